use super::{bad_enum, Db};
use crate::{
    error::LedgerResult,
    types::{
        AgencyId, ContractId, Currency, TransactionId, TransactionStatus, TransactionType, UserId,
    },
};
use rusqlite::{params, OptionalExtension};
use serde::Serialize;

/// Insert payload for one ledger row. The reference has already been
/// generated; the recorder assembles this inside its write transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub reference: String,
    pub contract_id: ContractId,
    pub agency_id: AgencyId,
    pub txn_type: TransactionType,
    pub amount: f64,
    pub currency: Currency,
    pub status: TransactionStatus,
    pub performed_by: UserId,
    pub verified_by: Option<UserId>,
    pub description: Option<String>,
    pub created_at: String,
}

/// A transaction row as read back from the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedRow {
    pub transaction_id: TransactionId,
    pub reference: String,
    pub contract_id: ContractId,
    pub agency_id: AgencyId,
    pub txn_type: String,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    pub performed_by: UserId,
    pub verified_by: Option<UserId>,
    pub description: Option<String>,
    pub created_at: String,
}

const TXN_COLUMNS: &str = "transaction_id, reference, contract_id, agency_id, txn_type,
     amount, currency, status, performed_by, verified_by, description, created_at";

fn txn_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<RecordedRow> {
    Ok(RecordedRow {
        transaction_id: row.get(0)?,
        reference: row.get(1)?,
        contract_id: row.get(2)?,
        agency_id: row.get(3)?,
        txn_type: row.get(4)?,
        amount: row.get(5)?,
        currency: row.get(6)?,
        status: row.get(7)?,
        performed_by: row.get(8)?,
        verified_by: row.get(9)?,
        description: row.get(10)?,
        created_at: row.get(11)?,
    })
}

impl Db<'_> {
    pub fn insert_transaction(&self, t: &NewTransaction) -> LedgerResult<TransactionId> {
        self.conn.execute(
            "INSERT INTO transactions (
                reference, contract_id, agency_id, txn_type, amount, currency,
                status, performed_by, verified_by, description, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                t.reference,
                t.contract_id,
                t.agency_id,
                t.txn_type.as_str(),
                t.amount,
                t.currency.as_str(),
                t.status.as_str(),
                t.performed_by,
                t.verified_by,
                t.description,
                t.created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// The (type, amount) pairs of a contract's COMPLETED transactions, in
    /// insertion order. The balance calculator replays these; nothing is
    /// cached anywhere.
    pub fn completed_amounts(
        &self,
        contract_id: ContractId,
    ) -> LedgerResult<Vec<(TransactionType, f64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT txn_type, amount FROM transactions
             WHERE contract_id = ?1 AND status = 'COMPLETED'
             ORDER BY transaction_id ASC",
        )?;
        let entries = stmt
            .query_map(params![contract_id], |row| {
                let txn_type: String = row.get(0)?;
                let parsed =
                    TransactionType::parse(&txn_type).ok_or_else(|| bad_enum(0, &txn_type))?;
                Ok((parsed, row.get::<_, f64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn transaction(&self, transaction_id: TransactionId) -> LedgerResult<Option<RecordedRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TXN_COLUMNS} FROM transactions WHERE transaction_id = ?1"
        ))?;
        let row = stmt
            .query_row(params![transaction_id], txn_row_mapper)
            .optional()?;
        Ok(row)
    }

    pub fn transaction_by_reference(&self, reference: &str) -> LedgerResult<Option<RecordedRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TXN_COLUMNS} FROM transactions WHERE reference = ?1"
        ))?;
        let row = stmt.query_row(params![reference], txn_row_mapper).optional()?;
        Ok(row)
    }

    pub fn transaction_count(&self) -> LedgerResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))
            .map_err(Into::into)
    }

    pub fn transaction_count_for_contract(&self, contract_id: ContractId) -> LedgerResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM transactions WHERE contract_id = ?1",
                params![contract_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    /// Every reference in the ledger (test helper for uniqueness checks).
    pub fn all_references(&self) -> LedgerResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT reference FROM transactions ORDER BY transaction_id ASC")?;
        let refs = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(refs)
    }
}
