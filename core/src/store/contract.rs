use super::{bad_enum, Db};
use crate::{
    error::LedgerResult,
    types::{AgencyId, ClientId, ContractId, ContractStatus},
};
use rusqlite::{params, OptionalExtension};

#[derive(Debug, Clone)]
pub struct NewContract {
    pub contract_number: String,
    pub client_id: ClientId,
    pub agency_id: AgencyId,
    pub contract_type: String,
    pub amount: f64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: ContractStatus,
}

#[derive(Debug, Clone)]
pub struct ContractRow {
    pub contract_id: ContractId,
    pub contract_number: String,
    pub client_id: ClientId,
    pub agency_id: AgencyId,
    pub contract_type: String,
    pub amount: f64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: ContractStatus,
}

impl Db<'_> {
    pub fn insert_contract(&self, c: &NewContract) -> LedgerResult<ContractId> {
        self.conn.execute(
            "INSERT INTO contract (
                contract_number, client_id, agency_id, contract_type,
                amount, start_date, end_date, status
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                c.contract_number,
                c.client_id,
                c.agency_id,
                c.contract_type,
                c.amount,
                c.start_date,
                c.end_date,
                c.status.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn contract(&self, contract_id: ContractId) -> LedgerResult<Option<ContractRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT contract_id, contract_number, client_id, agency_id,
                        contract_type, amount, start_date, end_date, status
                 FROM contract WHERE contract_id = ?1",
                params![contract_id],
                |row| {
                    let status: String = row.get(8)?;
                    Ok(ContractRow {
                        contract_id: row.get(0)?,
                        contract_number: row.get(1)?,
                        client_id: row.get(2)?,
                        agency_id: row.get(3)?,
                        contract_type: row.get(4)?,
                        amount: row.get(5)?,
                        start_date: row.get(6)?,
                        end_date: row.get(7)?,
                        status: ContractStatus::parse(&status).ok_or_else(|| bad_enum(8, &status))?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// DRAFT -> ACTIVE, as a payment side effect. Returns whether a row
    /// actually flipped; already-ACTIVE contracts are left untouched, which
    /// makes the transition idempotent.
    pub fn activate_contract_if_draft(&self, contract_id: ContractId) -> LedgerResult<bool> {
        let changed = self.conn.execute(
            "UPDATE contract SET status = 'ACTIVE'
             WHERE contract_id = ?1 AND status = 'DRAFT'",
            params![contract_id],
        )?;
        Ok(changed > 0)
    }

    pub fn contract_status(&self, contract_id: ContractId) -> LedgerResult<Option<ContractStatus>> {
        let status: Option<String> = self
            .conn
            .query_row(
                "SELECT status FROM contract WHERE contract_id = ?1",
                params![contract_id],
                |row| row.get(0),
            )
            .optional()?;
        match status {
            Some(s) => Ok(Some(ContractStatus::parse(&s).ok_or_else(|| bad_enum(0, &s))?)),
            None => Ok(None),
        }
    }
}
