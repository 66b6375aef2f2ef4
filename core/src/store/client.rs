use super::Db;
use crate::{
    error::LedgerResult,
    types::{AgencyId, ClientId, SortField, SortOrder, UserId},
};
use rusqlite::{params, OptionalExtension};
use serde::Serialize;

/// Insert payload for a client row. Fields arrive already normalized
/// (casing and trimming are the onboarding component's job).
#[derive(Debug, Clone)]
pub struct NewClient {
    pub national_id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub agency_id: AgencyId,
    pub registration_date: String,
    pub created_by: Option<UserId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientRow {
    pub client_id: ClientId,
    pub national_id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub agency_id: AgencyId,
    pub status: String,
    pub registration_date: String,
    pub created_by: Option<UserId>,
}

const CLIENT_COLUMNS: &str = "client_id, national_id, full_name, email, phone, address,
     date_of_birth, agency_id, status, registration_date, created_by";

fn client_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<ClientRow> {
    Ok(ClientRow {
        client_id: row.get(0)?,
        national_id: row.get(1)?,
        full_name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        address: row.get(5)?,
        date_of_birth: row.get(6)?,
        agency_id: row.get(7)?,
        status: row.get(8)?,
        registration_date: row.get(9)?,
        created_by: row.get(10)?,
    })
}

impl Db<'_> {
    pub fn insert_client(&self, c: &NewClient) -> LedgerResult<ClientId> {
        self.conn.execute(
            "INSERT INTO client (
                national_id, full_name, email, phone, address, date_of_birth,
                agency_id, status, registration_date, created_by
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'ACTIVE', ?8, ?9)",
            params![
                c.national_id,
                c.full_name,
                c.email,
                c.phone,
                c.address,
                c.date_of_birth,
                c.agency_id,
                c.registration_date,
                c.created_by,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn client(&self, client_id: ClientId) -> LedgerResult<Option<ClientRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CLIENT_COLUMNS} FROM client WHERE client_id = ?1"
        ))?;
        let row = stmt
            .query_row(params![client_id], client_row_mapper)
            .optional()?;
        Ok(row)
    }

    pub fn national_id_exists(&self, national_id: &str) -> LedgerResult<bool> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM client WHERE national_id = ?1",
            params![national_id],
            |row| row.get(0),
        )?;
        Ok(n > 0)
    }

    pub fn client_email_exists(&self, email: &str) -> LedgerResult<bool> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM client WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )?;
        Ok(n > 0)
    }

    /// One page of an agency's clients plus the unpaged match count.
    ///
    /// `pattern`, when present, is a ready-made LIKE pattern (`%term%`)
    /// matched against national id, name, email, and phone. The ORDER BY
    /// clause is assembled from the closed enums only — caller strings never
    /// reach the SQL text.
    pub fn clients_page(
        &self,
        agency_id: AgencyId,
        status: Option<&str>,
        pattern: Option<&str>,
        sort_by: SortField,
        sort_order: SortOrder,
        limit: i64,
        offset: i64,
    ) -> LedgerResult<(i64, Vec<ClientRow>)> {
        const MATCH_CLAUSE: &str = "agency_id = ?1
               AND (?2 IS NULL OR status = ?2)
               AND (?3 IS NULL
                    OR national_id LIKE ?3
                    OR full_name LIKE ?3
                    OR email LIKE ?3
                    OR phone LIKE ?3)";

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM client WHERE {MATCH_CLAUSE}"),
            params![agency_id, status, pattern],
            |row| row.get(0),
        )?;

        let sql = format!(
            "SELECT {CLIENT_COLUMNS} FROM client
             WHERE {MATCH_CLAUSE}
             ORDER BY {} {}, client_id ASC
             LIMIT ?4 OFFSET ?5",
            sort_by.column(),
            sort_order.as_sql(),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                params![agency_id, status, pattern, limit, offset],
                client_row_mapper,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok((total, rows))
    }

    /// Count clients in an agency (test helper).
    pub fn client_count(&self, agency_id: AgencyId) -> LedgerResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM client WHERE agency_id = ?1",
                params![agency_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}
