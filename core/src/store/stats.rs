//! Read-side aggregation queries for the statistics report.
//!
//! Every query carries the same three optional filters (agency, inclusive
//! start/end date); a NULL parameter means "no restriction". COALESCE keeps
//! the aggregates zero-valued over an empty filtered set.

use super::Db;
use crate::error::LedgerResult;
use rusqlite::params;

const FILTER_CLAUSE: &str = "(?1 IS NULL OR t.agency_id = ?1)
       AND (?2 IS NULL OR date(t.created_at) >= date(?2))
       AND (?3 IS NULL OR date(t.created_at) <= date(?3))";

impl Db<'_> {
    /// Overall count/sum/avg/min/max over the filtered set.
    pub fn stats_overall(
        &self,
        agency_id: Option<i64>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> LedgerResult<(i64, f64, f64, f64, f64)> {
        self.conn
            .query_row(
                &format!(
                    "SELECT COUNT(*),
                            COALESCE(SUM(t.amount), 0.0),
                            COALESCE(AVG(t.amount), 0.0),
                            COALESCE(MIN(t.amount), 0.0),
                            COALESCE(MAX(t.amount), 0.0)
                     FROM transactions t
                     WHERE {FILTER_CLAUSE}"
                ),
                params![agency_id, start_date, end_date],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                    ))
                },
            )
            .map_err(Into::into)
    }

    /// (completed, failed, pending) counts over the filtered set.
    pub fn stats_status_counts(
        &self,
        agency_id: Option<i64>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> LedgerResult<(i64, i64, i64)> {
        self.conn
            .query_row(
                &format!(
                    "SELECT COALESCE(SUM(CASE WHEN t.status = 'COMPLETED' THEN 1 ELSE 0 END), 0),
                            COALESCE(SUM(CASE WHEN t.status = 'FAILED' THEN 1 ELSE 0 END), 0),
                            COALESCE(SUM(CASE WHEN t.status = 'PENDING' THEN 1 ELSE 0 END), 0)
                     FROM transactions t
                     WHERE {FILTER_CLAUSE}"
                ),
                params![agency_id, start_date, end_date],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(Into::into)
    }

    /// (type, count, sum) per transaction type present in the filtered set.
    pub fn stats_by_type(
        &self,
        agency_id: Option<i64>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> LedgerResult<Vec<(String, i64, f64)>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT t.txn_type, COUNT(*), COALESCE(SUM(t.amount), 0.0)
             FROM transactions t
             WHERE {FILTER_CLAUSE}
             GROUP BY t.txn_type
             ORDER BY t.txn_type ASC"
        ))?;
        let rows = stmt
            .query_map(params![agency_id, start_date, end_date], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// (agency name, count, sum) per agency present in the filtered set.
    pub fn stats_by_agency(
        &self,
        agency_id: Option<i64>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> LedgerResult<Vec<(String, i64, f64)>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT a.name, COUNT(*), COALESCE(SUM(t.amount), 0.0)
             FROM transactions t
             JOIN agency a ON a.agency_id = t.agency_id
             WHERE {FILTER_CLAUSE}
             GROUP BY a.name
             ORDER BY a.name ASC"
        ))?;
        let rows = stmt
            .query_map(params![agency_id, start_date, end_date], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Average amount restricted to COMPLETED transactions.
    pub fn stats_completed_average(
        &self,
        agency_id: Option<i64>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> LedgerResult<f64> {
        self.conn
            .query_row(
                &format!(
                    "SELECT COALESCE(AVG(t.amount), 0.0)
                     FROM transactions t
                     WHERE t.status = 'COMPLETED' AND {FILTER_CLAUSE}"
                ),
                params![agency_id, start_date, end_date],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}
