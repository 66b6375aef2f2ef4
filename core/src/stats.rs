//! Read-only statistics over the transaction ledger.
//!
//! Fully independent of the write path. All filters are inclusive; a None
//! filter means no restriction. An empty filtered set yields zero-valued
//! aggregates, never a missing result.

use crate::{error::LedgerResult, store::LedgerStore, types::AgencyId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsFilter {
    #[serde(default)]
    pub agency_id: Option<AgencyId>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Breakdown {
    pub count: i64,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionStats {
    pub total_transactions: i64,
    pub total_amount: f64,
    pub average_amount: f64,
    pub min_amount: f64,
    pub max_amount: f64,
    pub completed_count: i64,
    pub failed_count: i64,
    pub pending_count: i64,
    /// Average over COMPLETED transactions only.
    pub completed_average: f64,
    pub by_type: BTreeMap<String, Breakdown>,
    pub by_agency: BTreeMap<String, Breakdown>,
}

pub struct StatsAggregator<'a> {
    store: &'a LedgerStore,
}

impl<'a> StatsAggregator<'a> {
    pub fn new(store: &'a LedgerStore) -> Self {
        Self { store }
    }

    pub fn transaction_stats(&self, filter: &StatsFilter) -> LedgerResult<TransactionStats> {
        let db = self.store.db();
        let agency = filter.agency_id;
        let start = filter.start_date.map(|d| d.to_string());
        let end = filter.end_date.map(|d| d.to_string());
        let (start, end) = (start.as_deref(), end.as_deref());

        let (total_transactions, total_amount, average_amount, min_amount, max_amount) =
            db.stats_overall(agency, start, end)?;
        let (completed_count, failed_count, pending_count) =
            db.stats_status_counts(agency, start, end)?;
        let completed_average = db.stats_completed_average(agency, start, end)?;

        let by_type = db
            .stats_by_type(agency, start, end)?
            .into_iter()
            .map(|(txn_type, count, total_amount)| {
                (
                    txn_type,
                    Breakdown {
                        count,
                        total_amount,
                    },
                )
            })
            .collect();
        let by_agency = db
            .stats_by_agency(agency, start, end)?
            .into_iter()
            .map(|(name, count, total_amount)| {
                (
                    name,
                    Breakdown {
                        count,
                        total_amount,
                    },
                )
            })
            .collect();

        log::debug!(
            "stats: {total_transactions} transactions, volume {total_amount:.2} \
             (agency filter: {agency:?})"
        );

        Ok(TransactionStats {
            total_transactions,
            total_amount,
            average_amount,
            min_amount,
            max_amount,
            completed_count,
            failed_count,
            pending_count,
            completed_average,
            by_type,
            by_agency,
        })
    }
}
