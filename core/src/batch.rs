//! Batch processing: repeated recorder invocations with per-item isolation.
//!
//! RULE: One item's failure never touches its siblings. Each item is its
//! own atomic unit; a validation rejection or an internal fault becomes a
//! FAILED entry in the results, and processing moves on. Results keep the
//! input order.

use crate::{
    config::LedgerConfig,
    error::LedgerResult,
    event::{EventLogEntry, LedgerEvent},
    recorder::{TransactionOutcome, TransactionRecorder},
    store::LedgerStore,
    types::{AgencyId, ContractId, TransactionId, UserId},
    validation::TransactionRequest,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

/// One batch line: the per-item fields. Agency and performer are shared
/// across the whole batch and supplied once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    pub contract_id: Option<ContractId>,
    pub txn_type: String,
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub verified_by: Option<UserId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemDisposition {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchItemResult {
    pub contract_id: Option<ContractId>,
    pub transaction_id: Option<TransactionId>,
    pub reference: Option<String>,
    pub outcome: ItemDisposition,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub batch_id: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<BatchItemResult>,
}

pub struct BatchProcessor<'a> {
    store: &'a LedgerStore,
    recorder: TransactionRecorder<'a>,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(store: &'a LedgerStore, config: &'a LedgerConfig) -> Self {
        Self {
            store,
            recorder: TransactionRecorder::new(store, config),
        }
    }

    /// Process items sequentially, in order. A deadline, when given, is
    /// honored between items as well as inside each recorder call; items
    /// not attempted before expiry come back FAILED.
    pub fn process(
        &self,
        items: &[BatchItem],
        agency_id: AgencyId,
        performed_by: UserId,
        deadline: Option<Instant>,
    ) -> LedgerResult<BatchSummary> {
        let batch_id = Uuid::new_v4().to_string();
        let mut results = Vec::with_capacity(items.len());
        let mut succeeded = 0usize;
        let mut failed = 0usize;

        for (index, item) in items.iter().enumerate() {
            let req = TransactionRequest {
                contract_id: item.contract_id,
                txn_type: item.txn_type.clone(),
                amount: item.amount,
                agency_id: Some(agency_id),
                performed_by: Some(performed_by),
                verified_by: item.verified_by,
                description: item.description.clone(),
                currency: item.currency.clone(),
            };

            let result = match self.recorder.record_by(&req, deadline) {
                Ok(TransactionOutcome::Recorded {
                    transaction_id,
                    reference,
                    ..
                }) => {
                    succeeded += 1;
                    BatchItemResult {
                        contract_id: item.contract_id,
                        transaction_id: Some(transaction_id),
                        reference: Some(reference.clone()),
                        outcome: ItemDisposition::Success,
                        message: format!("Transaction recorded under {reference}"),
                    }
                }
                Ok(TransactionOutcome::Rejected(rejection)) => {
                    failed += 1;
                    BatchItemResult {
                        contract_id: item.contract_id,
                        transaction_id: None,
                        reference: None,
                        outcome: ItemDisposition::Failed,
                        message: rejection.to_string(),
                    }
                }
                // Internal faults stay inside the batch: the item failed,
                // its siblings still get their turn.
                Err(fault) => {
                    log::warn!("batch {batch_id} item {index} faulted: {fault}");
                    failed += 1;
                    BatchItemResult {
                        contract_id: item.contract_id,
                        transaction_id: None,
                        reference: None,
                        outcome: ItemDisposition::Failed,
                        message: format!("Internal error: {fault}"),
                    }
                }
            };
            results.push(result);
        }

        let summary = BatchSummary {
            batch_id: batch_id.clone(),
            total: items.len(),
            succeeded,
            failed,
            results,
        };

        let event = LedgerEvent::BatchCompleted {
            batch_id,
            total: summary.total,
            succeeded,
            failed,
        };
        self.store.db().append_event(&EventLogEntry {
            id: None,
            component: "batch".to_string(),
            event_type: event.type_name().to_string(),
            payload: serde_json::to_string(&event)?,
            created_at: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        })?;

        log::info!(
            "batch {}: {} items, {succeeded} succeeded, {failed} failed",
            summary.batch_id,
            summary.total
        );
        Ok(summary)
    }
}
