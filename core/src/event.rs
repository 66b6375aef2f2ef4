//! The audit trail — every externally visible fact the engine produces.
//!
//! Events are appended to the `event_log` table after the write that caused
//! them has committed. They are a record, not a control channel: nothing in
//! the engine reads them back to make decisions.

use crate::types::{AgencyId, ClientId, ContractId, TransactionId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    TransactionRecorded {
        transaction_id: TransactionId,
        reference: String,
        contract_id: ContractId,
        agency_id: AgencyId,
        txn_type: String,
        amount: f64,
        currency: String,
    },
    ContractActivated {
        contract_id: ContractId,
        transaction_id: TransactionId,
    },
    ClientRegistered {
        client_id: ClientId,
        agency_id: AgencyId,
        national_id: String,
    },
    BatchCompleted {
        batch_id: String,
        total: usize,
        succeeded: usize,
        failed: usize,
    },
}

impl LedgerEvent {
    /// Stable string name for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::TransactionRecorded { .. } => "transaction_recorded",
            Self::ContractActivated { .. } => "contract_activated",
            Self::ClientRegistered { .. } => "client_registered",
            Self::BatchCompleted { .. } => "batch_completed",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub component: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized LedgerEvent
    pub created_at: String,
}
