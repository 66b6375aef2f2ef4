//! The single-transaction use case.
//!
//! One recorder call is one atomic unit: validation, the withdrawal balance
//! guard, the reference claim, the insert, and the DRAFT -> ACTIVE side
//! effect all run inside a single BEGIN IMMEDIATE transaction. An early
//! return drops the transaction, which rolls everything back — a rejected
//! or faulted call never leaves partial state behind.

use crate::{
    balance,
    config::LedgerConfig,
    error::LedgerResult,
    event::{EventLogEntry, LedgerEvent},
    reference,
    store::{LedgerStore, NewTransaction},
    types::{TransactionId, TransactionStatus, TransactionType},
    validation::{self, Rejection, TransactionRequest},
};
use chrono::Utc;
use std::time::Instant;

#[derive(Debug)]
pub enum TransactionOutcome {
    Recorded {
        transaction_id: TransactionId,
        reference: String,
        contract_activated: bool,
    },
    Rejected(Rejection),
}

impl TransactionOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded { .. })
    }

    /// Zero when rejected — the sentinel "no identifier".
    pub fn transaction_id(&self) -> TransactionId {
        match self {
            Self::Recorded { transaction_id, .. } => *transaction_id,
            Self::Rejected(_) => 0,
        }
    }

    /// Empty when rejected.
    pub fn reference(&self) -> &str {
        match self {
            Self::Recorded { reference, .. } => reference,
            Self::Rejected(_) => "",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Recorded { reference, .. } => {
                format!("Transaction recorded under {reference}")
            }
            Self::Rejected(rejection) => rejection.to_string(),
        }
    }
}

pub struct TransactionRecorder<'a> {
    store: &'a LedgerStore,
    config: &'a LedgerConfig,
}

impl<'a> TransactionRecorder<'a> {
    pub fn new(store: &'a LedgerStore, config: &'a LedgerConfig) -> Self {
        Self { store, config }
    }

    pub fn record(&self, req: &TransactionRequest) -> LedgerResult<TransactionOutcome> {
        self.record_by(req, None)
    }

    /// Record with an optional caller-supplied deadline. The deadline is
    /// checked on entry and again right before commit; expiry aborts with
    /// the store untouched.
    pub fn record_by(
        &self,
        req: &TransactionRequest,
        deadline: Option<Instant>,
    ) -> LedgerResult<TransactionOutcome> {
        if expired(deadline) {
            return Ok(TransactionOutcome::Rejected(Rejection::DeadlineExceeded));
        }

        let txn = self.store.begin_immediate()?;
        let db = txn.db();

        // Validating.
        let validated = match validation::validate(db, req, &self.config.default_currency)? {
            Ok(v) => v,
            Err(rejection) => {
                log::debug!("transaction rejected: {rejection}");
                return Ok(TransactionOutcome::Rejected(rejection));
            }
        };

        // BalanceChecking — withdrawals only. Runs against the write
        // transaction's snapshot, so a concurrently committed withdrawal
        // is already visible here.
        if validated.txn_type == TransactionType::Withdrawal {
            let available = balance::contract_balance(db, validated.contract_id)?;
            if validated.amount > available {
                log::debug!(
                    "withdrawal of {:.2} rejected, balance {available:.2} on contract {}",
                    validated.amount,
                    validated.contract_id
                );
                return Ok(TransactionOutcome::Rejected(Rejection::InsufficientBalance {
                    requested: validated.amount,
                    available,
                }));
            }
        }

        // Recording.
        let now = Utc::now();
        let sequence = db.next_reference_sequence()?;
        let reference = reference::transaction_reference(
            &self.config.reference_prefix,
            now.date_naive(),
            sequence,
            self.config.reference_pad,
        );
        let transaction_id = db.insert_transaction(&NewTransaction {
            reference: reference.clone(),
            contract_id: validated.contract_id,
            agency_id: validated.agency_id,
            txn_type: validated.txn_type,
            amount: validated.amount,
            currency: validated.currency,
            status: TransactionStatus::Completed,
            performed_by: validated.performed_by,
            verified_by: validated.verified_by,
            description: validated.description.clone(),
            created_at: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        })?;

        // PostEffects: first completed PAYMENT activates a DRAFT contract.
        // The guarded UPDATE flips at most once, so repeats are no-ops.
        let contract_activated = if validated.txn_type == TransactionType::Payment {
            db.activate_contract_if_draft(validated.contract_id)?
        } else {
            false
        };

        if expired(deadline) {
            // Abort before commit; the dropped transaction rolls back.
            return Ok(TransactionOutcome::Rejected(Rejection::DeadlineExceeded));
        }
        txn.commit()?;

        log::debug!(
            "recorded {reference} ({} {:.2} {}) on contract {}{}",
            validated.txn_type.as_str(),
            validated.amount,
            validated.currency.as_str(),
            validated.contract_id,
            if contract_activated { ", contract activated" } else { "" }
        );

        self.append_audit_events(transaction_id, &reference, &validated, contract_activated)?;

        Ok(TransactionOutcome::Recorded {
            transaction_id,
            reference,
            contract_activated,
        })
    }

    fn append_audit_events(
        &self,
        transaction_id: TransactionId,
        reference: &str,
        validated: &validation::ValidatedTransaction,
        contract_activated: bool,
    ) -> LedgerResult<()> {
        let mut events = vec![LedgerEvent::TransactionRecorded {
            transaction_id,
            reference: reference.to_string(),
            contract_id: validated.contract_id,
            agency_id: validated.agency_id,
            txn_type: validated.txn_type.as_str().to_string(),
            amount: validated.amount,
            currency: validated.currency.as_str().to_string(),
        }];
        if contract_activated {
            events.push(LedgerEvent::ContractActivated {
                contract_id: validated.contract_id,
                transaction_id,
            });
        }
        let db = self.store.db();
        for event in &events {
            db.append_event(&EventLogEntry {
                id: None,
                component: "recorder".to_string(),
                event_type: event.type_name().to_string(),
                payload: serde_json::to_string(event)?,
                created_at: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            })?;
        }
        Ok(())
    }
}

fn expired(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}
