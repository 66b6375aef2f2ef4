//! The engine facade — wires the store and config to the public operations.
//!
//! Callers hold one `Ledger` per connection. Concurrent callers each open
//! their own (`LedgerStore::reopen` on a file-backed database); SQLite's
//! locking then serializes the write transactions underneath.

use crate::{
    balance,
    batch::{BatchItem, BatchProcessor, BatchSummary},
    clients::{ClientDirectory, ClientPage, ClientQuery, ClientRequest, OnboardingOutcome},
    config::LedgerConfig,
    error::LedgerResult,
    recorder::{TransactionOutcome, TransactionRecorder},
    stats::{StatsAggregator, StatsFilter, TransactionStats},
    store::LedgerStore,
    types::{AgencyId, ContractId, UserId},
    validation::{Checked, TransactionRequest},
};
use std::time::Instant;

pub struct Ledger {
    store: LedgerStore,
    config: LedgerConfig,
}

impl Ledger {
    pub fn open(path: &str, config: LedgerConfig) -> LedgerResult<Self> {
        Ok(Self {
            store: LedgerStore::open(path)?,
            config,
        })
    }

    pub fn in_memory(config: LedgerConfig) -> LedgerResult<Self> {
        Ok(Self {
            store: LedgerStore::in_memory()?,
            config,
        })
    }

    pub fn migrate(&self) -> LedgerResult<()> {
        self.store.migrate()
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Record one transaction. Expected violations come back as a rejected
    /// outcome with a zero id and empty reference, never as an error.
    pub fn add_transaction(&self, req: &TransactionRequest) -> LedgerResult<TransactionOutcome> {
        TransactionRecorder::new(&self.store, &self.config).record(req)
    }

    pub fn add_transaction_with_deadline(
        &self,
        req: &TransactionRequest,
        deadline: Instant,
    ) -> LedgerResult<TransactionOutcome> {
        TransactionRecorder::new(&self.store, &self.config).record_by(req, Some(deadline))
    }

    /// Record a batch sharing one agency and performer; see `batch`.
    pub fn add_transaction_batch(
        &self,
        items: &[BatchItem],
        agency_id: AgencyId,
        performed_by: UserId,
    ) -> LedgerResult<BatchSummary> {
        BatchProcessor::new(&self.store, &self.config).process(items, agency_id, performed_by, None)
    }

    pub fn add_transaction_batch_with_deadline(
        &self,
        items: &[BatchItem],
        agency_id: AgencyId,
        performed_by: UserId,
        deadline: Instant,
    ) -> LedgerResult<BatchSummary> {
        BatchProcessor::new(&self.store, &self.config).process(
            items,
            agency_id,
            performed_by,
            Some(deadline),
        )
    }

    pub fn transaction_stats(&self, filter: &StatsFilter) -> LedgerResult<TransactionStats> {
        StatsAggregator::new(&self.store).transaction_stats(filter)
    }

    pub fn add_client(&self, req: &ClientRequest) -> LedgerResult<OnboardingOutcome> {
        ClientDirectory::new(&self.store, &self.config).register(req)
    }

    pub fn clients_by_agency(&self, query: &ClientQuery) -> LedgerResult<Checked<ClientPage>> {
        ClientDirectory::new(&self.store, &self.config).list_by_agency(query)
    }

    /// Current derived balance of a contract (replayed, never stored).
    pub fn contract_balance(&self, contract_id: ContractId) -> LedgerResult<f64> {
        balance::contract_balance(self.store.db(), contract_id)
    }
}
