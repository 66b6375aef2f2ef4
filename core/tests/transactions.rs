//! Transaction recorder integration tests.
//!
//! Verifies:
//!   - A PAYMENT on a DRAFT contract records, activates the contract, and
//!     produces a TXN-<date>-<seq> reference
//!   - The activation happens exactly once (second PAYMENT is a no-op)
//!   - Balances are replayed from signed COMPLETED amounts
//!   - Over-balance withdrawals reject without writing a row
//!   - Every validation failure is reported as a rejection with a zero id,
//!     in the documented check order
//!   - An expired deadline aborts before anything is written

use chrono::Utc;
use ledger_core::{
    config::LedgerConfig,
    ledger::Ledger,
    store::{NewClient, NewContract},
    types::{AgencyId, ContractId, ContractStatus, UserId},
    validation::TransactionRequest,
};
use std::time::Instant;

struct Fix {
    ag_douala: AgencyId,
    ag_yaounde: AgencyId,
    ag_closed_down: AgencyId,
    staff: UserId,
    retired_staff: UserId,
    draft_contract: ContractId,
    active_contract: ContractId,
    closed_contract: ContractId,
    orphan_agency_contract: ContractId,
}

fn ledger() -> (Ledger, Fix) {
    let ledger = Ledger::in_memory(LedgerConfig::default()).unwrap();
    ledger.migrate().unwrap();
    let db = ledger.store().db();

    let ag_douala = db
        .insert_agency("AG-001", "Agence Douala", Some("Douala"), true)
        .unwrap();
    let ag_yaounde = db
        .insert_agency("AG-002", "Agence Yaoundé", Some("Yaoundé"), true)
        .unwrap();
    let ag_closed_down = db
        .insert_agency("AG-003", "Agence Garoua", Some("Garoua"), false)
        .unwrap();

    let staff = db
        .insert_user("caisse.ag001@example.cm", "AGENCY_STAFF", Some(ag_douala), true)
        .unwrap();
    let retired_staff = db
        .insert_user("ancien.ag001@example.cm", "AGENCY_STAFF", Some(ag_douala), false)
        .unwrap();

    let client = db
        .insert_client(&NewClient {
            national_id: "100000000001".into(),
            full_name: "Amina Nkemeni".into(),
            email: Some("amina.nkemeni@example.cm".into()),
            phone: None,
            address: None,
            date_of_birth: None,
            agency_id: ag_douala,
            registration_date: "2026-01-15".into(),
            created_by: Some(staff),
        })
        .unwrap();

    let contract = |number: &str, agency: AgencyId, status: ContractStatus| {
        db.insert_contract(&NewContract {
            contract_number: number.into(),
            client_id: client,
            agency_id: agency,
            contract_type: "LOAN".into(),
            amount: 1_000_000.0,
            start_date: Some("2026-01-15".into()),
            end_date: None,
            status,
        })
        .unwrap()
    };
    let draft_contract = contract("CTR-001", ag_douala, ContractStatus::Draft);
    let active_contract = contract("CTR-002", ag_douala, ContractStatus::Active);
    let closed_contract = contract("CTR-003", ag_douala, ContractStatus::Closed);
    let orphan_agency_contract = contract("CTR-004", ag_closed_down, ContractStatus::Active);

    (
        ledger,
        Fix {
            ag_douala,
            ag_yaounde,
            ag_closed_down,
            staff,
            retired_staff,
            draft_contract,
            active_contract,
            closed_contract,
            orphan_agency_contract,
        },
    )
}

fn request(fix: &Fix, contract: ContractId, txn_type: &str, amount: f64) -> TransactionRequest {
    TransactionRequest {
        contract_id: Some(contract),
        txn_type: txn_type.into(),
        amount,
        agency_id: Some(fix.ag_douala),
        performed_by: Some(fix.staff),
        ..Default::default()
    }
}

#[test]
fn payment_on_draft_contract_records_and_activates() {
    let (ledger, fix) = ledger();

    let outcome = ledger
        .add_transaction(&request(&fix, fix.draft_contract, "PAYMENT", 50_000.0))
        .unwrap();

    assert!(outcome.is_recorded(), "expected success: {}", outcome.message());
    assert!(outcome.transaction_id() > 0);
    let expected_prefix = format!("TXN-{}-", Utc::now().format("%Y%m%d"));
    assert!(
        outcome.reference().starts_with(&expected_prefix),
        "reference {} must start with {expected_prefix}",
        outcome.reference()
    );

    let status = ledger
        .store()
        .db()
        .contract_status(fix.draft_contract)
        .unwrap()
        .unwrap();
    assert_eq!(status, ContractStatus::Active, "DRAFT must flip to ACTIVE");

    let row = ledger
        .store()
        .db()
        .transaction(outcome.transaction_id())
        .unwrap()
        .expect("row must exist");
    assert_eq!(row.status, "COMPLETED");
    assert_eq!(row.currency, "XAF", "home currency applies when unspecified");
}

#[test]
fn activation_happens_exactly_once() {
    let (ledger, fix) = ledger();

    ledger
        .add_transaction(&request(&fix, fix.draft_contract, "PAYMENT", 50_000.0))
        .unwrap();
    let second = ledger
        .add_transaction(&request(&fix, fix.draft_contract, "PAYMENT", 25_000.0))
        .unwrap();

    assert!(second.is_recorded());
    let status = ledger
        .store()
        .db()
        .contract_status(fix.draft_contract)
        .unwrap()
        .unwrap();
    assert_eq!(status, ContractStatus::Active);

    // Only the first payment flips the contract, so only one activation
    // event exists.
    let activations = ledger
        .store()
        .db()
        .events_of_type("contract_activated")
        .unwrap();
    assert_eq!(activations.len(), 1);
}

#[test]
fn balance_is_the_replay_of_signed_amounts() {
    let (ledger, fix) = ledger();
    let c = fix.active_contract;

    for (txn_type, amount) in [
        ("DEPOSIT", 100_000.0),
        ("PAYMENT", 50_000.0),
        ("FEE", 10_000.0),
        ("WITHDRAWAL", 30_000.0),
        ("PENALTY", 99_999.0), // neutral: recorded, no balance weight
    ] {
        let outcome = ledger.add_transaction(&request(&fix, c, txn_type, amount)).unwrap();
        assert!(outcome.is_recorded(), "{txn_type}: {}", outcome.message());
    }

    let balance = ledger.contract_balance(c).unwrap();
    assert!(
        (balance - 110_000.0).abs() < 1e-9,
        "expected 110000, got {balance}"
    );
}

#[test]
fn withdrawal_over_balance_rejects_and_writes_nothing() {
    let (ledger, fix) = ledger();
    let c = fix.active_contract;

    ledger.add_transaction(&request(&fix, c, "DEPOSIT", 20_000.0)).unwrap();
    let outcome = ledger
        .add_transaction(&request(&fix, c, "WITHDRAWAL", 50_000.0))
        .unwrap();

    assert!(!outcome.is_recorded());
    assert_eq!(outcome.transaction_id(), 0);
    assert_eq!(outcome.reference(), "");
    assert!(
        outcome.message().contains("Insufficient balance"),
        "got: {}",
        outcome.message()
    );

    let count = ledger
        .store()
        .db()
        .transaction_count_for_contract(c)
        .unwrap();
    assert_eq!(count, 1, "the rejected withdrawal must not leave a row");
}

#[test]
fn withdrawal_up_to_the_balance_is_allowed() {
    let (ledger, fix) = ledger();
    let c = fix.active_contract;

    ledger.add_transaction(&request(&fix, c, "DEPOSIT", 20_000.0)).unwrap();
    let outcome = ledger
        .add_transaction(&request(&fix, c, "WITHDRAWAL", 20_000.0))
        .unwrap();

    assert!(outcome.is_recorded(), "{}", outcome.message());
    assert_eq!(ledger.contract_balance(c).unwrap(), 0.0);
}

#[test]
fn unknown_contract_rejects_with_not_found() {
    let (ledger, fix) = ledger();

    let outcome = ledger
        .add_transaction(&request(&fix, 9_999, "PAYMENT", 10_000.0))
        .unwrap();

    assert_eq!(outcome.transaction_id(), 0);
    assert!(
        outcome.message().contains("not found"),
        "got: {}",
        outcome.message()
    );
}

#[test]
fn closed_contract_rejects_new_transactions() {
    let (ledger, fix) = ledger();

    let outcome = ledger
        .add_transaction(&request(&fix, fix.closed_contract, "DEPOSIT", 10_000.0))
        .unwrap();

    assert!(!outcome.is_recorded());
    assert!(outcome.message().contains("CLOSED"), "got: {}", outcome.message());
}

#[test]
fn agency_mismatch_rejects() {
    let (ledger, fix) = ledger();

    let mut req = request(&fix, fix.active_contract, "DEPOSIT", 10_000.0);
    req.agency_id = Some(fix.ag_yaounde);
    let outcome = ledger.add_transaction(&req).unwrap();

    assert!(!outcome.is_recorded());
    assert!(
        outcome.message().contains("belongs to agency"),
        "got: {}",
        outcome.message()
    );
}

#[test]
fn inactive_agency_rejects() {
    let (ledger, fix) = ledger();

    let mut req = request(&fix, fix.orphan_agency_contract, "DEPOSIT", 10_000.0);
    req.agency_id = Some(fix.ag_closed_down);
    let outcome = ledger.add_transaction(&req).unwrap();

    assert!(!outcome.is_recorded());
    assert!(outcome.message().contains("inactive"), "got: {}", outcome.message());
}

#[test]
fn inactive_performer_and_verifier_reject() {
    let (ledger, fix) = ledger();

    let mut req = request(&fix, fix.active_contract, "DEPOSIT", 10_000.0);
    req.performed_by = Some(fix.retired_staff);
    let outcome = ledger.add_transaction(&req).unwrap();
    assert!(outcome.message().contains("inactive"), "got: {}", outcome.message());

    let mut req = request(&fix, fix.active_contract, "DEPOSIT", 10_000.0);
    req.verified_by = Some(fix.retired_staff);
    let outcome = ledger.add_transaction(&req).unwrap();
    assert!(outcome.message().contains("inactive"), "got: {}", outcome.message());
}

#[test]
fn unknown_type_and_currency_reject() {
    let (ledger, fix) = ledger();

    let outcome = ledger
        .add_transaction(&request(&fix, fix.active_contract, "TRANSFER", 10_000.0))
        .unwrap();
    assert!(
        outcome.message().contains("Unknown transaction type"),
        "got: {}",
        outcome.message()
    );

    let mut req = request(&fix, fix.active_contract, "DEPOSIT", 10_000.0);
    req.currency = Some("GBP".into());
    let outcome = ledger.add_transaction(&req).unwrap();
    assert!(
        outcome.message().contains("Unknown currency"),
        "got: {}",
        outcome.message()
    );
}

#[test]
fn missing_required_fields_reject() {
    let (ledger, fix) = ledger();

    let mut req = request(&fix, fix.active_contract, "DEPOSIT", 0.0);
    let outcome = ledger.add_transaction(&req).unwrap();
    assert!(outcome.message().contains("amount"), "got: {}", outcome.message());

    req = request(&fix, fix.active_contract, "DEPOSIT", 10_000.0);
    req.contract_id = None;
    let outcome = ledger.add_transaction(&req).unwrap();
    assert!(
        outcome.message().contains("contract_id"),
        "got: {}",
        outcome.message()
    );

    req = request(&fix, fix.active_contract, "DEPOSIT", 10_000.0);
    req.performed_by = None;
    let outcome = ledger.add_transaction(&req).unwrap();
    assert!(
        outcome.message().contains("performed_by"),
        "got: {}",
        outcome.message()
    );
}

#[test]
fn references_are_distinct_and_sequential() {
    let (ledger, fix) = ledger();

    for _ in 0..3 {
        ledger
            .add_transaction(&request(&fix, fix.active_contract, "DEPOSIT", 1_000.0))
            .unwrap();
    }

    let refs = ledger.store().db().all_references().unwrap();
    assert_eq!(refs.len(), 3);
    let date = Utc::now().format("%Y%m%d").to_string();
    assert_eq!(refs[0], format!("TXN-{date}-000001"));
    assert_eq!(refs[1], format!("TXN-{date}-000002"));
    assert_eq!(refs[2], format!("TXN-{date}-000003"));
}

#[test]
fn expired_deadline_aborts_without_writing() {
    let (ledger, fix) = ledger();

    let outcome = ledger
        .add_transaction_with_deadline(
            &request(&fix, fix.active_contract, "DEPOSIT", 10_000.0),
            Instant::now(),
        )
        .unwrap();

    assert!(!outcome.is_recorded());
    assert!(outcome.message().contains("Deadline"), "got: {}", outcome.message());
    assert_eq!(ledger.store().db().transaction_count().unwrap(), 0);
}

#[test]
fn recorded_transactions_appear_in_the_audit_log() {
    let (ledger, fix) = ledger();

    ledger
        .add_transaction(&request(&fix, fix.active_contract, "DEPOSIT", 10_000.0))
        .unwrap();
    ledger
        .add_transaction(&request(&fix, fix.active_contract, "DEPOSIT", 20_000.0))
        .unwrap();

    let events = ledger
        .store()
        .db()
        .events_of_type("transaction_recorded")
        .unwrap();
    assert_eq!(events.len(), 2);
    assert!(events[0].payload.contains("\"reference\""));
}
