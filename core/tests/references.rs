//! Reference uniqueness under concurrent writers.
//!
//! The generation scheme must hold globally unique references even when
//! several connections race: the sequence claim and the insert share one
//! BEGIN IMMEDIATE transaction, so two writers can never read the same
//! next value. This test runs real threads against one on-disk database,
//! each with its own connection, and checks every reference is distinct.

use ledger_core::{
    config::LedgerConfig,
    ledger::Ledger,
    store::{NewClient, NewContract},
    types::ContractStatus,
    validation::TransactionRequest,
};
use std::collections::HashSet;
use std::thread;

const THREADS: usize = 4;
const DEPOSITS_PER_THREAD: usize = 5;

#[test]
fn concurrent_writers_never_collide_on_references() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir
        .path()
        .join("ledger.db")
        .to_str()
        .unwrap()
        .to_string();

    // Seed the shared database once.
    let (agency, staff, contract) = {
        let ledger = Ledger::open(&path, LedgerConfig::default()).unwrap();
        ledger.migrate().unwrap();
        let db = ledger.store().db();
        let agency = db
            .insert_agency("AG-001", "Agence Douala", Some("Douala"), true)
            .unwrap();
        let staff = db
            .insert_user("caisse@example.cm", "AGENCY_STAFF", Some(agency), true)
            .unwrap();
        let client = db
            .insert_client(&NewClient {
                national_id: "100000000001".into(),
                full_name: "Amina Nkemeni".into(),
                email: None,
                phone: None,
                address: None,
                date_of_birth: None,
                agency_id: agency,
                registration_date: "2026-01-15".into(),
                created_by: None,
            })
            .unwrap();
        let contract = db
            .insert_contract(&NewContract {
                contract_number: "CTR-001".into(),
                client_id: client,
                agency_id: agency,
                contract_type: "SAVINGS".into(),
                amount: 1_000_000.0,
                start_date: None,
                end_date: None,
                status: ContractStatus::Active,
            })
            .unwrap();
        (agency, staff, contract)
    };

    // Every thread gets its own connection to the same file.
    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let path = path.clone();
            thread::spawn(move || {
                let ledger = Ledger::open(&path, LedgerConfig::default()).unwrap();
                for i in 0..DEPOSITS_PER_THREAD {
                    let outcome = ledger
                        .add_transaction(&TransactionRequest {
                            contract_id: Some(contract),
                            txn_type: "DEPOSIT".into(),
                            amount: 1_000.0 + (worker * DEPOSITS_PER_THREAD + i) as f64,
                            agency_id: Some(agency),
                            performed_by: Some(staff),
                            ..Default::default()
                        })
                        .unwrap();
                    assert!(outcome.is_recorded(), "{}", outcome.message());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let ledger = Ledger::open(&path, LedgerConfig::default()).unwrap();
    let refs = ledger.store().db().all_references().unwrap();
    assert_eq!(refs.len(), THREADS * DEPOSITS_PER_THREAD);

    let distinct: HashSet<&String> = refs.iter().collect();
    assert_eq!(
        distinct.len(),
        refs.len(),
        "every reference must be pairwise distinct"
    );

    // The balance replay sees all committed deposits.
    let total: f64 = (0..THREADS * DEPOSITS_PER_THREAD)
        .map(|n| 1_000.0 + n as f64)
        .sum();
    let balance = ledger.contract_balance(contract).unwrap();
    assert!(
        (balance - total).abs() < 1e-9,
        "expected {total}, got {balance}"
    );
}

#[test]
fn two_handles_on_one_database_interleave_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db").to_str().unwrap().to_string();

    let first = Ledger::open(&path, LedgerConfig::default()).unwrap();
    first.migrate().unwrap();
    let db = first.store().db();
    let agency = db
        .insert_agency("AG-001", "Agence Douala", Some("Douala"), true)
        .unwrap();
    let staff = db
        .insert_user("caisse@example.cm", "AGENCY_STAFF", Some(agency), true)
        .unwrap();
    let client = db
        .insert_client(&NewClient {
            national_id: "100000000001".into(),
            full_name: "Serge Fotso".into(),
            email: None,
            phone: None,
            address: None,
            date_of_birth: None,
            agency_id: agency,
            registration_date: "2026-01-15".into(),
            created_by: None,
        })
        .unwrap();
    let contract = db
        .insert_contract(&NewContract {
            contract_number: "CTR-001".into(),
            client_id: client,
            agency_id: agency,
            contract_type: "SAVINGS".into(),
            amount: 100_000.0,
            start_date: None,
            end_date: None,
            status: ContractStatus::Active,
        })
        .unwrap();

    let second = Ledger::open(&path, LedgerConfig::default()).unwrap();
    let deposit = |ledger: &Ledger, amount: f64| {
        ledger
            .add_transaction(&TransactionRequest {
                contract_id: Some(contract),
                txn_type: "DEPOSIT".into(),
                amount,
                agency_id: Some(agency),
                performed_by: Some(staff),
                ..Default::default()
            })
            .unwrap()
    };

    // Alternate writers; each sees the other's committed sequence bumps.
    let a = deposit(&first, 10_000.0);
    let b = deposit(&second, 20_000.0);
    let c = deposit(&first, 30_000.0);

    let refs: HashSet<String> = [a.reference(), b.reference(), c.reference()]
        .iter()
        .map(|r| r.to_string())
        .collect();
    assert_eq!(refs.len(), 3);
    assert_eq!(second.contract_balance(contract).unwrap(), 60_000.0);
}
