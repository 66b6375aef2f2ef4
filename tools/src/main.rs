//! ledger-cli: headless runner for the multi-agency ledger engine.
//!
//! Usage:
//!   ledger-cli --db ledger.db --seed 42 --payments 6
//!   ledger-cli --db ledger.db --ipc-mode
//!
//! Without --ipc-mode the runner seeds deterministic demo data, records a
//! demo batch against it, and prints an end-of-run summary. With --ipc-mode
//! it reads one JSON command per stdin line and answers on stdout.

use anyhow::Result;
use ledger_core::{
    batch::BatchItem,
    clients::{ClientQuery, ClientRequest},
    config::LedgerConfig,
    ledger::Ledger,
    sample::{SampleSeeder, SampleSpec},
    stats::StatsFilter,
    types::{AgencyId, UserId},
    validation::TransactionRequest,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    AddTransaction { request: TransactionRequest },
    AddClient { request: ClientRequest },
    Batch {
        items: Vec<BatchItem>,
        agency_id: AgencyId,
        performed_by: UserId,
    },
    Stats {
        #[serde(default)]
        filter: StatsFilter,
    },
    ListClients { query: ClientQuery },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let payments = parse_arg(&args, "--payments", 6u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let config = match args.windows(2).find(|w| w[0] == "--config") {
        Some(w) => LedgerConfig::from_path(Path::new(&w[1]))?,
        None => LedgerConfig::default(),
    };

    let ledger = if db == ":memory:" {
        Ledger::in_memory(config)?
    } else {
        Ledger::open(db, config)?
    };
    ledger.migrate()?;
    log::info!("database ready at {db}");

    if ipc_mode {
        run_ipc_loop(&ledger)?;
    } else {
        run_demo(&ledger, seed, payments)?;
    }

    Ok(())
}

fn run_demo(ledger: &Ledger, seed: u64, payments: u64) -> Result<()> {
    println!("Multi-agency ledger — demo run");
    println!("  date:     {}", chrono::Utc::now().date_naive());
    println!("  seed:     {seed}");
    println!("  payments: {payments}");
    println!();

    let mut seeder = SampleSeeder::new(seed);
    let summary = seeder.seed(ledger.store(), &SampleSpec::default())?;
    let agency_id = summary.agency_ids[0];
    let staff = summary.staff_ids[0];

    // Payments against the first agency's contracts; the first completed
    // payment on each DRAFT contract activates it.
    let items: Vec<BatchItem> = summary
        .contract_ids
        .iter()
        .take(payments as usize)
        .map(|&contract_id| BatchItem {
            contract_id: Some(contract_id),
            txn_type: "PAYMENT".to_string(),
            amount: 50_000.0,
            currency: None,
            description: Some("demo payment".to_string()),
            verified_by: None,
        })
        .collect();
    let batch = ledger.add_transaction_batch(&items, agency_id, staff)?;

    println!("batch {}:", batch.batch_id);
    for result in &batch.results {
        println!(
            "  contract {:?} -> {:?} {}",
            result.contract_id, result.outcome, result.message
        );
    }
    println!();

    let stats = ledger.transaction_stats(&StatsFilter::default())?;
    println!("ledger totals:");
    println!("  transactions: {}", stats.total_transactions);
    println!("  volume:       {:.2}", stats.total_amount);
    println!("  completed:    {}", stats.completed_count);
    for (txn_type, breakdown) in &stats.by_type {
        println!(
            "  {txn_type:<12} {:>4} items, {:>14.2}",
            breakdown.count, breakdown.total_amount
        );
    }
    Ok(())
}

fn run_ipc_loop(ledger: &Ledger) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::AddTransaction { request } => {
                let outcome = ledger.add_transaction(&request)?;
                let reply = serde_json::json!({
                    "transaction_id": outcome.transaction_id(),
                    "reference": outcome.reference(),
                    "message": outcome.message(),
                });
                writeln!(stdout, "{}", reply)?;
            }
            IpcCommand::AddClient { request } => {
                let outcome = ledger.add_client(&request)?;
                let reply = serde_json::json!({
                    "client_id": outcome.client_id(),
                    "message": outcome.message(),
                });
                writeln!(stdout, "{}", reply)?;
            }
            IpcCommand::Batch {
                items,
                agency_id,
                performed_by,
            } => {
                let summary = ledger.add_transaction_batch(&items, agency_id, performed_by)?;
                writeln!(stdout, "{}", serde_json::to_string(&summary)?)?;
            }
            IpcCommand::Stats { filter } => {
                let stats = ledger.transaction_stats(&filter)?;
                writeln!(stdout, "{}", serde_json::to_string(&stats)?)?;
            }
            IpcCommand::ListClients { query } => {
                match ledger.clients_by_agency(&query)? {
                    Ok(page) => writeln!(stdout, "{}", serde_json::to_string(&page)?)?,
                    Err(rejection) => {
                        let reply = serde_json::json!({ "error": rejection.to_string() });
                        writeln!(stdout, "{}", reply)?;
                    }
                }
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
