//! ledger-runner: headless driver for the poultry ledger.
//!
//! Usage:
//!   ledger-runner --db poultry.db --data-dir ./data
//!   ledger-runner --db poultry.db --ipc-mode
//!   ledger-runner --seed-demo --today 2025-09-28
//!
//! In IPC mode every stdin line is one JSON command, e.g.
//!   {"cmd":"add_payment","trader_id":1,"amount":"2000.00"}
//! and every stdout line is one JSON reply.

use anyhow::Result;
use chrono::NaiveDate;
use poultry_ledger_core::{
    clock::LedgerClock,
    command::LedgerCommand,
    config::LedgerConfig,
    store::LedgerStore,
    types::format_money,
    Ledger,
};
use std::env;
use std::io::{self, BufRead, Write};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let seed_demo = args.iter().any(|a| a == "--seed-demo");
    let db = arg_value(&args, "--db").unwrap_or(":memory:");
    let data_dir = arg_value(&args, "--data-dir").unwrap_or("./data");
    let clock = match arg_value(&args, "--today") {
        Some(raw) => LedgerClock::fixed(NaiveDate::parse_from_str(raw, "%Y-%m-%d")?),
        None => LedgerClock::System,
    };

    let config = LedgerConfig::load(data_dir)?;
    let mut store = LedgerStore::open(db)?;
    store.migrate()?;
    if seed_demo {
        if store.trader_count()? > 0 {
            log::warn!("--seed-demo ignored: {db} already has traders");
        } else {
            store.seed_demo()?;
        }
    }

    if !ipc_mode {
        println!("Poultry Ledger: ledger-runner");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!("  today:     {}", clock.today());
        println!();
    }

    let mut ledger = Ledger::new(store, config, clock);

    if ipc_mode {
        run_ipc_loop(&mut ledger)?;
    } else {
        print_summary(&ledger)?;
    }

    Ok(())
}

fn run_ipc_loop(ledger: &mut Ledger) -> Result<()> {
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
        let line = buffer.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            break;
        }

        let cmd: LedgerCommand = match serde_json::from_str(line) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string(), "kind": "parse" });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let name = cmd.name();
        let reply = match cmd.execute(ledger) {
            Ok(out) => serde_json::to_value(&out)?,
            Err(e) => {
                log::warn!("{name} failed: {e}");
                serde_json::json!({ "error": e.to_string(), "kind": e.kind() })
            }
        };
        writeln!(stdout, "{}", reply)?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_summary(ledger: &Ledger) -> Result<()> {
    println!("=== LINES ===");
    for line in ledger.lines() {
        let traders = ledger.traders_by_line(line)?;
        println!("  {line:<20} {} traders", traders.len());
    }

    let report = ledger.weekly_report()?;
    println!();
    println!(
        "=== LAST {} DAYS ({} .. {}) ===",
        ledger.config().report_window_days,
        report.summary.since,
        report.summary.until
    );
    println!("  revenue:       {}", format_money(report.summary.total_revenue));
    println!("  bills:         {}", report.summary.num_transactions);

    println!();
    println!("=== TOP DEBTORS ===");
    if report.top_debtors.is_empty() {
        println!("  (nobody owes anything)");
    }
    for t in &report.top_debtors {
        println!("  {:<20} {:<20} {:>12}", t.name, t.line, format_money(t.total_debt));
    }

    println!();
    println!("=== SALES BY LINE ===");
    if report.line_performance.is_empty() {
        println!("  (no purchases yet)");
    }
    for l in &report.line_performance {
        println!("  {:<20} {:>12}", l.line, format_money(l.total_sales));
    }
    Ok(())
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
