//! Split Engine CLI
//!
//! Reads expenses from a CSV file and prints balances, settlements, people
//! or the normalized expense list as CSV.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- settlements expenses.csv > settlements.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug`, `info` or `warn` to control logging verbosity

use split_engine::{ExpenseLedger, MemoryStore, Result, SplitError};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;
use std::str::FromStr;

/// What to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Balances,
    Settlements,
    People,
    Expenses,
}

impl FromStr for Command {
    type Err = SplitError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "balances" => Ok(Command::Balances),
            "settlements" => Ok(Command::Settlements),
            "people" => Ok(Command::People),
            "expenses" => Ok(Command::Expenses),
            other => Err(SplitError::UnknownCommand(other.to_string())),
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        return Err(SplitError::MissingArgument);
    }

    let command = Command::from_str(&args[1])?;
    let file = File::open(&args[2])?;
    let reader = BufReader::new(file);

    let mut ledger = ExpenseLedger::new(MemoryStore::new());
    ledger.import_csv(reader)?;

    let stdout = io::stdout();
    let handle = stdout.lock();
    match command {
        Command::Balances => ledger.write_balances(handle)?,
        Command::Settlements => ledger.write_settlements(handle)?,
        Command::People => ledger.write_people(handle)?,
        Command::Expenses => ledger.write_expenses(handle)?,
    }

    Ok(())
}
