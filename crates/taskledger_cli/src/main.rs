//! Task ledger client shell.
//!
//! # Responsibility
//! - Act as one account against a local ledger file: submit one call, wait
//!   for it to commit, then re-read and print the caller's task list.
//!
//! # Usage
//!
//! ```bash
//! taskledger --account 0x1111111111111111111111111111111111111111 add "Buy milk" "2%"
//! TASKLEDGER_ACCOUNT=0x1111111111111111111111111111111111111111 taskledger complete 1
//! taskledger show 1 --json
//! ```

mod config;
mod shell;

use clap::Parser;
use config::{CliArgs, ShellConfig};
use std::process::ExitCode;
use taskledger_core::db::open_db;
use taskledger_core::{init_logging, SqliteTaskRepository, TaskLedgerService};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config = match ShellConfig::resolve(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error loading configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(log_dir) = config.log_dir.as_ref() {
        if let Err(err) = init_logging(&config.log_level, &log_dir.to_string_lossy()) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let mut conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!(
                "Failed to open ledger `{}`: {err}",
                config.db_path.display()
            );
            return ExitCode::FAILURE;
        }
    };
    let repo = match SqliteTaskRepository::try_new(&mut conn) {
        Ok(repo) => repo,
        Err(err) => {
            eprintln!("Failed to open ledger: {err}");
            return ExitCode::FAILURE;
        }
    };
    let mut ledger = TaskLedgerService::new(repo);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match shell::run_command(&mut ledger, config.account.as_ref(), &args.command, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
