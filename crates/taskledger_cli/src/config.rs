//! Command line and environment configuration for the client shell.
//!
//! Priority (highest first): CLI flags, `TASKLEDGER_*` environment variables
//! (via clap `env`), compiled defaults.

use clap::{Parser, Subcommand};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use taskledger_core::{default_log_level, AccountId, AccountIdError, TaskId};

const DEFAULT_DB_FILE_NAME: &str = "taskledger.sqlite3";

/// CLI arguments for the ledger client shell.
#[derive(Parser, Debug)]
#[command(name = "taskledger", version, about = "Task ledger client shell")]
pub struct CliArgs {
    /// Ledger database file (default: `<temp>/taskledger.sqlite3`).
    #[arg(long, env = "TASKLEDGER_DB_PATH")]
    pub db: Option<PathBuf>,

    /// Account address used as the caller identity.
    #[arg(short, long, env = "TASKLEDGER_ACCOUNT")]
    pub account: Option<String>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, env = "TASKLEDGER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, env = "TASKLEDGER_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Ledger operations exposed by the shell.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Record the caller as ledger owner on a fresh ledger.
    Init,
    /// Add a task owned by the caller.
    Add { title: String, description: String },
    /// Mark one of the caller's tasks as completed.
    Complete { id: TaskId },
    /// Replace title and description of one of the caller's tasks.
    Edit {
        id: TaskId,
        title: String,
        description: String,
    },
    /// Delete one of the caller's tasks.
    Delete { id: TaskId },
    /// List the caller's tasks.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one task by id.
    Show {
        id: TaskId,
        #[arg(long)]
        json: bool,
    },
    /// Print the ledger owner.
    Owner,
}

/// Fully resolved shell configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub db_path: PathBuf,
    pub account: Option<AccountId>,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl ShellConfig {
    /// Resolves defaults and validates the caller account, when given.
    ///
    /// # Errors
    /// - `InvalidAccount` when `--account` is not a valid address.
    pub fn resolve(args: &CliArgs) -> Result<Self, ConfigError> {
        let account = args
            .account
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(AccountId::parse)
            .transpose()
            .map_err(ConfigError::InvalidAccount)?;

        let db_path = args
            .db
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));

        let log_level = args
            .log_level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string());

        Ok(Self {
            db_path,
            account,
            log_level,
            log_dir: args.log_dir.clone(),
        })
    }
}

/// Errors that can occur when resolving shell configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidAccount(AccountIdError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAccount(err) => write!(f, "invalid --account: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidAccount(err) => Some(err),
        }
    }
}
