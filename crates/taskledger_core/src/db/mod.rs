//! Ledger file storage.
//!
//! # Responsibility
//! - Open ledger files (or throwaway in-memory ledgers) with the pragmas the
//!   ownership index depends on.
//! - Bring the task/owner-index schema up to the version this build knows.
//!
//! # Invariants
//! - A connection handed out by this module is fully migrated.
//! - A ledger written by a newer build is refused, never downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Storage failure while opening, migrating or querying a ledger.
#[derive(Debug)]
pub enum DbError {
    /// The ledger file could not be opened or created.
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    /// A schema step failed; the ledger stays at its previous version.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The ledger was migrated by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "cannot open ledger `{}`: {source}", path.display())
            }
            Self::Migration { version, source } => {
                write!(f, "ledger schema migration {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "ledger schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
