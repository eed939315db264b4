//! Core ledger logic for the task ledger.
//! This crate is the single source of truth for task ownership invariants.

pub mod access;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use access::{ensure_task_owner, AccessDenied};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::account::{AccountId, AccountIdError};
pub use model::task::{NewTask, Task, TaskId, TaskValidationError};
pub use repo::memory_repo::InMemoryTaskRepository;
pub use repo::task_repo::{
    MutationOutcome, RepoError, RepoResult, SqliteTaskRepository, TaskMutation, TaskRepository,
};
pub use service::ledger_service::{LedgerError, LedgerResult, TaskLedgerService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
