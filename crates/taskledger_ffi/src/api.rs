//! FFI use-case API for UI-facing ledger calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level ledger functions to the UI shell via FRB.
//! - Map every core error to a human-readable envelope message.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Each call opens the ledger, applies one operation and closes it, so the
//!   UI always re-reads committed state.

use log::warn;
use taskledger_core::db::open_db;
use taskledger_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AccountId, LedgerError, SqliteTaskRepository, Task, TaskLedgerService,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const LEDGER_DB_FILE_NAME: &str = "taskledger.sqlite3";
const LEDGER_DB_PATH_ENV: &str = "TASKLEDGER_DB_PATH";
static LEDGER_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Task row rendered by the UI list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTaskItem {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    /// Owner account address, lowercase `0x` form.
    pub owner: String,
}

impl From<Task> for LedgerTaskItem {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            completed: task.completed,
            owner: task.owner.to_string(),
        }
    }
}

/// Result envelope for mutating calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerActionResponse {
    /// Whether the operation was applied.
    pub ok: bool,
    /// Affected task id, when the call targets or creates one.
    pub task_id: Option<u64>,
    /// Human-readable message for alerts/diagnostics.
    pub message: String,
}

impl LedgerActionResponse {
    fn success(message: impl Into<String>, task_id: Option<u64>) -> Self {
        Self {
            ok: true,
            task_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>, task_id: Option<u64>) -> Self {
        Self {
            ok: false,
            task_id,
            message: message.into(),
        }
    }
}

/// Result envelope for the caller's task list refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTaskListResponse {
    pub ok: bool,
    /// Tasks in owner-index order (empty on failure).
    pub items: Vec<LedgerTaskItem>,
    pub message: String,
}

/// Result envelope for a single task lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTaskResponse {
    pub ok: bool,
    /// `None` when the task does not exist or the call failed.
    pub item: Option<LedgerTaskItem>,
    pub message: String,
}

/// Records `account` as ledger owner when the ledger is fresh.
///
/// # FFI contract
/// - Idempotent: later calls report the existing owner.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_init(account: String) -> LedgerActionResponse {
    let result = parse_account(&account)
        .and_then(|caller| with_ledger(|ledger| ledger.initialize_ledger(&caller)));
    match result {
        Ok(owner) => LedgerActionResponse::success(format!("Ledger owner: {owner}"), None),
        Err(err) => {
            LedgerActionResponse::failure(format!("Failed to initialize ledger: {err}"), None)
        }
    }
}

/// Adds a task owned by `account`.
///
/// # FFI contract
/// - Title and description are trimmed; blank values are rejected.
/// - Returns the new task id on success.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_add_task(
    account: String,
    title: String,
    description: String,
) -> LedgerActionResponse {
    let result = parse_account(&account).and_then(|caller| {
        with_ledger(|ledger| ledger.add_task(&caller, title, description))
    });
    match result {
        Ok(task_id) => LedgerActionResponse::success("Task added successfully!", Some(task_id)),
        Err(err) => LedgerActionResponse::failure(format!("Failed to add task: {err}"), None),
    }
}

/// Marks a task completed on behalf of `account`.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_mark_completed(account: String, task_id: u64) -> LedgerActionResponse {
    let result = parse_account(&account)
        .and_then(|caller| with_ledger(|ledger| ledger.mark_task_completed(&caller, task_id)));
    action_response(
        result,
        task_id,
        "Task marked as completed!",
        "Failed to mark task as completed",
    )
}

/// Replaces title and description of a task owned by `account`.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_edit_task(
    account: String,
    task_id: u64,
    title: String,
    description: String,
) -> LedgerActionResponse {
    let result = parse_account(&account).and_then(|caller| {
        with_ledger(|ledger| ledger.edit_task(&caller, task_id, &title, &description))
    });
    action_response(result, task_id, "Task edited successfully!", "Failed to edit task")
}

/// Deletes a task owned by `account`.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_delete_task(account: String, task_id: u64) -> LedgerActionResponse {
    let result = parse_account(&account)
        .and_then(|caller| with_ledger(|ledger| ledger.delete_task(&caller, task_id)));
    action_response(result, task_id, "Task deleted successfully!", "Failed to delete task")
}

/// Loads the full task list of `account` for rendering.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_my_tasks(account: String) -> LedgerTaskListResponse {
    let result =
        parse_account(&account).and_then(|caller| with_ledger(|ledger| ledger.my_tasks(&caller)));
    match result {
        Ok(tasks) => {
            let items = tasks
                .into_iter()
                .map(LedgerTaskItem::from)
                .collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No tasks found.".to_string()
            } else {
                format!("Found {} task(s).", items.len())
            };
            LedgerTaskListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => LedgerTaskListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("Failed to fetch tasks: {err}"),
        },
    }
}

/// Looks up one task by id.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_task(task_id: u64) -> LedgerTaskResponse {
    match with_ledger(|ledger| ledger.task(task_id)) {
        Ok(Some(task)) => LedgerTaskResponse {
            ok: true,
            item: Some(task.into()),
            message: "Task found.".to_string(),
        },
        Ok(None) => LedgerTaskResponse {
            ok: true,
            item: None,
            message: format!("Task {task_id} not found."),
        },
        Err(err) => LedgerTaskResponse {
            ok: false,
            item: None,
            message: format!("Failed to fetch task: {err}"),
        },
    }
}

fn action_response(
    result: Result<(), String>,
    task_id: u64,
    success: &str,
    failure_prefix: &str,
) -> LedgerActionResponse {
    match result {
        Ok(()) => LedgerActionResponse::success(success, Some(task_id)),
        Err(err) => {
            LedgerActionResponse::failure(format!("{failure_prefix}: {err}"), Some(task_id))
        }
    }
}

fn parse_account(raw: &str) -> Result<AccountId, String> {
    AccountId::parse(raw).map_err(|err| format!("invalid account: {err}"))
}

fn resolve_ledger_db_path() -> PathBuf {
    LEDGER_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(LEDGER_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(LEDGER_DB_FILE_NAME)
        })
        .clone()
}

fn with_ledger<T>(
    f: impl FnOnce(&mut TaskLedgerService<SqliteTaskRepository<'_>>) -> Result<T, LedgerError>,
) -> Result<T, String> {
    let db_path = resolve_ledger_db_path();
    let mut conn = open_db(&db_path).map_err(|err| format!("ledger DB open failed: {err}"))?;
    let repo = SqliteTaskRepository::try_new(&mut conn)
        .map_err(|err| format!("ledger repo init failed: {err}"))?;
    let mut ledger = TaskLedgerService::new(repo);
    f(&mut ledger).map_err(|err| {
        warn!("event=ffi_call module=ffi status=error error={}", err);
        err.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, ledger_add_task, ledger_delete_task, ledger_edit_task,
        ledger_init, ledger_mark_completed, ledger_my_tasks, ledger_task, ping,
        resolve_ledger_db_path, LEDGER_DB_PATH,
    };
    use std::path::Path;
    use std::sync::OnceLock;
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEST_LEDGER_DIR: OnceLock<tempfile::TempDir> = OnceLock::new();

    /// Pins the process-wide ledger path to a scratch directory so tests
    /// never write to the default ledger file.
    fn use_scratch_ledger() -> &'static Path {
        let dir = TEST_LEDGER_DIR
            .get_or_init(|| tempfile::tempdir().expect("create scratch ledger dir"))
            .path();
        LEDGER_DB_PATH.get_or_init(|| dir.join("taskledger.sqlite3"));
        dir
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn ledger_calls_use_scratch_database() {
        let dir = use_scratch_ledger();
        assert!(resolve_ledger_db_path().starts_with(dir));
    }

    #[test]
    fn add_then_list_returns_created_task() {
        use_scratch_ledger();
        let account = unique_account(1);
        let created = ledger_add_task(account.clone(), " Buy milk ".into(), "2%".into());
        assert!(created.ok, "{}", created.message);
        let task_id = created.task_id.expect("add should return task id");

        let listed = ledger_my_tasks(account.clone());
        assert!(listed.ok, "{}", listed.message);
        assert_eq!(listed.items.len(), 1);
        assert_eq!(listed.items[0].id, task_id);
        assert_eq!(listed.items[0].title, "Buy milk");
        assert_eq!(listed.items[0].owner, account);
        assert!(!listed.items[0].completed);
    }

    #[test]
    fn owner_flow_complete_edit_delete() {
        use_scratch_ledger();
        let account = unique_account(2);
        let task_id = ledger_add_task(account.clone(), "a".into(), "b".into())
            .task_id
            .expect("task id");

        assert!(ledger_mark_completed(account.clone(), task_id).ok);
        let edited = ledger_edit_task(account.clone(), task_id, "A".into(), "B".into());
        assert!(edited.ok, "{}", edited.message);

        let item = ledger_task(task_id).item.expect("task should exist");
        assert_eq!((item.title.as_str(), item.description.as_str()), ("A", "B"));
        assert!(item.completed);

        assert!(ledger_delete_task(account.clone(), task_id).ok);
        let lookup = ledger_task(task_id);
        assert!(lookup.ok);
        assert!(lookup.item.is_none());
        assert!(ledger_my_tasks(account).items.is_empty());
    }

    #[test]
    fn non_owner_edit_is_rejected() {
        use_scratch_ledger();
        let owner = unique_account(3);
        let stranger = unique_account(4);
        let task_id = ledger_add_task(owner, "a".into(), "b".into())
            .task_id
            .expect("task id");

        let response = ledger_edit_task(stranger, task_id, "x".into(), "y".into());
        assert!(!response.ok);
        assert!(response
            .message
            .contains("only the task owner can perform this action"));
        assert_eq!(ledger_task(task_id).item.expect("task").title, "a");
    }

    #[test]
    fn blank_fields_and_bad_accounts_are_rejected() {
        use_scratch_ledger();
        let account = unique_account(5);
        let blank = ledger_add_task(account, "   ".into(), "b".into());
        assert!(!blank.ok);
        assert!(blank.message.contains("title"));

        let bad = ledger_add_task("not-an-address".into(), "a".into(), "b".into());
        assert!(!bad.ok);
        assert!(bad.message.contains("invalid account"));
    }

    #[test]
    fn ledger_init_reports_owner() {
        use_scratch_ledger();
        let response = ledger_init(unique_account(6));
        assert!(response.ok, "{}", response.message);
        assert!(response.message.starts_with("Ledger owner: 0x"));
    }

    fn unique_account(salt: u128) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("0x{:040x}", (nanos << 8) | salt)
    }
}
