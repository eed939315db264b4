//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the ledger primitives: create, lookup, owner index, guarded
//!   mutation and ledger-owner metadata.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Creation assigns the next id and appends the owner index in one
//!   transaction.
//! - Guarded mutations read, check ownership and write inside one
//!   `IMMEDIATE` transaction; a failed check leaves no partial effect.
//! - Read paths reject corrupt persisted state instead of masking it.

use crate::access::{ensure_task_owner, AccessDenied};
use crate::db::DbError;
use crate::model::account::AccountId;
use crate::model::task::{validate_task_fields, NewTask, Task, TaskId, TaskValidationError};
use crate::repo::schema::ensure_ledger_connection_ready;
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    completed,
    owner
FROM tasks";

const LEDGER_OWNER_KEY: &str = "ledger_owner";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for ledger persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(TaskId),
    Unauthorized(AccessDenied),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Unauthorized(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted ledger data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection is not migrated: schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Unauthorized(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<AccessDenied> for RepoError {
    fn from(value: AccessDenied) -> Self {
        Self::Unauthorized(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Owner-only mutation applied to an existing task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskMutation<'a> {
    Complete,
    Edit {
        title: &'a str,
        description: &'a str,
    },
    Delete,
}

impl TaskMutation<'_> {
    /// Stable operation label used in log events.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Complete => "task_complete",
            Self::Edit { .. } => "task_edit",
            Self::Delete => "task_delete",
        }
    }
}

/// State to persist after a guarded mutation was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Updated(Task),
    Deleted(TaskId),
}

/// Repository interface backing the task ledger.
pub trait TaskRepository {
    /// Stores a new task owned by `draft.owner` and returns the stored record.
    fn create_task(&mut self, draft: &NewTask) -> RepoResult<Task>;
    /// Looks up one task by id; `None` when absent or deleted.
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Returns the owner index for `owner` in insertion order.
    fn list_owned_task_ids(&self, owner: &AccountId) -> RepoResult<Vec<TaskId>>;
    /// Applies an owner-only mutation atomically.
    fn apply_owned_mutation(
        &mut self,
        caller: &AccountId,
        id: TaskId,
        mutation: &TaskMutation<'_>,
    ) -> RepoResult<MutationOutcome>;
    /// Returns the account that initialized the ledger, if any.
    fn ledger_owner(&self) -> RepoResult<Option<AccountId>>;
    /// Records `account` as ledger owner unless one is already recorded.
    ///
    /// Returns the effective ledger owner.
    fn init_ledger_owner(&mut self, account: &AccountId) -> RepoResult<AccountId>;
}

/// Computes the post-mutation state for `current`, enforcing existence and
/// ownership. Shared by every `TaskRepository` implementation.
pub(crate) fn resolve_mutation(
    caller: &AccountId,
    id: TaskId,
    current: Option<Task>,
    mutation: &TaskMutation<'_>,
) -> RepoResult<MutationOutcome> {
    let mut task = current.ok_or(RepoError::NotFound(id))?;
    if let Err(denied) = ensure_task_owner(caller, &task) {
        warn!(
            "event={} module=repo status=denied task_id={} caller={}",
            mutation.label(),
            id,
            caller
        );
        return Err(denied.into());
    }

    match mutation {
        TaskMutation::Complete => {
            task.mark_completed();
            Ok(MutationOutcome::Updated(task))
        }
        TaskMutation::Edit { title, description } => {
            task.apply_edit(*title, *description)?;
            Ok(MutationOutcome::Updated(task))
        }
        TaskMutation::Delete => Ok(MutationOutcome::Deleted(task.id)),
    }
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` for foreign schemas.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_ledger_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&mut self, draft: &NewTask) -> RepoResult<Task> {
        validate_task_fields(&draft.title, &draft.description)?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO tasks (title, description, completed, owner)
             VALUES (?1, ?2, 0, ?3);",
            params![
                draft.title.as_str(),
                draft.description.as_str(),
                draft.owner.as_str()
            ],
        )?;
        let id = row_id_to_task_id(tx.last_insert_rowid())?;
        tx.execute(
            "INSERT INTO owner_tasks (owner, task_id) VALUES (?1, ?2);",
            params![draft.owner.as_str(), task_id_to_sql(id)?],
        )?;
        let task = draft.clone().into_task(id)?;
        tx.commit()?;

        info!(
            "event=task_add module=repo status=ok task_id={} owner={}",
            id, task.owner
        );
        Ok(task)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        load_task(self.conn, id)
    }

    fn list_owned_task_ids(&self, owner: &AccountId) -> RepoResult<Vec<TaskId>> {
        let mut stmt = self.conn.prepare(
            "SELECT task_id
             FROM owner_tasks
             WHERE owner = ?1
             ORDER BY seq ASC;",
        )?;
        let mut rows = stmt.query([owner.as_str()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row_id_to_task_id(row.get("task_id")?)?);
        }
        Ok(ids)
    }

    fn apply_owned_mutation(
        &mut self,
        caller: &AccountId,
        id: TaskId,
        mutation: &TaskMutation<'_>,
    ) -> RepoResult<MutationOutcome> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current = load_task(&tx, id)?;
        let outcome = resolve_mutation(caller, id, current, mutation)?;

        match &outcome {
            MutationOutcome::Updated(task) => {
                tx.execute(
                    "UPDATE tasks
                     SET
                        title = ?1,
                        description = ?2,
                        completed = ?3,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE id = ?4;",
                    params![
                        task.title.as_str(),
                        task.description.as_str(),
                        bool_to_int(task.completed),
                        task_id_to_sql(task.id)?,
                    ],
                )?;
            }
            MutationOutcome::Deleted(deleted_id) => {
                let sql_id = task_id_to_sql(*deleted_id)?;
                tx.execute("DELETE FROM owner_tasks WHERE task_id = ?1;", [sql_id])?;
                tx.execute("DELETE FROM tasks WHERE id = ?1;", [sql_id])?;
            }
        }
        tx.commit()?;

        info!(
            "event={} module=repo status=ok task_id={} caller={}",
            mutation.label(),
            id,
            caller
        );
        Ok(outcome)
    }

    fn ledger_owner(&self) -> RepoResult<Option<AccountId>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM ledger_meta WHERE key = ?1;",
                [LEDGER_OWNER_KEY],
                |row| row.get(0),
            )
            .optional()?;

        value
            .map(|raw| {
                AccountId::parse(&raw).map_err(|err| {
                    RepoError::InvalidData(format!("invalid ledger owner `{raw}`: {err}"))
                })
            })
            .transpose()
    }

    fn init_ledger_owner(&mut self, account: &AccountId) -> RepoResult<AccountId> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO ledger_meta (key, value) VALUES (?1, ?2);",
            params![LEDGER_OWNER_KEY, account.as_str()],
        )?;
        tx.commit()?;

        if inserted == 1 {
            info!(
                "event=ledger_init module=repo status=ok ledger_owner={}",
                account
            );
        }

        self.ledger_owner()?.ok_or_else(|| {
            RepoError::InvalidData("ledger owner missing after initialization".to_string())
        })
    }
}

fn load_task(conn: &Connection, id: TaskId) -> RepoResult<Option<Task>> {
    let Ok(sql_id) = i64::try_from(id) else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([sql_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_task_row(row)?));
    }

    Ok(None)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id = row_id_to_task_id(row.get("id")?)?;

    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` in tasks.completed"
            )));
        }
    };

    let owner_text: String = row.get("owner")?;
    let owner = AccountId::parse(&owner_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid owner `{owner_text}` in tasks.owner: {err}"))
    })?;

    let task = Task {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        completed,
        owner,
    };
    task.validate()
        .map_err(|err| RepoError::InvalidData(format!("task {id}: {err}")))?;
    Ok(task)
}

fn row_id_to_task_id(value: i64) -> RepoResult<TaskId> {
    match TaskId::try_from(value) {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(RepoError::InvalidData(format!(
            "invalid task id `{value}` in ledger storage"
        ))),
    }
}

fn task_id_to_sql(id: TaskId) -> RepoResult<i64> {
    i64::try_from(id).map_err(|_| RepoError::NotFound(id))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
