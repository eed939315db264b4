//! Task ledger use-case service.
//!
//! # Responsibility
//! - Expose the ledger operations (add, complete, edit, delete, owner index,
//!   lookup) with the caller identity passed explicitly.
//! - Translate repository errors into caller-facing `LedgerError`s.
//!
//! # Invariants
//! - Titles/descriptions are trimmed; blank ones never reach storage.
//! - Mutations on absent ids fail with `TaskNotFound` before ownership is
//!   considered; mutations by non-owners fail with `Unauthorized` before
//!   their input is looked at.
//! - Service layer remains storage-agnostic.

use crate::access::AccessDenied;
use crate::model::account::AccountId;
use crate::model::task::{NewTask, Task, TaskId, TaskValidationError};
use crate::repo::task_repo::{RepoError, TaskMutation, TaskRepository};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for ledger use-cases.
#[derive(Debug)]
pub enum LedgerError {
    /// Title or description failed validation.
    Validation(TaskValidationError),
    /// Target task does not exist (never created or deleted).
    TaskNotFound(TaskId),
    /// Caller is not the owner of the target task.
    Unauthorized(AccessDenied),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Unauthorized(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Unauthorized(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::TaskNotFound(_) => None,
        }
    }
}

impl From<RepoError> for LedgerError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(id) => Self::TaskNotFound(id),
            RepoError::Unauthorized(denied) => Self::Unauthorized(denied),
            other => Self::Repo(other),
        }
    }
}

impl From<TaskValidationError> for LedgerError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger facade over a `TaskRepository` backing.
pub struct TaskLedgerService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskLedgerService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Records `deployer` as ledger owner on first call.
    ///
    /// Later calls keep the original owner and return it.
    pub fn initialize_ledger(&mut self, deployer: &AccountId) -> LedgerResult<AccountId> {
        Ok(self.repo.init_ledger_owner(deployer)?)
    }

    /// Returns the account that initialized the ledger.
    pub fn ledger_owner(&self) -> LedgerResult<Option<AccountId>> {
        Ok(self.repo.ledger_owner()?)
    }

    /// Creates a task owned by `caller` and returns its id.
    ///
    /// # Contract
    /// - Title and description are trimmed and must be non-empty.
    /// - New tasks start with `completed = false`.
    /// - The id is appended to the caller's owner index.
    pub fn add_task(
        &mut self,
        caller: &AccountId,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> LedgerResult<TaskId> {
        let draft = match NewTask::new(caller.clone(), title, description) {
            Ok(draft) => draft,
            Err(err) => {
                warn!(
                    "event=task_add module=service status=rejected caller={} reason={:?}",
                    caller, err
                );
                return Err(err.into());
            }
        };

        let task = self.repo.create_task(&draft)?;
        Ok(task.id)
    }

    /// Marks a task completed. Completing twice is a no-op success.
    pub fn mark_task_completed(&mut self, caller: &AccountId, id: TaskId) -> LedgerResult<()> {
        self.apply(caller, id, TaskMutation::Complete)
    }

    /// Overwrites title and description; owner and completion are untouched.
    ///
    /// Ownership is checked before the new text is validated.
    pub fn edit_task(
        &mut self,
        caller: &AccountId,
        id: TaskId,
        title: &str,
        description: &str,
    ) -> LedgerResult<()> {
        self.apply(caller, id, TaskMutation::Edit { title, description })
    }

    /// Deletes a task and prunes it from the owner index.
    pub fn delete_task(&mut self, caller: &AccountId, id: TaskId) -> LedgerResult<()> {
        self.apply(caller, id, TaskMutation::Delete)
    }

    /// Returns the caller's owned task ids in creation order.
    pub fn fetch_my_tasks(&self, caller: &AccountId) -> LedgerResult<Vec<TaskId>> {
        Ok(self.repo.list_owned_task_ids(caller)?)
    }

    /// Looks up one task; `None` when the id was never assigned or deleted.
    pub fn task(&self, id: TaskId) -> LedgerResult<Option<Task>> {
        Ok(self.repo.get_task(id)?)
    }

    /// Loads the caller's full task list in owner-index order.
    ///
    /// This is the refresh query a client runs after each mutation.
    pub fn my_tasks(&self, caller: &AccountId) -> LedgerResult<Vec<Task>> {
        let ids = self.fetch_my_tasks(caller)?;
        let mut tasks = Vec::with_capacity(ids.len());
        for id in ids {
            match self.repo.get_task(id)? {
                Some(task) => tasks.push(task),
                None => debug!(
                    "event=task_list module=service status=skip task_id={} reason=absent",
                    id
                ),
            }
        }
        Ok(tasks)
    }

    fn apply(
        &mut self,
        caller: &AccountId,
        id: TaskId,
        mutation: TaskMutation<'_>,
    ) -> LedgerResult<()> {
        match self.repo.apply_owned_mutation(caller, id, &mutation) {
            Ok(_) => Ok(()),
            Err(err) => {
                let err = LedgerError::from(err);
                if matches!(err, LedgerError::TaskNotFound(_)) {
                    info!(
                        "event={} module=service status=not_found task_id={} caller={}",
                        mutation.label(),
                        id,
                        caller
                    );
                }
                Err(err)
            }
        }
    }
}
