//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record stored by the ledger.
//! - Provide field validation and in-place lifecycle helpers.
//!
//! # Invariants
//! - `id` is positive; `0` is never assigned.
//! - `title` and `description` are stored trimmed and non-empty.
//! - `completed` only moves from `false` to `true`.
//! - `owner` never changes after creation.

use crate::model::account::AccountId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Ledger-assigned task identifier.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = u64;

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Sequential id assigned at creation, never reused.
    pub id: TaskId,
    /// Short task title.
    pub title: String,
    /// Free-form task description.
    pub description: String,
    /// Completion flag; there is no way back to `false`.
    pub completed: bool,
    /// Account that created the task.
    pub owner: AccountId,
}

impl Task {
    /// Creates a validated, not-yet-completed task.
    ///
    /// # Errors
    /// - Returns `TaskValidationError` when id is `0` or a text field is blank.
    pub fn new(
        id: TaskId,
        owner: AccountId,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, TaskValidationError> {
        let task = Self {
            id,
            title: title.into(),
            description: description.into(),
            completed: false,
            owner,
        };
        task.validate()?;
        Ok(task)
    }

    /// Validates record-level invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id == 0 {
            return Err(TaskValidationError::ZeroId);
        }
        validate_task_fields(&self.title, &self.description)
    }

    /// Marks this task completed. Repeated calls are no-ops.
    pub fn mark_completed(&mut self) {
        self.completed = true;
    }

    /// Replaces title and description (trimmed), leaving owner and
    /// completion intact.
    ///
    /// On validation failure the task is left unchanged.
    pub fn apply_edit(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<(), TaskValidationError> {
        let title = trimmed(title.into());
        let description = trimmed(description.into());
        validate_task_fields(&title, &description)?;
        self.title = title;
        self.description = description;
        Ok(())
    }
}

/// Validated input for a task that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub owner: AccountId,
    pub title: String,
    pub description: String,
}

impl NewTask {
    /// Builds a creation request from trimmed, validated fields.
    pub fn new(
        owner: AccountId,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, TaskValidationError> {
        let draft = Self {
            owner,
            title: trimmed(title.into()),
            description: trimmed(description.into()),
        };
        validate_task_fields(&draft.title, &draft.description)?;
        Ok(draft)
    }

    /// Materializes the stored record for an assigned id.
    pub fn into_task(self, id: TaskId) -> Result<Task, TaskValidationError> {
        Task::new(id, self.owner, self.title, self.description)
    }
}

/// Checks the user-editable text fields of a task.
pub fn validate_task_fields(title: &str, description: &str) -> Result<(), TaskValidationError> {
    if title.trim().is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    if description.trim().is_empty() {
        return Err(TaskValidationError::EmptyDescription);
    }
    Ok(())
}

fn trimmed(text: String) -> String {
    let kept = text.trim();
    if kept.len() == text.len() {
        text
    } else {
        kept.to_owned()
    }
}

/// Task validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    ZeroId,
    EmptyTitle,
    EmptyDescription,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroId => write!(f, "task id 0 is reserved"),
            Self::EmptyTitle => write!(f, "task title must not be empty"),
            Self::EmptyDescription => write!(f, "task description must not be empty"),
        }
    }
}

impl Error for TaskValidationError {}
