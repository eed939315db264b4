//! Ownership guard shared by every task mutation path.
//!
//! # Invariants
//! - A mutation is permitted iff the caller equals the stored task owner.
//! - The guard has no side effects; callers must run it before writing.

use crate::model::account::AccountId;
use crate::model::task::{Task, TaskId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Denied mutation attempt on a task owned by another account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDenied {
    pub task_id: TaskId,
    pub caller: AccountId,
    pub owner: AccountId,
}

impl Display for AccessDenied {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "only the task owner can perform this action (task {}, caller {})",
            self.task_id, self.caller
        )
    }
}

impl Error for AccessDenied {}

/// Returns `Ok(())` when `caller` owns `task`.
pub fn ensure_task_owner(caller: &AccountId, task: &Task) -> Result<(), AccessDenied> {
    if &task.owner == caller {
        return Ok(());
    }

    Err(AccessDenied {
        task_id: task.id,
        caller: caller.clone(),
        owner: task.owner.clone(),
    })
}
