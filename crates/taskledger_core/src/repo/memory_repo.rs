//! Owned in-memory ledger backing.
//!
//! Mirrors `SqliteTaskRepository` semantics without a database: ids start at
//! 1 and are never reused, and deleting a task prunes it from the owner index.
//! Each call runs to completion on `&mut self`, which gives the same
//! all-or-nothing behavior as the SQLite transactions.

use crate::model::account::AccountId;
use crate::model::task::{validate_task_fields, NewTask, Task, TaskId};
use crate::repo::task_repo::{
    resolve_mutation, MutationOutcome, RepoError, RepoResult, TaskMutation, TaskRepository,
};
use std::collections::{BTreeMap, HashMap};

/// In-memory task repository.
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    tasks: BTreeMap<TaskId, Task>,
    owner_index: HashMap<AccountId, Vec<TaskId>>,
    last_id: TaskId,
    ledger_owner: Option<AccountId>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live task records.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl TaskRepository for InMemoryTaskRepository {
    fn create_task(&mut self, draft: &NewTask) -> RepoResult<Task> {
        validate_task_fields(&draft.title, &draft.description)?;

        let id = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| RepoError::InvalidData("task id space exhausted".to_string()))?;
        let task = draft.clone().into_task(id)?;

        self.last_id = id;
        self.owner_index
            .entry(task.owner.clone())
            .or_default()
            .push(id);
        self.tasks.insert(id, task.clone());
        Ok(task)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        Ok(self.tasks.get(&id).cloned())
    }

    fn list_owned_task_ids(&self, owner: &AccountId) -> RepoResult<Vec<TaskId>> {
        Ok(self.owner_index.get(owner).cloned().unwrap_or_default())
    }

    fn apply_owned_mutation(
        &mut self,
        caller: &AccountId,
        id: TaskId,
        mutation: &TaskMutation<'_>,
    ) -> RepoResult<MutationOutcome> {
        let current = self.tasks.get(&id).cloned();
        let outcome = resolve_mutation(caller, id, current, mutation)?;

        match &outcome {
            MutationOutcome::Updated(task) => {
                self.tasks.insert(task.id, task.clone());
            }
            MutationOutcome::Deleted(deleted_id) => {
                if let Some(task) = self.tasks.remove(deleted_id) {
                    if let Some(ids) = self.owner_index.get_mut(&task.owner) {
                        ids.retain(|owned| owned != deleted_id);
                    }
                }
            }
        }

        Ok(outcome)
    }

    fn ledger_owner(&self) -> RepoResult<Option<AccountId>> {
        Ok(self.ledger_owner.clone())
    }

    fn init_ledger_owner(&mut self, account: &AccountId) -> RepoResult<AccountId> {
        Ok(self
            .ledger_owner
            .get_or_insert_with(|| account.clone())
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryTaskRepository;
    use crate::model::account::AccountId;
    use crate::model::task::NewTask;
    use crate::repo::task_repo::{RepoError, TaskMutation, TaskRepository};

    fn account(last: char) -> AccountId {
        AccountId::parse(&format!("0x{}{last}", "0".repeat(39))).unwrap()
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let owner = account('1');
        let mut repo = InMemoryTaskRepository::new();

        let first = repo
            .create_task(&NewTask::new(owner.clone(), "a", "b").unwrap())
            .unwrap();
        repo.apply_owned_mutation(&owner, first.id, &TaskMutation::Delete)
            .unwrap();
        let second = repo
            .create_task(&NewTask::new(owner.clone(), "c", "d").unwrap())
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(repo.get_task(1).unwrap().is_none());
        assert_eq!(repo.list_owned_task_ids(&owner).unwrap(), vec![2]);
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn rejected_edit_leaves_record_untouched() {
        let owner = account('1');
        let mut repo = InMemoryTaskRepository::new();
        let task = repo
            .create_task(&NewTask::new(owner.clone(), "a", "b").unwrap())
            .unwrap();

        let err = repo
            .apply_owned_mutation(
                &owner,
                task.id,
                &TaskMutation::Edit {
                    title: " ",
                    description: "new",
                },
            )
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert_eq!(repo.get_task(task.id).unwrap(), Some(task));
    }

    #[test]
    fn ledger_owner_is_recorded_once() {
        let mut repo = InMemoryTaskRepository::new();
        assert!(repo.ledger_owner().unwrap().is_none());

        let first = repo.init_ledger_owner(&account('1')).unwrap();
        let second = repo.init_ledger_owner(&account('2')).unwrap();
        assert_eq!(first, account('1'));
        assert_eq!(second, account('1'));
    }
}
