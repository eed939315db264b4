//! Client shell: runs one ledger command and renders the result.
//!
//! # Invariants
//! - Every successful mutation is followed by a fresh read of the caller's
//!   full task list; nothing is cached between calls.
//! - Failures are reported as `Failed to <action>: <reason>`.

use crate::config::Command;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, Write};
use taskledger_core::{AccountId, LedgerError, Task, TaskLedgerService, TaskRepository};

/// Errors surfaced to the shell user.
#[derive(Debug)]
pub enum ShellError {
    /// The command acts on behalf of an account but none was configured.
    MissingAccount(&'static str),
    /// The ledger rejected or failed the operation.
    Ledger {
        action: &'static str,
        source: LedgerError,
    },
    Io(io::Error),
    Json(serde_json::Error),
}

impl Display for ShellError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAccount(action) => write!(
                f,
                "Failed to {action}: no account configured (use --account or TASKLEDGER_ACCOUNT)"
            ),
            Self::Ledger { action, source } => write!(f, "Failed to {action}: {source}"),
            Self::Io(err) => write!(f, "output error: {err}"),
            Self::Json(err) => write!(f, "json encoding error: {err}"),
        }
    }
}

impl Error for ShellError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingAccount(_) => None,
            Self::Ledger { source, .. } => Some(source),
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<io::Error> for ShellError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ShellError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Executes `command` against `ledger` as `account` and writes the output.
pub fn run_command<R: TaskRepository>(
    ledger: &mut TaskLedgerService<R>,
    account: Option<&AccountId>,
    command: &Command,
    out: &mut impl Write,
) -> Result<(), ShellError> {
    match command {
        Command::Init => {
            let caller = require_account(account, "initialize ledger")?;
            let owner = ledger
                .initialize_ledger(caller)
                .map_err(ledger_error("initialize ledger"))?;
            writeln!(out, "Ledger owner: {owner}")?;
        }
        Command::Add { title, description } => {
            let caller = require_account(account, "add task")?;
            let id = ledger
                .add_task(caller, title.as_str(), description.as_str())
                .map_err(ledger_error("add task"))?;
            writeln!(out, "Task added successfully! (id {id})")?;
            render_my_tasks(ledger, caller, out)?;
        }
        Command::Complete { id } => {
            let caller = require_account(account, "mark task as completed")?;
            ledger
                .mark_task_completed(caller, *id)
                .map_err(ledger_error("mark task as completed"))?;
            writeln!(out, "Task marked as completed!")?;
            render_my_tasks(ledger, caller, out)?;
        }
        Command::Edit {
            id,
            title,
            description,
        } => {
            let caller = require_account(account, "edit task")?;
            ledger
                .edit_task(caller, *id, title, description)
                .map_err(ledger_error("edit task"))?;
            writeln!(out, "Task edited successfully!")?;
            render_my_tasks(ledger, caller, out)?;
        }
        Command::Delete { id } => {
            let caller = require_account(account, "delete task")?;
            ledger
                .delete_task(caller, *id)
                .map_err(ledger_error("delete task"))?;
            writeln!(out, "Task deleted successfully!")?;
            render_my_tasks(ledger, caller, out)?;
        }
        Command::List { json } => {
            let caller = require_account(account, "fetch tasks")?;
            if *json {
                let tasks = ledger.my_tasks(caller).map_err(ledger_error("fetch tasks"))?;
                writeln!(out, "{}", serde_json::to_string_pretty(&tasks)?)?;
            } else {
                render_my_tasks(ledger, caller, out)?;
            }
        }
        Command::Show { id, json } => {
            let task = ledger.task(*id).map_err(ledger_error("fetch task"))?;
            match (task, *json) {
                (Some(task), true) => writeln!(out, "{}", serde_json::to_string_pretty(&task)?)?,
                (Some(task), false) => {
                    writeln!(out, "{}", task_line(&task))?;
                    writeln!(out, "  owner: {}", task.owner)?;
                }
                (None, true) => writeln!(out, "null")?,
                (None, false) => writeln!(out, "Task {id} not found.")?,
            }
        }
        Command::Owner => match ledger.ledger_owner().map_err(ledger_error("fetch owner"))? {
            Some(owner) => writeln!(out, "Ledger owner: {owner}")?,
            None => writeln!(out, "Ledger is not initialized.")?,
        },
    }

    Ok(())
}

fn render_my_tasks<R: TaskRepository>(
    ledger: &TaskLedgerService<R>,
    caller: &AccountId,
    out: &mut impl Write,
) -> Result<(), ShellError> {
    let tasks = ledger.my_tasks(caller).map_err(ledger_error("fetch tasks"))?;
    info!(
        "event=shell_refresh module=cli status=ok caller={} task_count={}",
        caller,
        tasks.len()
    );

    writeln!(out, "Connected Account: {caller}")?;
    writeln!(out, "My Tasks")?;
    if tasks.is_empty() {
        writeln!(out, "No tasks found.")?;
        return Ok(());
    }
    for task in &tasks {
        writeln!(out, "{}", task_line(task))?;
    }
    Ok(())
}

fn task_line(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    format!(
        "[{mark}] #{} {} - {}",
        task.id, task.title, task.description
    )
}

fn require_account<'a>(
    account: Option<&'a AccountId>,
    action: &'static str,
) -> Result<&'a AccountId, ShellError> {
    account.ok_or(ShellError::MissingAccount(action))
}

fn ledger_error(action: &'static str) -> impl Fn(LedgerError) -> ShellError {
    move |source| ShellError::Ledger { action, source }
}

#[cfg(test)]
mod tests {
    use super::{run_command, ShellError};
    use crate::config::Command;
    use taskledger_core::{AccountId, InMemoryTaskRepository, LedgerError, TaskLedgerService};

    const OWNER: &str = "0x00000000000000000000000000000000000000a1";
    const OTHER: &str = "0x00000000000000000000000000000000000000b2";

    fn run(
        ledger: &mut TaskLedgerService<InMemoryTaskRepository>,
        account: &str,
        command: Command,
    ) -> Result<String, ShellError> {
        let account = AccountId::parse(account).unwrap();
        let mut out = Vec::new();
        run_command(ledger, Some(&account), &command, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn add(title: &str, description: &str) -> Command {
        Command::Add {
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn add_re_renders_full_list() {
        let mut ledger = TaskLedgerService::new(InMemoryTaskRepository::new());

        run(&mut ledger, OWNER, add("Buy milk", "2%")).unwrap();
        let output = run(&mut ledger, OWNER, add("Walk dog", "park")).unwrap();

        assert!(output.starts_with("Task added successfully! (id 2)"));
        assert!(output.contains("[ ] #1 Buy milk - 2%"));
        assert!(output.contains("[ ] #2 Walk dog - park"));
    }

    #[test]
    fn padded_input_is_stored_trimmed() {
        let mut ledger = TaskLedgerService::new(InMemoryTaskRepository::new());

        let output = run(&mut ledger, OWNER, add("  Buy milk ", " 2%\n")).unwrap();
        assert!(output.contains("[ ] #1 Buy milk - 2%\n"));
        assert_eq!(ledger.task(1).unwrap().unwrap().title, "Buy milk");
    }

    #[test]
    fn complete_marks_row_done() {
        let mut ledger = TaskLedgerService::new(InMemoryTaskRepository::new());
        run(&mut ledger, OWNER, add("Buy milk", "2%")).unwrap();

        let output = run(&mut ledger, OWNER, Command::Complete { id: 1 }).unwrap();
        assert!(output.contains("[x] #1 Buy milk - 2%"));
    }

    #[test]
    fn non_owner_edit_reports_failure() {
        let mut ledger = TaskLedgerService::new(InMemoryTaskRepository::new());
        run(&mut ledger, OWNER, add("Buy milk", "2%")).unwrap();

        let err = run(
            &mut ledger,
            OTHER,
            Command::Edit {
                id: 1,
                title: "x".to_string(),
                description: "y".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ShellError::Ledger {
                source: LedgerError::Unauthorized(_),
                ..
            }
        ));
        assert!(err.to_string().starts_with("Failed to edit task:"));
    }

    #[test]
    fn delete_then_list_shows_empty_state() {
        let mut ledger = TaskLedgerService::new(InMemoryTaskRepository::new());
        run(&mut ledger, OWNER, add("Buy milk", "2%")).unwrap();

        let output = run(&mut ledger, OWNER, Command::Delete { id: 1 }).unwrap();
        assert!(output.contains("No tasks found."));
    }

    #[test]
    fn list_json_emits_task_records() {
        let mut ledger = TaskLedgerService::new(InMemoryTaskRepository::new());
        run(&mut ledger, OWNER, add("Buy milk", "2%")).unwrap();

        let output = run(&mut ledger, OWNER, Command::List { json: true }).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["id"], 1);
        assert_eq!(value[0]["title"], "Buy milk");
        assert_eq!(value[0]["completed"], false);
        assert_eq!(value[0]["owner"], OWNER);
    }

    #[test]
    fn show_missing_task_is_not_an_error() {
        let mut ledger = TaskLedgerService::new(InMemoryTaskRepository::new());
        let output = run(&mut ledger, OWNER, Command::Show { id: 5, json: false }).unwrap();
        assert_eq!(output.trim(), "Task 5 not found.");
    }

    #[test]
    fn mutations_require_an_account() {
        let mut ledger = TaskLedgerService::new(InMemoryTaskRepository::new());
        let mut out = Vec::new();
        let err = run_command(&mut ledger, None, &add("a", "b"), &mut out).unwrap_err();
        assert!(matches!(err, ShellError::MissingAccount("add task")));
    }

    #[test]
    fn init_and_owner_report_first_initializer() {
        let mut ledger = TaskLedgerService::new(InMemoryTaskRepository::new());
        let before = run(&mut ledger, OWNER, Command::Owner).unwrap();
        assert_eq!(before.trim(), "Ledger is not initialized.");

        run(&mut ledger, OWNER, Command::Init).unwrap();
        let again = run(&mut ledger, OTHER, Command::Init).unwrap();
        assert_eq!(again.trim(), format!("Ledger owner: {OWNER}"));
    }
}
