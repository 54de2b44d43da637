//! Interactive shell
//!
//! A line-oriented session over one [`ViewCoordinator`]. The view is printed
//! again whenever it changes: after edits, sort toggles and syncs, including
//! background ones.
//!
//! ## Commands
//!
//! - `list`: Print the view
//! - `sort`: Toggle between insertion and name order
//! - `add <first> <last> <email>`: Add a student
//! - `update <id> <first> <last> <email>`: Change a student
//! - `rm <id>`: Remove a student
//! - `undo`: Restore the last removed student
//! - `sync`: Fetch new students from the remote directory
//! - `help`, `quit`

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use roster_core::{Config, HttpFetcher, Student, StudentStore, ViewCoordinator};

use crate::commands::with_hint;
use crate::output::{student_row, Output};

type Coordinator = ViewCoordinator<HttpFetcher>;

/// A parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    Empty,
    List,
    Sort,
    Add {
        first_name: String,
        last_name: String,
        email: String,
    },
    Update {
        id: i64,
        first_name: String,
        last_name: String,
        email: String,
    },
    Remove(i64),
    Undo,
    Sync,
    Help,
    Quit,
}

impl ShellCommand {
    fn parse(line: &str) -> Result<Self, String> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = words.split_first() else {
            return Ok(ShellCommand::Empty);
        };

        let command = match (name, args) {
            ("list" | "ls", []) => ShellCommand::List,
            ("sort", []) => ShellCommand::Sort,
            ("add", [first, last, email]) => ShellCommand::Add {
                first_name: first.to_string(),
                last_name: last.to_string(),
                email: email.to_string(),
            },
            ("add", _) => return Err("Usage: add <first> <last> <email>".to_string()),
            ("update" | "edit", [id, first, last, email]) => ShellCommand::Update {
                id: parse_id(id)?,
                first_name: first.to_string(),
                last_name: last.to_string(),
                email: email.to_string(),
            },
            ("update" | "edit", _) => {
                return Err("Usage: update <id> <first> <last> <email>".to_string())
            }
            ("rm" | "remove", [id]) => ShellCommand::Remove(parse_id(id)?),
            ("rm" | "remove", _) => return Err("Usage: rm <id>".to_string()),
            ("undo", []) => ShellCommand::Undo,
            ("sync", []) => ShellCommand::Sync,
            ("help" | "?", _) => ShellCommand::Help,
            ("quit" | "exit" | "q", _) => ShellCommand::Quit,
            (other, _) => {
                return Err(format!(
                    "Unknown command '{}'. Type `help` for a list of commands.",
                    other
                ))
            }
        };
        Ok(command)
    }
}

fn parse_id(word: &str) -> Result<i64, String> {
    word.parse()
        .map_err(|_| format!("Invalid id '{}'. Ids are whole numbers.", word))
}

/// Run the shell until `quit` or end of input
pub async fn run(store: Arc<StudentStore>, config: &Config, output: &Output) -> Result<()> {
    let fetcher = HttpFetcher::from_config(config).map_err(with_hint)?;
    let coordinator = ViewCoordinator::new(store, fetcher).map_err(with_hint)?;

    let mut view = coordinator.view();
    let mut errors = coordinator.last_error();
    let mut loading = coordinator.loading();
    let mut added = coordinator.last_sync_added();

    let _periodic = config
        .sync_interval()
        .map(|interval| coordinator.start_periodic_sync(interval));

    output.message("Roster shell. Type `help` for commands.");
    render(&coordinator, &view.borrow_and_update(), output);

    if config.sync_on_start {
        spawn_sync(&coordinator);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match ShellCommand::parse(&line) {
                    Ok(ShellCommand::Quit) => break,
                    Ok(command) => execute(&coordinator, command, config, output).await,
                    Err(message) => output.warn(&message),
                }
            }
            Ok(()) = view.changed() => {
                render(&coordinator, &view.borrow_and_update(), output);
            }
            Ok(()) = errors.changed() => {
                if let Some(message) = errors.borrow_and_update().clone() {
                    output.warn(&message);
                }
            }
            Ok(()) = loading.changed() => {
                if *loading.borrow_and_update() {
                    output.message("Syncing...");
                }
            }
            Ok(()) = added.changed() => {
                let count = *added.borrow_and_update();
                if count > 0 {
                    output.success(&format!("{} new student(s) from the directory", count));
                }
            }
        }
    }

    info!("Shell closed");
    Ok(())
}

fn spawn_sync(coordinator: &Coordinator) {
    let coordinator = coordinator.clone();
    tokio::spawn(async move {
        // Failures are reported through last_error
        let _ = coordinator.sync().await;
    });
}

async fn execute(coordinator: &Coordinator, command: ShellCommand, config: &Config, output: &Output) {
    // Errors from edits are reported through last_error
    match command {
        ShellCommand::Empty | ShellCommand::Quit => {}
        ShellCommand::List => render(coordinator, &coordinator.students(), output),
        ShellCommand::Sort => {
            let mode = coordinator.toggle_sort().await;
            output.message(&format!("Sorted by {}", mode));
        }
        ShellCommand::Add {
            first_name,
            last_name,
            email,
        } => {
            let Ok(id) = coordinator.next_local_id().await else {
                return;
            };
            let student = Student::new(id, first_name, last_name, email)
                .with_default_avatar(&config.avatar_base);
            let name = student.full_name();
            if coordinator.add(student).await.is_ok() {
                output.success(&format!("Added {} ({})", name, id));
            }
        }
        ShellCommand::Update {
            id,
            first_name,
            last_name,
            email,
        } => {
            let Some(existing) = find(coordinator, id, output) else {
                return;
            };
            let student =
                Student::new(id, first_name, last_name, email).with_avatar(existing.avatar);
            if let Ok(true) = coordinator.update(student).await {
                output.success(&format!("Updated {}", id));
            }
        }
        ShellCommand::Remove(id) => {
            let Some(student) = find(coordinator, id, output) else {
                return;
            };
            if let Ok(true) = coordinator.remove(&student).await {
                output.success(&format!(
                    "Removed {}. Type `undo` to restore.",
                    student.full_name()
                ));
            }
        }
        ShellCommand::Undo => match coordinator.undo_remove().await {
            Ok(Some(student)) => output.success(&format!("Restored {}", student.full_name())),
            Ok(None) => output.message("Nothing to undo."),
            Err(_) => {}
        },
        ShellCommand::Sync => spawn_sync(coordinator),
        ShellCommand::Help => print_help(output),
    }
}

fn find(coordinator: &Coordinator, id: i64, output: &Output) -> Option<Student> {
    let found = coordinator.students().into_iter().find(|s| s.id == id);
    if found.is_none() {
        output.warn(&format!("No student with id {}", id));
    }
    found
}

fn render(coordinator: &Coordinator, students: &[Student], output: &Output) {
    if !output.is_human() {
        output.print_students(students);
        return;
    }

    println!();
    println!(
        "── Students ({}, {}) ──",
        students.len(),
        coordinator.sort_mode()
    );
    if students.is_empty() {
        println!("No students yet. Type `sync` to fetch the directory.");
    }
    for student in students {
        println!("{}", student_row(student));
    }
}

fn print_help(output: &Output) {
    output.message(
        "Commands:\n  \
         list                                 Print the students\n  \
         sort                                 Toggle insertion/name order\n  \
         add <first> <last> <email>           Add a student\n  \
         update <id> <first> <last> <email>   Change a student\n  \
         rm <id>                              Remove a student\n  \
         undo                                 Restore the last removed student\n  \
         sync                                 Fetch new students\n  \
         help                                 Show this help\n  \
         quit                                 Leave the shell",
    );
}
