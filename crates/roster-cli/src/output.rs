//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use roster_core::{Student, SyncOutcome};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    pub fn is_human(&self) -> bool {
        matches!(self.format, OutputFormat::Human)
    }

    /// Print a single student
    pub fn print_student(&self, student: &Student) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:     {}", student.id);
                println!("Name:   {}", student.full_name());
                println!("Email:  {}", student.email);
                if !student.avatar.is_empty() {
                    println!("Avatar: {}", student.avatar);
                }
            }
            OutputFormat::Json => print_json(student),
            OutputFormat::Quiet => {
                println!("{}", student.id);
            }
        }
    }

    /// Print a list of students
    pub fn print_students(&self, students: &[Student]) {
        match self.format {
            OutputFormat::Human => {
                if students.is_empty() {
                    println!("No students found.");
                    return;
                }
                for student in students {
                    println!("{}", student_row(student));
                }
                println!("\n{} student(s)", students.len());
            }
            OutputFormat::Json => print_json(students),
            OutputFormat::Quiet => {
                for student in students {
                    println!("{}", student.id);
                }
            }
        }
    }

    /// Print the result of a sync
    pub fn print_sync_outcome(&self, outcome: &SyncOutcome, total: i64) {
        match self.format {
            OutputFormat::Human => {
                if outcome.added_count == 0 {
                    println!("✓ Sync complete - already up to date");
                } else {
                    println!(
                        "✓ Sync complete - {} new student(s)",
                        outcome.added_count
                    );
                }
                println!(
                    "  Fetched: {}, Stored: {}",
                    outcome.fetched.len(),
                    total
                );
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "status": "success",
                        "fetched": outcome.fetched.len(),
                        "added": outcome.added_count,
                        "total": total
                    })
                );
            }
            OutputFormat::Quiet => {
                println!("{}", outcome.added_count);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning to stderr (suppressed in quiet mode)
    pub fn warn(&self, msg: &str) {
        if !self.is_quiet() {
            eprintln!("⚠ {}", msg);
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

/// One line of the student table
pub fn student_row(student: &Student) -> String {
    format!(
        "{:>6} | {:<30} | {}",
        student.id,
        truncate(&student.full_name(), 30),
        truncate(&student.email, 40)
    )
}

/// Truncate a string to max length (in characters), adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        assert_eq!(truncate("Zoë Élodie-Ångström", 8), "Zoë É...");
    }

    #[test]
    fn test_student_row() {
        let student = Student::new(7, "Michael", "Lawson", "michael.lawson@reqres.in");
        assert_eq!(
            student_row(&student),
            "     7 | Michael Lawson                 | michael.lawson@reqres.in"
        );
    }
}
