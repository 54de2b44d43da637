//! Command handlers

pub mod config;
pub mod shell;
pub mod status;
pub mod student;
pub mod sync;

/// Convert a core error, appending a recovery hint when one applies
pub fn with_hint<E: Into<roster_core::Error>>(err: E) -> anyhow::Error {
    let err = err.into();
    match err.recovery_suggestion() {
        Some(hint) => anyhow::anyhow!("{}\n{}", err, hint),
        None => err.into(),
    }
}
