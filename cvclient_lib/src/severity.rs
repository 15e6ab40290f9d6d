//! Runtime-selected log severity.
//!
//! `tracing` picks the level at the macro call site, so anything that decides
//! a level at runtime (the client's debug switch) goes through here.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Level for transaction chatter: `Info` when the client runs in debug mode.
    pub fn chatter(debug: bool) -> Self {
        if debug {
            Severity::Info
        } else {
            Severity::Debug
        }
    }

    pub fn emit(self, args: fmt::Arguments<'_>) {
        match self {
            Severity::Debug => tracing::debug!("{}", args),
            Severity::Info => tracing::info!("{}", args),
            Severity::Warning => tracing::warn!("{}", args),
            Severity::Error => tracing::error!("{}", args),
        }
    }
}
