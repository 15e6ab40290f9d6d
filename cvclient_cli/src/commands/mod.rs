//! CLI subcommand implementations.

pub mod alerts;
pub mod chart;
pub mod watch;
