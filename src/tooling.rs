//! Tooling & Integration Layer
//!
//! Command-line entry points over the session: one-shot commands, an
//! interactive shell and the terminal formatting they share.

pub mod cli;
pub mod format;
pub mod shell;

pub use cli::{Cli, CliContext, Commands};
pub use shell::{Reply, Shell};
