//! CodeLens CLI library.
//!
//! This library provides the core functionality for the CodeLens command-line
//! interface, including configuration management, command execution, analysis
//! history, and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod history;
pub mod output;
pub mod repl;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use history::{History, HistoryEntry};
pub use output::{Formatter, Notice, NoticeKind};
