//! Command-line interface for the attribute augmentation pipeline.
//!
//! Two commands share one pipeline: `describe` writes Turkish descriptions
//! and `stereotype` tags the attributes of a named entity. Missing arguments
//! are collected interactively.

mod commands;
mod prompt;

pub use commands::{
    Cli, CliError, Command, ConsoleProgress, DescribeArgs, RunSettings, StereotypeArgs, Tuning,
    connect_and_run, execute, render_summary, resolve_settings, run_cli,
};
pub use prompt::Console;
