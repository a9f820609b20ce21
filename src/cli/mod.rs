//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod display;
mod enums;

pub use args::{Args, Command, ConfigAction, GenerateArgs};
pub use commands::{
    build_inputs, handle_config_action, list_playbooks, run_analyze, run_export, run_generate,
    run_optimize, run_video,
};
pub use display::{render_analysis, render_content, render_optimized, render_playbook};
pub use enums::{AspectArg, ExportFormat, FormatArg, GoalArg, PlatformArg, ToneArg};
