//! CLI module for the stack composer.
//!
//! This module provides the command-line interface for composing and
//! exporting migration deployments.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::OutputFormatter;
