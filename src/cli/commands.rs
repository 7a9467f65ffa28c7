//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::composer::ComposeContext;

/// Stack composer - resolves migration deployment options into ordered units.
#[derive(Parser, Debug)]
#[command(name = "stack-composer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the context file (searched upwards from the current directory if unset).
    #[arg(short, long, global = true, env = "COMPOSER_CONTEXT_FILE")]
    pub context_file: Option<PathBuf>,

    /// Name of the context block to compose.
    #[arg(long, global = true, env = "CONTEXT_ID")]
    pub context_id: Option<String>,

    /// Defaults file replacing the built-in default values.
    #[arg(long, global = true, env = "COMPOSER_DEFAULTS_FILE")]
    pub defaults: Option<PathBuf>,

    /// Target region.
    #[arg(long, global = true, env = "CDK_DEFAULT_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Target account.
    #[arg(long, global = true, env = "CDK_DEFAULT_ACCOUNT")]
    pub account: Option<String>,

    /// Application registry to associate every unit with.
    #[arg(long, global = true, env = "COMPOSER_MIGRATIONS_APP_REGISTRY_ARN")]
    pub app_registry_arn: Option<String>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve and validate the selected context block.
    Validate {
        /// Show all warnings, not just the count.
        #[arg(short, long)]
        warnings: bool,
    },

    /// Compose and display the enabled units.
    Plan,

    /// Show the provisioning order and dependency edges.
    Graph {
        /// Only show the dependencies of this unit id.
        #[arg(long)]
        unit: Option<String>,
    },

    /// Hand the composition to the manifest engine and write the manifest.
    Export {
        /// Output file.
        #[arg(short, long, default_value = "composer-plan.json")]
        out: PathBuf,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Builds the deployment target from the global arguments.
    #[must_use]
    pub fn compose_context(&self) -> ComposeContext {
        let mut context = ComposeContext::new(&self.region);
        if let Some(account) = &self.account {
            context = context.with_account(account);
        }
        if let Some(arn) = &self.app_registry_arn {
            context = context.with_app_registry_arn(arn);
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan_with_globals() {
        let cli = Cli::try_parse_from([
            "stack-composer",
            "--context-id",
            "dev",
            "--region",
            "eu-west-1",
            "--account",
            "123456789012",
            "plan",
            "--output",
            "json",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Plan));
        assert_eq!(cli.context_id.as_deref(), Some("dev"));
        assert_eq!(cli.output, OutputFormat::Json);

        let context = cli.compose_context();
        assert_eq!(context.region, "eu-west-1");
        assert_eq!(context.account.as_deref(), Some("123456789012"));
        assert_eq!(context.app_registry_arn, None);
    }

    #[test]
    fn test_export_default_path() {
        let cli = Cli::try_parse_from(["stack-composer", "export"]).unwrap();
        let Commands::Export { out } = cli.command else {
            panic!("expected export");
        };
        assert_eq!(out, PathBuf::from("composer-plan.json"));
    }
}
