// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Stack Composer
//!
//! Resolves the options of a search-cluster migration deployment into an
//! ordered set of deployment units.
//!
//! ## Overview
//!
//! A composition run takes a raw configuration block and a default table and:
//!
//! - Resolves every option to its declared type, falling back to defaults
//! - Parses closed-set options, engine versions and access policies
//! - Decides which deployment units are enabled from feature flags and
//!   prerequisites
//! - Orders the enabled units by their dependencies
//!
//! The result is handed to a [`engine::ProvisioningEngine`]; the bundled
//! [`engine::ManifestEngine`] writes it out as a JSON plan manifest.
//!
//! ## Modules
//!
//! - [`config`]: Option loading, resolution and binding
//! - [`policy`]: Access-policy documents
//! - [`composer`]: Unit enablement, parameters and the dependency graph
//! - [`engine`]: Provisioning engine interface and the manifest engine
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```json
//! {
//!   "dev": {
//!     "stage": "dev",
//!     "domainName": "target",
//!     "engineVersion": "OS_2.11",
//!     "vpcEnabled": true,
//!     "migrationAssistanceEnabled": true,
//!     "trafficReplayerServiceEnabled": true
//!   }
//! }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod composer;
pub mod config;
pub mod engine;
pub mod error;
pub mod policy;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use composer::{CompositionResult, ComposeContext, DeploymentUnit, StackComposer, UnitKind};
pub use config::{ComposerOptions, ContextLoader, OptionTable, ResolvedOptions};
pub use engine::{ManifestEngine, PlanManifest, ProvisioningEngine};
pub use error::{ComposerError, ErrorKind, Result};
