//! Configuration module for the stack composer.
//!
//! This module handles everything between raw option input and typed options:
//! - Loading context documents and default tables
//! - Resolving and coercing individual option values
//! - Resolving closed-set options and engine versions
//! - Binding the typed option tree and reporting recoverable inconsistencies
//! - Fingerprinting resolved options for change detection

mod enums;
mod hash;
mod options;
mod parser;
mod schema;
mod validator;
mod value;
mod version;

pub use enums::{resolve_enum, EbsVolumeType, EnumOption, RemovalPolicy, TlsSecurityPolicy};
pub use hash::OptionHasher;
pub use options::{
    AnalyticsOptions, CaptureProxyOptions, ComposerOptions, DomainOptions, EbsOptions,
    FetchMigrationOptions, MigrationOptions, NetworkOptions, NodeOptions, ReplayerOptions,
    SecurityOptions, ServiceFlags, DEFAULT_DEPLOY_ID,
};
pub use parser::{find_context_file, ContextLoader, DEFAULT_CONTEXT_FILES};
pub use schema::{lookup, OptionSpec, Requirement, ResolvedOptions, OPTION_SCHEMA};
pub use validator::{OptionValidator, ValidationReport, ValidationWarning};
pub use value::{resolve, type_name, DefaultTable, ExpectedType, OptionTable, RawConfig, ResolvedOption};
pub use version::{EngineFamily, EngineVersion};
