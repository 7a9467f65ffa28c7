//! Error types for the stack composer.
//!
//! This module provides the error hierarchy for every phase of a composition
//! run: option resolution, access-policy parsing, dependency-graph assembly,
//! and hand-off to a provisioning engine.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the stack composer.
#[derive(Debug, Error)]
pub enum ComposerError {
    /// Option resolution errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Access-policy parsing errors.
    #[error("Access policy error: {0}")]
    Policy(#[from] PolicyError),

    /// Dependency-graph errors.
    #[error("Dependency graph error: {0}")]
    Graph(#[from] GraphError),

    /// Provisioning-engine errors.
    #[error("Provisioning engine error: {0}")]
    Engine(#[from] EngineError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Option resolution errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A context or defaults file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// A context or defaults file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// The context document has no block for the selected context id.
    #[error("No context block found for contextId '{context_id}'")]
    ContextBlockNotFound {
        /// The selected context id.
        context_id: String,
    },

    /// A value's type does not match the type declared for its option.
    #[error("Type provided for {option} was {actual} but expected {expected}")]
    TypeMismatch {
        /// Option name.
        option: String,
        /// Type of the supplied value.
        actual: String,
        /// Declared type of the option.
        expected: String,
    },

    /// A string value could not be decoded as a literal of the declared type.
    #[error("Value '{value}' provided for {option} could not be parsed: {message}")]
    LiteralParse {
        /// Option name.
        option: String,
        /// The raw string value.
        value: String,
        /// Description of the parse failure.
        message: String,
    },

    /// A mandatory option is absent after defaulting.
    #[error("Required option '{option}' is not present")]
    MissingRequiredField {
        /// Option name.
        option: String,
    },

    /// A closed-set option does not match any recognized symbol.
    #[error("Provided {option} '{value}' does not match a selectable option, expected one of: {valid}")]
    UnknownEnumValue {
        /// Option name.
        option: String,
        /// The rejected value.
        value: String,
        /// Comma-separated list of accepted symbols.
        valid: String,
    },

    /// An engine version lacks a recognized family prefix or dotted version.
    #[error("Engine version '{value}' for {option} does not match the expected format, i.e. OS_1.3 or ES_7.9")]
    InvalidVersionFormat {
        /// Option name.
        option: String,
        /// The rejected value.
        value: String,
    },
}

/// Access-policy parsing errors.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The policy document has no non-empty `Statement` element.
    #[error("Provided {option} JSON must have the 'Statement' element present and not be empty")]
    Malformed {
        /// Option name the document came from.
        option: String,
    },

    /// A single statement entry could not be parsed.
    #[error("Statement {index} of {option} is invalid: {message}")]
    InvalidStatement {
        /// Option name the document came from.
        option: String,
        /// Zero-based position of the entry.
        index: usize,
        /// Description of the failure.
        message: String,
    },
}

/// Dependency-graph errors.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The static rule table produced a cycle.
    #[error("Internal invariant violated: dependency cycle through unit '{unit}'")]
    InternalInvariant {
        /// A unit participating in the cycle.
        unit: String,
    },

    /// An edge references a unit that was never registered.
    #[error("Unit '{unit}' is not part of the composition")]
    UnknownUnit {
        /// The missing unit id.
        unit: String,
    },
}

/// Provisioning-engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine rejected a unit registration.
    #[error("Failed to register unit '{unit}': {reason}")]
    RegistrationFailed {
        /// Unit id.
        unit: String,
        /// Reason for failure.
        reason: String,
    },

    /// The engine rejected a dependency declaration.
    #[error("Failed to declare dependency '{unit}' -> '{depends_on}': {reason}")]
    DependencyRejected {
        /// Dependent unit id.
        unit: String,
        /// Prerequisite unit id.
        depends_on: String,
        /// Reason for failure.
        reason: String,
    },

    /// The engine output could not be serialized.
    #[error("Failed to serialize plan manifest: {message}")]
    Serialization {
        /// Description of the failure.
        message: String,
    },
}

/// Stable classification of fatal composition errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Value type mismatch after coercion attempts.
    ConfigType,
    /// Mandatory option absent after defaulting.
    MissingRequiredField,
    /// Closed-set option with an unrecognized value.
    UnknownEnumValue,
    /// Engine version without a recognized family prefix.
    InvalidVersionFormat,
    /// Access-policy document without a usable `Statement`.
    MalformedPolicy,
    /// Dependency rule table produced a cycle.
    InternalInvariant,
    /// Context loading, engine hand-off, or IO failure.
    Environment,
}

/// Result type alias for composer operations.
pub type Result<T> = std::result::Result<T, ComposerError>;

impl ComposerError {
    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(
                ConfigError::TypeMismatch { .. } | ConfigError::LiteralParse { .. },
            ) => ErrorKind::ConfigType,
            Self::Config(ConfigError::MissingRequiredField { .. }) => {
                ErrorKind::MissingRequiredField
            }
            Self::Config(ConfigError::UnknownEnumValue { .. }) => ErrorKind::UnknownEnumValue,
            Self::Config(ConfigError::InvalidVersionFormat { .. }) => {
                ErrorKind::InvalidVersionFormat
            }
            Self::Policy(_) => ErrorKind::MalformedPolicy,
            Self::Graph(GraphError::InternalInvariant { .. }) => ErrorKind::InternalInvariant,
            Self::Config(
                ConfigError::FileNotFound { .. }
                | ConfigError::ParseError { .. }
                | ConfigError::ContextBlockNotFound { .. },
            )
            | Self::Graph(GraphError::UnknownUnit { .. })
            | Self::Engine(_)
            | Self::Io(_) => ErrorKind::Environment,
        }
    }

    /// Returns the name of the option that caused this error, if any.
    #[must_use]
    pub fn option(&self) -> Option<&str> {
        match self {
            Self::Config(
                ConfigError::TypeMismatch { option, .. }
                | ConfigError::LiteralParse { option, .. }
                | ConfigError::MissingRequiredField { option }
                | ConfigError::UnknownEnumValue { option, .. }
                | ConfigError::InvalidVersionFormat { option, .. },
            )
            | Self::Policy(
                PolicyError::Malformed { option } | PolicyError::InvalidStatement { option, .. },
            ) => Some(option.as_str()),
            _ => None,
        }
    }
}

impl ConfigError {
    /// Creates a type mismatch error for an option.
    #[must_use]
    pub fn type_mismatch(
        option: impl Into<String>,
        actual: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            option: option.into(),
            actual: actual.into(),
            expected: expected.into(),
        }
    }

    /// Creates a missing required field error.
    #[must_use]
    pub fn missing(option: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            option: option.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_option() {
        let err = ComposerError::from(ConfigError::type_mismatch("dataNodeCount", "string", "number"));
        assert_eq!(err.kind(), ErrorKind::ConfigType);
        assert_eq!(err.option(), Some("dataNodeCount"));

        let err = ComposerError::from(PolicyError::Malformed {
            option: String::from("accessPolicies"),
        });
        assert_eq!(err.kind(), ErrorKind::MalformedPolicy);
        assert_eq!(err.option(), Some("accessPolicies"));

        let err = ComposerError::from(GraphError::InternalInvariant {
            unit: String::from("mskUtilityStack"),
        });
        assert_eq!(err.kind(), ErrorKind::InternalInvariant);
        assert_eq!(err.option(), None);
    }

    #[test]
    fn test_messages_name_the_option() {
        let err = ConfigError::type_mismatch("vpcEnabled", "number", "boolean");
        assert_eq!(
            err.to_string(),
            "Type provided for vpcEnabled was number but expected boolean"
        );
        assert!(ConfigError::missing("stage").to_string().contains("'stage'"));
    }
}
