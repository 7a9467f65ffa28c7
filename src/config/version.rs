//! Search-engine version selection.
//!
//! Versions are written as `<family>_<dotted version>`, e.g. `OS_2.11` or
//! `ES_7.10`.

use serde::Serialize;
use std::fmt;

use crate::error::ConfigError;

/// Supported search-engine families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngineFamily {
    /// `OpenSearch` (`OS_` prefix).
    OpenSearch,
    /// Elasticsearch (`ES_` prefix).
    Elasticsearch,
}

/// A parsed engine version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineVersion {
    /// Engine family.
    pub family: EngineFamily,
    /// Dotted version number, e.g. `2.11`.
    pub version: String,
}

impl EngineFamily {
    const fn prefix(self) -> &'static str {
        match self {
            Self::OpenSearch => "OS_",
            Self::Elasticsearch => "ES_",
        }
    }
}

impl EngineVersion {
    /// Parses an engine version string for the named option.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidVersionFormat`] if the value is absent,
    /// lacks a recognized family prefix, or is not followed by a dotted
    /// numeric version.
    pub fn parse(option: &str, value: Option<&str>) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidVersionFormat {
            option: option.to_string(),
            value: value.unwrap_or_default().to_string(),
        };

        let value = value.ok_or_else(invalid)?;

        let (family, version) = [EngineFamily::OpenSearch, EngineFamily::Elasticsearch]
            .into_iter()
            .find_map(|family| value.strip_prefix(family.prefix()).map(|rest| (family, rest)))
            .ok_or_else(invalid)?;

        if !is_dotted_version(version) {
            return Err(invalid());
        }

        Ok(Self {
            family,
            version: version.to_string(),
        })
    }
}

/// Returns true for strings like `7`, `1.3` or `2.11.0`.
fn is_dotted_version(s: &str) -> bool {
    !s.is_empty()
        && s
            .split('.')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.family.prefix(), self.version)
    }
}

impl fmt::Display for EngineFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenSearch => write!(f, "OpenSearch"),
            Self::Elasticsearch => write!(f, "Elasticsearch"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_both_families() {
        let os = EngineVersion::parse("engineVersion", Some("OS_2.11")).unwrap();
        assert_eq!(os.family, EngineFamily::OpenSearch);
        assert_eq!(os.version, "2.11");

        let es = EngineVersion::parse("engineVersion", Some("ES_7.10")).unwrap();
        assert_eq!(es.family, EngineFamily::Elasticsearch);
        assert_eq!(es.version, "7.10");

        assert_ne!(os.family, es.family);
        assert_eq!(es.to_string(), "ES_7.10");
    }

    #[test]
    fn test_unknown_prefix_rejected() {
        let err = EngineVersion::parse("engineVersion", Some("XX_1.3")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVersionFormat { ref value, .. } if value == "XX_1.3"));
    }

    #[test]
    fn test_absent_or_malformed_rejected() {
        assert!(EngineVersion::parse("engineVersion", None).is_err());
        assert!(EngineVersion::parse("engineVersion", Some("OS_")).is_err());
        assert!(EngineVersion::parse("engineVersion", Some("OS_2..1")).is_err());
        assert!(EngineVersion::parse("engineVersion", Some("os_2.11")).is_err());
    }
}
