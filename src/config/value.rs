//! Single-option value resolution.
//!
//! Raw option values arrive untyped: context files carry real JSON types while
//! command-line surfaces only ever deliver strings. This module coerces one
//! named option against its declared type, falling back to the default table
//! when the raw value is missing.

use serde_json::{Map, Number, Value};
use std::fmt;

use crate::error::ConfigError;

/// Mapping from option name to an untyped value.
///
/// Used both for the raw configuration and for the default table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionTable(Map<String, Value>);

/// Raw configuration supplied by the context loader.
pub type RawConfig = OptionTable;

/// Fallback values consulted when the raw configuration lacks a usable value.
pub type DefaultTable = OptionTable;

/// Type an option is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedType {
    /// UTF-8 string.
    String,
    /// Numeric value (strings are parsed as integers).
    Number,
    /// Boolean value.
    Boolean,
    /// JSON object or array.
    Structured,
}

/// A resolved, typed option value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResolvedOption {
    /// No usable value and no default.
    #[default]
    Absent,
    /// String value.
    String(String),
    /// Numeric value.
    Number(Number),
    /// Boolean value.
    Boolean(bool),
    /// Object or array value.
    Structured(Value),
}

impl OptionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wraps an existing JSON object map.
    #[must_use]
    pub const fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Builds a table from a JSON value, which must be an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a JSON object.
    pub fn from_value(value: Value, source: &str) -> Result<Self, ConfigError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ConfigError::ParseError {
                message: format!("expected an object of options, found {}", type_name(&other)),
                location: Some(source.to_string()),
            }),
        }
    }

    /// Adds or replaces an option, returning the table.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Returns the raw value of an option.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Iterates over the option names present in the table.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns the number of options in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the table holds no options.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for OptionTable {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl ExpectedType {
    /// Returns the type name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Structured => "object",
        }
    }

    /// Returns true if an already-typed value satisfies this type.
    const fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::String, Value::String(_))
                | (Self::Number, Value::Number(_))
                | (Self::Boolean, Value::Bool(_))
                | (Self::Structured, Value::Object(_) | Value::Array(_))
        )
    }
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl ResolvedOption {
    /// Returns true if no value was resolved.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns the string value, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean value, if any.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the numeric value, if any.
    #[must_use]
    pub const fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the structured value, if any.
    #[must_use]
    pub const fn as_structured(&self) -> Option<&Value> {
        match self {
            Self::Structured(v) => Some(v),
            _ => None,
        }
    }

    /// Converts the resolved option back into a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Absent => Value::Null,
            Self::String(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Boolean(b) => Value::Bool(*b),
            Self::Structured(v) => v.clone(),
        }
    }

    fn from_typed(value: Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::String(s) => Self::String(s),
            Value::Number(n) => Self::Number(n),
            Value::Bool(b) => Self::Boolean(b),
            structured @ (Value::Array(_) | Value::Object(_)) => Self::Structured(structured),
        }
    }
}

/// Resolves a single named option.
///
/// A missing or empty-string raw value falls back to the default table. An
/// explicit `null` is discarded without consulting the defaults. `false` and
/// `0` are preserved. String values are coerced to the declared
/// type; already-typed values must match it exactly.
///
/// # Errors
///
/// Returns [`ConfigError::LiteralParse`] when a string cannot be decoded and
/// [`ConfigError::TypeMismatch`] when the value has the wrong type.
pub fn resolve(
    name: &str,
    expected: ExpectedType,
    defaults: &DefaultTable,
    raw: &RawConfig,
) -> Result<ResolvedOption, ConfigError> {
    let value = match raw.get(name) {
        Some(Value::Null) => return Ok(ResolvedOption::Absent),
        Some(value) if !is_empty(value) => value,
        _ => match defaults.get(name) {
            Some(default) if !default.is_null() => default,
            _ => return Ok(ResolvedOption::Absent),
        },
    };

    coerce(name, expected, value)
}

/// Coerces a present value to the declared type.
fn coerce(name: &str, expected: ExpectedType, value: &Value) -> Result<ResolvedOption, ConfigError> {
    if let Value::String(s) = value {
        match expected {
            ExpectedType::String => return Ok(ResolvedOption::String(s.clone())),
            ExpectedType::Number => {
                let parsed = s.trim().parse::<i64>().map_err(|e| ConfigError::LiteralParse {
                    option: name.to_string(),
                    value: s.clone(),
                    message: e.to_string(),
                })?;
                return Ok(ResolvedOption::Number(Number::from(parsed)));
            }
            ExpectedType::Boolean | ExpectedType::Structured => {
                let parsed: Value =
                    serde_json::from_str(s).map_err(|e| ConfigError::LiteralParse {
                        option: name.to_string(),
                        value: s.clone(),
                        message: e.to_string(),
                    })?;
                if parsed.is_null() {
                    return Ok(ResolvedOption::Absent);
                }
                if !expected.accepts(&parsed) {
                    return Err(ConfigError::type_mismatch(name, type_name(&parsed), expected.name()));
                }
                return Ok(ResolvedOption::from_typed(parsed));
            }
        }
    }

    if expected.accepts(value) {
        Ok(ResolvedOption::from_typed(value.clone()))
    } else {
        Err(ConfigError::type_mismatch(name, type_name(value), expected.name()))
    }
}

/// Returns true for an empty string.
fn is_empty(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.is_empty())
}

/// Returns the type name of a JSON value.
#[must_use]
pub const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) | Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defaults() -> DefaultTable {
        OptionTable::new()
            .with("stage", "dev")
            .with("dataNodeCount", 2)
            .with("enforceHTTPS", true)
    }

    #[test]
    fn test_default_used_when_absent_or_empty() {
        let raw = OptionTable::new().with("stage", "");
        assert_eq!(
            resolve("stage", ExpectedType::String, &defaults(), &raw).unwrap(),
            ResolvedOption::String(String::from("dev"))
        );
        assert_eq!(
            resolve("dataNodeCount", ExpectedType::Number, &defaults(), &OptionTable::new()).unwrap(),
            ResolvedOption::Number(Number::from(2))
        );
    }

    #[test]
    fn test_falsy_values_preserved() {
        let raw = OptionTable::new()
            .with("enforceHTTPS", false)
            .with("dataNodeCount", 0);
        assert_eq!(
            resolve("enforceHTTPS", ExpectedType::Boolean, &defaults(), &raw).unwrap(),
            ResolvedOption::Boolean(false)
        );
        assert_eq!(
            resolve("dataNodeCount", ExpectedType::Number, &defaults(), &raw).unwrap(),
            ResolvedOption::Number(Number::from(0))
        );
    }

    #[test]
    fn test_null_and_missing_are_absent() {
        let raw = OptionTable::new().with("vpcId", Value::Null);
        let empty = OptionTable::new();
        assert!(resolve("vpcId", ExpectedType::String, &empty, &raw).unwrap().is_absent());
        assert!(resolve("mskARN", ExpectedType::String, &empty, &raw).unwrap().is_absent());
    }

    #[test]
    fn test_null_skips_default() {
        let defaults = OptionTable::new().with("dataNodeType", "r6g.large.search");
        let raw = OptionTable::new().with("dataNodeType", Value::Null);
        assert!(
            resolve("dataNodeType", ExpectedType::String, &defaults, &raw)
                .unwrap()
                .is_absent()
        );
        assert_eq!(
            resolve("dataNodeType", ExpectedType::String, &defaults, &OptionTable::new()).unwrap(),
            ResolvedOption::String(String::from("r6g.large.search"))
        );
    }

    #[test]
    fn test_string_coercion() {
        let raw = OptionTable::new()
            .with("dataNodeCount", " 4 ")
            .with("vpcEnabled", "true")
            .with("vpcSubnetIds", r#"["subnet-1","subnet-2"]"#);
        let empty = OptionTable::new();

        assert_eq!(
            resolve("dataNodeCount", ExpectedType::Number, &empty, &raw).unwrap(),
            ResolvedOption::Number(Number::from(4))
        );
        assert_eq!(
            resolve("vpcEnabled", ExpectedType::Boolean, &empty, &raw).unwrap(),
            ResolvedOption::Boolean(true)
        );
        assert_eq!(
            resolve("vpcSubnetIds", ExpectedType::Structured, &empty, &raw).unwrap(),
            ResolvedOption::Structured(json!(["subnet-1", "subnet-2"]))
        );
    }

    #[test]
    fn test_unparseable_string_is_fatal() {
        let raw = OptionTable::new()
            .with("dataNodeCount", "four")
            .with("vpcEnabled", "yes");
        let empty = OptionTable::new();

        let err = resolve("dataNodeCount", ExpectedType::Number, &empty, &raw).unwrap_err();
        assert!(matches!(err, ConfigError::LiteralParse { ref option, .. } if option == "dataNodeCount"));

        let err = resolve("vpcEnabled", ExpectedType::Boolean, &empty, &raw).unwrap_err();
        assert!(matches!(err, ConfigError::LiteralParse { .. }));
    }

    #[test]
    fn test_type_mismatch_names_types() {
        let raw = OptionTable::new()
            .with("vpcEnabled", 1)
            .with("enforceHTTPS", "42");
        let empty = OptionTable::new();

        let err = resolve("vpcEnabled", ExpectedType::Boolean, &empty, &raw).unwrap_err();
        match err {
            ConfigError::TypeMismatch { option, actual, expected } => {
                assert_eq!(option, "vpcEnabled");
                assert_eq!(actual, "number");
                assert_eq!(expected, "boolean");
            }
            other => panic!("unexpected error: {other}"),
        }

        // A string literal that decodes to the wrong type is rejected too
        let err = resolve("enforceHTTPS", ExpectedType::Boolean, &empty, &raw).unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { .. }));
    }

    #[test]
    fn test_table_from_non_object_rejected() {
        assert!(OptionTable::from_value(json!([1, 2]), "context").is_err());
        let table = OptionTable::from_value(json!({"stage": "dev"}), "context").unwrap();
        assert_eq!(table.len(), 1);
    }
}
