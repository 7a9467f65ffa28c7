//! Access-policy parsing.
//!
//! Access policies are supplied as IAM-style JSON documents whose `Statement`
//! element holds either a single statement object or an array of them. This
//! module normalizes them into [`PolicyStatement`] values.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::PolicyError;

/// Whether a statement grants or denies access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Effect {
    /// Grant access.
    #[default]
    Allow,
    /// Deny access.
    Deny,
}

/// A principal a statement applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Principal {
    /// Every principal (`"*"`).
    Any,
    /// A principal of a specific kind, e.g. `AWS` or `Service`.
    Typed {
        /// Principal kind.
        kind: String,
        /// Principal identifier.
        id: String,
    },
}

/// A normalized authorization rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyStatement {
    /// Optional statement id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    /// Allow or deny.
    pub effect: Effect,
    /// Principals the statement applies to.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub principals: Vec<Principal>,
    /// Principals the statement excludes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub not_principals: Vec<Principal>,
    /// Actions covered.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
    /// Actions excluded.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub not_actions: Vec<String>,
    /// Resources covered.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    /// Resources excluded.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub not_resources: Vec<String>,
    /// Condition block, kept verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PrincipalJson {
    Wildcard(String),
    Typed(BTreeMap<String, OneOrMany>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct StatementJson {
    #[serde(default)]
    sid: Option<String>,
    #[serde(default)]
    effect: Effect,
    #[serde(default)]
    principal: Option<PrincipalJson>,
    #[serde(default)]
    not_principal: Option<PrincipalJson>,
    #[serde(default)]
    action: Option<OneOrMany>,
    #[serde(default)]
    not_action: Option<OneOrMany>,
    #[serde(default)]
    resource: Option<OneOrMany>,
    #[serde(default)]
    not_resource: Option<OneOrMany>,
    #[serde(default)]
    condition: Option<Value>,
}

impl PolicyStatement {
    /// Builds a statement allowing every principal every domain action on
    /// the given resource.
    #[must_use]
    pub fn allow_all(resource: impl Into<String>) -> Self {
        Self {
            sid: None,
            effect: Effect::Allow,
            principals: vec![Principal::Any],
            not_principals: vec![],
            actions: vec![String::from("es:*")],
            not_actions: vec![],
            resources: vec![resource.into()],
            not_resources: vec![],
            conditions: None,
        }
    }
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

fn flatten(value: Option<OneOrMany>) -> Vec<String> {
    value.map(Vec::from).unwrap_or_default()
}

fn principals(value: Option<PrincipalJson>) -> Result<Vec<Principal>, String> {
    match value {
        None => Ok(vec![]),
        Some(PrincipalJson::Wildcard(s)) if s == "*" => Ok(vec![Principal::Any]),
        Some(PrincipalJson::Wildcard(s)) => Err(format!("principal '{s}' must be \"*\" or an object")),
        Some(PrincipalJson::Typed(map)) => Ok(map
            .into_iter()
            .flat_map(|(kind, ids)| {
                Vec::from(ids).into_iter().map(move |id| {
                    if id == "*" && kind == "AWS" {
                        Principal::Any
                    } else {
                        Principal::Typed {
                            kind: kind.clone(),
                            id,
                        }
                    }
                })
            })
            .collect()),
    }
}

/// Parses a single statement entry.
fn parse_statement(option: &str, index: usize, entry: &Value) -> Result<PolicyStatement, PolicyError> {
    let invalid = |message: String| PolicyError::InvalidStatement {
        option: option.to_string(),
        index,
        message,
    };

    if !entry.is_object() {
        return Err(invalid(String::from("expected a statement object")));
    }

    let json: StatementJson =
        serde_json::from_value(entry.clone()).map_err(|e| invalid(e.to_string()))?;

    if json.action.is_none() && json.not_action.is_none() {
        return Err(invalid(String::from("statement must contain 'Action' or 'NotAction'")));
    }

    Ok(PolicyStatement {
        sid: json.sid,
        effect: json.effect,
        principals: principals(json.principal).map_err(&invalid)?,
        not_principals: principals(json.not_principal).map_err(&invalid)?,
        actions: flatten(json.action),
        not_actions: flatten(json.not_action),
        resources: flatten(json.resource),
        not_resources: flatten(json.not_resource),
        conditions: json.condition,
    })
}

/// Parses an access-policy document into statements, preserving order.
///
/// # Errors
///
/// Returns [`PolicyError::Malformed`] if the document has no non-empty
/// `Statement` element and [`PolicyError::InvalidStatement`] if any entry
/// fails to parse. No partial list is ever returned.
pub fn parse_policies(option: &str, doc: &Value) -> Result<Vec<PolicyStatement>, PolicyError> {
    let malformed = || PolicyError::Malformed {
        option: option.to_string(),
    };

    let statements = doc.get("Statement").ok_or_else(malformed)?;

    match statements {
        Value::Null => Err(malformed()),
        Value::String(s) if s.is_empty() => Err(malformed()),
        Value::Array(entries) if entries.is_empty() => Err(malformed()),
        Value::Array(entries) => entries
            .iter()
            .enumerate()
            .map(|(index, entry)| parse_statement(option, index, entry))
            .collect(),
        single => Ok(vec![parse_statement(option, 0, single)?]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_statement_rejected() {
        let err = parse_policies("accessPolicies", &json!({"Statement": []})).unwrap_err();
        assert!(matches!(err, PolicyError::Malformed { .. }));
        assert!(parse_policies("accessPolicies", &json!({"Version": "2012-10-17"})).is_err());
        assert!(parse_policies("accessPolicies", &json!({"Statement": null})).is_err());
    }

    #[test]
    fn test_single_statement() {
        let doc = json!({
            "Statement": {
                "Effect": "Allow",
                "Principal": {"AWS": "arn:aws:iam::123456789012:root"},
                "Action": "es:ESHttp*",
                "Resource": "arn:aws:es:us-east-1:123456789012:domain/test/*"
            }
        });
        let statements = parse_policies("accessPolicies", &doc).unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].actions, vec!["es:ESHttp*"]);
        assert_eq!(
            statements[0].principals,
            vec![Principal::Typed {
                kind: String::from("AWS"),
                id: String::from("arn:aws:iam::123456789012:root"),
            }]
        );
    }

    #[test]
    fn test_statement_list_keeps_order() {
        let doc = json!({
            "Statement": [
                {"Sid": "first", "Effect": "Allow", "Principal": "*", "Action": ["es:ESHttpGet"]},
                {"Sid": "second", "Effect": "Deny", "Principal": "*", "Action": "es:ESHttpDelete"}
            ]
        });
        let statements = parse_policies("accessPolicies", &doc).unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].sid.as_deref(), Some("first"));
        assert_eq!(statements[1].sid.as_deref(), Some("second"));
        assert_eq!(statements[1].effect, Effect::Deny);
        assert_eq!(statements[0].principals, vec![Principal::Any]);
    }

    #[test]
    fn test_bad_entry_fails_whole_document() {
        let doc = json!({
            "Statement": [
                {"Effect": "Allow", "Principal": "*", "Action": "es:*"},
                {"Effect": "Maybe", "Action": "es:*"}
            ]
        });
        let err = parse_policies("accessPolicies", &doc).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidStatement { index: 1, .. }));

        let err = parse_policies("accessPolicies", &json!({"Statement": ["es:*"]})).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidStatement { index: 0, .. }));
    }

    #[test]
    fn test_allow_all() {
        let statement = PolicyStatement::allow_all("arn:aws:es:us-east-1:1:domain/d/*");
        assert_eq!(statement.effect, Effect::Allow);
        assert_eq!(statement.principals, vec![Principal::Any]);
        assert_eq!(statement.actions, vec!["es:*"]);
    }
}
