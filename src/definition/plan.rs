use serde::{Deserialize, Serialize};

use crate::security::AuthenticationRequest;

/// A named security policy attached to an API.
///
/// A plan binds a required authentication mechanism (by name) to per-plan
/// validation parameters, with an optional per-request selection rule and an
/// order hint. Plans are owned exclusively by their API and are replaced
/// wholesale when the API's configuration reloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    /// Plan id, unique within the owning API.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Name of the authentication mechanism this plan requires.
    /// Matched case-insensitively against the registered handler pool.
    pub security: String,

    /// Optional per-request predicate deciding whether this plan applies.
    #[serde(default)]
    pub selection_rule: Option<SelectionRule>,

    /// Opaque validation parameters resolved by the mechanism's backend after
    /// successful authentication (key-store scope, rule set, quota keys, ...).
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,

    /// Order hint. Plans are stable-sorted ascending before resolution, so
    /// equal orders keep declaration order.
    #[serde(default)]
    pub order: u32,
}

impl Plan {
    pub fn new(id: impl Into<String>, security: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            security: security.into(),
            selection_rule: None,
            parameters: serde_json::Map::new(),
            order: 0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_selection_rule(mut self, rule: SelectionRule) -> Self {
        self.selection_rule = Some(rule);
        self
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }
}

/// Per-request predicate deciding whether a plan applies.
///
/// Evaluated synchronously against the request before the plan's mechanism is
/// consulted; a non-matching rule skips the plan's handler at dispatch time
/// without rejecting the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum SelectionRule {
    /// Matches when the named header is present with exactly this value.
    HeaderEquals { name: String, value: String },

    /// Matches when the named header is present, regardless of value.
    HeaderPresent { name: String },

    /// Matches when the named query parameter is present with exactly this value.
    QueryEquals { name: String, value: String },
}

impl SelectionRule {
    /// Evaluate this rule against a request.
    pub fn matches(&self, request: &AuthenticationRequest) -> bool {
        match self {
            SelectionRule::HeaderEquals { name, value } => {
                request.header(name).is_some_and(|v| v == value)
            }
            SelectionRule::HeaderPresent { name } => request.header(name).is_some(),
            SelectionRule::QueryEquals { name, value } => {
                request.query_param(name).is_some_and(|v| v == value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AuthenticationRequest {
        AuthenticationRequest::new(http::Method::GET, "/echo")
            .with_header("X-Channel", "partner")
            .with_query_param("version", "2")
    }

    #[test]
    fn test_header_equals_rule() {
        let rule = SelectionRule::HeaderEquals {
            name: "X-Channel".to_string(),
            value: "partner".to_string(),
        };
        assert!(rule.matches(&request()));

        let rule = SelectionRule::HeaderEquals {
            name: "X-Channel".to_string(),
            value: "internal".to_string(),
        };
        assert!(!rule.matches(&request()));
    }

    #[test]
    fn test_header_present_rule() {
        let rule = SelectionRule::HeaderPresent {
            name: "X-Channel".to_string(),
        };
        assert!(rule.matches(&request()));

        let rule = SelectionRule::HeaderPresent {
            name: "X-Missing".to_string(),
        };
        assert!(!rule.matches(&request()));
    }

    #[test]
    fn test_query_equals_rule() {
        let rule = SelectionRule::QueryEquals {
            name: "version".to_string(),
            value: "2".to_string(),
        };
        assert!(rule.matches(&request()));

        let rule = SelectionRule::QueryEquals {
            name: "version".to_string(),
            value: "1".to_string(),
        };
        assert!(!rule.matches(&request()));
    }

    #[test]
    fn test_selection_rule_deserializes_from_tagged_json() {
        let rule: SelectionRule = serde_json::from_str(
            r#"{ "type": "header_equals", "name": "X-Channel", "value": "partner" }"#,
        )
        .unwrap();
        assert_eq!(
            rule,
            SelectionRule::HeaderEquals {
                name: "X-Channel".to_string(),
                value: "partner".to_string(),
            }
        );
    }
}
