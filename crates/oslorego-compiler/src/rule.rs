//! Flattened rule records produced by the expression parser.

use serde::{Deserialize, Serialize};

/// How a rule record is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// A dispatchable action, emitted as an `allow` body guarded by the rule name.
    Action,
    /// A named rule referenced from other rules.
    Alias,
}

impl RuleKind {
    /// `Action` if `key` contains `separator`, otherwise `Alias`.
    #[must_use]
    pub fn for_key(key: &str, separator: char) -> Self {
        if key.contains(separator) {
            Self::Action
        } else {
            Self::Alias
        }
    }

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::Alias => "alias",
        }
    }
}

/// One conjunction of rendered assertions.
///
/// Records sharing a name are alternatives of the same rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRecord {
    /// Whether this is an action or an alias block.
    pub kind: RuleKind,
    /// Policy key or generated rule name.
    pub name: String,
    /// Rendered Rego lines, in source order.
    pub assertions: Vec<String>,
}

impl RuleRecord {
    /// Creates a record with no assertions.
    #[must_use]
    pub fn new(kind: RuleKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            assertions: Vec::new(),
        }
    }

    /// Creates a record holding a single assertion.
    #[must_use]
    pub fn single(kind: RuleKind, name: impl Into<String>, assertion: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            assertions: vec![assertion.into()],
        }
    }

    /// Appends an assertion.
    pub fn push(&mut self, assertion: impl Into<String>) {
        self.assertions.push(assertion.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_for_key() {
        assert_eq!(RuleKind::for_key("secrets:get", ':'), RuleKind::Action);
        assert_eq!(RuleKind::for_key("admin_required", ':'), RuleKind::Alias);
        assert_eq!(RuleKind::for_key("secrets/get", '/'), RuleKind::Action);
    }

    #[test]
    fn test_record_serializes() {
        let record = RuleRecord::single(RuleKind::Alias, "admin", "credentials.roles[_] = \"admin\"");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "alias");
        assert_eq!(json["assertions"][0], "credentials.roles[_] = \"admin\"");
    }
}
