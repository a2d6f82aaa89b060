//! Rego package names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CompilerError, Result};

/// Package used when none is configured.
pub const DEFAULT_PACKAGE_NAME: &str = "openstack.policy";

/// A validated, dot-separated Rego package name such as `openstack.policy`.
///
/// Every segment must match `[A-Za-z_][A-Za-z0-9_]*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageName(String);

impl PackageName {
    /// Validates `name`.
    ///
    /// # Errors
    ///
    /// Returns [`CompilerError::InvalidPackageName`] if `name` is empty, has an
    /// empty segment, or a segment is not an identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use oslorego_compiler::PackageName;
    ///
    /// assert!(PackageName::parse("openstack.policy").is_ok());
    /// assert!(PackageName::parse(".policy").is_err());
    /// assert!(PackageName::parse("policy/../etc").is_err());
    /// ```
    pub fn parse(name: &str) -> Result<Self> {
        let invalid = |reason: String| CompilerError::InvalidPackageName {
            name: name.to_string(),
            reason,
        };

        if name.is_empty() {
            return Err(invalid("package name is empty".to_string()));
        }
        for (index, segment) in name.split('.').enumerate() {
            if segment.is_empty() {
                return Err(invalid(format!("segment {} is empty", index + 1)));
            }
            if !is_identifier(segment) {
                return Err(invalid(format!("'{segment}' is not an identifier")));
            }
        }
        Ok(Self(name.to_string()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PackageName {
    fn default() -> Self {
        Self(DEFAULT_PACKAGE_NAME.to_string())
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PackageName {
    type Err = CompilerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PackageName {
    type Error = CompilerError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<PackageName> for String {
    fn from(value: PackageName) -> Self {
        value.0
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["openstack.policy", "policy", "_a.b_2.C", "a1.b2.c3"] {
            assert_eq!(PackageName::parse(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in [
            "",
            ".policy",
            "openstack.",
            "openstack..policy",
            "1abc",
            "open-stack",
            "openstack/policy",
            "openstack\\policy",
            "../policy",
            "open stack",
        ] {
            assert!(
                matches!(
                    PackageName::parse(name),
                    Err(CompilerError::InvalidPackageName { .. })
                ),
                "expected {name:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_default() {
        assert_eq!(PackageName::default().to_string(), "openstack.policy");
    }

    #[test]
    fn test_serde_validates() {
        let name: PackageName = serde_json::from_str("\"a.b\"").unwrap();
        assert_eq!(name.as_str(), "a.b");
        assert!(serde_json::from_str::<PackageName>("\"a..b\"").is_err());
    }
}
