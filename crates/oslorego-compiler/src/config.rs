//! Compiler configuration.

use serde::{Deserialize, Serialize};

use crate::error::{CompilerError, Result};
use crate::naming::DEFAULT_ALIAS_PREFIX;
use crate::package::{is_identifier, PackageName, DEFAULT_PACKAGE_NAME};

/// Default character marking a policy key as an action.
pub const DEFAULT_ACTION_SEPARATOR: char = ':';

/// Settings for a [`Compiler`](crate::Compiler).
///
/// # Examples
///
/// ```
/// use oslorego_compiler::CompilerConfig;
///
/// let config = CompilerConfig::new()
///     .with_package_name("keystone.policy")
///     .with_alias_prefix("keystone_rule");
/// assert_eq!(config.package_name, "keystone.policy");
/// assert_eq!(config.action_separator, ':');
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Rego package of the generated module.
    pub package_name: String,

    /// Policy keys containing this character are compiled as actions.
    pub action_separator: char,

    /// Prefix of the rule names generated for parenthesized groups.
    pub alias_prefix: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            package_name: DEFAULT_PACKAGE_NAME.to_string(),
            action_separator: DEFAULT_ACTION_SEPARATOR,
            alias_prefix: DEFAULT_ALIAS_PREFIX.to_string(),
        }
    }
}

impl CompilerConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the package name.
    #[must_use]
    pub fn with_package_name(mut self, package_name: impl Into<String>) -> Self {
        self.package_name = package_name.into();
        self
    }

    /// Sets the action separator.
    #[must_use]
    pub const fn with_action_separator(mut self, separator: char) -> Self {
        self.action_separator = separator;
        self
    }

    /// Sets the generated rule name prefix.
    #[must_use]
    pub fn with_alias_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.alias_prefix = prefix.into();
        self
    }

    /// Checks every field and returns the validated package name.
    ///
    /// # Errors
    ///
    /// Returns [`CompilerError::InvalidPackageName`] for a bad package name and
    /// [`CompilerError::InvalidConfig`] for a bad alias prefix.
    pub fn validate(&self) -> Result<PackageName> {
        let package = PackageName::parse(&self.package_name)?;
        if !is_identifier(&self.alias_prefix) {
            return Err(CompilerError::InvalidConfig {
                field: "alias_prefix",
                reason: format!("'{}' is not an identifier", self.alias_prefix),
            });
        }
        Ok(package)
    }
}
