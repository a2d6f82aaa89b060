//! Error types for the oslo.policy compiler.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for compiler operations.
pub type Result<T> = std::result::Result<T, CompilerError>;

/// Errors raised while compiling a single rule expression.
///
/// These never carry the policy key; [`CompilerError::Policy`] attaches it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    /// The rule value is neither a string nor an empty list.
    #[error("Invalid rule value: {found}")]
    InvalidValue {
        /// Short description of the value that was found.
        found: String,
    },

    /// An assertion is missing its left or right operand.
    #[error("Missing {side} operand in assertion '{assertion}'")]
    InvalidAssertion {
        /// Which operand is missing (`left` or `right`).
        side: &'static str,
        /// The offending assertion.
        assertion: String,
    },

    /// A `%(` target interpolation lacks its closing `)s`.
    #[error("Unmatched target interpolation in '{assertion}'")]
    UnmatchedInterpolation {
        /// The offending assertion.
        assertion: String,
    },

    /// A token appeared where the grammar does not allow it.
    #[error("Unexpected token '{token}'")]
    UnexpectedToken {
        /// The offending token (`<end>` for the end of input).
        token: String,
    },

    /// A `)` appeared without a matching `(`.
    #[error("Unexpected ')' without a matching '('")]
    UnexpectedCloseParen,

    /// The expression ended with open groups.
    #[error("{open} parenthesized group(s) never closed")]
    UnclosedSubexpression {
        /// Number of groups still open at the end of input.
        open: usize,
    },
}

/// Errors that can occur while compiling a policy document.
#[derive(Error, Debug)]
pub enum CompilerError {
    /// Failed to read a policy file.
    #[error("Failed to read policy file {path}: {source}")]
    FileReadError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the generated policy.
    #[error("Failed to write policy file {path}: {source}")]
    FileWriteError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML/JSON or is not a mapping.
    #[error("Failed to parse policy document: {0}")]
    DocumentParse(#[from] serde_yaml::Error),

    /// The package name is not a dotted identifier.
    #[error("Invalid package name '{name}': {reason}")]
    InvalidPackageName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A configuration value is not usable.
    #[error("Invalid configuration for {field}: {reason}")]
    InvalidConfig {
        /// The configuration field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// A rule expression failed to compile.
    #[error("Failed to compile policy '{key}': {source}")]
    Policy {
        /// The policy key whose value failed.
        key: String,
        /// The expression-level failure.
        #[source]
        source: ExpressionError,
    },
}

impl CompilerError {
    /// Attaches a policy key to an expression error.
    #[must_use]
    pub fn policy(key: impl Into<String>, source: ExpressionError) -> Self {
        Self::Policy {
            key: key.into(),
            source,
        }
    }

    /// Returns the expression-level cause, if this error came from a rule.
    #[must_use]
    pub const fn expression_error(&self) -> Option<&ExpressionError> {
        match self {
            Self::Policy { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_error_display() {
        let err = CompilerError::policy(
            "secrets:get",
            ExpressionError::UnexpectedToken {
                token: "and".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "Failed to compile policy 'secrets:get': Unexpected token 'and'"
        );
    }

    #[test]
    fn test_invalid_assertion_display() {
        let err = ExpressionError::InvalidAssertion {
            side: "right",
            assertion: "project:".to_string(),
        };
        assert_eq!(err.to_string(), "Missing right operand in assertion 'project:'");
    }

    #[test]
    fn test_expression_error_accessor() {
        let err = CompilerError::policy("admin", ExpressionError::UnexpectedCloseParen);
        assert_eq!(
            err.expression_error(),
            Some(&ExpressionError::UnexpectedCloseParen)
        );

        let err = CompilerError::InvalidPackageName {
            name: ".bad".to_string(),
            reason: "empty segment".to_string(),
        };
        assert!(err.expression_error().is_none());
    }
}
