//! Rendering of atomic `left:right` assertions into Rego comparisons.

use tracing::warn;

use crate::classifier::{rego_string, Operand};
use crate::error::ExpressionError;

/// Renders one assertion as a single line of Rego.
///
/// Special forms, checked in order:
///
/// 1. `rule:<name>` becomes a bare reference to `<name>`.
/// 2. `role:<name>` becomes `credentials.roles[_] = "<name>"`.
/// 3. `<left>:%(<path>)s` compares against `target.<path>`.
/// 4. Otherwise both sides are classified and combined.
///
/// # Errors
///
/// Returns [`ExpressionError::InvalidAssertion`] if either operand is empty and
/// [`ExpressionError::UnmatchedInterpolation`] if a `%(` lacks its `)s`.
///
/// # Examples
///
/// ```
/// use oslorego_compiler::comparison::render_assertion;
///
/// assert_eq!(render_assertion("rule:admin").unwrap(), "admin");
/// assert_eq!(
///     render_assertion("project_id:%(target.project_id)s").unwrap(),
///     "credentials.project_id = target.target.project_id"
/// );
/// ```
pub fn render_assertion(assertion: &str) -> Result<String, ExpressionError> {
    let (left, right) = assertion.split_once(':').unwrap_or((assertion, ""));

    if left.is_empty() {
        return Err(missing_operand("left", assertion));
    }
    if right.is_empty() {
        return Err(missing_operand("right", assertion));
    }

    match left {
        "rule" => return Ok(right.to_string()),
        "role" => return Ok(format!("credentials.roles[_] = {}", rego_string(right))),
        _ => {}
    }

    if let Some(interpolated) = right.strip_prefix("%(") {
        let path = interpolated.strip_suffix(")s").ok_or_else(|| {
            ExpressionError::UnmatchedInterpolation {
                assertion: assertion.to_string(),
            }
        })?;
        if path.is_empty() {
            return Err(missing_operand("right", assertion));
        }
        let left = Operand::classify(left);
        let target = format!("target.{path}");
        return Ok(if left.is_literal() {
            format!("{} = {target}", left.rendered())
        } else {
            format!("credentials.{} = {target}", left.rendered())
        });
    }

    Ok(combine(&Operand::classify(left), &Operand::classify(right), assertion))
}

fn combine(left: &Operand, right: &Operand, assertion: &str) -> String {
    match (left.is_literal(), right.is_literal()) {
        (true, true) => format!("{} = {}", left.rendered(), right.rendered()),
        (false, true) => format!("credentials.{} = {}", left.rendered(), right.rendered()),
        (true, false) => format!("credentials.{} = {}", right.rendered(), left.rendered()),
        (false, false) => {
            warn!(
                assertion,
                "Neither operand is a literal; treating the right operand as a string"
            );
            format!(
                "credentials.{} = {}",
                left.rendered(),
                rego_string(&right.rendered())
            )
        }
    }
}

fn missing_operand(side: &'static str, assertion: &str) -> ExpressionError {
    ExpressionError::InvalidAssertion {
        side,
        assertion: assertion.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(assertion: &str) -> String {
        render_assertion(assertion).unwrap()
    }

    #[test]
    fn test_rule_reference() {
        assert_eq!(render("rule:admin"), "admin");
        assert_eq!(render("rule:admin_or_owner"), "admin_or_owner");
    }

    #[test]
    fn test_role_lookup() {
        assert_eq!(render("role:admin"), "credentials.roles[_] = \"admin\"");
        // Role names are literal even when they look like numbers.
        assert_eq!(render("role:123"), "credentials.roles[_] = \"123\"");
    }

    #[test]
    fn test_target_interpolation() {
        assert_eq!(
            render("project:%(target.secret.project_id)s"),
            "credentials.project = target.target.secret.project_id"
        );
        assert_eq!(
            render("True:%(target.is_public)s"),
            "true = target.target.is_public"
        );
        assert_eq!(render("'x':%(name)s"), "\"x\" = target.name");
    }

    #[test]
    fn test_unmatched_interpolation() {
        let err = render_assertion("project:%(target.project_id").unwrap_err();
        assert_eq!(
            err,
            ExpressionError::UnmatchedInterpolation {
                assertion: "project:%(target.project_id".to_string()
            }
        );
        assert!(matches!(
            render_assertion("project:%(target.project_id)"),
            Err(ExpressionError::UnmatchedInterpolation { .. })
        ));
    }

    #[test]
    fn test_missing_operands() {
        assert_eq!(
            render_assertion(":%(project)s").unwrap_err(),
            ExpressionError::InvalidAssertion {
                side: "left",
                assertion: ":%(project)s".to_string()
            }
        );
        assert_eq!(
            render_assertion("project:").unwrap_err(),
            ExpressionError::InvalidAssertion {
                side: "right",
                assertion: "project:".to_string()
            }
        );
        assert!(matches!(
            render_assertion("project:%()s"),
            Err(ExpressionError::InvalidAssertion { side: "right", .. })
        ));
    }

    #[test]
    fn test_literal_on_either_side() {
        assert_eq!(render("project:'asdf'"), "credentials.project = \"asdf\"");
        assert_eq!(render("'asdf':project"), "credentials.project = \"asdf\"");
        assert_eq!(render("project:123"), "credentials.project = 123");
        assert_eq!(render("123:project"), "credentials.project = 123");
        assert_eq!(render("project:True"), "credentials.project = true");
        assert_eq!(render("True:project"), "credentials.project = true");
    }

    #[test]
    fn test_both_literals() {
        assert_eq!(render("True:'yes'"), "true = \"yes\"");
        assert_eq!(render("1:2"), "1 = 2");
    }

    #[test]
    fn test_bare_word_fallback() {
        assert_eq!(render("is_admin:yes"), "credentials.is_admin = \"yes\"");
    }

    #[test]
    fn test_only_first_colon_splits() {
        assert_eq!(
            render("project:'a:b'"),
            "credentials.project = \"a:b\""
        );
    }
}
