//! Operand classification.
//!
//! Decides whether one side of a `left:right` assertion is a literal
//! (boolean, integer, quoted string) or a field reference, and how it is
//! written in Rego.

/// One classified side of an assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// `True` or `False`.
    Boolean(bool),
    /// An integer literal, kept as written.
    Number(String),
    /// A single-quoted string; holds the text between the quotes.
    Quoted(String),
    /// Anything else: a field name.
    Field(String),
}

impl Operand {
    /// Classifies a raw operand.
    ///
    /// # Examples
    ///
    /// ```
    /// use oslorego_compiler::classifier::Operand;
    ///
    /// assert_eq!(Operand::classify("True"), Operand::Boolean(true));
    /// assert_eq!(Operand::classify("0x1F"), Operand::Number("0x1F".to_string()));
    /// assert_eq!(Operand::classify("'abc'"), Operand::Quoted("abc".to_string()));
    /// assert_eq!(Operand::classify("project"), Operand::Field("project".to_string()));
    /// ```
    #[must_use]
    pub fn classify(operand: &str) -> Self {
        match operand {
            "True" => Self::Boolean(true),
            "False" => Self::Boolean(false),
            _ if is_integer_literal(operand) => Self::Number(operand.to_string()),
            _ => match strip_single_quotes(operand) {
                Some(inner) => Self::Quoted(inner.to_string()),
                None => Self::Field(operand.to_string()),
            },
        }
    }

    /// Returns `true` for booleans, numbers and quoted strings.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        !matches!(self, Self::Field(_))
    }

    /// The operand as it appears in Rego. Fields are returned unchanged.
    #[must_use]
    pub fn rendered(&self) -> String {
        match self {
            Self::Boolean(true) => "true".to_string(),
            Self::Boolean(false) => "false".to_string(),
            Self::Number(text) | Self::Field(text) => text.clone(),
            Self::Quoted(inner) => rego_string(inner),
        }
    }
}

/// Classifies `operand`, returning its rendered form and whether it is a literal.
#[must_use]
pub fn classify(operand: &str) -> (String, bool) {
    let operand = Operand::classify(operand);
    (operand.rendered(), operand.is_literal())
}

/// Quotes `value` as a Rego (JSON) string literal.
#[must_use]
pub fn rego_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn strip_single_quotes(operand: &str) -> Option<&str> {
    if operand.len() < 2 {
        return None;
    }
    operand.strip_prefix('\'')?.strip_suffix('\'')
}

/// Signed integer literal with an optional `0x`, `0o`, `0b` or legacy `0` octal
/// prefix. Underscores may separate digits. The value must fit in an `i64`.
fn is_integer_literal(operand: &str) -> bool {
    let (sign, unsigned) = match operand.as_bytes().first() {
        Some(b'+') => ("+", &operand[1..]),
        Some(b'-') => ("-", &operand[1..]),
        _ => ("", operand),
    };

    let (radix, digits, prefixed) = split_radix(unsigned);
    if digits.is_empty() || !underscores_ok(digits, prefixed) {
        return false;
    }

    let digits: String = digits.chars().filter(|&c| c != '_').collect();
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return false;
    }
    i64::from_str_radix(&format!("{sign}{digits}"), radix).is_ok()
}

fn split_radix(unsigned: &str) -> (u32, &str, bool) {
    let lower = unsigned.get(..2).map(str::to_ascii_lowercase);
    match lower.as_deref() {
        Some("0x") => (16, &unsigned[2..], true),
        Some("0o") => (8, &unsigned[2..], true),
        Some("0b") => (2, &unsigned[2..], true),
        _ if unsigned.len() > 1 && unsigned.starts_with('0') => (8, &unsigned[1..], true),
        _ => (10, unsigned, false),
    }
}

/// Underscores must sit between digits, or directly after a base prefix.
fn underscores_ok(digits: &str, prefixed: bool) -> bool {
    let bytes = digits.as_bytes();
    bytes.iter().enumerate().all(|(i, &b)| {
        if b != b'_' {
            return true;
        }
        let prev_ok = if i == 0 {
            prefixed
        } else {
            bytes[i - 1] != b'_'
        };
        let next_ok = bytes.get(i + 1).is_some_and(|&n| n != b'_');
        prev_ok && next_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booleans() {
        assert_eq!(classify("True"), ("true".to_string(), true));
        assert_eq!(classify("False"), ("false".to_string(), true));
        assert_eq!(classify("true"), ("true".to_string(), false));
    }

    #[test]
    fn test_decimal_numbers() {
        assert_eq!(classify("123"), ("123".to_string(), true));
        assert_eq!(classify("-42"), ("-42".to_string(), true));
        assert_eq!(classify("+7"), ("+7".to_string(), true));
        assert_eq!(classify("0"), ("0".to_string(), true));
        assert_eq!(classify("1_000"), ("1_000".to_string(), true));
    }

    #[test]
    fn test_prefixed_numbers() {
        assert!(classify("0x1f").1);
        assert!(classify("0X1F").1);
        assert!(classify("0o17").1);
        assert!(classify("017").1);
        assert!(classify("0b101").1);
        assert!(classify("-0x10").1);
        assert!(classify("0x_ff").1);
    }

    #[test]
    fn test_not_numbers() {
        assert!(!classify("08").1);
        assert!(!classify("0x").1);
        assert!(!classify("12a").1);
        assert!(!classify("1__0").1);
        assert!(!classify("_1").1);
        assert!(!classify("1_").1);
        assert!(!classify("--1").1);
        assert!(!classify("+-1").1);
        assert!(!classify("-").1);
        assert!(!classify("99999999999999999999").1);
    }

    #[test]
    fn test_i64_bounds() {
        assert!(classify("9223372036854775807").1);
        assert!(classify("-9223372036854775808").1);
        assert!(!classify("9223372036854775808").1);
    }

    #[test]
    fn test_quoted_strings() {
        assert_eq!(classify("'asdf'"), ("\"asdf\"".to_string(), true));
        assert_eq!(classify("''"), ("\"\"".to_string(), true));
        assert_eq!(classify("'say \"hi\"'"), ("\"say \\\"hi\\\"\"".to_string(), true));
        assert!(!classify("'").1);
        assert!(!classify("'open").1);
    }

    #[test]
    fn test_fields() {
        assert_eq!(classify("project_id"), ("project_id".to_string(), false));
        assert_eq!(
            Operand::classify("user.domain_id"),
            Operand::Field("user.domain_id".to_string())
        );
    }

    #[test]
    fn test_rego_string_escapes() {
        assert_eq!(rego_string("admin"), "\"admin\"");
        assert_eq!(rego_string("a\\b"), "\"a\\\\b\"");
    }
}
