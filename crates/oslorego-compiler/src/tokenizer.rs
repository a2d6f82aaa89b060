//! Tokenizer for oslo.policy rule expressions.
//!
//! Splits an expression such as `role:admin or (rule:owner and not rule:locked)`
//! into parentheses, the `and`/`or`/`not` keywords, and atomic assertions.
//! The tokenizer never fails; malformed input is rejected by the parser.

use std::fmt;

/// A lexical token of a rule expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `and`
    And,
    /// `or`
    Or,
    /// `not`
    Not,
    /// Any other word, normally a `left:right` assertion.
    Assertion(&'a str),
    /// End of input.
    End,
}

impl<'a> Token<'a> {
    /// Classifies the text of a single token.
    #[must_use]
    pub fn from_text(text: &'a str) -> Self {
        match text {
            "" => Self::End,
            "(" => Self::OpenParen,
            ")" => Self::CloseParen,
            "and" => Self::And,
            "or" => Self::Or,
            "not" => Self::Not,
            other => Self::Assertion(other),
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenParen => f.write_str("("),
            Self::CloseParen => f.write_str(")"),
            Self::And => f.write_str("and"),
            Self::Or => f.write_str("or"),
            Self::Not => f.write_str("not"),
            Self::Assertion(text) => f.write_str(text),
            Self::End => f.write_str("<end>"),
        }
    }
}

/// Splits the next token off `input`.
///
/// Returns the token text and the unconsumed remainder. An empty token text
/// means the input is exhausted.
///
/// # Examples
///
/// ```
/// use oslorego_compiler::tokenizer::split_token;
///
/// assert_eq!(split_token("  (rule:a)"), ("(", "rule:a)"));
/// assert_eq!(split_token("rule:a)"), ("rule:a", ")"));
/// assert_eq!(split_token(" \t"), ("", ""));
/// ```
#[must_use]
pub fn split_token(input: &str) -> (&str, &str) {
    let input = input.trim_start_matches([' ', '\t']);
    match input.as_bytes().first() {
        None => ("", ""),
        Some(b'(' | b')') => input.split_at(1),
        Some(_) => input.split_at(word_end(input)),
    }
}

/// Byte offset where the word starting at the beginning of `input` ends.
///
/// A `%(` target interpolation is kept inside the word up to its `)`, so
/// `project:%(target.project_id)s` stays a single token.
fn word_end(input: &str) -> usize {
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' | b'(' | b')' => break,
            b'%' if bytes.get(i + 1) == Some(&b'(') => {
                let rest = &input[i + 2..];
                match rest.find([' ', '\t', ')']) {
                    Some(offset) if rest.as_bytes()[offset] == b')' => i += offset + 3,
                    Some(offset) => i += offset + 2,
                    None => i = bytes.len(),
                }
            }
            _ => i += 1,
        }
    }

    i
}

/// Lazy token stream over one rule expression.
///
/// Iteration yields every token followed by exactly one [`Token::End`].
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    remainder: &'a str,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    /// Creates a tokenizer over `input`.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            remainder: input,
            finished: false,
        }
    }

    /// The input not yet consumed.
    #[must_use]
    pub const fn remainder(&self) -> &'a str {
        self.remainder
    }

    /// Consumes and returns the next token; returns [`Token::End`] once exhausted.
    pub fn next_token(&mut self) -> Token<'a> {
        let (text, rest) = split_token(self.remainder);
        self.remainder = rest;
        Token::from_text(text)
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token == Token::End {
            self.finished = true;
        }
        Some(token)
    }
}
