//! Expression parser.
//!
//! A state machine over the [`Tokenizer`] stream that flattens one oslo.policy
//! expression into [`RuleRecord`]s. `and` chains accumulate into the current
//! record, `or` closes the current record and starts a new one with the same
//! name, and every parenthesized group becomes its own generated rule that is
//! referenced from the enclosing record.
//!
//! Records live in an arena; the group nesting is a stack of frames holding
//! arena indices.

use serde_yaml::Value;
use tracing::debug;

use crate::comparison::render_assertion;
use crate::error::ExpressionError;
use crate::naming::AliasAllocator;
use crate::rule::{RuleKind, RuleRecord};
use crate::tokenizer::{Token, Tokenizer};

/// Parser states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Start of an expression, or right after `and`, `or` or `(`.
    ExpectStart,
    /// Right after `not`.
    ExpectNextToken,
    /// After an assertion or `)`.
    ExpectEndOrOperator,
}

/// One open rule: the record being filled and its finished alternatives.
struct Frame {
    current: usize,
    finished: Vec<usize>,
}

impl Frame {
    const fn new(current: usize) -> Self {
        Self {
            current,
            finished: Vec::new(),
        }
    }

    fn into_indices(mut self) -> Vec<usize> {
        self.finished.push(self.current);
        self.finished
    }
}

/// Parses a single rule expression.
///
/// # Examples
///
/// ```
/// use oslorego_compiler::naming::SequentialAliases;
/// use oslorego_compiler::parser::ExpressionParser;
/// use oslorego_compiler::rule::RuleKind;
///
/// let aliases = SequentialAliases::default();
/// let records = ExpressionParser::new(RuleKind::Alias, "owner", &aliases)
///     .parse("rule:admin or user_id:%(target.user_id)s")
///     .unwrap();
///
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0].assertions, vec!["admin"]);
/// assert_eq!(records[1].assertions, vec!["credentials.user_id = target.target.user_id"]);
/// ```
pub struct ExpressionParser<'a> {
    aliases: &'a dyn AliasAllocator,
    state: ParserState,
    arena: Vec<RuleRecord>,
    /// Open rules; the bottom frame belongs to the policy key.
    stack: Vec<Frame>,
    /// Finished records of the policy key itself.
    disjuncts: Vec<usize>,
    /// Finished records of generated groups, one run per group in closing order.
    groups: Vec<usize>,
    negated: bool,
    done: bool,
}

impl<'a> ExpressionParser<'a> {
    /// Creates a parser for the policy `name`.
    #[must_use]
    pub fn new(kind: RuleKind, name: impl Into<String>, aliases: &'a dyn AliasAllocator) -> Self {
        Self {
            aliases,
            state: ParserState::ExpectStart,
            arena: vec![RuleRecord::new(kind, name)],
            stack: vec![Frame::new(0)],
            disjuncts: Vec::new(),
            groups: Vec::new(),
            negated: false,
            done: false,
        }
    }

    /// Current state of the machine.
    #[must_use]
    pub const fn state(&self) -> ParserState {
        self.state
    }

    /// Number of groups currently open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    /// Parses `expression` to completion.
    ///
    /// Returns the key's own records first (one per `or` alternative), then
    /// the records of generated groups in the order the groups were closed.
    ///
    /// # Errors
    ///
    /// Returns an [`ExpressionError`] if the expression does not follow the
    /// grammar or contains a malformed assertion.
    pub fn parse(mut self, expression: &str) -> Result<Vec<RuleRecord>, ExpressionError> {
        let mut tokens = Tokenizer::new(expression);
        while !self.done {
            self.step(tokens.next_token())?;
        }
        Ok(self.into_records())
    }

    /// Feeds one token to the state machine.
    ///
    /// # Errors
    ///
    /// Returns an [`ExpressionError`] if the token is not accepted in the
    /// current state.
    pub fn step(&mut self, token: Token<'_>) -> Result<(), ExpressionError> {
        use ParserState::{ExpectEndOrOperator, ExpectNextToken, ExpectStart};

        if self.done {
            return Err(ExpressionError::UnexpectedToken {
                token: token.to_string(),
            });
        }

        self.state = match (token, self.state) {
            (Token::OpenParen, ExpectStart | ExpectNextToken) => {
                self.open_group();
                ExpectStart
            }
            (Token::CloseParen, _) => {
                self.close_group()?;
                ExpectEndOrOperator
            }
            (Token::Not, ExpectStart) => {
                self.negated = true;
                ExpectNextToken
            }
            (Token::Assertion(text), ExpectStart | ExpectNextToken) if text.contains(':') => {
                let rendered = render_assertion(text)?;
                self.append(rendered);
                ExpectEndOrOperator
            }
            (Token::And, ExpectEndOrOperator) => ExpectStart,
            (Token::Or, ExpectEndOrOperator) => {
                self.split_disjunct();
                ExpectStart
            }
            (Token::End, ExpectEndOrOperator) => {
                self.end()?;
                ExpectEndOrOperator
            }
            (token, _) => {
                return Err(ExpressionError::UnexpectedToken {
                    token: token.to_string(),
                })
            }
        };
        Ok(())
    }

    fn top(&self) -> usize {
        self.stack[self.stack.len() - 1].current
    }

    fn append(&mut self, assertion: String) {
        let assertion = if std::mem::take(&mut self.negated) {
            format!("not {assertion}")
        } else {
            assertion
        };
        let top = self.top();
        self.arena[top].push(assertion);
    }

    fn open_group(&mut self) {
        let name = self.aliases.allocate();
        self.append(name.clone());
        self.arena.push(RuleRecord::new(RuleKind::Alias, name));
        self.stack.push(Frame::new(self.arena.len() - 1));
    }

    fn close_group(&mut self) -> Result<(), ExpressionError> {
        if self.stack.len() <= 1 {
            return Err(ExpressionError::UnexpectedCloseParen);
        }
        self.negated = false;
        if let Some(frame) = self.stack.pop() {
            self.groups.extend(frame.into_indices());
        }
        Ok(())
    }

    fn split_disjunct(&mut self) {
        let top = self.top();
        let next = RuleRecord::new(self.arena[top].kind, self.arena[top].name.clone());
        self.arena.push(next);
        let index = self.arena.len() - 1;
        if let Some(frame) = self.stack.last_mut() {
            frame.finished.push(frame.current);
            frame.current = index;
        }
    }

    fn end(&mut self) -> Result<(), ExpressionError> {
        if self.stack.len() > 1 {
            return Err(ExpressionError::UnclosedSubexpression {
                open: self.depth(),
            });
        }
        if let Some(frame) = self.stack.pop() {
            self.disjuncts = frame.into_indices();
        }
        self.done = true;
        Ok(())
    }

    fn into_records(self) -> Vec<RuleRecord> {
        let mut slots: Vec<Option<RuleRecord>> = self.arena.into_iter().map(Some).collect();
        self.disjuncts
            .iter()
            .chain(&self.groups)
            .filter_map(|&index| slots[index].take())
            .collect()
    }
}

/// Compiles the raw value of one policy entry into rule records.
///
/// Strings are parsed as expressions, except the special values `!` (never
/// allowed), and `""` or `@` (always allowed). An empty list is always
/// allowed; every other value is rejected.
///
/// # Errors
///
/// Returns [`ExpressionError::InvalidValue`] for values that are neither a
/// string nor an empty list, or any error raised while parsing the expression.
pub fn compile_rule_value(
    kind: RuleKind,
    name: &str,
    value: &Value,
    aliases: &dyn AliasAllocator,
) -> Result<Vec<RuleRecord>, ExpressionError> {
    let records = match value {
        Value::String(expression) => compile_expression(kind, name, expression, aliases)?,
        Value::Sequence(items) if items.is_empty() => vec![RuleRecord::single(kind, name, "true")],
        other => {
            return Err(ExpressionError::InvalidValue {
                found: describe_value(other),
            })
        }
    };
    debug!(name, kind = kind.as_str(), records = records.len(), "Compiled rule");
    Ok(records)
}

/// Compiles one expression string, handling the `!`, `""` and `@` shorthands.
///
/// Trailing line breaks, as kept by YAML literal blocks, are ignored.
///
/// # Errors
///
/// Returns an [`ExpressionError`] if the expression cannot be parsed.
pub fn compile_expression(
    kind: RuleKind,
    name: &str,
    expression: &str,
    aliases: &dyn AliasAllocator,
) -> Result<Vec<RuleRecord>, ExpressionError> {
    match expression.trim_end_matches(['\r', '\n']) {
        "!" => Ok(vec![RuleRecord::single(kind, name, "false")]),
        "" | "@" => Ok(vec![RuleRecord::single(kind, name, "true")]),
        expression => ExpressionParser::new(kind, name, aliases).parse(expression),
    }
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string {s:?}"),
        Value::Sequence(items) => format!("list with {} item(s)", items.len()),
        Value::Mapping(_) => "mapping".to_string(),
        Value::Tagged(tagged) => format!("tagged value {}", tagged.tag),
    }
}
