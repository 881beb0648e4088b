use std::{cmp::Ordering, iter::Peekable, slice};

use crate::{
    ParseResult,
    error::{ParseError, ParseErrorKind},
    report,
    resolver::Resolver,
    token::{Token, TokenKind},
};

/// A scalar operand.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    String(String),
    Number(f64),
    Bool(bool),
}

impl Value {
    /// `false`, `0`, `""` and `"0"` are falsy.
    pub(crate) fn truthy(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Number(value) => *value != 0.0,
            Self::String(value) => !value.is_empty() && value != "0",
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::String(value) => value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite()),
            Self::Bool(_) => None,
        }
    }

    fn to_text(&self) -> String {
        match self {
            Self::String(value) => value.clone(),
            Self::Number(value) => value.to_string(),
            Self::Bool(value) => value.to_string(),
        }
    }

    /// Booleans compare by truthiness, numeric pairs numerically, and anything
    /// else as text.
    fn compare(&self, other: &Self) -> Option<Ordering> {
        if matches!(self, Self::Bool(_)) || matches!(other, Self::Bool(_)) {
            return Some(self.truthy().cmp(&other.truthy()));
        }
        if let (Some(left), Some(right)) = (self.as_number(), other.as_number()) {
            return left.partial_cmp(&right);
        }
        Some(self.to_text().cmp(&other.to_text()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    And,
    Or,
    Xor,
}

impl Operator {
    pub(crate) fn from_literal(literal: &str) -> Option<Self> {
        let operator = match literal {
            "==" => Self::Equal,
            "!=" | "<>" => Self::NotEqual,
            "<" => Self::Less,
            "<=" => Self::LessOrEqual,
            ">" => Self::Greater,
            ">=" => Self::GreaterOrEqual,
            "&&" => Self::And,
            "||" => Self::Or,
            "^" => Self::Xor,
            word if word.eq_ignore_ascii_case("and") => Self::And,
            word if word.eq_ignore_ascii_case("or") => Self::Or,
            word if word.eq_ignore_ascii_case("xor") => Self::Xor,
            _ => return None,
        };
        Some(operator)
    }

    const fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Xor => "XOR",
        }
    }

    fn apply(self, left: &Value, right: &Value) -> bool {
        match self {
            Self::Equal => left.compare(right) == Some(Ordering::Equal),
            Self::NotEqual => left.compare(right) != Some(Ordering::Equal),
            Self::Less => left.compare(right) == Some(Ordering::Less),
            Self::LessOrEqual => matches!(
                left.compare(right),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Self::Greater => left.compare(right) == Some(Ordering::Greater),
            Self::GreaterOrEqual => matches!(
                left.compare(right),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Self::And => left.truthy() && right.truthy(),
            Self::Or => left.truthy() || right.truthy(),
            Self::Xor => left.truthy() != right.truthy(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Term {
    Operand(Value),
    Operator(Operator),
    Open,
    Close,
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Operand(value) => write!(f, "operand '{}'", value.to_text()),
            Self::Operator(operator) => write!(f, "operator '{}'", operator.symbol()),
            Self::Open => f.write_str("'('"),
            Self::Close => f.write_str("')'"),
        }
    }
}

type Terms<'t> = Peekable<slice::Iter<'t, Term>>;

/// The terms of one condition, in source order.
///
/// Evaluation is a strict left-to-right reduction: every operator applies to
/// the running result and the operand after it. Only parentheses group.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Expression {
    terms: Vec<Term>,
    line: usize,
    context: String,
    max_depth: usize,
}

impl Expression {
    pub(crate) fn evaluate(&self) -> ParseResult<bool> {
        let mut terms = self.terms.iter().peekable();
        let value = self.reduce(&mut terms, 0)?;
        match terms.next() {
            None => Ok(value.truthy()),
            Some(Term::Close) => Err(self.invalid("unbalanced closing parenthesis")),
            Some(term) => Err(self.invalid(format!("unexpected {term}"))),
        }
    }

    fn reduce(&self, terms: &mut Terms<'_>, depth: usize) -> ParseResult<Value> {
        let mut result = self.operand(terms, depth)?;
        while let Some(Term::Operator(operator)) = terms.peek() {
            let operator = *operator;
            terms.next();
            let right = self.operand(terms, depth)?;
            result = Value::Bool(operator.apply(&result, &right));
        }
        Ok(result)
    }

    fn operand(&self, terms: &mut Terms<'_>, depth: usize) -> ParseResult<Value> {
        match terms.next() {
            Some(Term::Operand(value)) => Ok(value.clone()),
            Some(Term::Open) => {
                let depth = depth.saturating_add(1);
                if depth > self.max_depth {
                    return Err(ParseError::new(
                        self.line,
                        self.context.as_str(),
                        ParseErrorKind::NestingTooDeep {
                            limit: self.max_depth,
                        },
                    ));
                }
                let inner = self.reduce(terms, depth)?;
                match terms.next() {
                    Some(Term::Close) => Ok(Value::Bool(inner.truthy())),
                    Some(term) => Err(self.invalid(format!("expected ')' but found {term}"))),
                    None => Err(self.invalid("missing closing parenthesis")),
                }
            }
            Some(term @ (Term::Operator(_) | Term::Close)) => {
                Err(self.invalid(format!("expected an operand but found {term}")))
            }
            None => Err(self.invalid("expected an operand at the end of the expression")),
        }
    }

    fn invalid<R: Into<String>>(&self, reason: R) -> ParseError {
        ParseError::invalid_expression(self.line, self.context.as_str(), reason)
    }
}

/// Accumulates the terms of one condition as the parser scans it, resolving
/// variables and embedded tags as they arrive.
pub(crate) struct ExpressionBuilder<'c> {
    resolver: Resolver<'c>,
    terms: Vec<Term>,
    line: usize,
    context: String,
    max_depth: usize,
}

impl<'c> ExpressionBuilder<'c> {
    /// `opening` positions any evaluation error at the tag being built.
    pub(crate) fn new(resolver: Resolver<'c>, opening: &Token, max_depth: usize) -> Self {
        Self {
            resolver,
            terms: Vec::new(),
            line: opening.line(),
            context: opening.context().to_owned(),
            max_depth,
        }
    }

    pub(crate) fn push(&mut self, token: &Token) -> ParseResult<()> {
        let term = match token.kind() {
            TokenKind::Variable => Term::Operand(self.resolver.variable(token.value())),
            TokenKind::Tag => Term::Operand(self.resolver.embedded_tag(token.value())),
            TokenKind::String => Term::Operand(Value::String(token.value().to_owned())),
            TokenKind::Bool => Term::Operand(Value::Bool(token.value().eq_ignore_ascii_case("true"))),
            TokenKind::Number => match token.value().parse::<f64>() {
                Ok(number) => Term::Operand(Value::Number(number)),
                Err(_) => {
                    return Err(self.invalid(token, "malformed number"));
                }
            },
            TokenKind::Operator => match Operator::from_literal(token.value()) {
                Some(operator) => Term::Operator(operator),
                None => return Err(self.invalid(token, "unknown operator")),
            },
            TokenKind::LeftParen => Term::Open,
            TokenKind::RightParen => Term::Close,
            TokenKind::LeftDelimiter
            | TokenKind::RightDelimiter
            | TokenKind::If
            | TokenKind::ElseIf
            | TokenKind::Else
            | TokenKind::EndIf
            | TokenKind::Text
            | TokenKind::Whitespace
            | TokenKind::Comment
            | TokenKind::Eos
            | TokenKind::Misc => {
                return Err(self.invalid(token, "token cannot be part of a condition"));
            }
        };
        self.terms.push(term);
        Ok(())
    }

    pub(crate) fn finish(self) -> Expression {
        Expression {
            terms: self.terms,
            line: self.line,
            context: self.context,
            max_depth: self.max_depth,
        }
    }

    fn invalid(&self, token: &Token, reason: &str) -> ParseError {
        ParseError::invalid_expression(
            token.line(),
            self.context.as_str(),
            format!("{reason}: {}", report::describe_found(token)),
        )
    }
}

#[cfg(test)]
impl Expression {
    pub(crate) fn from_terms(terms: Vec<Term>) -> Self {
        Self {
            terms,
            line: 1,
            context: crate::token::DEFAULT_CONTEXT.to_owned(),
            max_depth: crate::options::DEFAULT_MAX_DEPTH,
        }
    }
}
