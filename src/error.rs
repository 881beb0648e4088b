pub type CondlateResult<T> = std::result::Result<T, CondlateError>;
pub type ParseResult<T> = std::result::Result<T, ParseError>;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ParseErrorKind {
    /// The grammar expected one thing and the token stream produced another.
    #[error("Unexpected {found}; expected {expected}.")]
    UnexpectedToken { found: String, expected: String },
    /// An `{if}` (or a nested `{if}` inside a skipped branch) ran into the
    /// end of the stream before its `{/if}`.
    #[error("Unexpected {found}; expected {expected}.")]
    MissingClosingTag {
        found: String,
        expected: String,
        /// Line of the `{if}` that was never closed.
        opened_on: usize,
    },
    #[error("Invalid conditional expression: {reason}.")]
    InvalidExpression { reason: String },
    #[error("Conditionals may not be nested more than {limit} levels deep.")]
    NestingTooDeep { limit: usize },
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParseError {
    pub line: usize,
    pub context: String,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new<C: Into<String>>(line: usize, context: C, kind: ParseErrorKind) -> Self {
        Self {
            line,
            context: context.into(),
            kind,
        }
    }

    pub(crate) fn invalid_expression<C: Into<String>, R: Into<String>>(
        line: usize,
        context: C,
        reason: R,
    ) -> Self {
        Self::new(
            line,
            context,
            ParseErrorKind::InvalidExpression {
                reason: reason.into(),
            },
        )
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            // These carry their own location in the message.
            ParseErrorKind::UnexpectedToken { .. } | ParseErrorKind::MissingClosingTag { .. } => {
                write!(f, "{}", self.kind)
            }
            ParseErrorKind::InvalidExpression { .. } | ParseErrorKind::NestingTooDeep { .. } => {
                write!(f, "{} (in {} on line {})", self.kind, self.context, self.line)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum CondlateError {
    #[error("Template already exists: {template_name}")]
    TemplateExists { template_name: String },
    #[error("Template not found: {template_name}")]
    MissingTemplate { template_name: String },
    #[error(transparent)]
    Parse(#[from] ParseError),
}
