use std::iter::Peekable;

/// Context name given to tokens when the source does not supply one.
pub(crate) const DEFAULT_CONTEXT: &str = "template";

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    /// The `{` opening a conditional tag.
    LeftDelimiter,
    /// The `}` closing a conditional tag.
    RightDelimiter,
    If,
    ElseIf,
    Else,
    EndIf,
    /// A bare name to be looked up in the variable table.
    Variable,
    /// An embedded `{...}` tag inside a condition, kept opaque.
    Tag,
    Number,
    /// A quoted string, with its quotes removed and escapes processed.
    String,
    Bool,
    Operator,
    LeftParen,
    RightParen,
    /// Plain template text outside of any conditional tag.
    Text,
    Whitespace,
    Comment,
    /// End of stream.
    Eos,
    Misc,
}

impl TokenKind {
    /// Human readable name used in error messages.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::LeftDelimiter => "left delimiter",
            Self::RightDelimiter => "right delimiter",
            Self::If => "if tag",
            Self::ElseIf => "elseif tag",
            Self::Else => "else tag",
            Self::EndIf => "closing tag",
            Self::Variable => "variable",
            Self::Tag => "tag",
            Self::Number => "number",
            Self::String => "string",
            Self::Bool => "boolean",
            Self::Operator => "operator",
            Self::LeftParen => "opening parenthesis",
            Self::RightParen => "closing parenthesis",
            Self::Text => "template string",
            Self::Whitespace => "whitespace",
            Self::Comment => "comment",
            Self::Eos => "end of stream",
            Self::Misc => "misc",
        }
    }

    /// Keywords that may directly follow a [`TokenKind::LeftDelimiter`].
    pub const fn is_keyword(self) -> bool {
        matches!(self, Self::If | Self::ElseIf | Self::Else | Self::EndIf)
    }

    /// Kinds accepted as an operand in a condition.
    pub const fn is_primary(self) -> bool {
        matches!(
            self,
            Self::Number | Self::String | Self::Bool | Self::Variable | Self::Tag
        )
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// A single lexical token, positioned by line and by the name of the template
/// (or other context) it was read from.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    kind: TokenKind,
    value: String,
    line: usize,
    context: String,
}

impl Token {
    pub fn new<V: Into<String>, C: Into<String>>(
        kind: TokenKind,
        value: V,
        line: usize,
        context: C,
    ) -> Self {
        Self {
            kind,
            value: value.into(),
            line,
            context: context.into(),
        }
    }

    pub const fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// 1-indexed line the token starts on.
    pub const fn line(&self) -> usize {
        self.line
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Cursor over a token source with a single token of lookahead.
///
/// Once the source is exhausted the cursor keeps yielding an end-of-stream
/// token positioned after the last token seen, so sources that never emit
/// [`TokenKind::Eos`] themselves are still terminated.
pub(crate) struct TokenStream<I: Iterator<Item = Token>> {
    tokens: Peekable<I>,
    current: Token,
}

impl<I: Iterator<Item = Token>> TokenStream<I> {
    pub(crate) fn new<T: IntoIterator<IntoIter = I>>(tokens: T) -> Self {
        let mut tokens = tokens.into_iter().peekable();
        let current = tokens
            .next()
            .unwrap_or_else(|| Token::new(TokenKind::Eos, "", 1, DEFAULT_CONTEXT));
        Self { tokens, current }
    }

    pub(crate) const fn current(&self) -> &Token {
        &self.current
    }

    pub(crate) fn peek(&mut self) -> Option<&Token> {
        if self.current.is(TokenKind::Eos) {
            return None;
        }
        self.tokens.peek()
    }

    pub(crate) fn peek_kind(&mut self) -> Option<TokenKind> {
        self.peek().map(Token::kind)
    }

    /// Moves to the next token and returns the one left behind.
    pub(crate) fn bump(&mut self) -> Token {
        if self.current.is(TokenKind::Eos) {
            return self.current.clone();
        }
        let next = self.tokens.next().unwrap_or_else(|| {
            Token::new(
                TokenKind::Eos,
                "",
                self.current.line,
                self.current.context.clone(),
            )
        });
        std::mem::replace(&mut self.current, next)
    }
}
