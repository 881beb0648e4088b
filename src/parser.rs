use crate::{
    ParseResult, ParserOptions,
    buffer::BufferStack,
    conditional::Conditional,
    error::{ParseError, ParseErrorKind},
    expression::{Expression, ExpressionBuilder},
    interface::Context,
    report::{self, CLOSING_TAG},
    resolver::Resolver,
    token::{Token, TokenKind, TokenStream},
};

/// Resolves the `{if}` blocks of a token stream, keeping the text of the
/// selected branches and dropping everything else.
///
/// ```
/// use condlate::{Context, Parser, VariableTy, tokenize};
///
/// let context = Context::new()
///     .insert("logged_in", VariableTy::Boolean.with_data("yes"))
///     .to_owned();
///
/// let mut parser = Parser::new();
/// parser.set_variables(&context);
///
/// let tokens = tokenize("Hi {if logged_in}friend{if:else}stranger{/if}!", "greeting");
/// assert_eq!(parser.parse(tokens).unwrap(), "Hi friend!");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Parser<'c> {
    variables: Option<&'c Context<'c>>,
    options: ParserOptions,
}

impl<'c> Parser<'c> {
    pub const fn new() -> Self {
        Self::with_options(ParserOptions::new())
    }

    pub const fn with_options(options: ParserOptions) -> Self {
        Self {
            variables: None,
            options,
        }
    }

    /// Installs the variable table. Without one every lookup misses.
    pub fn set_variables(&mut self, variables: &'c Context<'c>) -> &mut Self {
        self.variables = Some(variables);
        self
    }

    /// Absent variables and embedded tags resolve to `false` from now on.
    pub fn enable_safety(&mut self) -> &mut Self {
        self.options.safety = true;
        self
    }

    pub const fn options(&self) -> ParserOptions {
        self.options
    }

    /// Drives the token stream to its end and returns the trimmed output.
    ///
    /// A source that stops without a [`TokenKind::Eos`] token is treated as if
    /// it ended with one.
    ///
    /// # Errors
    /// - [`ParseErrorKind::UnexpectedToken`] when the stream does not follow
    ///   the conditional grammar.
    /// - [`ParseErrorKind::MissingClosingTag`] when an `{if}` is never closed.
    /// - [`ParseErrorKind::InvalidExpression`] for a malformed condition.
    /// - [`ParseErrorKind::NestingTooDeep`] past [`ParserOptions::max_depth`].
    pub fn parse<T: IntoIterator<Item = Token>>(&self, tokens: T) -> ParseResult<String> {
        let session = Session {
            tokens: TokenStream::new(tokens),
            buffers: BufferStack::new(),
            resolver: Resolver::new(self.variables, self.options.safety),
            max_depth: self.options.max_depth,
            depth: 0,
        };
        tracing::debug!(
            context = session.tokens.current().context(),
            safety = self.options.safety,
            "parsing conditionals"
        );
        let output = session.run()?;
        tracing::debug!(len = output.len(), "parsed conditionals");
        Ok(output)
    }
}

impl Default for Parser<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// State of a single parse.
struct Session<'c, I: Iterator<Item = Token>> {
    tokens: TokenStream<I>,
    buffers: BufferStack,
    resolver: Resolver<'c>,
    max_depth: usize,
    /// Conditionals currently open.
    depth: usize,
}

impl<I: Iterator<Item = Token>> Session<'_, I> {
    fn run(mut self) -> ParseResult<String> {
        self.absorb();
        self.template()?;

        if !self.tokens.current().is(TokenKind::Eos) {
            let expected = format!("end of {}", self.tokens.current().context());
            return Err(report::unexpected(&self.found(), &expected, None));
        }
        Ok(self.buffers.finish())
    }

    /// Consumes whitespace and comments, writing them to the top buffer.
    fn absorb(&mut self) {
        loop {
            let current = self.tokens.current();
            if current.is(TokenKind::Whitespace) {
                self.buffers.push_whitespace();
            } else if current.is(TokenKind::Comment) {
                self.buffers.push_str(current.value());
            } else {
                return;
            }
            self.tokens.bump();
        }
    }

    fn advance(&mut self) {
        self.tokens.bump();
        self.absorb();
    }

    /// Whether the cursor sits on a delimiter opening a `kind` tag.
    fn at_tag(&mut self, kind: TokenKind) -> bool {
        self.tokens.current().is(TokenKind::LeftDelimiter) && self.tokens.peek_kind() == Some(kind)
    }

    /// The token to name in an error: the keyword of a tag rather than its
    /// delimiter.
    fn found(&mut self) -> Token {
        if self.tokens.current().is(TokenKind::LeftDelimiter) {
            if let Some(keyword) = self.tokens.peek().filter(|next| next.kind().is_keyword()) {
                return keyword.clone();
            }
        }
        self.tokens.current().clone()
    }

    /// End of stream inside a tag leaves the conditional unclosed; anything
    /// else is out of place.
    fn unexpected_in_tag(&mut self, expected: &str, opening: &Token) -> ParseError {
        let found = self.found();
        if found.is(TokenKind::Eos) {
            report::missing_closing_tag(&found, opening)
        } else {
            report::unexpected(&found, expected, None)
        }
    }

    /// template = (TEXT | conditional)*
    fn template(&mut self) -> ParseResult<()> {
        loop {
            if self.tokens.current().is(TokenKind::Text) {
                self.buffers.push_str(self.tokens.current().value());
                self.advance();
            } else if self.at_tag(TokenKind::If) {
                self.conditional()?;
            } else {
                return Ok(());
            }
        }
    }

    fn conditional(&mut self) -> ParseResult<()> {
        let opening = self.tokens.current().clone();
        if self.depth >= self.max_depth {
            return Err(ParseError::new(
                opening.line(),
                opening.context(),
                ParseErrorKind::NestingTooDeep {
                    limit: self.max_depth,
                },
            ));
        }

        self.depth = self.depth.saturating_add(1);
        let result = self.branches(&opening);
        self.depth = self.depth.saturating_sub(1);
        result
    }

    fn branches(&mut self, opening: &Token) -> ParseResult<()> {
        let mut statement = Conditional::new();

        let condition = self.condition(opening)?;
        let taken = statement.add_if(&condition)?;
        self.branch(taken, opening)?;

        loop {
            if self.at_tag(TokenKind::ElseIf) {
                let condition = self.condition(opening)?;
                let taken = statement.add_else_if(&condition)?;
                self.branch(taken, opening)?;
            } else if self.at_tag(TokenKind::Else) {
                self.else_tag(opening)?;
                let taken = statement.add_else();
                self.branch(taken, opening)?;
                break;
            } else {
                break;
            }
        }

        self.close(opening)?;
        let selected = statement.close_if();
        tracing::debug!(
            line = opening.line(),
            context = opening.context(),
            ?selected,
            "resolved conditional"
        );
        Ok(())
    }

    /// Scans an `if` or `elseif` tag up to its `}` and builds its condition.
    /// The tag text goes to a scratch buffer that is thrown away.
    fn condition(&mut self, opening: &Token) -> ParseResult<Expression> {
        self.buffers.open();
        let condition = self.scan_condition(opening);
        let _tag = self.buffers.close();
        condition
    }

    /// expr = term (OPERATOR term)*
    /// term = LPAREN* primary RPAREN*
    fn scan_condition(&mut self, opening: &Token) -> ParseResult<Expression> {
        let tag = self.tokens.current().clone();
        let mut builder = ExpressionBuilder::new(self.resolver, &tag, self.max_depth);
        self.advance();
        self.advance();

        loop {
            while self.tokens.current().is(TokenKind::LeftParen) {
                builder.push(self.tokens.current())?;
                self.advance();
            }

            if !self.tokens.current().kind().is_primary() {
                return Err(
                    self.unexpected_in_tag("a variable, string, number, boolean or tag", opening)
                );
            }
            builder.push(self.tokens.current())?;
            self.advance();

            while self.tokens.current().is(TokenKind::RightParen) {
                builder.push(self.tokens.current())?;
                self.advance();
            }

            if self.tokens.current().is(TokenKind::RightDelimiter) {
                return Ok(builder.finish());
            }
            if !self.tokens.current().is(TokenKind::Operator) {
                return Err(self.unexpected_in_tag("an operator or }", opening));
            }
            builder.push(self.tokens.current())?;
            self.advance();
        }
    }

    /// Scans an `{if:else}` tag up to its `}`.
    fn else_tag(&mut self, opening: &Token) -> ParseResult<()> {
        self.buffers.open();
        self.advance();
        self.advance();
        let end = self.expect_tag_end(opening);
        let _tag = self.buffers.close();
        end
    }

    fn expect_tag_end(&mut self, opening: &Token) -> ParseResult<()> {
        if self.tokens.current().is(TokenKind::RightDelimiter) {
            Ok(())
        } else {
            Err(self.unexpected_in_tag("}", opening))
        }
    }

    /// Called with the cursor on the `}` ending a branch tag. A taken branch is
    /// rendered into its own buffer; any other is skipped.
    fn branch(&mut self, taken: bool, opening: &Token) -> ParseResult<()> {
        if taken {
            self.buffers.open();
            self.advance();
            self.template()?;
            let body = self.buffers.close();
            self.buffers.push_str(&body);
            Ok(())
        } else {
            self.tokens.bump();
            self.skip(opening)
        }
    }

    /// Steps over an untaken branch up to the `elseif`, `else` or `/if` tag
    /// that belongs to `opening`, leaving that tag for the caller.
    fn skip(&mut self, opening: &Token) -> ParseResult<()> {
        tracing::trace!(
            line = opening.line(),
            context = opening.context(),
            "skipping branch"
        );
        let mut nested: Vec<Token> = Vec::new();

        loop {
            if self.tokens.current().is(TokenKind::Eos) {
                let unclosed = nested.last().unwrap_or(opening);
                return Err(report::missing_closing_tag(self.tokens.current(), unclosed));
            }

            if self.at_tag(TokenKind::If) {
                nested.push(self.tokens.current().clone());
            } else if self.at_tag(TokenKind::EndIf) {
                // A nested `{/if}` is stepped over like any other token.
                if nested.pop().is_none() {
                    return Ok(());
                }
            } else if nested.is_empty()
                && (self.at_tag(TokenKind::ElseIf) || self.at_tag(TokenKind::Else))
            {
                return Ok(());
            }
            self.tokens.bump();
        }
    }

    /// Consumes the `{/if}` closing `opening`.
    fn close(&mut self, opening: &Token) -> ParseResult<()> {
        if !self.at_tag(TokenKind::EndIf) {
            let found = self.found();
            return Err(if found.is(TokenKind::Eos) {
                report::missing_closing_tag(&found, opening)
            } else {
                report::unexpected(&found, CLOSING_TAG, Some(opening))
            });
        }

        self.buffers.open();
        self.advance();
        self.advance();
        let end = self.expect_tag_end(opening);
        let _tag = self.buffers.close();
        end?;

        self.advance();
        Ok(())
    }
}
