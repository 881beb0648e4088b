use std::borrow::Cow;

use crate::{
    CondlateResult, ParserOptions,
    interface::Context,
    lexer::Lexer,
    parser::Parser,
    token::{DEFAULT_CONTEXT, TokenKind},
};

/// A named piece of template source whose `{if}` blocks are resolved on every
/// render.
///
/// # Example
///
/// ```rust
/// use condlate::{Context, ParserOptions, Template, VariableTy};
///
/// let template = Template::new("{if admin}Dashboard{if:else}Home{/if}");
///
/// let mut context = Context::new();
/// context.insert("admin", VariableTy::Boolean.with_data("true"));
///
/// let result = template.render(&context, ParserOptions::new()).unwrap();
/// assert_eq!(result, "Dashboard");
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Template<'a> {
    content: Cow<'a, str>,
    name: Option<String>,
}

impl<'a> Template<'a> {
    pub fn new<T: Into<Cow<'a, str>>>(content: T) -> Self {
        Self {
            content: content.into(),
            name: None,
        }
    }

    /// The name is reported as the context of any parse error.
    #[must_use]
    pub fn with_name<N: Into<String>>(mut self, name: N) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn tokens(&self) -> Lexer<'_> {
        Lexer::with_context(&self.content, self.name().unwrap_or(DEFAULT_CONTEXT))
    }

    /// Renders the template against `context`.
    ///
    /// # Errors
    /// - `CondlateError::Parse` if a conditional is malformed or left open.
    pub fn render(&self, context: &Context<'_>, options: ParserOptions) -> CondlateResult<String> {
        let mut parser = Parser::with_options(options);
        parser.set_variables(context);
        Ok(parser.parse(self.tokens())?)
    }

    /// Names referenced by any condition that `context` does not provide,
    /// sorted and without duplicates.
    ///
    /// ```
    /// use condlate::{Context, Template};
    ///
    /// let template = Template::new("{if user && user.admin}admin{if:elseif guest}guest{/if}");
    /// let mut context = Context::new();
    /// context.insert("guest", false.into());
    ///
    /// assert_eq!(template.collect_variables(&context), vec!["user", "user.admin"]);
    /// ```
    pub fn collect_variables(&self, context: &Context<'_>) -> Vec<String> {
        let mut variables: Vec<String> = self
            .tokens()
            .filter(|token| token.is(TokenKind::Variable) && !context.contains(token.value()))
            .map(|token| token.value().to_owned())
            .collect();
        variables.sort();
        variables.dedup();
        variables
    }
}
