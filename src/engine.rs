use std::borrow::Cow;
use std::collections::HashMap;

use crate::error::{CondlateError, CondlateResult};
use crate::interface::{CondlateInterface, Context};
use crate::options::ParserOptions;
use crate::template::Template;

/// `CondlateEngine` is the primary implementation of the `CondlateInterface`
/// trait: a collection of named templates rendered with shared
/// [`ParserOptions`].
///
/// # Examples
///
/// ```
/// use condlate::{CondlateEngine, CondlateInterface, Context, VariableTy};
///
/// // Create a new engine
/// let mut engine = CondlateEngine::new();
///
/// // Add a template
/// engine
///     .add_template("greeting", "Hello{if name}, {name}{/if}!")
///     .unwrap();
///
/// // Setup context
/// let mut context = Context::new();
/// context.insert("name", VariableTy::String.with_data(""));
///
/// // Render template
/// let output = engine.render("greeting", Some(&context)).unwrap();
/// assert_eq!(output, "Hello!");
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct CondlateEngine<'a> {
    templates: HashMap<String, Template<'a>>,
    options: ParserOptions,
}

impl<'a> CondlateEngine<'a> {
    /// Creates a new engine with no templates and default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self {
            templates: HashMap::new(),
            options,
        }
    }

    /// Renders every template in safety mode from now on.
    pub fn enable_safety(&mut self) -> &mut Self {
        self.options.safety = true;
        self
    }

    pub fn template<N: AsRef<str>>(&self, name: N) -> Option<&Template<'a>> {
        self.templates.get(name.as_ref())
    }
}

impl<'a> CondlateInterface<'a> for CondlateEngine<'a> {
    /// Adds a new template to the engine with the given name and content.
    ///
    /// Conditionals are checked when the template is rendered, so malformed
    /// content is accepted here.
    ///
    /// # Examples
    ///
    /// ```
    /// use condlate::{CondlateEngine, CondlateError, CondlateInterface};
    ///
    /// let mut engine = CondlateEngine::new();
    /// engine.add_template("footer", "{if year}(c) {year}{/if}").unwrap();
    ///
    /// let err = engine.add_template("footer", "again").unwrap_err();
    /// assert!(matches!(err, CondlateError::TemplateExists { .. }));
    /// ```
    fn add_template<N: AsRef<str>, C: Into<Cow<'a, str>>>(
        &mut self,
        name: N,
        content: C,
    ) -> CondlateResult<()> {
        let name = name.as_ref();

        if self.templates.contains_key(name) {
            return Err(CondlateError::TemplateExists {
                template_name: name.to_string(),
            });
        }

        let template = Template::new(content).with_name(name);
        self.templates.insert(name.to_string(), template);
        tracing::debug!(template = name, "added template");

        Ok(())
    }

    /// Renders a template with the given name using the provided context.
    ///
    /// Without a context every variable is absent.
    fn render<N: AsRef<str>>(
        &self,
        template_name: N,
        context: Option<&Context<'_>>,
    ) -> CondlateResult<String> {
        let name = template_name.as_ref();
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| CondlateError::MissingTemplate {
                template_name: name.to_string(),
            })?;

        let default_context = Context::default();
        let context = context.unwrap_or(&default_context);

        tracing::debug!(template = name, safety = self.options.safety, "rendering template");
        template.render(context, self.options)
    }

    /// Returns an empty list if the template doesn't exist.
    ///
    /// ```
    /// use condlate::{CondlateEngine, CondlateInterface, Context};
    ///
    /// let mut engine = CondlateEngine::new();
    /// engine
    ///     .add_template("nav", "{if admin}Admin{/if}{if admin || editor}Edit{/if}")
    ///     .unwrap();
    ///
    /// let variables = engine.missing_variables("nav", &Context::new());
    /// assert_eq!(variables, vec!["admin", "editor"]);
    /// ```
    fn missing_variables<N: AsRef<str>>(
        &self,
        template_name: N,
        context: &Context<'_>,
    ) -> Vec<String> {
        self.templates
            .get(template_name.as_ref())
            .map(|template| template.collect_variables(context))
            .unwrap_or_default()
    }

    fn options(&self) -> ParserOptions {
        self.options
    }
}
