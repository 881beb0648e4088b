use std::{borrow::Cow, collections::BTreeMap};

use crate::ParserOptions;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VariableTy {
    String,
    /// A number stored in its textual form, e.g. `"42"` or `"2.5"`.
    Number,
    /// `"true"`, `"1"` and `"yes"` are true, anything else is false.
    Boolean,
    /// An array-like aggregate. Never usable as a scalar operand.
    Iterable,
    /// An opaque object. With data it converts to that string; without data it
    /// has no string conversion and is never usable as an operand.
    Object,
}

impl VariableTy {
    pub fn with_data<'a, T: Into<Cow<'a, str>>>(self, data: T) -> Variable<'a> {
        Variable {
            ty: self,
            data: Some(data.into()),
        }
    }

    pub const fn without_data(self) -> Variable<'static> {
        Variable {
            ty: self,
            data: None,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable<'a> {
    ty: VariableTy,
    data: Option<Cow<'a, str>>,
}

impl Variable<'_> {
    pub const fn ty(&self) -> VariableTy {
        self.ty
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_ref().map(|s| s.as_ref())
    }
}

impl From<bool> for Variable<'static> {
    fn from(value: bool) -> Self {
        VariableTy::Boolean.with_data(if value { "true" } else { "false" })
    }
}

impl From<i64> for Variable<'static> {
    fn from(value: i64) -> Self {
        VariableTy::Number.with_data(value.to_string())
    }
}

impl From<f64> for Variable<'static> {
    fn from(value: f64) -> Self {
        VariableTy::Number.with_data(value.to_string())
    }
}

impl<'a> From<&'a str> for Variable<'a> {
    fn from(value: &'a str) -> Self {
        VariableTy::String.with_data(value)
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Context<'a> {
    data: BTreeMap<String, Variable<'a>>,
}

impl Context<'_> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'a> Context<'a> {
    pub fn insert<T: AsRef<str>>(&mut self, name: T, variable: Variable<'a>) -> &mut Self {
        self.data.insert(name.as_ref().to_string(), variable);
        self
    }

    pub fn get<T: AsRef<str>>(&self, name: T) -> Option<&Variable<'a>> {
        self.data.get(name.as_ref())
    }

    pub fn contains<T: AsRef<str>>(&self, name: T) -> bool {
        self.data.contains_key(name.as_ref())
    }
}

/// `CondlateInterface` is the trait for the Condlate engine: a store of named
/// templates whose `{if}` blocks are resolved against a [`Context`] at render
/// time.
pub trait CondlateInterface<'a> {
    /// `add_template` tries to make a new template available in the engine.
    ///
    /// # Errors
    /// - If the template name is a duplicate.
    fn add_template<N: AsRef<str>, C: Into<Cow<'a, str>>>(
        &mut self,
        name: N,
        content: C,
    ) -> crate::CondlateResult<()>;

    /// `render` tries to render a template with the given context.
    ///
    /// # Errors
    /// - If the template name is not found.
    /// - If the template's conditionals are malformed.
    fn render<N: AsRef<str>>(
        &self,
        template_name: N,
        context: Option<&Context<'_>>,
    ) -> crate::CondlateResult<String>;

    /// `missing_variables` lists every variable referenced by a condition in
    /// the selected template that the given context does not provide, sorted
    /// and without duplicates.
    fn missing_variables<N: AsRef<str>>(&self, template_name: N, context: &Context<'_>)
    -> Vec<String>;

    /// Options used for every render.
    fn options(&self) -> ParserOptions;
}
