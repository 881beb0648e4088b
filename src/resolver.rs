use crate::{
    expression::Value,
    interface::{Context, Variable, VariableTy},
};

/// What a bound variable can contribute to a condition, decided once at lookup.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand {
    Scalar(Value),
    /// Aggregates and objects without a string conversion.
    Unsupported,
}

impl Operand {
    pub(crate) fn classify(variable: &Variable<'_>) -> Self {
        let data = variable.data();
        match variable.ty() {
            VariableTy::String => Self::Scalar(Value::String(data.unwrap_or_default().to_owned())),
            VariableTy::Number => match data {
                Some(text) => match text.trim().parse::<f64>() {
                    Ok(number) => Self::Scalar(Value::Number(number)),
                    Err(_) => Self::Scalar(Value::String(text.to_owned())),
                },
                None => Self::Scalar(Value::Number(0.0)),
            },
            VariableTy::Boolean => Self::Scalar(Value::Bool(data.is_some_and(|text| {
                ["true", "1", "yes"]
                    .iter()
                    .any(|truthy| text.trim().eq_ignore_ascii_case(truthy))
            }))),
            VariableTy::Object => match data {
                Some(text) => Self::Scalar(Value::String(text.to_owned())),
                None => Self::Unsupported,
            },
            VariableTy::Iterable => Self::Unsupported,
        }
    }
}

/// Maps condition operands onto values, applying safety coercion.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Resolver<'c> {
    variables: Option<&'c Context<'c>>,
    safety: bool,
}

impl<'c> Resolver<'c> {
    pub(crate) const fn new(variables: Option<&'c Context<'c>>, safety: bool) -> Self {
        Self { variables, safety }
    }

    /// Absent names become `false` under safety and their own name otherwise.
    /// Unsupported values are `false` either way.
    pub(crate) fn variable(&self, name: &str) -> Value {
        match self.variables.and_then(|variables| variables.get(name)) {
            Some(variable) => match Operand::classify(variable) {
                Operand::Scalar(value) => value,
                Operand::Unsupported => {
                    tracing::trace!(name, ty = ?variable.ty(), "unsupported operand coerced to false");
                    Value::Bool(false)
                }
            },
            None if self.safety => {
                tracing::trace!(name, "absent variable coerced to false");
                Value::Bool(false)
            }
            None => Value::String(name.to_owned()),
        }
    }

    /// Embedded tags are not expanded here: they pass through as their literal
    /// text, or become `false` under safety.
    pub(crate) fn embedded_tag(&self, literal: &str) -> Value {
        if self.safety {
            tracing::trace!(tag = literal, "embedded tag coerced to false");
            Value::Bool(false)
        } else {
            Value::String(literal.to_owned())
        }
    }
}
