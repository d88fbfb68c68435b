use crate::error::ConfigError;
use crate::schema::SchemaError;
use std::borrow::Cow;

/// Why a variable has no usable value.
///
/// Resolution outcomes are cached and handed out repeatedly, so the error is `Clone`.
/// Literals are stored already rendered for display, with sensitive values redacted.
#[envspec_derive::envspec_error]
#[derive(Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A required variable is not set and has no default.
    #[error("{name} is required but not set, and has no default")]
    Undefined { name: Cow<'static, str> },

    /// The literal does not satisfy the schema.
    #[error("value of {name} ({literal}) is invalid: {source}{}", format_context(.context))]
    Schema {
        name: Cow<'static, str>,
        literal: Cow<'static, str>,
        source: SchemaError,
        context: Option<Cow<'static, str>>,
    },

    /// The value was parsed but a constraint rejected it.
    #[error("value of {name} ({literal}) is invalid: {message}")]
    Constraint {
        name: Cow<'static, str>,
        literal: Cow<'static, str>,
        description: Cow<'static, str>,
        message: Cow<'static, str>,
    },

    /// Some, but not all, variables of a composite value are set.
    #[error("incomplete configuration: {} set, but {} not", join(.provided), join(.missing))]
    Incomplete { provided: Vec<Cow<'static, str>>, missing: Vec<Cow<'static, str>> },

    /// A required value was read while a dependency makes it irrelevant.
    #[error("{name} is not relevant because of {dependency}")]
    Irrelevant { name: Cow<'static, str>, dependency: Cow<'static, str> },

    /// A declaration problem surfaced during resolution.
    #[error("configuration error{}: {source}", format_context(.context))]
    Configuration { source: ConfigError, context: Option<Cow<'static, str>> },
}

impl ValueError {
    /// Name of the variable the error is about, when there is exactly one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Undefined { name }
            | Self::Schema { name, .. }
            | Self::Constraint { name, .. }
            | Self::Irrelevant { name, .. } => Some(name.as_ref()),
            Self::Incomplete { .. } | Self::Configuration { .. } => None,
        }
    }
}

/// Renders `A`, `A and B`, `A, B and C`.
fn join(names: &[Cow<'static, str>]) -> String {
    match names {
        [] => String::new(),
        [only] => only.to_string(),
        [rest @ .., last] => format!("{} and {last}", rest.join(", ")),
    }
}
