use std::borrow::Cow;

/// Which side of a numeric range was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum RangeBound {
    /// The value is less than the minimum.
    Below,
    /// The value is greater than the maximum.
    Above,
}

/// Which side of a length limit was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum LengthBound {
    /// The value is shorter than the minimum length.
    Under,
    /// The value is longer than the maximum length.
    Over,
}

/// A value that does not satisfy its schema.
#[envspec_derive::envspec_error]
#[derive(Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A numeric value outside of its inclusive range.
    #[error("must be {limit} or {}", range_requirement(.bound))]
    Range { bound: RangeBound, limit: Cow<'static, str> },

    /// A string or binary value whose byte length is out of bounds.
    #[error("must have a length of {} {limit} bytes, got {actual}", length_requirement(.bound))]
    Length { bound: LengthBound, limit: usize, actual: usize },

    /// A literal that is not one of the members of a set.
    #[error("{}", membership_requirement(.accepted))]
    Membership { literal: Cow<'static, str>, accepted: Vec<Cow<'static, str>> },

    /// The literal could not be parsed into the native type.
    #[error("{message}")]
    Unmarshal { message: Cow<'static, str> },

    /// The native value could not be rendered as a literal.
    #[error("cannot be represented as a literal: {message}")]
    Marshal { message: Cow<'static, str> },
}

impl SchemaError {
    pub(crate) fn unmarshal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Unmarshal { message: message.into() }
    }

    pub(crate) fn marshal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Marshal { message: message.into() }
    }
}

const fn range_requirement(bound: &RangeBound) -> &'static str {
    match bound {
        RangeBound::Below => "greater",
        RangeBound::Above => "less",
    }
}

const fn length_requirement(bound: &LengthBound) -> &'static str {
    match bound {
        LengthBound::Under => "at least",
        LengthBound::Over => "at most",
    }
}

/// Renders `"a"`, `"a" or "b"`, `one of "a", "b" or "c"`.
fn membership_requirement(accepted: &[Cow<'static, str>]) -> String {
    let quoted: Vec<String> = accepted.iter().map(|literal| format!("{literal:?}")).collect();
    match quoted.as_slice() {
        [] => "must not be set".to_owned(),
        [only] => format!("must be {only}"),
        [rest @ .., last] => format!("must be one of {} or {last}", rest.join(", ")),
    }
}
