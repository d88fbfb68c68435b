//! # Schemas
//!
//! A [`Schema`] describes which literals are valid for one kind of value and how they map to
//! the native type. Every variant carries its own [`Marshaler`] capability; dispatch between
//! variants is a plain `match`.
//!
//! | Variant   | Bounds                         | Typical native types             |
//! |-----------|--------------------------------|----------------------------------|
//! | `Numeric` | inclusive `min` / `max`        | `u16`, `i64`, `f64`              |
//! | `String`  | byte length                    | `String`, newtypes over `String` |
//! | `Binary`  | decoded byte length + encoding | `Vec<u8>`                        |
//! | `Set`     | closed list of members         | enums                            |
//! | `Other`   | none, constraint driven        | `SocketAddr`, URLs, keys         |

pub mod binary;
pub mod error;
pub mod marshal;
pub mod numeric;
pub mod other;
pub mod set;
pub mod string;

pub use binary::{BinaryEncoding, BinarySchema};
pub use error::{LengthBound, RangeBound, SchemaError};
pub use marshal::{FnMarshaler, FromStrMarshaler, Marshaler};
pub use numeric::{Number, NumericSchema};
pub use other::OtherSchema;
pub use set::{SetMember, SetSchema};
pub use string::StringSchema;

use crate::error::ConfigError;
use crate::literal::{Literal, REDACTED};
use std::fmt::Debug;

/// Bound shared by every native type a variable can hold.
///
/// Any type that is `Clone + Debug + PartialEq + Send + Sync + 'static` automatically
/// implements this trait.
pub trait Value: Clone + Debug + PartialEq + Send + Sync + 'static {}
impl<T: Clone + Debug + PartialEq + Send + Sync + 'static> Value for T {}

/// Fieldless discriminant of a [`Schema`], for reporters that group by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum SchemaKind {
    Numeric,
    String,
    Binary,
    Set,
    Other,
}

/// Description of the valid values of one variable.
#[derive(Debug, Clone)]
pub enum Schema<T> {
    Numeric(NumericSchema<T>),
    String(StringSchema<T>),
    Binary(BinarySchema<T>),
    Set(SetSchema<T>),
    Other(OtherSchema<T>),
}

impl<T: Value> Schema<T> {
    #[must_use]
    pub const fn kind(&self) -> SchemaKind {
        match self {
            Self::Numeric(_) => SchemaKind::Numeric,
            Self::String(_) => SchemaKind::String,
            Self::Binary(_) => SchemaKind::Binary,
            Self::Set(_) => SchemaKind::Set,
            Self::Other(_) => SchemaKind::Other,
        }
    }

    /// Short name of the native type, e.g. `u16`.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        numeric::short_type_name::<T>()
    }

    /// Checks that the schema itself is consistent.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidSchema`] for inverted or empty bounds, and
    /// [`ConfigError::DuplicateLiteral`] for a set with two members sharing a literal.
    pub fn finalize(&self) -> Result<(), ConfigError> {
        match self {
            Self::Numeric(s) => s.finalize(),
            Self::String(s) => s.finalize(),
            Self::Binary(s) => s.finalize(),
            Self::Set(s) => s.finalize(),
            Self::Other(_) => Ok(()),
        }
    }

    /// Checks an already native value against the schema bounds.
    ///
    /// # Errors
    /// Returns the [`SchemaError`] describing the violated bound.
    pub fn validate(&self, value: &T) -> Result<(), SchemaError> {
        match self {
            Self::Numeric(s) => s.validate(value),
            Self::String(s) => s.validate(value),
            Self::Binary(s) => s.validate(value),
            Self::Set(s) => s.validate(value),
            Self::Other(_) => Ok(()),
        }
    }

    /// Renders `value` as a canonical literal.
    ///
    /// # Errors
    /// Returns [`SchemaError::Marshal`] when the value has no literal form.
    pub fn marshal(&self, value: &T) -> Result<Literal, SchemaError> {
        match self {
            Self::Numeric(s) => s.marshal(value),
            Self::String(s) => s.marshal(value),
            Self::Binary(s) => s.marshal(value),
            Self::Set(s) => s.marshal(value),
            Self::Other(s) => s.marshal(value),
        }
    }

    /// Parses `literal` and checks the result against the schema bounds.
    ///
    /// # Errors
    /// Returns the [`SchemaError`] for a literal that cannot be parsed or is out of bounds.
    pub fn unmarshal(&self, literal: &Literal) -> Result<T, SchemaError> {
        match self {
            Self::Numeric(s) => s.unmarshal(literal),
            Self::String(s) => s.unmarshal(literal),
            Self::Binary(s) => s.unmarshal(literal),
            Self::Set(s) => s.unmarshal(literal),
            Self::Other(s) => s.unmarshal(literal),
        }
    }

    /// Values generated from the schema bounds, for documentation.
    ///
    /// A conservative request yields at most one value.
    #[must_use]
    pub fn examples(&self, conservative: bool) -> Vec<T> {
        match self {
            Self::Numeric(s) => s.examples(conservative),
            Self::String(s) => s.examples(conservative),
            Self::Binary(s) => s.examples(conservative),
            Self::Set(s) => s.examples(conservative),
            Self::Other(_) => Vec::new(),
        }
    }

    /// Drops everything `error` quotes from the offending literal, for sensitive variables.
    ///
    /// Bounds and accepted literals are part of the schema and survive; parser messages are
    /// replaced by a fixed requirement since they may echo the input.
    pub(crate) fn redact(&self, error: SchemaError) -> SchemaError {
        match error {
            SchemaError::Membership { accepted, .. } => {
                SchemaError::Membership { literal: REDACTED.into(), accepted }
            },
            SchemaError::Unmarshal { .. } => SchemaError::unmarshal(match self {
                Self::Binary(s) => format!("must be {} encoded", s.encoding().article()),
                _ => format!("must be a valid {}", self.type_name()),
            }),
            SchemaError::Marshal { .. } => SchemaError::marshal(REDACTED),
            bounds @ (SchemaError::Range { .. } | SchemaError::Length { .. }) => bounds,
        }
    }

    /// One-line human description of the accepted values.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Numeric(s) => s.summary(),
            Self::String(s) => s.summary(),
            Self::Binary(s) => s.summary(),
            Self::Set(s) => s.summary(),
            Self::Other(s) => s.summary(),
        }
    }
}

impl<T> From<NumericSchema<T>> for Schema<T> {
    fn from(schema: NumericSchema<T>) -> Self {
        Self::Numeric(schema)
    }
}

impl<T> From<StringSchema<T>> for Schema<T> {
    fn from(schema: StringSchema<T>) -> Self {
        Self::String(schema)
    }
}

impl<T> From<BinarySchema<T>> for Schema<T> {
    fn from(schema: BinarySchema<T>) -> Self {
        Self::Binary(schema)
    }
}

impl<T> From<SetSchema<T>> for Schema<T> {
    fn from(schema: SetSchema<T>) -> Self {
        Self::Set(schema)
    }
}

impl<T> From<OtherSchema<T>> for Schema<T> {
    fn from(schema: OtherSchema<T>) -> Self {
        Self::Other(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_by_kind() {
        let schema: Schema<u16> = NumericSchema::new().max(100).into();
        assert_eq!(schema.kind(), SchemaKind::Numeric);
        assert_eq!(schema.type_name(), "u16");
        assert!(schema.unmarshal(&Literal::new("101")).is_err());
        assert_eq!(schema.kind().to_string(), "Numeric");
    }

    #[test]
    fn redaction_keeps_bounds_and_drops_input() {
        let hex: Schema<Vec<u8>> = BinarySchema::new(BinaryEncoding::Hex).into();
        let err = hex.unmarshal(&Literal::new("abcdeZ")).unwrap_err();
        assert_eq!(hex.redact(err).to_string(), "must be hex encoded");

        let set: Schema<u8> = SetSchema::new().member(1, "one", "One").into();
        let err = set.redact(set.unmarshal(&Literal::new("hunter2")).unwrap_err());
        assert!(!format!("{err:?}").contains("hunter2"));
        assert_eq!(err.to_string(), r#"must be "one""#);

        let port: Schema<u16> = NumericSchema::new().max(100).into();
        let err = port.unmarshal(&Literal::new("101")).unwrap_err();
        assert_eq!(port.redact(err.clone()), err);
    }

    #[test]
    fn other_has_no_bounds_and_no_examples() {
        let schema: Schema<std::net::IpAddr> = OtherSchema::parsed().into();
        assert!(schema.finalize().is_ok());
        assert!(schema.examples(false).is_empty());
    }
}
