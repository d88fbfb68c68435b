use crate::literal::Literal;
use crate::schema::Value;
use crate::schema::error::SchemaError;
use crate::schema::marshal::{FromStrMarshaler, Marshaler};
use crate::schema::numeric::short_type_name;
use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::Arc;

/// Schema for opaque values such as URLs or socket addresses.
///
/// There are no schema-level bounds; validation beyond parsing is left to constraints.
pub struct OtherSchema<T> {
    marshaler: Arc<dyn Marshaler<T>>,
}

impl<T: Value> OtherSchema<T> {
    pub fn new(marshaler: impl Marshaler<T> + 'static) -> Self {
        Self { marshaler: Arc::new(marshaler) }
    }

    pub(crate) fn marshal(&self, value: &T) -> Result<Literal, SchemaError> {
        self.marshaler.marshal(value)
    }

    pub(crate) fn unmarshal(&self, literal: &Literal) -> Result<T, SchemaError> {
        self.marshaler.unmarshal(literal)
    }

    pub(crate) fn summary(&self) -> String {
        format!("<{}>", short_type_name::<T>())
    }
}

impl<T> OtherSchema<T>
where
    T: Value + FromStr + Display,
    T::Err: Display,
{
    /// An opaque schema parsed with [`FromStr`] and rendered with [`Display`].
    #[must_use]
    pub fn parsed() -> Self {
        Self::new(FromStrMarshaler::new())
    }
}

impl<T> Clone for OtherSchema<T> {
    fn clone(&self) -> Self {
        Self { marshaler: Arc::clone(&self.marshaler) }
    }
}

impl<T> fmt::Debug for OtherSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtherSchema").field("type", &std::any::type_name::<T>()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    #[test]
    fn parses_through_from_str() {
        let schema = OtherSchema::<SocketAddr>::parsed();
        let addr = schema.unmarshal(&Literal::new("127.0.0.1:8080")).unwrap();
        assert_eq!(addr.port(), 8080);
        assert!(schema.unmarshal(&Literal::new("localhost")).is_err());
        assert_eq!(schema.summary(), "<SocketAddr>");
    }
}
