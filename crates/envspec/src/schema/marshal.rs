use crate::literal::Literal;
use crate::schema::error::SchemaError;
use std::fmt;
use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

/// Converts native values to and from their literal form.
///
/// Implementations must obey the round-trip law: for every value `v` that
/// the schema accepts, `unmarshal(marshal(v)) == v`.
pub trait Marshaler<T>: Send + Sync {
    /// Renders `value` as a literal. The returned literal is canonical.
    ///
    /// # Errors
    /// Returns [`SchemaError::Marshal`] if the value has no textual form.
    fn marshal(&self, value: &T) -> Result<Literal, SchemaError>;

    /// Parses the verbatim form of `literal`.
    ///
    /// # Errors
    /// Returns [`SchemaError::Unmarshal`] if the literal cannot be parsed.
    fn unmarshal(&self, literal: &Literal) -> Result<T, SchemaError>;
}

/// Marshaler for any type that implements [`FromStr`] and [`Display`].
pub struct FromStrMarshaler<T>(PhantomData<fn() -> T>);

impl<T> FromStrMarshaler<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for FromStrMarshaler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for FromStrMarshaler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FromStrMarshaler").field(&std::any::type_name::<T>()).finish()
    }
}

impl<T> Marshaler<T> for FromStrMarshaler<T>
where
    T: FromStr + Display,
    T::Err: Display,
{
    fn marshal(&self, value: &T) -> Result<Literal, SchemaError> {
        Ok(Literal::new(value.to_string()))
    }

    fn unmarshal(&self, literal: &Literal) -> Result<T, SchemaError> {
        literal.verbatim().parse::<T>().map_err(|e| SchemaError::unmarshal(e.to_string()))
    }
}

type MarshalFn<T> = Box<dyn Fn(&T) -> Result<String, String> + Send + Sync>;
type UnmarshalFn<T> = Box<dyn Fn(&str) -> Result<T, String> + Send + Sync>;

/// Marshaler built from a pair of closures.
pub struct FnMarshaler<T> {
    marshal: MarshalFn<T>,
    unmarshal: UnmarshalFn<T>,
}

impl<T> FnMarshaler<T> {
    pub fn new(
        marshal: impl Fn(&T) -> Result<String, String> + Send + Sync + 'static,
        unmarshal: impl Fn(&str) -> Result<T, String> + Send + Sync + 'static,
    ) -> Self {
        Self { marshal: Box::new(marshal), unmarshal: Box::new(unmarshal) }
    }
}

impl<T> fmt::Debug for FnMarshaler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMarshaler").finish_non_exhaustive()
    }
}

impl<T> Marshaler<T> for FnMarshaler<T> {
    fn marshal(&self, value: &T) -> Result<Literal, SchemaError> {
        (self.marshal)(value).map(Literal::new).map_err(SchemaError::marshal)
    }

    fn unmarshal(&self, literal: &Literal) -> Result<T, SchemaError> {
        (self.unmarshal)(literal.verbatim()).map_err(SchemaError::unmarshal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    #[test]
    fn from_str_roundtrip() {
        let marshaler = FromStrMarshaler::<IpAddr>::new();
        let value = marshaler.unmarshal(&Literal::new("::1")).unwrap();
        assert_eq!(marshaler.marshal(&value).unwrap().canonical(), "::1");
    }

    #[test]
    fn from_str_reports_parse_errors() {
        let marshaler = FromStrMarshaler::<u8>::new();
        let err = marshaler.unmarshal(&Literal::new("300")).unwrap_err();
        assert!(matches!(err, SchemaError::Unmarshal { .. }));
    }

    #[test]
    fn fn_marshaler() {
        let marshaler = FnMarshaler::new(
            |v: &bool| Ok(if *v { "yes" } else { "no" }.to_owned()),
            |s| match s {
                "yes" => Ok(true),
                "no" => Ok(false),
                other => Err(format!("unexpected {other}")),
            },
        );

        assert_eq!(marshaler.marshal(&true).unwrap().canonical(), "yes");
        assert!(!marshaler.unmarshal(&Literal::new("no")).unwrap());
        assert_eq!(
            marshaler.unmarshal(&Literal::new("maybe")).unwrap_err().to_string(),
            "unexpected maybe"
        );
    }
}
