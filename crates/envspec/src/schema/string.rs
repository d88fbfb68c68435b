use crate::error::ConfigError;
use crate::literal::Literal;
use crate::schema::Value;
use crate::schema::error::{LengthBound, SchemaError};
use crate::schema::marshal::Marshaler;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

struct StringMarshaler<T>(PhantomData<fn() -> T>);

impl<T: From<String> + AsRef<str>> Marshaler<T> for StringMarshaler<T> {
    fn marshal(&self, value: &T) -> Result<Literal, SchemaError> {
        Ok(Literal::new(value.as_ref()))
    }

    fn unmarshal(&self, literal: &Literal) -> Result<T, SchemaError> {
        Ok(T::from(literal.verbatim().to_owned()))
    }
}

/// Schema for string-like values.
///
/// Length limits are measured in bytes of the literal, not in characters.
pub struct StringSchema<T> {
    min_len: Option<usize>,
    max_len: Option<usize>,
    marshaler: Arc<dyn Marshaler<T>>,
}

impl<T: Value + From<String> + AsRef<str>> StringSchema<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { min_len: None, max_len: None, marshaler: Arc::new(StringMarshaler(PhantomData)) }
    }
}

impl<T: Value + From<String> + AsRef<str>> Default for StringSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Value> StringSchema<T> {
    /// A string schema over a type with a custom textual form.
    pub fn with_marshaler(marshaler: impl Marshaler<T> + 'static) -> Self {
        Self { min_len: None, max_len: None, marshaler: Arc::new(marshaler) }
    }

    #[must_use]
    pub const fn min_len(mut self, min: usize) -> Self {
        self.min_len = Some(min);
        self
    }

    #[must_use]
    pub const fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    #[must_use]
    pub const fn limits(&self) -> (Option<usize>, Option<usize>) {
        (self.min_len, self.max_len)
    }

    pub(crate) fn finalize(&self) -> Result<(), ConfigError> {
        finalize_lengths(self.min_len, self.max_len)
    }

    pub(crate) fn validate(&self, value: &T) -> Result<(), SchemaError> {
        let literal = self.marshaler.marshal(value)?;
        check_length(literal.canonical().len(), self.min_len, self.max_len)
    }

    pub(crate) fn marshal(&self, value: &T) -> Result<Literal, SchemaError> {
        self.marshaler.marshal(value)
    }

    pub(crate) fn unmarshal(&self, literal: &Literal) -> Result<T, SchemaError> {
        let value = self.marshaler.unmarshal(literal)?;
        self.validate(&value)?;
        Ok(value)
    }

    /// A placeholder string of the smallest permitted length.
    pub(crate) fn examples(&self, _conservative: bool) -> Vec<T> {
        let len = self.min_len.unwrap_or(1).max(1);
        if self.max_len.is_some_and(|max| max < len) {
            return Vec::new();
        }
        self.unmarshal(&Literal::new("x".repeat(len))).into_iter().collect()
    }

    pub(crate) fn summary(&self) -> String {
        length_summary("string", self.min_len, self.max_len)
    }
}

impl<T> Clone for StringSchema<T> {
    fn clone(&self) -> Self {
        Self {
            min_len: self.min_len,
            max_len: self.max_len,
            marshaler: Arc::clone(&self.marshaler),
        }
    }
}

impl<T> fmt::Debug for StringSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringSchema")
            .field("min_len", &self.min_len)
            .field("max_len", &self.max_len)
            .finish_non_exhaustive()
    }
}

pub(crate) fn finalize_lengths(min: Option<usize>, max: Option<usize>) -> Result<(), ConfigError> {
    if min == Some(0) {
        return Err(ConfigError::InvalidSchema {
            message: "minimum length must be at least 1".into(),
            context: None,
        });
    }
    if max == Some(0) {
        return Err(ConfigError::InvalidSchema {
            message: "maximum length must be at least 1".into(),
            context: None,
        });
    }
    if let (Some(min), Some(max)) = (min, max)
        && min > max
    {
        return Err(ConfigError::InvalidSchema {
            message: format!("minimum length {min} is greater than maximum length {max}").into(),
            context: None,
        });
    }
    Ok(())
}

pub(crate) fn check_length(
    actual: usize,
    min: Option<usize>,
    max: Option<usize>,
) -> Result<(), SchemaError> {
    if let Some(limit) = min
        && actual < limit
    {
        return Err(SchemaError::Length { bound: LengthBound::Under, limit, actual });
    }
    if let Some(limit) = max
        && actual > limit
    {
        return Err(SchemaError::Length { bound: LengthBound::Over, limit, actual });
    }
    Ok(())
}

pub(crate) fn length_summary(what: &str, min: Option<usize>, max: Option<usize>) -> String {
    match (min, max) {
        (Some(min), Some(max)) if min == max => format!("{what} of {min} bytes"),
        (Some(min), Some(max)) => format!("{what} of {min} .. {max} bytes"),
        (Some(min), None) => format!("{what} of at least {min} bytes"),
        (None, Some(max)) => format!("{what} of at most {max} bytes"),
        (None, None) => format!("<{what}>"),
    }
}
