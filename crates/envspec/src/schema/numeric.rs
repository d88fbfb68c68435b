use crate::error::ConfigError;
use crate::literal::Literal;
use crate::schema::Value;
use crate::schema::error::{RangeBound, SchemaError};
use crate::schema::marshal::Marshaler;
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

/// Native numeric types supported by [`NumericSchema`].
pub trait Number: Value + Copy + PartialOrd + Display + Default {
    /// Parses the literal form of the number.
    ///
    /// # Errors
    /// Returns a human-readable message when `s` is not a valid number.
    fn parse_literal(s: &str) -> Result<Self, String>;
}

macro_rules! impl_number {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Number for $ty {
                fn parse_literal(s: &str) -> Result<Self, String> {
                    s.parse::<$ty>().map_err(|e| format!("{e}"))
                }
            }
        )*
    };
}

impl_number!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// Marshals numbers through [`Number::parse_literal`] and [`Display`].
struct NumberMarshaler<T>(PhantomData<fn() -> T>);

impl<T: Number> Marshaler<T> for NumberMarshaler<T> {
    fn marshal(&self, value: &T) -> Result<Literal, SchemaError> {
        Ok(Literal::new(value.to_string()))
    }

    fn unmarshal(&self, literal: &Literal) -> Result<T, SchemaError> {
        T::parse_literal(literal.verbatim()).map_err(SchemaError::unmarshal)
    }
}

/// Schema for numeric values with optional inclusive bounds.
pub struct NumericSchema<T> {
    min: Option<T>,
    max: Option<T>,
    zero: T,
    compare: fn(&T, &T) -> Option<Ordering>,
    marshaler: Arc<dyn Marshaler<T>>,
}

impl<T: Number> NumericSchema<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            min: None,
            max: None,
            zero: T::default(),
            compare: <T as PartialOrd>::partial_cmp,
            marshaler: Arc::new(NumberMarshaler(PhantomData)),
        }
    }
}

impl<T: Number> Default for NumericSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Value> NumericSchema<T> {
    /// Sets the inclusive minimum.
    #[must_use]
    pub fn min(mut self, min: T) -> Self {
        self.min = Some(min);
        self
    }

    /// Sets the inclusive maximum.
    #[must_use]
    pub fn max(mut self, max: T) -> Self {
        self.max = Some(max);
        self
    }

    /// Replaces the default marshaler, e.g. to accept hexadecimal literals.
    #[must_use]
    pub fn marshaler(mut self, marshaler: impl Marshaler<T> + 'static) -> Self {
        self.marshaler = Arc::new(marshaler);
        self
    }

    #[must_use]
    pub const fn limits(&self) -> (Option<&T>, Option<&T>) {
        (self.min.as_ref(), self.max.as_ref())
    }

    pub(crate) fn finalize(&self) -> Result<(), ConfigError> {
        for bound in [&self.min, &self.max].into_iter().flatten() {
            if (self.compare)(bound, bound).is_none() {
                return Err(ConfigError::InvalidSchema {
                    message: format!("{bound:?} is not a comparable bound").into(),
                    context: None,
                });
            }
        }

        if let (Some(min), Some(max)) = (&self.min, &self.max)
            && (self.compare)(min, max) == Some(Ordering::Greater)
        {
            return Err(ConfigError::InvalidSchema {
                message: format!("minimum {min:?} is greater than maximum {max:?}").into(),
                context: None,
            });
        }
        Ok(())
    }

    pub(crate) fn validate(&self, value: &T) -> Result<(), SchemaError> {
        if (self.compare)(value, value).is_none() {
            return Err(SchemaError::unmarshal("must be a number"));
        }
        if let Some(min) = &self.min
            && (self.compare)(value, min) == Some(Ordering::Less)
        {
            return Err(SchemaError::Range {
                bound: RangeBound::Below,
                limit: self.render(min).into(),
            });
        }
        if let Some(max) = &self.max
            && (self.compare)(value, max) == Some(Ordering::Greater)
        {
            return Err(SchemaError::Range {
                bound: RangeBound::Above,
                limit: self.render(max).into(),
            });
        }
        Ok(())
    }

    pub(crate) fn marshal(&self, value: &T) -> Result<Literal, SchemaError> {
        self.marshaler.marshal(value)
    }

    pub(crate) fn unmarshal(&self, literal: &Literal) -> Result<T, SchemaError> {
        let value = self.marshaler.unmarshal(literal)?;
        self.validate(&value)?;
        Ok(value)
    }

    /// The bounds and zero, when they are within range.
    pub(crate) fn examples(&self, conservative: bool) -> Vec<T> {
        let mut candidates = Vec::with_capacity(3);
        if self.validate(&self.zero).is_ok() {
            candidates.push(self.zero.clone());
        }
        candidates.extend(self.min.iter().cloned());
        candidates.extend(self.max.iter().cloned());
        candidates.dedup();

        if conservative {
            candidates.truncate(1);
        }
        candidates
    }

    pub(crate) fn summary(&self) -> String {
        match (&self.min, &self.max) {
            (Some(min), Some(max)) => {
                format!("{} .. {}", self.render(min), self.render(max))
            },
            (Some(min), None) => format!(">= {}", self.render(min)),
            (None, Some(max)) => format!("<= {}", self.render(max)),
            (None, None) => format!("<{}>", short_type_name::<T>()),
        }
    }

    fn render(&self, value: &T) -> String {
        self.marshaler.marshal(value).map_or_else(|_| format!("{value:?}"), |l| l.canonical().to_owned())
    }
}

impl<T: Clone> Clone for NumericSchema<T> {
    fn clone(&self) -> Self {
        Self {
            min: self.min.clone(),
            max: self.max.clone(),
            zero: self.zero.clone(),
            compare: self.compare,
            marshaler: Arc::clone(&self.marshaler),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for NumericSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumericSchema")
            .field("min", &self.min)
            .field("max", &self.max)
            .finish_non_exhaustive()
    }
}

pub(crate) fn short_type_name<T>() -> &'static str {
    let name = std::any::type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded() -> NumericSchema<i16> {
        NumericSchema::new().min(-10).max(20)
    }

    #[test]
    fn above_maximum_cites_the_bound() {
        let err = bounded().unmarshal(&Literal::new("25")).unwrap_err();
        assert_eq!(err, SchemaError::Range { bound: RangeBound::Above, limit: "20".into() });
        assert!(err.to_string().contains("20"));
    }

    #[test]
    fn below_minimum() {
        let err = bounded().unmarshal(&Literal::new("-11")).unwrap_err();
        assert!(matches!(err, SchemaError::Range { bound: RangeBound::Below, .. }));
    }

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(bounded().unmarshal(&Literal::new("-10")).unwrap(), -10);
        assert_eq!(bounded().unmarshal(&Literal::new("20")).unwrap(), 20);
    }

    #[test]
    fn surrounding_whitespace_is_not_a_number() {
        let err = bounded().unmarshal(&Literal::new(" 15 ")).unwrap_err();
        assert!(matches!(err, SchemaError::Unmarshal { .. }));
    }

    #[test]
    fn overflow_is_an_unmarshal_error() {
        let err = bounded().unmarshal(&Literal::new("70000")).unwrap_err();
        assert!(matches!(err, SchemaError::Unmarshal { .. }));
    }

    #[test]
    fn inverted_bounds_fail_finalize() {
        let schema = NumericSchema::<u32>::new().min(10).max(1);
        assert!(matches!(schema.finalize(), Err(ConfigError::InvalidSchema { .. })));
    }

    #[test]
    fn nan_bound_fails_finalize() {
        let schema = NumericSchema::<f64>::new().max(f64::NAN);
        assert!(schema.finalize().is_err());
    }

    #[test]
    fn nan_literal_is_rejected() {
        let schema = NumericSchema::<f64>::new();
        assert!(schema.unmarshal(&Literal::new("NaN")).is_err());
    }

    #[test]
    fn examples_stay_in_range() {
        let schema = NumericSchema::<i32>::new().min(5).max(9);
        assert_eq!(schema.examples(false), vec![5, 9]);
        assert_eq!(schema.examples(true), vec![5]);
        assert_eq!(bounded().examples(false), vec![0, -10, 20]);
    }

    #[test]
    fn summary() {
        assert_eq!(bounded().summary(), "-10 .. 20");
        assert_eq!(NumericSchema::<u8>::new().summary(), "<u8>");
    }
}
