use crate::constraint::Constraint;
use crate::error::{ConfigError, ConfigErrorExt};
use crate::literal::Literal;
use crate::schema::{Schema, Value};
use crate::spec::seal::Sealable;
use crate::spec::{Documentation, Example, Necessity, Spec, SpecCore, SpecId, SpecInner, SpecMeta};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Accumulates a variable declaration and validates it in [`SpecBuilder::build`].
///
/// # Examples
/// ```rust
/// use envspec::{NumericSchema, SpecBuilder};
///
/// let spec = SpecBuilder::new("PORT", "TCP port to listen on", NumericSchema::<u16>::new().min(1))
///     .optional()
///     .default_value(8080)
///     .example(443, "behind a TLS terminator")
///     .build()
///     .unwrap();
///
/// assert_eq!(spec.default_literal().unwrap().canonical(), "8080");
/// ```
pub struct SpecBuilder<T> {
    name: Cow<'static, str>,
    description: Cow<'static, str>,
    schema: Schema<T>,
    necessity: Necessity,
    default: Option<T>,
    sensitive: bool,
    constraints: Vec<Constraint<T>>,
    examples: Vec<(T, Cow<'static, str>)>,
    documentation: Documentation,
}

impl<T: Value> SpecBuilder<T> {
    /// Starts a required variable declaration.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        description: impl Into<Cow<'static, str>>,
        schema: impl Into<Schema<T>>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema: schema.into(),
            necessity: Necessity::Required,
            default: None,
            sensitive: false,
            constraints: Vec::new(),
            examples: Vec::new(),
            documentation: Documentation::default(),
        }
    }

    #[must_use]
    pub const fn necessity(mut self, necessity: Necessity) -> Self {
        self.necessity = necessity;
        self
    }

    #[must_use]
    pub const fn required(self) -> Self {
        self.necessity(Necessity::Required)
    }

    #[must_use]
    pub const fn optional(self) -> Self {
        self.necessity(Necessity::Optional)
    }

    #[must_use]
    pub const fn deprecated(self) -> Self {
        self.necessity(Necessity::Deprecated)
    }

    /// Value used when the variable is not set. Validated by [`SpecBuilder::build`].
    #[must_use]
    pub fn default_value(mut self, value: T) -> Self {
        self.default = Some(value);
        self
    }

    /// Marks the value as secret: it is never logged and redacted in reports.
    #[must_use]
    pub const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    #[must_use]
    pub fn constraint(mut self, constraint: Constraint<T>) -> Self {
        self.constraints.push(constraint);
        self
    }

    #[must_use]
    pub fn example(mut self, value: T, description: impl Into<Cow<'static, str>>) -> Self {
        self.examples.push((value, description.into()));
        self
    }

    #[must_use]
    pub fn documentation(mut self, documentation: Documentation) -> Self {
        self.documentation.merge(documentation);
        self
    }

    /// Validates the declaration and yields the spec.
    ///
    /// The default and every example must satisfy the schema and all constraints, and must
    /// survive a marshal/unmarshal round trip.
    ///
    /// # Errors
    /// - [`ConfigError::EmptyName`] / [`ConfigError::InvalidName`] for a bad name.
    /// - [`ConfigError::EmptyDescription`] when the description is blank.
    /// - [`ConfigError::InvalidSchema`] / [`ConfigError::DuplicateLiteral`] from the schema.
    /// - [`ConfigError::InvalidDefault`] / [`ConfigError::InvalidExample`] for bad values.
    pub fn build(self) -> Result<Spec<T>, ConfigError> {
        validate_name(&self.name)?;
        let name = self.name;

        if self.description.trim().is_empty() {
            return Err(ConfigError::EmptyDescription {
                message: "every variable must be described".into(),
                context: Some(name),
            });
        }
        self.schema.finalize().context(name.clone())?;

        let default = match self.default {
            Some(value) => {
                let literal = check_value(&self.schema, &self.constraints, &value, self.sensitive)
                    .map_err(|message| ConfigError::InvalidDefault {
                        message: message.into(),
                        context: Some(name.clone()),
                    })?;
                Some((value, literal))
            },
            None => None,
        };

        let examples = self
            .examples
            .into_iter()
            .map(|(value, description)| {
                let literal = check_value(&self.schema, &self.constraints, &value, self.sensitive)
                    .map_err(|message| ConfigError::InvalidExample {
                        message: message.into(),
                        context: Some(name.clone()),
                    })?;
                Ok(Example { value, literal, description, is_normative: true })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let core = SpecCore {
            id: SpecId::next(),
            name: Arc::from(name.as_ref()),
            description: self.description,
            necessity: self.necessity,
            sensitive: self.sensitive,
            meta: Sealable::new(SpecMeta {
                relationships: Vec::new(),
                documentation: self.documentation,
            }),
        };

        Ok(Spec(Arc::new(SpecInner {
            core: Arc::new(core),
            schema: self.schema,
            constraints: self.constraints,
            default,
            examples,
        })))
    }
}

impl<T> fmt::Debug for SpecBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecBuilder")
            .field("name", &self.name)
            .field("necessity", &self.necessity)
            .field("has_default", &self.default.is_some())
            .finish_non_exhaustive()
    }
}

fn validate_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::EmptyName {
            message: "variable names must not be empty".into(),
            context: None,
        });
    }
    if let Some(c) = name.chars().find(|c| c.is_whitespace() || matches!(c, '=' | '\0')) {
        return Err(ConfigError::InvalidName {
            message: format!("{c:?} cannot appear in an environment variable name").into(),
            context: Some(name.to_owned().into()),
        });
    }
    Ok(())
}

/// Checks a value declared at build time, returning its canonical literal.
fn check_value<T: Value>(
    schema: &Schema<T>,
    constraints: &[Constraint<T>],
    value: &T,
    sensitive: bool,
) -> Result<Literal, String> {
    schema.validate(value).map_err(|e| e.to_string())?;
    let literal = schema.marshal(value).map_err(|e| e.to_string())?;
    let parsed = schema.unmarshal(&literal).map_err(|e| e.to_string())?;
    if &parsed != value {
        return Err(format!("{} does not round-trip through its literal", literal.display(sensitive)));
    }
    for constraint in constraints {
        constraint.check(value)?;
    }
    Ok(literal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BinaryEncoding, BinarySchema, FnMarshaler, NumericSchema, OtherSchema, StringSchema};

    fn text() -> StringSchema<String> {
        StringSchema::new()
    }

    #[test]
    fn names_are_validated() {
        let empty = SpecBuilder::new("", "x", text()).build().unwrap_err();
        assert!(matches!(empty, ConfigError::EmptyName { .. }));

        for bad in ["MY VAR", "A=B", "TAB\t", "NUL\0"] {
            let err = SpecBuilder::new(bad, "x", text()).build().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidName { .. }), "{bad:?}: {err}");
        }
    }

    #[test]
    fn description_is_required() {
        let err = SpecBuilder::new("HOST", "  ", text()).build().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyDescription { .. }));
    }

    #[test]
    fn schema_errors_carry_the_name() {
        let err = SpecBuilder::new("NAME", "x", text().min_len(0)).build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSchema { .. }));
        assert!(err.to_string().contains("(NAME)"));
    }

    #[test]
    fn short_binary_default_is_rejected() {
        let schema = BinarySchema::<Vec<u8>>::new(BinaryEncoding::Base64).min_len(5);
        let err = SpecBuilder::new("KEY", "Signing key", schema)
            .default_value(vec![1, 2, 3])
            .build()
            .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidDefault { .. }));
        assert!(err.to_string().contains("at least 5 bytes"));
    }

    #[test]
    fn default_must_satisfy_constraints() {
        let err = SpecBuilder::new("WORKERS", "Worker count", NumericSchema::<u32>::new())
            .default_value(3)
            .constraint(Constraint::predicate("must be even", |v: &u32| v % 2 == 0))
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid default value (WORKERS): must be even");
    }

    #[test]
    fn examples_are_validated() {
        let err = SpecBuilder::new("PORT", "Port", NumericSchema::<u16>::new().min(1024))
            .example(80, "privileged")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidExample { .. }));
    }

    #[test]
    fn default_must_roundtrip() {
        // Renders every value as "x", so nothing but "x" itself survives.
        let lossy = FnMarshaler::new(|_: &String| Ok("x".to_owned()), |s: &str| Ok(s.to_owned()));
        let err = SpecBuilder::new("LOSSY", "Lossy", OtherSchema::new(lossy))
            .default_value("y".to_owned())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("does not round-trip"));
    }

    #[test]
    fn builds_with_canonical_default_literal() {
        let spec = SpecBuilder::new("RETRIES", "Retries", NumericSchema::<u8>::new())
            .optional()
            .sensitive()
            .default_value(3)
            .example(5, "busy networks")
            .build()
            .unwrap();

        assert_eq!(spec.necessity(), Necessity::Optional);
        assert!(spec.is_sensitive());
        assert_eq!(spec.default_literal().unwrap().canonical(), "3");
        let examples = spec.examples();
        assert_eq!(examples.len(), 1);
        assert!(examples[0].is_normative);
        assert!(!spec.is_sealed());
    }
}
