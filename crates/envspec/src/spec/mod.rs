//! # Specs
//!
//! A [`Spec`] is the immutable declaration of one variable: name, description, necessity,
//! schema, constraints, default and examples. Relationships and documentation can still be
//! attached after [`SpecBuilder::build`], until the spec is sealed by its first resolution or
//! by an explicit [`Spec::seal`].

pub mod builder;
pub mod docs;
pub(crate) mod seal;

pub use builder::SpecBuilder;
pub use docs::{Documentation, Example};

use crate::constraint::Constraint;
use crate::error::ConfigError;
use crate::literal::Literal;
use crate::relationship::Relationship;
use crate::schema::{Schema, SchemaKind, Value};
use seal::Sealable;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Process-unique identity of a spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecId(u64);

impl SpecId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How much the application needs a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum_macros::Display)]
pub enum Necessity {
    /// Must be set, explicitly or by a default, whenever it is relevant.
    #[default]
    Required,
    /// May be absent; never invalid.
    Optional,
    /// Still honoured, but setting it is flagged for attention.
    Deprecated,
}

#[derive(Debug, Default)]
pub(crate) struct SpecMeta {
    pub(crate) relationships: Vec<Relationship>,
    pub(crate) documentation: Documentation,
}

/// The untyped part of a spec, shared with relationship endpoints.
#[derive(Debug)]
pub(crate) struct SpecCore {
    pub(crate) id: SpecId,
    pub(crate) name: Arc<str>,
    pub(crate) description: Cow<'static, str>,
    pub(crate) necessity: Necessity,
    pub(crate) sensitive: bool,
    pub(crate) meta: Sealable<SpecMeta>,
}

impl SpecCore {
    pub(crate) fn seal(&self) {
        if self.meta.seal() {
            trace!(name = %self.name, id = %self.id, "spec sealed");
        }
    }
}

struct SpecInner<T> {
    core: Arc<SpecCore>,
    schema: Schema<T>,
    constraints: Vec<Constraint<T>>,
    default: Option<(T, Literal)>,
    examples: Vec<Example<T>>,
}

/// A built variable declaration. Cloning is cheap and shares the declaration.
pub struct Spec<T>(Arc<SpecInner<T>>);

impl<T: Value> Spec<T> {
    #[must_use]
    pub fn id(&self) -> SpecId {
        self.0.core.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.core.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.0.core.description
    }

    #[must_use]
    pub fn necessity(&self) -> Necessity {
        self.0.core.necessity
    }

    #[must_use]
    pub fn is_sensitive(&self) -> bool {
        self.0.core.sensitive
    }

    #[must_use]
    pub fn schema(&self) -> &Schema<T> {
        &self.0.schema
    }

    #[must_use]
    pub fn constraints(&self) -> &[Constraint<T>] {
        &self.0.constraints
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&T> {
        self.0.default.as_ref().map(|(value, _)| value)
    }

    #[must_use]
    pub fn default_literal(&self) -> Option<&Literal> {
        self.0.default.as_ref().map(|(_, literal)| literal)
    }

    /// Declared examples, or examples generated from the schema when none were declared.
    ///
    /// Generated examples that violate a constraint are left out.
    #[must_use]
    pub fn examples(&self) -> Vec<Example<T>> {
        if !self.0.examples.is_empty() {
            return self.0.examples.clone();
        }
        self.0
            .schema
            .examples(false)
            .into_iter()
            .filter(|value| self.0.constraints.iter().all(|c| c.check(value).is_ok()))
            .filter_map(|value| {
                let literal = self.0.schema.marshal(&value).ok()?;
                Some(Example { value, literal, description: Cow::Borrowed(""), is_normative: false })
            })
            .collect()
    }

    #[must_use]
    pub fn relationships(&self) -> Vec<Relationship> {
        self.0.core.meta.read(|meta| meta.relationships.clone())
    }

    #[must_use]
    pub fn documentation(&self) -> Documentation {
        self.0.core.meta.read(|meta| meta.documentation.clone())
    }

    /// Appends documentation to the spec.
    ///
    /// # Errors
    /// Returns [`ConfigError::Sealed`] once the spec has been sealed.
    pub fn add_documentation(&self, documentation: Documentation) -> Result<(), ConfigError> {
        self.0
            .core
            .meta
            .mutate(|meta| meta.documentation.merge(documentation))
            .ok_or_else(|| sealed_error(self.name()))
    }

    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.0.core.meta.is_sealed()
    }

    /// Freezes relationships and documentation. Resolution does this implicitly.
    pub fn seal(&self) {
        self.0.core.seal();
    }

    pub(crate) fn core(&self) -> &Arc<SpecCore> {
        &self.0.core
    }
}

pub(crate) fn sealed_error(name: &str) -> ConfigError {
    ConfigError::Sealed {
        message: "cannot modify spec after value has been used".into(),
        context: Some(name.to_owned().into()),
    }
}

impl<T> Clone for Spec<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Value> fmt::Debug for Spec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spec")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("necessity", &self.necessity())
            .field("schema", &self.schema().kind())
            .field("sealed", &self.is_sealed())
            .finish_non_exhaustive()
    }
}

/// Type-erased view of a [`Spec`], for registries, reporters and documentation generators.
pub trait AnySpec: Send + Sync + fmt::Debug {
    fn id(&self) -> SpecId;
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn necessity(&self) -> Necessity;
    fn is_sensitive(&self) -> bool;
    fn schema_kind(&self) -> SchemaKind;
    fn type_name(&self) -> &'static str;
    fn schema_summary(&self) -> String;
    fn default_literal(&self) -> Option<&Literal>;
    fn example_literals(&self) -> Vec<(Literal, Cow<'static, str>)>;
    fn constraint_descriptions(&self) -> Vec<String>;
    fn relationships(&self) -> Vec<Relationship>;
    fn documentation(&self) -> Documentation;
    fn is_sealed(&self) -> bool;
    fn seal(&self);
}

impl<T: Value> AnySpec for Spec<T> {
    fn id(&self) -> SpecId {
        Self::id(self)
    }

    fn name(&self) -> &str {
        Self::name(self)
    }

    fn description(&self) -> &str {
        Self::description(self)
    }

    fn necessity(&self) -> Necessity {
        Self::necessity(self)
    }

    fn is_sensitive(&self) -> bool {
        Self::is_sensitive(self)
    }

    fn schema_kind(&self) -> SchemaKind {
        self.schema().kind()
    }

    fn type_name(&self) -> &'static str {
        self.schema().type_name()
    }

    fn schema_summary(&self) -> String {
        self.schema().summary()
    }

    fn default_literal(&self) -> Option<&Literal> {
        Self::default_literal(self)
    }

    fn example_literals(&self) -> Vec<(Literal, Cow<'static, str>)> {
        self.examples().into_iter().map(|e| (e.literal, e.description)).collect()
    }

    fn constraint_descriptions(&self) -> Vec<String> {
        self.constraints().iter().map(|c| c.description().to_owned()).collect()
    }

    fn relationships(&self) -> Vec<Relationship> {
        Self::relationships(self)
    }

    fn documentation(&self) -> Documentation {
        Self::documentation(self)
    }

    fn is_sealed(&self) -> bool {
        Self::is_sealed(self)
    }

    fn seal(&self) {
        Self::seal(self);
    }
}
