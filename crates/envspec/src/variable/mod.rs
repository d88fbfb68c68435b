//! # Variables
//!
//! A [`Variable`] binds a [`Spec`] to an environment [`Lookup`] and resolves it lazily, at
//! most once. Concurrent first reads block on a one-shot cell, so constraints with side
//! effects run exactly once no matter how many threads race.
//!
//! Resolution happens in a fixed order:
//!
//! 1. The spec is sealed.
//! 2. `DependsOn` preconditions are evaluated, resolving the dependencies first. A closed gate
//!    makes the variable irrelevant and its environment value is ignored, valid or not.
//! 3. The environment is consulted; an empty value counts as absent.
//! 4. An absent value falls back to the default, which was validated when the spec was built.
//! 5. An explicit value is unmarshaled, then checked by each constraint; the first failure
//!    wins.

pub mod error;
pub(crate) mod resolve;

pub use error::{ValueError, ValueErrorExt};

use crate::literal::{Literal, REDACTED};
use crate::lookup::Lookup;
use crate::relationship::{Gate, RelationshipKind};
use crate::schema::Value;
use crate::spec::{AnySpec, Necessity, Spec};
use resolve::Resolution;
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Where the value of a variable came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Availability {
    /// Set in the environment.
    Explicit,
    /// Not set; the default applies.
    Default,
    /// Not set and no default, or irrelevant.
    None,
}

/// Whether the `DependsOn` preconditions of a variable hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Relevance {
    Relevant,
    /// A precondition on the named dependency is not satisfied.
    Irrelevant { because: Arc<str> },
}

impl Relevance {
    #[must_use]
    pub const fn is_relevant(&self) -> bool {
        matches!(self, Self::Relevant)
    }
}

/// Conditions worth reporting that do not make a variable invalid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Attention {
    /// A deprecated variable is set explicitly.
    Deprecated,
    /// The value was not written in its canonical form, e.g. `007` for `7`.
    NonCanonical { verbatim: String, canonical: String },
    /// A variable replaced by another one is set explicitly.
    Superseded { by: Arc<str> },
}

impl fmt::Display for Attention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deprecated => f.write_str("deprecated"),
            Self::NonCanonical { verbatim, canonical } => {
                write!(f, "{verbatim} is better written as {canonical}")
            },
            Self::Superseded { by } => write!(f, "superseded by {by}"),
        }
    }
}

struct VariableInner<T> {
    spec: Spec<T>,
    lookup: Arc<dyn Lookup>,
    state: OnceLock<Resolution<T>>,
    /// Served to reads from within the variable's own resolution.
    reentered: OnceLock<Resolution<T>>,
}

/// A spec bound to an environment lookup. Cloning is cheap and shares the resolution.
pub struct Variable<T> {
    inner: Arc<VariableInner<T>>,
}

impl<T: Value> Variable<T> {
    pub(crate) fn new(spec: Spec<T>, lookup: Arc<dyn Lookup>) -> Self {
        Self { inner: Arc::new(VariableInner {
            spec,
            lookup,
            state: OnceLock::new(),
            reentered: OnceLock::new(),
        }) }
    }

    #[must_use]
    pub fn spec(&self) -> &Spec<T> {
        &self.inner.spec
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.inner.spec.name()
    }

    /// Resolves on first use.
    ///
    /// A read from within the resolution of this same variable, e.g. by one of its own
    /// constraints, sees a [`ValueError::Configuration`] cycle error, and the resolution in
    /// progress caches the same error.
    fn resolution(&self) -> &Resolution<T> {
        match self.try_resolution() {
            Some(resolution) => resolution,
            None => self.inner.reentered.get_or_init(|| resolve::reentered(&self.inner.spec)),
        }
    }

    /// `None` when this variable is already being resolved on the current thread.
    fn try_resolution(&self) -> Option<&Resolution<T>> {
        if let Some(resolution) = self.inner.state.get() {
            return Some(resolution);
        }
        if resolve::is_in_progress(self.inner.spec.id()) {
            return None;
        }
        Some(
            self.inner
                .state
                .get_or_init(|| resolve::resolve(&self.inner.spec, self.inner.lookup.as_ref())),
        )
    }

    #[must_use]
    pub fn availability(&self) -> Availability {
        self.resolution().availability
    }

    #[must_use]
    pub fn relevance(&self) -> Relevance {
        self.resolution().relevance.clone()
    }

    #[must_use]
    pub fn is_relevant(&self) -> bool {
        self.resolution().relevance.is_relevant()
    }

    /// The literal of the value in use, explicit or default.
    #[must_use]
    pub fn literal(&self) -> Option<&Literal> {
        self.resolution().literal.as_ref()
    }

    /// The parsed value, even if a constraint rejected it. Intended for reporters.
    #[must_use]
    pub fn native_value(&self) -> Option<&T> {
        self.resolution().value.as_ref()
    }

    /// The validated value.
    ///
    /// `Ok(None)` means absent or irrelevant. A relevant required variable without a value
    /// yields [`ValueError::Undefined`].
    ///
    /// # Errors
    /// Returns the cached [`ValueError`] when the value is invalid.
    pub fn value(&self) -> Result<Option<T>, ValueError> {
        let value = self.outcome()?;
        match self.undefined() {
            Some(err) if value.is_none() => Err(err),
            _ => Ok(value),
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<ValueError> {
        let resolution = self.resolution();
        match &resolution.error {
            Some(err) => Some(err.clone()),
            None if resolution.value.is_none() => self.undefined(),
            None => None,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.error().is_none()
    }

    /// Reporting flags that do not affect validity.
    #[must_use]
    pub fn attention(&self) -> Vec<Attention> {
        let resolution = self.resolution();
        if resolution.availability != Availability::Explicit {
            return Vec::new();
        }

        let mut flags = Vec::new();
        if self.spec().necessity() == Necessity::Deprecated {
            flags.push(Attention::Deprecated);
        }
        if let Some(literal) = &resolution.literal
            && !literal.is_canonical()
        {
            let (verbatim, canonical) = if self.spec().is_sensitive() {
                (REDACTED.to_owned(), REDACTED.to_owned())
            } else {
                (literal.quote(), crate::literal::quote(literal.canonical()))
            };
            flags.push(Attention::NonCanonical { verbatim, canonical });
        }
        let id = self.spec().id();
        flags.extend(
            self.spec()
                .relationships()
                .into_iter()
                .filter(|r| r.kind() == RelationshipKind::Supersedes && r.object().id() == id)
                .map(|r| Attention::Superseded { by: r.subject().shared_name() }),
        );
        flags
    }

    /// Type-erased handle for registries and reporters.
    #[must_use]
    pub fn erased(&self) -> Arc<dyn AnyVariable> {
        Arc::new(self.clone())
    }

    /// The value or error without synthesizing [`ValueError::Undefined`].
    pub(crate) fn outcome(&self) -> Result<Option<T>, ValueError> {
        let resolution = self.resolution();
        match &resolution.error {
            Some(err) => Err(err.clone()),
            None => Ok(resolution.value.clone()),
        }
    }

    /// Evaluates a `DependsOn` precondition against this variable.
    pub(crate) fn gate(&self, predicate: &dyn Fn(&T) -> bool) -> Gate {
        let Some(resolution) = self.try_resolution() else {
            return Gate::Reentered;
        };
        match (&resolution.error, &resolution.value) {
            (None, Some(value)) if predicate(value) => Gate::Open,
            _ => Gate::Closed,
        }
    }

    fn undefined(&self) -> Option<ValueError> {
        (self.spec().necessity() == Necessity::Required && self.is_relevant())
            .then(|| ValueError::Undefined { name: Cow::Owned(self.name().to_owned()) })
    }
}

impl<T> Clone for Variable<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T: Value> fmt::Debug for Variable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Variable");
        debug.field("name", &self.name());
        match self.inner.state.get() {
            Some(resolution) => debug
                .field("availability", &resolution.availability)
                .field("valid", &resolution.error.is_none()),
            None => debug.field("resolved", &false),
        };
        debug.finish_non_exhaustive()
    }
}

/// Type-erased view of a [`Variable`].
pub trait AnyVariable: Send + Sync + fmt::Debug {
    fn spec(&self) -> &dyn AnySpec;
    fn name(&self) -> &str;
    fn availability(&self) -> Availability;
    fn relevance(&self) -> Relevance;
    fn literal(&self) -> Option<&Literal>;
    fn error(&self) -> Option<ValueError>;
    fn is_valid(&self) -> bool;
    fn attention(&self) -> Vec<Attention>;
}

impl<T: Value> AnyVariable for Variable<T> {
    fn spec(&self) -> &dyn AnySpec {
        Self::spec(self)
    }

    fn name(&self) -> &str {
        Self::name(self)
    }

    fn availability(&self) -> Availability {
        Self::availability(self)
    }

    fn relevance(&self) -> Relevance {
        Self::relevance(self)
    }

    fn literal(&self) -> Option<&Literal> {
        Self::literal(self)
    }

    fn error(&self) -> Option<ValueError> {
        Self::error(self)
    }

    fn is_valid(&self) -> bool {
        Self::is_valid(self)
    }

    fn attention(&self) -> Vec<Attention> {
        Self::attention(self)
    }
}
