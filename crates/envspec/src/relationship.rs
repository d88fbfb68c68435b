//! # Relationships
//!
//! Directed edges between specs. `RefersTo` and `Supersedes` are metadata for reporters;
//! `DependsOn` gates the relevance of its subject on the resolved value of its object.
//!
//! Every edge is recorded on both endpoints so either side can enumerate it. Endpoints are
//! held as [`SpecRef`]s (id, name and a weak handle), so the graph never keeps specs alive
//! and cannot form ownership cycles. Only the subject's copy of a `DependsOn` edge carries
//! the precondition.

use crate::error::ConfigError;
use crate::literal::Literal;
use crate::schema::Value;
use crate::spec::{SpecCore, SpecId, sealed_error};
use crate::variable::Variable;
use fxhash::FxHashSet;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;

/// Serialises linking so cycle detection sees a stable graph.
static LINK: Mutex<()> = Mutex::new(());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum RelationshipKind {
    /// The subject's documentation refers to the object.
    #[strum(serialize = "refers to")]
    RefersTo,
    /// The subject is only relevant when the object's value satisfies a precondition.
    #[strum(serialize = "depends on")]
    DependsOn,
    /// The subject replaces the (usually deprecated) object.
    #[strum(serialize = "supersedes")]
    Supersedes,
}

/// A stable handle on a spec that does not keep it alive.
#[derive(Clone)]
pub struct SpecRef {
    id: SpecId,
    name: Arc<str>,
    core: Weak<SpecCore>,
}

impl SpecRef {
    fn new(core: &Arc<SpecCore>) -> Self {
        Self { id: core.id, name: Arc::clone(&core.name), core: Arc::downgrade(core) }
    }

    #[must_use]
    pub const fn id(&self) -> SpecId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    fn upgrade(&self) -> Option<Arc<SpecCore>> {
        self.core.upgrade()
    }
}

impl fmt::Debug for SpecRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.id)
    }
}

impl PartialEq for SpecRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SpecRef {}

/// Outcome of a `DependsOn` precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Gate {
    Open,
    Closed,
    /// The dependency is itself being resolved on this thread.
    Reentered,
}

pub(crate) type Precondition = Arc<dyn Fn() -> Gate + Send + Sync>;

/// A directed edge between two specs.
#[derive(Clone)]
pub struct Relationship {
    kind: RelationshipKind,
    subject: SpecRef,
    object: SpecRef,
    expected: Option<Literal>,
    precondition: Option<Precondition>,
}

impl Relationship {
    #[must_use]
    pub const fn kind(&self) -> RelationshipKind {
        self.kind
    }

    #[must_use]
    pub const fn subject(&self) -> &SpecRef {
        &self.subject
    }

    #[must_use]
    pub const fn object(&self) -> &SpecRef {
        &self.object
    }

    /// The literal the object must resolve to, for value dependencies.
    #[must_use]
    pub const fn expected(&self) -> Option<&Literal> {
        self.expected.as_ref()
    }

    pub(crate) fn precondition(&self) -> Option<&Precondition> {
        self.precondition.as_ref()
    }
}

impl fmt::Debug for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relationship")
            .field("kind", &self.kind)
            .field("subject", &self.subject)
            .field("object", &self.object)
            .field("expected", &self.expected)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject.name, self.kind, self.object.name)?;
        if let Some(expected) = &self.expected {
            write!(f, " = {}", expected.quote())?;
        }
        Ok(())
    }
}

/// Records an edge on both endpoints.
///
/// Fails if either spec is sealed, or if a `DependsOn` edge would close a cycle.
fn link(
    kind: RelationshipKind,
    subject: &Arc<SpecCore>,
    object: &Arc<SpecCore>,
    expected: Option<Literal>,
    precondition: Option<Precondition>,
) -> Result<(), ConfigError> {
    let _link = LINK.lock();

    if subject.id == object.id {
        return Err(ConfigError::Cycle {
            message: format!("{} cannot be related to itself", subject.name).into(),
            context: Some(kind.to_string().into()),
        });
    }
    if kind == RelationshipKind::DependsOn && depends_on(object, subject.id) {
        return Err(ConfigError::Cycle {
            message: format!("{} already depends on {}", object.name, subject.name).into(),
            context: Some(kind.to_string().into()),
        });
    }

    let (first, second) = if subject.id < object.id { (subject, object) } else { (object, subject) };
    let mut first_meta = first.meta.lock();
    let mut second_meta = second.meta.lock();
    let (Some(first_meta), Some(second_meta)) = (first_meta.as_mut(), second_meta.as_mut()) else {
        let sealed = if first.meta.is_sealed() { first } else { second };
        return Err(sealed_error(&sealed.name));
    };
    let (subject_meta, object_meta) =
        if subject.id < object.id { (first_meta, second_meta) } else { (second_meta, first_meta) };

    let relationship = Relationship {
        kind,
        subject: SpecRef::new(subject),
        object: SpecRef::new(object),
        expected,
        precondition: None,
    };
    object_meta.relationships.push(relationship.clone());
    subject_meta.relationships.push(Relationship { precondition, ..relationship });

    debug!(subject = %subject.name, object = %object.name, %kind, "relationship linked");
    Ok(())
}

/// Whether `from` reaches `target` through `DependsOn` edges.
fn depends_on(from: &Arc<SpecCore>, target: SpecId) -> bool {
    let mut seen = FxHashSet::default();
    let mut stack = vec![Arc::clone(from)];

    while let Some(core) = stack.pop() {
        if core.id == target {
            return true;
        }
        if !seen.insert(core.id) {
            continue;
        }
        let objects: Vec<SpecRef> = core.meta.read(|meta| {
            meta.relationships
                .iter()
                .filter(|r| r.kind == RelationshipKind::DependsOn && r.subject.id == core.id)
                .map(|r| r.object.clone())
                .collect()
        });
        stack.extend(objects.iter().filter_map(SpecRef::upgrade));
    }
    false
}

/// Relationship declarations. Relating a variable to itself is a [`ConfigError::Cycle`].
impl<T: Value> Variable<T> {
    /// Cross-references `other` in documentation.
    ///
    /// # Errors
    /// Fails with [`ConfigError::Sealed`] once either variable has been resolved.
    pub fn see_also<U: Value>(&self, other: &Variable<U>) -> Result<(), ConfigError> {
        link(RelationshipKind::RefersTo, self.spec().core(), other.spec().core(), None, None)
    }

    /// Marks `other` as replaced by this variable.
    ///
    /// # Errors
    /// Fails with [`ConfigError::Sealed`] once either variable has been resolved.
    pub fn supersedes<U: Value>(&self, other: &Variable<U>) -> Result<(), ConfigError> {
        link(RelationshipKind::Supersedes, self.spec().core(), other.spec().core(), None, None)
    }

    /// Makes this variable relevant only while `other` has a valid value satisfying
    /// `predicate`. An absent, invalid or irrelevant `other` makes this variable irrelevant.
    ///
    /// # Errors
    /// Fails with [`ConfigError::Sealed`] once either variable has been resolved, and with
    /// [`ConfigError::Cycle`] when `other` already depends on this variable.
    pub fn depends_on<U: Value>(
        &self,
        other: &Variable<U>,
        predicate: impl Fn(&U) -> bool + Send + Sync + 'static,
    ) -> Result<(), ConfigError> {
        self.depends_on_with(other, None, predicate)
    }

    /// Makes this variable relevant only while `other` resolves to `expected`.
    ///
    /// # Errors
    /// Fails like [`Variable::depends_on`], and with [`ConfigError::InvalidSchema`] when
    /// `expected` is not a valid value of `other`.
    pub fn depends_on_value<U: Value>(&self, other: &Variable<U>, expected: U) -> Result<(), ConfigError> {
        let schema = other.spec().schema();
        let literal = schema
            .validate(&expected)
            .and_then(|()| schema.marshal(&expected))
            .map_err(|e| ConfigError::InvalidSchema {
                message: format!("expected value of {} is invalid: {e}", other.spec().name()).into(),
                context: Some(self.spec().name().to_owned().into()),
            })?;
        self.depends_on_with(other, Some(literal), move |value: &U| *value == expected)
    }

    /// Makes this variable relevant only while `other` has a valid value, set explicitly or
    /// by default.
    ///
    /// # Errors
    /// See [`Variable::depends_on`].
    pub fn depends_on_presence<U: Value>(&self, other: &Variable<U>) -> Result<(), ConfigError> {
        self.depends_on_with(other, None, |_: &U| true)
    }

    fn depends_on_with<U: Value>(
        &self,
        other: &Variable<U>,
        expected: Option<Literal>,
        predicate: impl Fn(&U) -> bool + Send + Sync + 'static,
    ) -> Result<(), ConfigError> {
        let dependency = other.clone();
        let precondition: Precondition = Arc::new(move || dependency.gate(&predicate));
        link(
            RelationshipKind::DependsOn,
            self.spec().core(),
            other.spec().core(),
            expected,
            Some(precondition),
        )
    }
}
