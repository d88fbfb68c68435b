//! One-shot resolution of a variable: preconditions, lookup, default, unmarshal, constraints.

use crate::error::ConfigError;
use crate::literal::Literal;
use crate::lookup::Lookup;
use crate::relationship::{Gate, Precondition, RelationshipKind};
use crate::schema::Value;
use crate::spec::{Necessity, Spec, SpecId};
use crate::variable::error::ValueError;
use crate::variable::{Availability, Relevance};
use fxhash::FxHashMap;
use std::borrow::Cow;
use std::cell::RefCell;
use std::sync::Arc;
use tracing::{debug, trace, warn};

thread_local! {
    /// Specs whose resolution is running on this thread, flagged once something re-entered it.
    static IN_PROGRESS: RefCell<FxHashMap<SpecId, bool>> = RefCell::new(FxHashMap::default());
}

struct InProgress(SpecId);

impl InProgress {
    fn enter(id: SpecId) -> Self {
        IN_PROGRESS.with_borrow_mut(|ids| ids.insert(id, false));
        Self(id)
    }

    fn was_reentered(&self) -> bool {
        IN_PROGRESS.with_borrow(|ids| ids.get(&self.0).copied().unwrap_or(false))
    }
}

impl Drop for InProgress {
    fn drop(&mut self) {
        IN_PROGRESS.with_borrow_mut(|ids| ids.remove(&self.0));
    }
}

pub(crate) fn is_in_progress(id: SpecId) -> bool {
    IN_PROGRESS.with_borrow(|ids| ids.contains_key(&id))
}

/// The outcome handed to a read of `spec` from within its own resolution. The resolution in
/// progress is failed with the same error once it completes.
pub(crate) fn reentered<T: Value>(spec: &Spec<T>) -> Resolution<T> {
    IN_PROGRESS.with_borrow_mut(|ids| {
        if let Some(flag) = ids.get_mut(&spec.id()) {
            *flag = true;
        }
    });
    Resolution::failed(cycle(spec.name(), spec.name()))
}

fn cycle(reentered: &str, resolving: &str) -> ValueError {
    let source = ConfigError::Cycle {
        message: format!("{reentered} was re-entered while resolving {resolving}").into(),
        context: None,
    };
    ValueError::Configuration { source, context: Some(resolving.to_owned().into()) }
}

/// The cached outcome of resolving a variable.
#[derive(Debug)]
pub(crate) struct Resolution<T> {
    pub(crate) availability: Availability,
    pub(crate) relevance: Relevance,
    pub(crate) literal: Option<Literal>,
    /// The parsed value, kept even when a constraint rejected it.
    pub(crate) value: Option<T>,
    pub(crate) error: Option<ValueError>,
}

impl<T> Resolution<T> {
    const fn absent() -> Self {
        Self {
            availability: Availability::None,
            relevance: Relevance::Relevant,
            literal: None,
            value: None,
            error: None,
        }
    }

    fn irrelevant(because: Arc<str>) -> Self {
        Self { relevance: Relevance::Irrelevant { because }, ..Self::absent() }
    }

    fn failed(error: ValueError) -> Self {
        Self { error: Some(error), ..Self::absent() }
    }
}

pub(crate) fn resolve<T: Value>(spec: &Spec<T>, lookup: &dyn Lookup) -> Resolution<T> {
    let guard = InProgress::enter(spec.id());
    spec.seal();

    let mut resolution = evaluate(spec, lookup);
    if guard.was_reentered() {
        resolution.error = Some(cycle(spec.name(), spec.name()));
    }
    report(spec, &resolution);
    resolution
}

fn evaluate<T: Value>(spec: &Spec<T>, lookup: &dyn Lookup) -> Resolution<T> {
    if let Some(gated) = check_preconditions(spec) {
        return gated;
    }

    match lookup.lookup(spec.name()).filter(|raw| !raw.is_empty()) {
        Some(raw) => explicit(spec, raw),
        None => match (spec.default_value(), spec.default_literal()) {
            (Some(value), Some(literal)) => Resolution {
                availability: Availability::Default,
                literal: Some(literal.clone()),
                value: Some(value.clone()),
                ..Resolution::absent()
            },
            _ => Resolution::absent(),
        },
    }
}

/// Evaluates the `DependsOn` preconditions in declaration order; the first closed gate wins.
fn check_preconditions<T: Value>(spec: &Spec<T>) -> Option<Resolution<T>> {
    let id = spec.id();
    let gates: Vec<(Arc<str>, Precondition)> = spec.core().meta.read(|meta| {
        meta.relationships
            .iter()
            .filter(|r| r.kind() == RelationshipKind::DependsOn && r.subject().id() == id)
            .filter_map(|r| r.precondition().map(|p| (r.object().shared_name(), Arc::clone(p))))
            .collect()
    });

    for (dependency, precondition) in gates {
        match precondition() {
            Gate::Open => {},
            Gate::Closed => return Some(Resolution::irrelevant(dependency)),
            Gate::Reentered => return Some(Resolution::failed(cycle(&dependency, spec.name()))),
        }
    }
    None
}

/// Sensitive variables never carry input-derived text in their errors: schema errors are
/// redacted and constraint messages fall back to the constraint description.
fn explicit<T: Value>(spec: &Spec<T>, raw: String) -> Resolution<T> {
    let name = || Cow::Owned(spec.name().to_owned());
    let sensitive = spec.is_sensitive();
    let verbatim = Literal::new(raw);
    let shown = Cow::Owned(verbatim.display(sensitive));

    let value = match spec.schema().unmarshal(&verbatim) {
        Ok(value) => value,
        Err(source) => {
            return Resolution {
                availability: Availability::Explicit,
                literal: Some(verbatim),
                ..Resolution::failed(ValueError::Schema {
                    name: name(),
                    literal: shown,
                    source: if sensitive { spec.schema().redact(source) } else { source },
                    context: None,
                })
            };
        },
    };

    let literal = match spec.schema().marshal(&value) {
        Ok(canonical) => Literal::with_canonical(verbatim.verbatim(), canonical.canonical()),
        Err(_) => verbatim,
    };
    let error = spec.constraints().iter().find_map(|constraint| {
        constraint.check(&value).err().map(|message| ValueError::Constraint {
            name: name(),
            literal: shown.clone(),
            description: Cow::Owned(constraint.description().to_owned()),
            message: if sensitive {
                Cow::Owned(constraint.description().to_owned())
            } else {
                message.into()
            },
        })
    });

    Resolution {
        availability: Availability::Explicit,
        relevance: Relevance::Relevant,
        literal: Some(literal),
        value: Some(value),
        error,
    }
}

fn report<T: Value>(spec: &Spec<T>, resolution: &Resolution<T>) {
    debug!(
        name = spec.name(),
        availability = %resolution.availability,
        relevant = resolution.relevance.is_relevant(),
        error = resolution.error.as_ref().map(ValueError::variant_name),
        "variable resolved"
    );
    if !spec.is_sensitive()
        && let Some(literal) = &resolution.literal
    {
        trace!(name = spec.name(), literal = %literal.quote(), canonical = literal.is_canonical());
    }
    if spec.necessity() == Necessity::Deprecated && resolution.availability == Availability::Explicit
    {
        warn!(name = spec.name(), "deprecated variable is set");
    }
}
