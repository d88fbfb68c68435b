//! # Registries
//!
//! A [`Registry`] owns the variables of one application or library and guarantees that no
//! two of them share a name. Registration belongs to program initialisation: declare
//! everything, then resolve.
//!
//! Names are compared after [`normalize_name`], which folds case on Windows where the
//! environment itself is case-insensitive.

pub mod set;
pub mod validation;

pub use set::RegistrySet;
pub use validation::{Finding, Validation};

use crate::error::ConfigError;
use crate::lookup::{Lookup, ProcessEnv};
use crate::schema::Value;
use crate::spec::Spec;
use crate::variable::{AnyVariable, Variable};
use fxhash::FxHashMap;
use parking_lot::{RwLock, RwLockWriteGuard};
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::debug;

static DEFAULT_REGISTRY: LazyLock<Registry> =
    LazyLock::new(|| Registry::new("default", "Default registry"));

/// The process-wide registry used by [`register`] when no registry is named.
///
/// Tests should prefer a fresh [`Registry`]; those that must use this one should call
/// [`Registry::reset`] and run serially.
pub fn default_registry() -> &'static Registry {
    &DEFAULT_REGISTRY
}

/// Key under which a name is unique.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    if cfg!(windows) { name.to_uppercase() } else { name.to_owned() }
}

#[derive(Default)]
struct Entries {
    ordered: Vec<Arc<dyn AnyVariable>>,
    index: FxHashMap<String, usize>,
}

impl Entries {
    fn insert(&mut self, key: String, variable: Arc<dyn AnyVariable>) {
        self.index.insert(key, self.ordered.len());
        self.ordered.push(variable);
    }
}

struct RegistryInner {
    key: Cow<'static, str>,
    name: Cow<'static, str>,
    url: Option<Cow<'static, str>>,
    lookup: Arc<dyn Lookup>,
    entries: RwLock<Entries>,
}

/// A named collection of variables with unique names. Cloning is cheap and shares state.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

/// Builder for [`Registry`].
#[derive(Debug)]
pub struct RegistryBuilder {
    key: Cow<'static, str>,
    name: Cow<'static, str>,
    url: Option<Cow<'static, str>>,
    lookup: Option<Arc<dyn Lookup>>,
}

impl RegistryBuilder {
    /// Project or documentation URL shown by reporters.
    #[must_use]
    pub fn url(mut self, url: impl Into<Cow<'static, str>>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Environment source for variables registered here. Defaults to [`ProcessEnv`].
    #[must_use]
    pub fn lookup(mut self, lookup: impl Lookup + 'static) -> Self {
        self.lookup = Some(Arc::new(lookup));
        self
    }

    #[must_use]
    pub fn shared_lookup(mut self, lookup: Arc<dyn Lookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    #[must_use]
    pub fn build(self) -> Registry {
        Registry {
            inner: Arc::new(RegistryInner {
                key: self.key,
                name: self.name,
                url: self.url,
                lookup: self.lookup.unwrap_or_else(|| Arc::new(ProcessEnv)),
                entries: RwLock::new(Entries::default()),
            }),
        }
    }
}

impl Registry {
    /// # Examples
    /// ```rust
    /// use envspec::{MapEnv, Registry};
    ///
    /// let registry = Registry::builder("billing", "Billing service")
    ///     .url("https://example.com/billing")
    ///     .lookup(MapEnv::new())
    ///     .build();
    /// assert!(registry.is_empty());
    /// ```
    pub fn builder(
        key: impl Into<Cow<'static, str>>,
        name: impl Into<Cow<'static, str>>,
    ) -> RegistryBuilder {
        RegistryBuilder { key: key.into(), name: name.into(), url: None, lookup: None }
    }

    /// A registry reading the process environment.
    pub fn new(key: impl Into<Cow<'static, str>>, name: impl Into<Cow<'static, str>>) -> Self {
        Self::builder(key, name).build()
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.inner.url.as_deref()
    }

    #[must_use]
    pub fn lookup(&self) -> &Arc<dyn Lookup> {
        &self.inner.lookup
    }

    /// Binds `spec` to this registry's lookup and registers it.
    ///
    /// # Errors
    /// Returns [`ConfigError::DuplicateName`] when an equivalent name is already registered.
    /// A duplicate never panics and leaves the registry unchanged.
    pub fn register<T: Value>(&self, spec: Spec<T>) -> Result<Variable<T>, ConfigError> {
        register(spec, &[self])
    }

    /// Looks a variable up by name, after normalisation.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn AnyVariable>> {
        let entries = self.inner.entries.read();
        entries.index.get(&normalize_name(name)).map(|&i| Arc::clone(&entries.ordered[i]))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.entries.read().index.contains_key(&normalize_name(name))
    }

    /// Variables in declaration order.
    #[must_use]
    pub fn variables(&self) -> Vec<Arc<dyn AnyVariable>> {
        self.inner.entries.read().ordered.clone()
    }

    /// Variables sorted by name, for deterministic reports.
    #[must_use]
    pub fn variables_by_name(&self) -> Vec<Arc<dyn AnyVariable>> {
        let mut variables = self.variables();
        variables.sort_by(|a, b| a.name().cmp(b.name()));
        variables
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.read().ordered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discards every registered variable. Variables already handed out keep working.
    pub fn reset(&self) {
        let mut entries = self.inner.entries.write();
        let discarded = entries.ordered.len();
        *entries = Entries::default();
        debug!(registry = %self.inner.key, discarded, "registry reset");
    }

    /// Resolves every variable and summarises the outcome.
    #[must_use]
    pub fn validate(&self) -> Validation {
        Validation::new(self.variables())
    }

    /// Shorthand for `self.validate().is_valid()`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.variables().iter().all(|v| v.is_valid())
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.inner).addr()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("key", &self.inner.key)
            .field("name", &self.inner.name)
            .field("url", &self.inner.url)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Registers `spec` in every registry of `registries`, or in the [`default_registry`]
/// when the slice is empty.
///
/// The variable reads the environment through the first registry's lookup. Either every
/// registry accepts the variable or none does.
///
/// # Errors
/// Returns [`ConfigError::DuplicateName`] when any target already has an equivalent name.
/// A duplicate never panics and no registry is modified.
///
/// # Examples
/// ```rust
/// use envspec::{MapEnv, NumericSchema, Registry, SpecBuilder, register};
///
/// let env = MapEnv::new();
/// env.set("WORKERS", "4");
/// let registry = Registry::builder("app", "App").lookup(env).build();
///
/// let spec = SpecBuilder::new("WORKERS", "Worker threads", NumericSchema::<u8>::new()).build()?;
/// let workers = register(spec, &[&registry])?;
/// assert_eq!(workers.value()?, Some(4));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn register<T: Value>(spec: Spec<T>, registries: &[&Registry]) -> Result<Variable<T>, ConfigError> {
    let mut targets: Vec<&Registry> = Vec::with_capacity(registries.len().max(1));
    if registries.is_empty() {
        targets.push(default_registry());
    }
    for &registry in registries {
        if !targets.iter().any(|t| t.ptr_eq(registry)) {
            targets.push(registry);
        }
    }
    let lookup = Arc::clone(&targets[0].inner.lookup);

    // Lock in address order so concurrent multi-registry registrations cannot deadlock.
    targets.sort_by_key(|r| r.address());
    let mut guards: Vec<(&Registry, RwLockWriteGuard<'_, Entries>)> =
        targets.iter().map(|r| (*r, r.inner.entries.write())).collect();

    let key = normalize_name(spec.name());
    if let Some((registry, _)) = guards.iter().find(|(_, entries)| entries.index.contains_key(&key)) {
        return Err(ConfigError::DuplicateName {
            message: format!("{} is already registered", spec.name()).into(),
            context: Some(registry.inner.key.clone()),
        });
    }

    let variable = Variable::new(spec, lookup);
    let erased = variable.erased();
    for (registry, entries) in &mut guards {
        entries.insert(key.clone(), Arc::clone(&erased));
        debug!(registry = %registry.inner.key, name = variable.name(), "variable registered");
    }
    Ok(variable)
}
