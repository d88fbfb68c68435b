//! The single seam through which the engine reads the outside world.

use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::fmt::Debug;
use std::sync::Arc;

/// Looks up the raw value of an environment variable.
///
/// An empty value and an absent value are treated identically by the engine, so
/// implementations may return either.
pub trait Lookup: Send + Sync + Debug {
    fn lookup(&self, name: &str) -> Option<String>;
}

/// The real process environment.
///
/// Values that are not valid UTF-8 are converted lossily.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl Lookup for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
    }
}

/// An in-memory environment for hermetic tests.
///
/// Clones share the same underlying map, so a test can keep a handle and modify the
/// environment after handing a copy to a [`Registry`](crate::Registry).
#[derive(Debug, Default, Clone)]
pub struct MapEnv {
    vars: Arc<RwLock<FxHashMap<String, String>>>,
}

impl MapEnv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) -> &Self {
        self.vars.write().insert(name.into(), value.into());
        self
    }

    pub fn remove(&self, name: &str) -> Option<String> {
        self.vars.write().remove(name)
    }

    pub fn clear(&self) {
        self.vars.write().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.read().len()
    }
}

impl Lookup for MapEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        self.vars.read().get(name).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let vars = iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { vars: Arc::new(RwLock::new(vars)) }
    }
}
