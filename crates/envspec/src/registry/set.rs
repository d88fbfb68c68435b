use crate::error::ConfigError;
use crate::registry::{Registry, Validation, normalize_name};
use crate::variable::{AnyVariable, ValueError};
use fxhash::{FxHashMap, FxHashSet};
use std::collections::hash_map::Entry;
use std::sync::Arc;

/// Several independently authored registries, validated together.
///
/// A name may appear in more than one registry only when it is the same variable, i.e. it
/// was registered into several registries at once.
#[derive(Debug, Clone, Default)]
pub struct RegistrySet {
    registries: Vec<Registry>,
}

impl RegistrySet {
    #[must_use]
    pub const fn new() -> Self {
        Self { registries: Vec::new() }
    }

    /// Adds `registry`. Adding the same registry twice is a no-op.
    ///
    /// # Errors
    /// Returns [`ConfigError::DuplicateName`] when a different variable with an equivalent
    /// name is already part of the set.
    pub fn add(&mut self, registry: Registry) -> Result<(), ConfigError> {
        if self.registries.iter().any(|r| r.ptr_eq(&registry)) {
            return Ok(());
        }

        let known = self.by_name();
        for variable in registry.variables() {
            let key = normalize_name(variable.name());
            if let Some((owner, existing)) = known.get(&key)
                && existing.spec().id() != variable.spec().id()
            {
                return Err(duplicate(variable.name(), owner, &registry));
            }
        }

        self.registries.push(registry);
        Ok(())
    }

    /// Builder-style [`RegistrySet::add`].
    ///
    /// # Errors
    /// See [`RegistrySet::add`].
    pub fn with(mut self, registry: Registry) -> Result<Self, ConfigError> {
        self.add(registry)?;
        Ok(self)
    }

    #[must_use]
    pub fn registries(&self) -> &[Registry] {
        &self.registries
    }

    /// Every variable once, in registry order then declaration order.
    ///
    /// Member registries stay open for registration, so two distinct variables sharing a name
    /// can both be listed here; [`RegistrySet::check`] and [`RegistrySet::validate`] report
    /// them.
    #[must_use]
    pub fn variables(&self) -> Vec<Arc<dyn AnyVariable>> {
        let mut seen = FxHashSet::default();
        let mut variables = Vec::new();
        for registry in &self.registries {
            for variable in registry.variables() {
                if seen.insert(variable.spec().id()) {
                    variables.push(variable);
                }
            }
        }
        variables
    }

    /// Re-checks name uniqueness across the set, including variables registered after their
    /// registry was added.
    ///
    /// # Errors
    /// Returns [`ConfigError::DuplicateName`] for the first name declared by two distinct
    /// variables.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.conflicts().into_iter().next().map_or(Ok(()), |conflict| Err(conflict.error))
    }

    /// Validates every variable. Both variables of a name conflict are invalid, with a
    /// [`ValueError::Configuration`] error wrapping the duplicate.
    #[must_use]
    pub fn validate(&self) -> Validation {
        let mut validation = Validation::new(self.variables());
        for Conflict { names, error } in self.conflicts() {
            let error = ValueError::Configuration { source: error, context: None };
            for name in &names {
                validation.reject(name, &error);
            }
        }
        validation
    }

    fn conflicts(&self) -> Vec<Conflict> {
        let mut owners: FxHashMap<String, (&Registry, Arc<dyn AnyVariable>)> = FxHashMap::default();
        let mut conflicts = Vec::new();
        for registry in &self.registries {
            for variable in registry.variables() {
                match owners.entry(normalize_name(variable.name())) {
                    Entry::Vacant(slot) => {
                        slot.insert((registry, variable));
                    },
                    Entry::Occupied(slot) => {
                        let (owner, existing) = slot.get();
                        if existing.spec().id() != variable.spec().id() {
                            conflicts.push(Conflict {
                                names: [existing.name().to_owned(), variable.name().to_owned()],
                                error: duplicate(variable.name(), owner, registry),
                            });
                        }
                    },
                }
            }
        }
        conflicts
    }

    fn by_name(&self) -> FxHashMap<String, (&Registry, Arc<dyn AnyVariable>)> {
        self.registries
            .iter()
            .flat_map(|r| r.variables().into_iter().map(move |v| (normalize_name(v.name()), (r, v))))
            .collect()
    }
}

struct Conflict {
    names: [String; 2],
    error: ConfigError,
}

fn duplicate(name: &str, owner: &Registry, registry: &Registry) -> ConfigError {
    ConfigError::DuplicateName {
        message: format!("{name} is declared by both {} and {}", owner.key(), registry.key()).into(),
        context: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::MapEnv;
    use crate::registry::register;
    use crate::schema::StringSchema;
    use crate::spec::SpecBuilder;

    fn registry(key: &'static str, names: &[&'static str]) -> Registry {
        let registry = Registry::builder(key, key).lookup(MapEnv::new()).build();
        for &name in names {
            let spec = SpecBuilder::new(name, "x", StringSchema::<String>::new()).optional().build().unwrap();
            registry.register(spec).unwrap();
        }
        registry
    }

    #[test]
    fn same_name_in_two_registries_is_rejected() {
        let mut set = RegistrySet::new();
        set.add(registry("a", &["HOST", "PORT"])).unwrap();

        let err = set.add(registry("b", &["PORT"])).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName { .. }));
        assert!(err.to_string().contains("both a and b"));
        assert_eq!(set.registries().len(), 1);
    }

    #[test]
    fn late_registration_of_a_taken_name_is_reported() {
        let b = registry("b", &[]);
        let set = RegistrySet::new().with(registry("a", &["PORT"])).unwrap().with(b.clone()).unwrap();
        assert!(set.check().is_ok());

        let spec = SpecBuilder::new("PORT", "x", StringSchema::<String>::new()).optional().build().unwrap();
        b.register(spec).unwrap();

        let err = set.check().unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName { .. }));
        assert!(err.to_string().contains("both a and b"));

        let validation = set.validate();
        assert!(!validation.is_valid());
        assert_eq!(validation.invalid().count(), 2);
        assert!(validation.invalid().all(|f| matches!(
            f.error,
            Some(ValueError::Configuration { source: ConfigError::DuplicateName { .. }, .. })
        )));
    }

    #[test]
    fn shared_variable_is_allowed_and_listed_once() {
        let a = registry("a", &["HOST"]);
        let b = registry("b", &[]);
        let spec = SpecBuilder::new("PORT", "x", StringSchema::<String>::new()).optional().build().unwrap();
        register(spec, &[&a, &b]).unwrap();

        let set = RegistrySet::new().with(a.clone()).unwrap().with(b).unwrap().with(a).unwrap();
        assert_eq!(set.registries().len(), 2);
        let names: Vec<_> = set.variables().iter().map(|v| v.name().to_owned()).collect();
        assert_eq!(names, ["HOST", "PORT"]);
        assert!(set.validate().is_valid());
    }
}
