//! Application-facing views over one or more variables.
//!
//! A façade is what application code holds on to: it hides the individual variables behind a
//! single typed value and decides what "missing" means.
//!
//! | Façade          | Missing value         | Invalid value |
//! |-----------------|-----------------------|---------------|
//! | [`Required`]    | panic                 | panic         |
//! | [`Optional`]    | `None`                | panic         |
//! | [`Deprecated`]  | `None`                | panic         |
//!
//! A value suppressed by a `depends_on` precondition is missing, never invalid, even when the
//! literal in the environment would not parse. Every panicking accessor has a `try_` twin.

mod parts;

pub use parts::Parts;

use crate::schema::Value;
use crate::variable::{AnyVariable, Relevance, ValueError};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

type Resolver<T> = Arc<dyn Fn() -> Result<Option<T>, ValueError> + Send + Sync>;

/// Shared plumbing of the three façades.
struct Facade<T> {
    resolve: Resolver<T>,
    variables: Arc<[Arc<dyn AnyVariable>]>,
}

impl<T: Value> Facade<T> {
    fn new<P: Parts<Output = T>>(parts: P) -> Self {
        let variables = parts.variables().into();
        Self { resolve: Arc::new(move || parts.resolve()), variables }
    }

    fn map<U: Value>(self, f: impl Fn(T) -> U + Send + Sync + 'static) -> Facade<U> {
        let inner = self.resolve;
        Facade { resolve: Arc::new(move || inner().map(|v| v.map(&f))), variables: self.variables }
    }

    fn resolve(&self) -> Result<Option<T>, ValueError> {
        (self.resolve)()
    }

    /// Explains why a required composite has no value.
    fn missing(&self) -> ValueError {
        let names = || {
            let names: Vec<&str> = self.variables.iter().map(|v| v.name()).collect();
            Cow::Owned(names.join(", "))
        };
        let gated = self.variables.iter().find_map(|v| match v.relevance() {
            Relevance::Irrelevant { because } => Some(because),
            Relevance::Relevant => None,
        });
        match gated {
            Some(because) => ValueError::Irrelevant { name: names(), dependency: Cow::Owned(because.to_string()) },
            None => ValueError::Undefined { name: names() },
        }
    }

    #[track_caller]
    fn expect_valid(&self) -> Option<T> {
        match self.resolve() {
            Ok(value) => value,
            Err(err) => fail(&err),
        }
    }
}

impl<T> Clone for Facade<T> {
    fn clone(&self) -> Self {
        Self { resolve: Arc::clone(&self.resolve), variables: Arc::clone(&self.variables) }
    }
}

impl<T> fmt::Debug for Facade<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.variables.iter().map(|v| v.name())).finish()
    }
}

#[track_caller]
fn fail(err: &ValueError) -> ! {
    panic!("{err}")
}

macro_rules! facade {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name<T>(Facade<T>);

        impl<T: Value> $name<T> {
            pub fn new<P: Parts<Output = T>>(parts: P) -> Self {
                Self(Facade::new(parts))
            }

            /// Converts the combined value into the application's own type.
            #[must_use]
            pub fn map<U: Value>(self, f: impl Fn(T) -> U + Send + Sync + 'static) -> $name<U> {
                $name(self.0.map(f))
            }

            /// The constituent variables, for reporters.
            #[must_use]
            pub fn variables(&self) -> &[Arc<dyn AnyVariable>] {
                &self.0.variables
            }
        }

        impl<T> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.0).finish()
            }
        }
    };
}

facade! {
    /// A value the application cannot run without.
    ///
    /// ```
    /// use envspec::{MapEnv, NumericSchema, Registry, Required, SpecBuilder, StringSchema};
    ///
    /// let env = MapEnv::new();
    /// env.set("DB_HOST", "db.internal").set("DB_PORT", "5432");
    /// let registry = Registry::builder("db", "Database").lookup(env).build();
    ///
    /// let host = SpecBuilder::new("DB_HOST", "Database host", StringSchema::<String>::new());
    /// let port = SpecBuilder::new("DB_PORT", "Database port", NumericSchema::<u16>::new());
    /// let address = Required::new((
    ///     registry.register(host.build()?)?,
    ///     registry.register(port.build()?)?,
    /// ))
    /// .map(|(host, port)| format!("{host}:{port}"));
    ///
    /// assert_eq!(address.value(), "db.internal:5432");
    /// # Ok::<(), envspec::ConfigError>(())
    /// ```
    Required
}

impl<T: Value> Required<T> {
    /// # Panics
    /// When any constituent is invalid, or when no value is available.
    #[must_use]
    #[track_caller]
    pub fn value(&self) -> T {
        match self.try_value() {
            Ok(value) => value,
            Err(err) => fail(&err),
        }
    }

    /// # Errors
    /// The first constituent error, [`ValueError::Incomplete`] for a partially set composite,
    /// [`ValueError::Irrelevant`] when a precondition suppressed the value and
    /// [`ValueError::Undefined`] otherwise.
    pub fn try_value(&self) -> Result<T, ValueError> {
        self.0.resolve()?.ok_or_else(|| self.0.missing())
    }
}

facade! {
    /// A value the application can run without.
    Optional
}

impl<T: Value> Optional<T> {
    /// `None` when nothing is set or the value is gated out by a precondition.
    ///
    /// # Panics
    /// When any constituent is invalid, or a composite is only partially set.
    #[must_use]
    #[track_caller]
    pub fn value(&self) -> Option<T> {
        self.0.expect_valid()
    }

    /// # Errors
    /// The first constituent error, or [`ValueError::Incomplete`].
    pub fn try_value(&self) -> Result<Option<T>, ValueError> {
        self.0.resolve()
    }
}

facade! {
    /// An optional value kept for backwards compatibility. Explicit settings are reported
    /// as needing attention.
    Deprecated
}

impl<T: Value> Deprecated<T> {
    /// # Panics
    /// When any constituent is invalid, or a composite is only partially set.
    #[must_use]
    #[track_caller]
    pub fn deprecated_value(&self) -> Option<T> {
        self.0.expect_valid()
    }

    /// # Errors
    /// The first constituent error, or [`ValueError::Incomplete`].
    pub fn try_deprecated_value(&self) -> Result<Option<T>, ValueError> {
        self.0.resolve()
    }
}
