//! Declarative, strongly-typed environment variable specifications.
//!
//! Applications declare every environment variable they read as a [`Spec`]: a name, a
//! description, a [`Necessity`], a [`Schema`] with a marshaler for the native type, optional
//! constraints, a default and examples. Registering a spec in a [`Registry`] yields a
//! [`Variable`], which resolves lazily and exactly once against the environment.
//!
//! ## Resolution
//!
//! A variable's value comes from one of three places, reported as its [`Availability`]:
//! the environment (`Explicit`), the spec's default (`Default`), or nowhere (`None`). An empty
//! environment value is the same as an unset one. Explicit literals are unmarshaled, checked
//! against the schema and then against each constraint; the first failure is cached as the
//! variable's [`ValueError`] and handed out on every read.
//!
//! `DependsOn` relationships gate relevance: a variable whose precondition is not met is
//! [`Relevance::Irrelevant`] and its environment value is ignored entirely, even when it
//! would not parse.
//!
//! ## Errors
//!
//! Two families never mix:
//!
//! * [`ConfigError`]: misuse of the declaration API, raised by [`SpecBuilder::build`],
//!   relationship linking and registration. Treat it as a programming error.
//! * [`ValueError`]: the environment does not satisfy a spec. Collected per variable and
//!   summarised by [`Registry::validate`].
//!
//! ## Sensitive values
//!
//! Literals of specs marked [`SpecBuilder::sensitive`] are replaced by [`REDACTED`] in every
//! error message, finding and log event.
//!
//! ## Examples
//!
//! ```rust
//! use envspec::prelude::*;
//!
//! # fn main() -> Result<(), ConfigError> {
//! let env = MapEnv::new();
//! env.set("APP_PORT", "8080");
//! let registry = Registry::builder("app", "Example application").lookup(env).build();
//!
//! let port = registry.register(
//!     SpecBuilder::new("APP_PORT", "TCP port to listen on", NumericSchema::<u16>::new().min(1024))
//!         .default_value(3000)
//!         .build()?,
//! )?;
//! let workers = registry.register(
//!     SpecBuilder::new("APP_WORKERS", "Worker threads", NumericSchema::<usize>::new().min(1))
//!         .optional()
//!         .build()?,
//! )?;
//!
//! assert_eq!(Required::new(port.clone()).value(), 8080);
//! assert_eq!(port.availability(), Availability::Explicit);
//! assert_eq!(Optional::new(workers).value(), None);
//! assert!(registry.validate().is_valid());
//! # Ok(())
//! # }
//! ```

pub mod constraint;
pub mod error;
pub mod facade;
pub mod literal;
pub mod lookup;
pub mod registry;
pub mod relationship;
pub mod schema;
pub mod spec;
pub mod variable;

pub use constraint::Constraint;
pub use error::{ConfigError, ConfigErrorExt};
pub use facade::{Deprecated, Optional, Parts, Required};
pub use literal::{Literal, REDACTED};
pub use lookup::{Lookup, MapEnv, ProcessEnv};
pub use registry::{
    Finding, Registry, RegistryBuilder, RegistrySet, Validation, default_registry, register,
};
pub use relationship::{Relationship, RelationshipKind, SpecRef};
pub use schema::{
    BinaryEncoding, BinarySchema, NumericSchema, OtherSchema, Schema, SchemaError, SetSchema,
    StringSchema, Value,
};
pub use spec::{AnySpec, Documentation, Example, Necessity, Spec, SpecBuilder, SpecId};
pub use variable::{
    AnyVariable, Attention, Availability, Relevance, ValueError, ValueErrorExt, Variable,
};

/// The declaration API in one import.
pub mod prelude {
    pub use crate::constraint::Constraint;
    pub use crate::error::ConfigError;
    pub use crate::facade::{Deprecated, Optional, Required};
    pub use crate::lookup::MapEnv;
    pub use crate::registry::{Registry, RegistrySet, register};
    pub use crate::schema::{
        BinaryEncoding, BinarySchema, NumericSchema, OtherSchema, SetSchema, StringSchema,
    };
    pub use crate::spec::{Necessity, SpecBuilder};
    pub use crate::variable::{Availability, Relevance, ValueError, Variable};
}
