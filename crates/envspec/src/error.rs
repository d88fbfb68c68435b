//! # Configuration Errors
//!
//! [`ConfigError`] signals misuse of the declaration API: an invalid name, a default that
//! violates its own schema, a relationship cycle, a mutation after sealing, a duplicate
//! registration. These are programming errors detected while the application declares its
//! variables, never while it reads them.

use std::borrow::Cow;

/// Build-time errors raised by spec builders, relationship linking and registries.
#[envspec_derive::envspec_error]
#[derive(Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The variable name is empty.
    #[error("Empty variable name{}: {message}", format_context(.context))]
    EmptyName { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The variable name contains characters that cannot appear in an environment key.
    #[error("Invalid variable name{}: {message}", format_context(.context))]
    InvalidName { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The variable has no human-readable description.
    #[error("Missing description{}: {message}", format_context(.context))]
    EmptyDescription { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The schema itself is inconsistent, e.g. `min > max`.
    #[error("Invalid schema{}: {message}", format_context(.context))]
    InvalidSchema { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The default value does not satisfy the schema or the constraints.
    #[error("Invalid default value{}: {message}", format_context(.context))]
    InvalidDefault { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A declared example does not satisfy the schema or the constraints.
    #[error("Invalid example{}: {message}", format_context(.context))]
    InvalidExample { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Two set members share the same literal.
    #[error("Duplicate set literal{}: {message}", format_context(.context))]
    DuplicateLiteral { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The spec was modified after its value had been used.
    #[error("Sealed spec{}: {message}", format_context(.context))]
    Sealed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A variable with an equivalent name is already registered.
    #[error("Duplicate variable{}: {message}", format_context(.context))]
    DuplicateName { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A `DependsOn` relationship would close a cycle.
    #[error("Relationship cycle{}: {message}", format_context(.context))]
    Cycle { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal configuration error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
