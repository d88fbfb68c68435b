#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the envspec workspace.
//!
//! The engine reports three error families (build-time configuration errors,
//! schema violations and per-variable resolution errors). All of them are
//! declared through [`macro@envspec_error`] so they share one shape: named
//! fields, an optional `context` slot and a stable variant name for reporters.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for the error enums of the envspec engine.
///
/// # Injected Behaviors
///
/// * **Derives**: `Debug` and `thiserror::Error` unless already derived.
/// * **Context**: a companion `<ErrorName>Ext` trait adding `.context(...)` to
///   `Result<T, ErrorName>`. Variants without a `context` field pass through untouched.
/// * **Variant names**: an inherent `variant_name(&self) -> &'static str` so reporters
///   can group errors by kind without matching on the enum.
/// * **Conversions**: `From<Source>` for variants whose only fields are `source` and
///   `context`, plus `From<&'static str>`/`From<String>` when an `Internal` variant exists.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum**.
/// 2. Every variant uses named fields; tuple and unit variants are rejected.
/// 3. `context`, when present, is typed `Option<Cow<'static, str>>`.
/// 4. A variant carrying a `source` (or `#[source]`/`#[from]`) field must carry `context` too.
///
/// # Example
///
/// ```rust,ignore
/// use envspec_derive::envspec_error;
/// use std::borrow::Cow;
///
/// #[envspec_error]
/// pub enum LookupError {
///     #[error("Unreadable variable{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Variable {name} is not defined")]
///     Undefined { name: Cow<'static, str> },
/// }
///
/// let err = LookupError::Undefined { name: "PORT".into() };
/// assert_eq!(err.variant_name(), "Undefined");
/// ```
#[proc_macro_attribute]
pub fn envspec_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}
