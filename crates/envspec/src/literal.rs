//! String forms of a variable value.

use std::fmt;

/// Placeholder shown instead of the value of a sensitive variable.
pub const REDACTED: &str = "[redacted]";

/// The textual form of a value.
///
/// `verbatim` is exactly what was found in the environment (or produced for a default),
/// `canonical` is the rendering of the unmarshaled native value. The two may differ, e.g.
/// `"007"` and `"7"`; the difference is reported but is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Literal {
    verbatim: String,
    canonical: String,
}

impl Literal {
    /// A literal whose verbatim and canonical forms are the same string.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self { canonical: value.clone(), verbatim: value }
    }

    pub fn with_canonical(verbatim: impl Into<String>, canonical: impl Into<String>) -> Self {
        Self { verbatim: verbatim.into(), canonical: canonical.into() }
    }

    #[must_use]
    pub fn verbatim(&self) -> &str {
        &self.verbatim
    }

    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Returns `true` when the value was written in its canonical form.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.verbatim == self.canonical
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.verbatim.is_empty()
    }

    /// Shell-quoted verbatim form, suitable for error messages and documentation.
    #[must_use]
    pub fn quote(&self) -> String {
        quote(&self.verbatim)
    }

    /// Quoted verbatim form, or [`REDACTED`] for sensitive values.
    #[must_use]
    pub fn display(&self, sensitive: bool) -> String {
        if sensitive { REDACTED.to_owned() } else { self.quote() }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.verbatim)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Quotes `value` for a POSIX shell.
///
/// Values made only of characters that never need escaping are returned as-is; everything
/// else is wrapped in single quotes, with embedded single quotes written as `'\''`.
#[must_use]
pub fn quote(value: &str) -> String {
    if value.is_empty() {
        return "''".to_owned();
    }
    if value.chars().all(is_shell_safe) {
        return value.to_owned();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}

const fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, '_' | '-' | '.' | '/' | ':' | '@' | '%' | '+' | ',' | '=')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_difference_is_detected() {
        let literal = Literal::with_canonical("007", "7");
        assert!(!literal.is_canonical());
        assert_eq!(literal.to_string(), "007");
        assert!(Literal::new("7").is_canonical());
    }

    #[test]
    fn quoting() {
        assert_eq!(quote(""), "''");
        assert_eq!(quote("localhost:8080"), "localhost:8080");
        assert_eq!(quote("hello world"), "'hello world'");
        assert_eq!(quote("it's"), "'it'\\''s'");
    }

    #[test]
    fn sensitive_values_are_masked() {
        let literal = Literal::new("hunter2");
        assert_eq!(literal.display(true), REDACTED);
        assert_eq!(literal.display(false), "hunter2");
    }
}
