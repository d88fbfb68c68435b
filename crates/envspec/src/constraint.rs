//! Predicates layered on top of a schema.

use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

type CheckFn<T> = Arc<dyn Fn(&T) -> Result<(), String> + Send + Sync>;

/// An additional rule a value must satisfy after it has been unmarshaled.
///
/// Constraints run in declaration order and the first failure wins. A constraint may have
/// side effects (e.g. filesystem checks); resolution guarantees it runs at most once per
/// variable.
pub struct Constraint<T> {
    description: Cow<'static, str>,
    is_user_defined: bool,
    check: CheckFn<T>,
}

impl<T: 'static> Constraint<T> {
    /// A user constraint whose check returns an error message on failure.
    pub fn new(
        description: impl Into<Cow<'static, str>>,
        check: impl Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self { description: description.into(), is_user_defined: true, check: Arc::new(check) }
    }

    /// A user constraint from a boolean predicate. The description doubles as the message.
    pub fn predicate(
        description: impl Into<Cow<'static, str>>,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        let description = description.into();
        let message = description.to_string();
        Self {
            description,
            is_user_defined: true,
            check: Arc::new(move |v: &T| if predicate(v) { Ok(()) } else { Err(message.clone()) }),
        }
    }

    fn builtin(
        description: &'static str,
        check: impl Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self { description: Cow::Borrowed(description), is_user_defined: false, check: Arc::new(check) }
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn is_user_defined(&self) -> bool {
        self.is_user_defined
    }

    /// Runs the check.
    ///
    /// # Errors
    /// Returns the failure message produced by the check.
    pub fn check(&self, value: &T) -> Result<(), String> {
        (self.check)(value)
    }
}

impl<T: AsRef<Path> + 'static> Constraint<T> {
    /// The value must name an existing directory.
    #[must_use]
    pub fn directory_exists() -> Self {
        Self::builtin("must be an existing directory", |v: &T| {
            let path = v.as_ref();
            match path.metadata() {
                Ok(meta) if meta.is_dir() => Ok(()),
                Ok(_) => Err(format!("{} is not a directory", path.display())),
                Err(err) => Err(format!("{}: {err}", path.display())),
            }
        })
    }

    /// The value must name an existing regular file.
    #[must_use]
    pub fn file_exists() -> Self {
        Self::builtin("must be an existing file", |v: &T| {
            let path = v.as_ref();
            match path.metadata() {
                Ok(meta) if meta.is_file() => Ok(()),
                Ok(_) => Err(format!("{} is not a regular file", path.display())),
                Err(err) => Err(format!("{}: {err}", path.display())),
            }
        })
    }
}

impl<T> Clone for Constraint<T> {
    fn clone(&self) -> Self {
        Self {
            description: self.description.clone(),
            is_user_defined: self.is_user_defined,
            check: Arc::clone(&self.check),
        }
    }
}

impl<T> fmt::Debug for Constraint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("description", &self.description)
            .field("is_user_defined", &self.is_user_defined)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn predicate_uses_description_as_message() {
        let even = Constraint::predicate("must be even", |v: &u32| v % 2 == 0);
        assert!(even.check(&4).is_ok());
        assert_eq!(even.check(&3).unwrap_err(), "must be even");
        assert!(even.is_user_defined());
    }

    #[test]
    fn directory_exists() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();

        let constraint = Constraint::<PathBuf>::directory_exists();
        assert!(!constraint.is_user_defined());
        assert!(constraint.check(&dir.path().to_path_buf()).is_ok());
        assert!(constraint.check(&file).unwrap_err().contains("is not a directory"));
        assert!(constraint.check(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();

        let constraint = Constraint::<PathBuf>::file_exists();
        assert!(constraint.check(&file).is_ok());
        assert!(constraint.check(&dir.path().to_path_buf()).is_err());
    }
}
