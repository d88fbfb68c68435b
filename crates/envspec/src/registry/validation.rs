use crate::spec::Necessity;
use crate::variable::{AnyVariable, Attention, Availability, Relevance, ValueError};
use std::fmt;
use std::sync::Arc;

/// The resolved state of one variable, ready for a reporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub name: String,
    pub necessity: Necessity,
    pub availability: Availability,
    pub relevance: Relevance,
    /// Quoted literal in use, or the redaction mask for sensitive variables.
    pub literal: Option<String>,
    pub error: Option<ValueError>,
    pub attention: Vec<Attention>,
}

impl Finding {
    fn new(variable: &dyn AnyVariable) -> Self {
        let sensitive = variable.spec().is_sensitive();
        Self {
            name: variable.name().to_owned(),
            necessity: variable.spec().necessity(),
            availability: variable.availability(),
            relevance: variable.relevance(),
            literal: variable.literal().map(|l| l.display(sensitive)),
            error: variable.error(),
            attention: variable.attention(),
        }
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    #[must_use]
    pub fn needs_attention(&self) -> bool {
        !self.attention.is_empty()
    }
}

/// Outcome of validating a set of variables, sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Validation {
    findings: Vec<Finding>,
}

impl Validation {
    pub(crate) fn new(variables: Vec<Arc<dyn AnyVariable>>) -> Self {
        let mut findings: Vec<Finding> = variables.iter().map(|v| Finding::new(v.as_ref())).collect();
        findings.sort_by(|a, b| a.name.cmp(&b.name));
        Self { findings }
    }

    /// Marks every finding named `name` as invalid with `error`.
    pub(crate) fn reject(&mut self, name: &str, error: &ValueError) {
        for finding in self.findings.iter_mut().filter(|f| f.name == name) {
            finding.error = Some(error.clone());
        }
    }

    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// `false` iff at least one variable is invalid, including required variables
    /// that are not set.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.findings.iter().all(Finding::is_valid)
    }

    pub fn invalid(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| !f.is_valid())
    }

    pub fn needing_attention(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.needs_attention())
    }
}

/// One line per invalid variable, then one per attention flag.
impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for finding in self.invalid() {
            if let Some(err) = &finding.error {
                writeln!(f, "{}: {err}", finding.name)?;
            }
        }
        for finding in self.needing_attention() {
            for flag in &finding.attention {
                writeln!(f, "{}: {flag}", finding.name)?;
            }
        }
        Ok(())
    }
}
