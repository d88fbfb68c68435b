use crate::literal::Literal;
use std::borrow::Cow;

/// Free-form documentation attached to a spec, for documentation generators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Documentation {
    pub summary: Option<String>,
    pub paragraphs: Vec<String>,
    /// Render the variable prominently, e.g. in a "read this first" section.
    pub important: bool,
}

impl Documentation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    #[must_use]
    pub fn paragraph(mut self, paragraph: impl Into<String>) -> Self {
        self.paragraphs.push(paragraph.into());
        self
    }

    #[must_use]
    pub const fn important(mut self) -> Self {
        self.important = true;
        self
    }

    pub(crate) fn merge(&mut self, other: Self) {
        if other.summary.is_some() {
            self.summary = other.summary;
        }
        self.paragraphs.extend(other.paragraphs);
        self.important |= other.important;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.paragraphs.is_empty() && !self.important
    }
}

/// An example value together with its literal.
///
/// Normative examples were declared by the author of the spec; the others are generated
/// from the schema bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Example<T> {
    pub value: T,
    pub literal: Literal,
    pub description: Cow<'static, str>,
    pub is_normative: bool,
}
