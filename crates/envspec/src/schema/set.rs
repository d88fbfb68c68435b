use crate::error::ConfigError;
use crate::literal::Literal;
use crate::schema::Value;
use crate::schema::error::SchemaError;
use std::borrow::Cow;
use std::fmt::{self, Display};

/// One permitted value of a [`SetSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct SetMember<T> {
    pub value: T,
    pub literal: String,
    pub description: Cow<'static, str>,
}

/// Schema for a closed set of values, each with a fixed literal.
///
/// Members keep their declaration order, which is also the order in which
/// they are listed in membership errors and documentation.
#[derive(Clone)]
pub struct SetSchema<T> {
    members: Vec<SetMember<T>>,
}

impl<T: Value> SetSchema<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { members: Vec::new() }
    }

    #[must_use]
    pub fn member(
        mut self,
        value: T,
        literal: impl Into<String>,
        description: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.members.push(SetMember {
            value,
            literal: literal.into(),
            description: description.into(),
        });
        self
    }

    #[must_use]
    pub fn members(&self) -> &[SetMember<T>] {
        &self.members
    }

    pub(crate) fn finalize(&self) -> Result<(), ConfigError> {
        if self.members.is_empty() {
            return Err(ConfigError::InvalidSchema {
                message: "a set must have at least one member".into(),
                context: None,
            });
        }

        for (i, member) in self.members.iter().enumerate() {
            let earlier = &self.members[..i];
            if member.literal.is_empty() {
                return Err(ConfigError::InvalidSchema {
                    message: "set member literals must not be empty".into(),
                    context: None,
                });
            }
            if earlier.iter().any(|m| m.literal == member.literal) {
                return Err(ConfigError::DuplicateLiteral {
                    message: format!("{:?} is declared more than once", member.literal).into(),
                    context: None,
                });
            }
            if earlier.iter().any(|m| m.value == member.value) {
                return Err(ConfigError::InvalidSchema {
                    message: format!("value {:?} has more than one literal", member.value).into(),
                    context: None,
                });
            }
        }
        Ok(())
    }

    pub(crate) fn validate(&self, value: &T) -> Result<(), SchemaError> {
        self.marshal(value).map(|_| ())
    }

    pub(crate) fn marshal(&self, value: &T) -> Result<Literal, SchemaError> {
        self.members
            .iter()
            .find(|m| &m.value == value)
            .map(|m| Literal::new(m.literal.as_str()))
            .ok_or_else(|| SchemaError::marshal(format!("{value:?} is not a member of the set")))
    }

    pub(crate) fn unmarshal(&self, literal: &Literal) -> Result<T, SchemaError> {
        self.members
            .iter()
            .find(|m| m.literal == literal.verbatim())
            .map(|m| m.value.clone())
            .ok_or_else(|| SchemaError::Membership {
                literal: literal.verbatim().to_owned().into(),
                accepted: self.accepted(),
            })
    }

    pub(crate) fn examples(&self, conservative: bool) -> Vec<T> {
        let take = if conservative { 1 } else { self.members.len() };
        self.members.iter().take(take).map(|m| m.value.clone()).collect()
    }

    pub(crate) fn summary(&self) -> String {
        self.members.iter().map(|m| m.literal.as_str()).collect::<Vec<_>>().join(" | ")
    }

    fn accepted(&self) -> Vec<Cow<'static, str>> {
        self.members.iter().map(|m| Cow::Owned(m.literal.clone())).collect()
    }
}

impl<T: Value + Display> SetSchema<T> {
    /// Adds a member whose literal is the [`Display`] rendering of `value`.
    #[must_use]
    pub fn member_display(self, value: T, description: impl Into<Cow<'static, str>>) -> Self {
        let literal = value.to_string();
        self.member(value, literal, description)
    }
}

impl<T: Value> Default for SetSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for SetSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.members.iter().map(|m| &m.literal)).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Color {
        Red,
        Green,
        Blue,
    }

    fn colors() -> SetSchema<Color> {
        SetSchema::new()
            .member(Color::Red, "red", "Warm")
            .member(Color::Green, "green", "Natural")
            .member(Color::Blue, "blue", "Cold")
    }

    #[test]
    fn unknown_literal_lists_members_in_order() {
        let err = colors().unmarshal(&Literal::new("purple")).unwrap_err();
        let SchemaError::Membership { literal, accepted } = &err else {
            panic!("expected a membership error, got {err:?}");
        };
        assert_eq!(literal, "purple");
        assert_eq!(accepted, &["red", "green", "blue"]);
        assert_eq!(err.to_string(), r#"must be one of "red", "green" or "blue""#);
    }

    #[test]
    fn lookup_is_exact() {
        assert_eq!(colors().unmarshal(&Literal::new("green")).unwrap(), Color::Green);
        assert!(colors().unmarshal(&Literal::new("Green")).is_err());
        assert!(colors().unmarshal(&Literal::new(" green")).is_err());
    }

    #[test]
    fn duplicate_literal_is_a_configuration_error() {
        let schema = colors().member(Color::Red, "red", "Again");
        assert!(matches!(schema.finalize(), Err(ConfigError::DuplicateLiteral { .. })));
    }

    #[test]
    fn duplicate_value_is_rejected() {
        let schema = colors().member(Color::Red, "crimson", "Alias");
        assert!(matches!(schema.finalize(), Err(ConfigError::InvalidSchema { .. })));
    }

    #[test]
    fn empty_set_is_rejected() {
        assert!(SetSchema::<Color>::new().finalize().is_err());
    }

    #[test]
    fn member_display_uses_display() {
        let schema = SetSchema::new().member_display(1u8, "one").member_display(2u8, "two");
        assert_eq!(schema.marshal(&2).unwrap().canonical(), "2");
        assert_eq!(schema.summary(), "1 | 2");
    }

    #[test]
    fn examples() {
        assert_eq!(colors().examples(true), vec![Color::Red]);
        assert_eq!(colors().examples(false), vec![Color::Red, Color::Green, Color::Blue]);
    }
}
