use crate::schema::Value;
use crate::variable::{AnyVariable, Availability, ValueError, Variable};
use std::borrow::Cow;
use std::sync::Arc;

/// One or more variables that together form a single logical value.
///
/// Implemented for a single [`Variable`] and for tuples of two to four variables. A tuple is
/// all or nothing: when some parts have a value and at least one of them was set explicitly,
/// the parts without a value are reported as [`ValueError::Incomplete`]. Parts with their own
/// default always count as having a value.
pub trait Parts: Send + Sync + 'static {
    type Output: Value;

    /// The combined value, `Ok(None)` when no part is set.
    ///
    /// # Errors
    /// Returns the first invalid part's error, or [`ValueError::Incomplete`].
    fn resolve(&self) -> Result<Option<Self::Output>, ValueError>;

    fn variables(&self) -> Vec<Arc<dyn AnyVariable>>;
}

impl<A: Value> Parts for Variable<A> {
    type Output = A;

    fn resolve(&self) -> Result<Option<A>, ValueError> {
        self.outcome()
    }

    fn variables(&self) -> Vec<Arc<dyn AnyVariable>> {
        vec![self.erased()]
    }
}

/// Combines the per-part outcomes of a composite.
fn incomplete(parts: &[(&str, bool, Availability)]) -> ValueError {
    let names = |present: bool| -> Vec<Cow<'static, str>> {
        parts
            .iter()
            .filter(|(_, has_value, _)| *has_value == present)
            .map(|(name, ..)| Cow::Owned((*name).to_owned()))
            .collect()
    };
    ValueError::Incomplete { provided: names(true), missing: names(false) }
}

macro_rules! impl_parts {
    ($($ty:ident $var:ident $idx:tt),+) => {
        impl<$($ty: Value),+> Parts for ($(Variable<$ty>,)+) {
            type Output = ($($ty,)+);

            fn resolve(&self) -> Result<Option<Self::Output>, ValueError> {
                $(let $var = self.$idx.outcome()?;)+

                if let ($(Some($var),)+) = ($($var.clone(),)+) {
                    return Ok(Some(($($var,)+)));
                }

                let states = [$((self.$idx.name(), $var.is_some(), self.$idx.availability())),+];
                if states.iter().any(|(_, _, availability)| *availability == Availability::Explicit) {
                    return Err(incomplete(&states));
                }
                Ok(None)
            }

            fn variables(&self) -> Vec<Arc<dyn AnyVariable>> {
                vec![$(self.$idx.erased()),+]
            }
        }
    };
}

impl_parts!(A a 0, B b 1);
impl_parts!(A a 0, B b 1, C c 2);
impl_parts!(A a 0, B b 1, C c 2, D d 3);
