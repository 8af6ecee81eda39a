//! Discriminated-union normalization
//!
//! Devfile entities model tagged unions as a discriminator string plus a set of
//! optional member slots, of which exactly one may be populated. The functions
//! here infer the discriminator from the populated member, clear stale members,
//! and find the active member for dispatch.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UnionError {
    #[error("only one union member should be set: {union}")]
    Ambiguous { union: &'static str },

    #[error("discriminator should not be empty: {union}")]
    MissingDiscriminator { union: &'static str },
}

/// A value that can occupy a union member slot
pub trait UnionMember {
    /// True when the slot holds nothing
    fn is_zero(&self) -> bool;
}

impl<T> UnionMember for Option<T> {
    fn is_zero(&self) -> bool {
        self.is_none()
    }
}

impl UnionMember for String {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl UnionMember for bool {
    fn is_zero(&self) -> bool {
        !*self
    }
}

/// A struct modelling a tagged union: one discriminator plus named member slots
pub trait Union {
    /// Type name used in error messages
    const NAME: &'static str;

    /// Every member, in declaration order. This is the default shape.
    const MEMBERS: &'static [&'static str];

    fn discriminator(&self) -> &str;

    fn set_discriminator(&mut self, value: &str);

    fn is_member_set(&self, member: &str) -> bool;

    fn clear_member(&mut self, member: &str);

    fn normalize(&mut self) -> Result<(), UnionError>
    where
        Self: Sized,
    {
        normalize_union(self, Self::MEMBERS)
    }

    fn simplify(&mut self)
    where
        Self: Sized,
    {
        simplify_union(self, Self::MEMBERS)
    }
}

/// Set the discriminator from the single populated member, if it is not set already.
///
/// Zero populated members leaves the discriminator empty; two or more is an error.
pub fn update_discriminator<U: Union>(union: &mut U, shape: &[&str]) -> Result<(), UnionError> {
    if !union.discriminator().is_empty() {
        return Ok(());
    }

    if let Some(member) = visit_union(union, shape)? {
        union.set_discriminator(member);
    }

    Ok(())
}

/// Clear every member other than the one named by the discriminator
pub fn cleanup_values<U: Union>(union: &mut U, shape: &[&str]) -> Result<(), UnionError> {
    if union.discriminator().is_empty() {
        return Err(UnionError::MissingDiscriminator { union: U::NAME });
    }

    let active = union.discriminator().to_string();
    for member in shape.iter().filter(|m| **m != active) {
        union.clear_member(member);
    }

    Ok(())
}

pub fn normalize_union<U: Union>(union: &mut U, shape: &[&str]) -> Result<(), UnionError> {
    update_discriminator(union, shape)?;
    cleanup_values(union, shape)
}

/// Normalize, then blank the discriminator so that it stays implicit
pub fn simplify_union<U: Union>(union: &mut U, shape: &[&str]) {
    let _ = normalize_union(union, shape);
    union.set_discriminator("");
}

/// Find the single populated member among `shape`.
///
/// Returns the member name rather than invoking a handler; each union's
/// `variant()` matches on it to hand out the typed payload.
pub fn visit_union<'s, U: Union>(
    union: &U,
    shape: &[&'s str],
) -> Result<Option<&'s str>, UnionError> {
    let mut found = None;
    for member in shape {
        if union.is_member_set(member) {
            if found.is_some() {
                return Err(UnionError::Ambiguous { union: U::NAME });
            }
            found = Some(*member);
        }
    }
    Ok(found)
}

/// Implement [`Union`] for a struct from its discriminator field and member slots.
macro_rules! impl_union {
    ($ty:ty, $name:literal, $disc:ident, { $($member:literal => $field:ident),+ $(,)? }) => {
        impl $crate::models::union::Union for $ty {
            const NAME: &'static str = $name;
            const MEMBERS: &'static [&'static str] = &[$($member),+];

            fn discriminator(&self) -> &str {
                &self.$disc
            }

            fn set_discriminator(&mut self, value: &str) {
                self.$disc = value.to_string();
            }

            fn is_member_set(&self, member: &str) -> bool {
                match member {
                    $($member => !$crate::models::union::UnionMember::is_zero(&self.$field),)+
                    _ => false,
                }
            }

            fn clear_member(&mut self, member: &str) {
                match member {
                    $($member => self.$field = Default::default(),)+
                    _ => {}
                }
            }
        }
    };
}

pub(crate) use impl_union;
