//! Entity traits: identity and ownership.

use crate::id::UserId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// An entity with exactly one owning user.
///
/// The owner is fixed when the entity is created; nothing in the system
/// reassigns it.
pub trait Owned: Entity {
    fn owner_id(&self) -> UserId;
}
