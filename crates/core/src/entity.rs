//! Entity trait: identity + continuity across state changes.

/// Entity with a store-assigned identity.
///
/// Identity is absent until the first save and never changes afterwards.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the identifier, if one has been assigned.
    fn id(&self) -> Option<Self::Id>;

    fn is_persisted(&self) -> bool {
        self.id().is_some()
    }
}
