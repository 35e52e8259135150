//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two values with the same attributes are
/// interchangeable. This is what allows search criteria to serve as cache keys,
/// so every value object is also `Eq + Hash`.
///
/// - **Value Object**: `Price`, `SearchCriteria`
/// - **Entity**: `Product`, `User` (see [`crate::Entity`])
///
/// Value objects are immutable once constructed; to "modify" one, build a new one.
pub trait ValueObject: Clone + Eq + core::hash::Hash + core::fmt::Debug {}
