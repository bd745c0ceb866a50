//! Entity trait: things with identity that outlive their field values.

/// An entity is addressed by identifier, not by value.
///
/// A charge sheet keeps being "that invoice's sheet" while every row on it
/// changes; a kit stays the same kit through renames. Implementors pick a
/// strongly-typed id (never a bare `Uuid`) so ids of different kinds cannot
/// be swapped for each other.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
