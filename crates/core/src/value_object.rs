//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and defined entirely by their attribute
/// values: `Totals` or a `Vin` with the same fields *are* the same value.
/// To "modify" one, construct a new one. The supertraits keep them cheap to
/// copy, comparable, and debuggable.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
