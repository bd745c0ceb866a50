//! Aggregate traits for the event-sourced lifecycles (dispatch calls,
//! impounded vehicles).

/// Root of a consistency boundary.
///
/// Everything inside one aggregate changes together or not at all; the
/// version counts how many events have been applied to reach the current
/// state.
pub trait AggregateRoot {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Number of events applied so far. Strictly increasing, one per event.
    fn version(&self) -> u64;
}

/// Decide-then-apply execution, pure on both sides.
///
/// `handle` inspects state and either rejects the command or returns the
/// events it produces, without mutating anything. `apply` folds one event
/// into state and bumps the version. Neither side performs IO; collaborator
/// calls happen in the host before a command is built.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Event: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    fn apply(&mut self, event: &Self::Event);

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;
}
