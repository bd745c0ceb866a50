use chrono::{DateTime, Utc};

/// A fact the domain produced.
///
/// Events are immutable once emitted and carry their own schema version so
/// stored streams survive shape changes. The `Send + Sync + 'static` bounds
/// let them cross the bus without borrowing anything.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable dotted name, e.g. "dispatch.call.opened".
    fn event_type(&self) -> &'static str;

    /// Schema version of this event type.
    fn version(&self) -> u32;

    /// Business time: when the thing happened, not when it was stored.
    fn occurred_at(&self) -> DateTime<Utc>;
}
