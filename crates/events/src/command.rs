use towdesk_core::EntityId;

/// A command targets a specific aggregate.
///
/// Commands represent **intent**, a request to perform an action. They are
/// transient; accepted commands become events. The `Send + Sync + 'static`
/// bounds let commands cross thread boundaries and be retried or logged
/// without borrowing issues.
pub trait Command: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// The aggregate this command operates on (routing/isolation boundary).
    fn target_id(&self) -> EntityId;
}
