/// Execute an aggregate command deterministically (no IO, no async).
///
/// The canonical lifecycle in one step:
///
/// 1. **Decide**: `aggregate.handle(command)` returns events (pure).
/// 2. **Evolve**: each event is applied via `aggregate.apply(event)`.
///
/// The aggregate maintains its own version tracking during `apply` (+1 per
/// event). Useful for tests and inline processing where no event store or
/// bus is involved.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: towdesk_core::Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    Ok(events)
}
