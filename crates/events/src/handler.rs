/// Execute an aggregate command deterministically (no IO, no async).
///
/// The canonical event-sourced lifecycle in one step:
///
/// 1. **Decide**: calls `aggregate.handle(command)` to get events (pure, no
///    mutation)
/// 2. **Evolve**: applies each event via `aggregate.apply(event)`
///
/// The aggregate maintains its own version tracking during `apply()`,
/// incrementing by one per event. Stores that persist the returned events are
/// expected to run their own optimistic concurrency checks against the
/// pre-execution version.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: cyclebill_core::Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    Ok(events)
}
