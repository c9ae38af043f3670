use chrono::{DateTime, Utc};

/// Contract implemented by every domain event the billing engine records.
///
/// An event is a fact. Once appended to a stream it never changes and is
/// never removed, which is what lets a discarded draft keep its audit trail
/// after the draft itself is gone.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable dotted name, `<context>.<aggregate>.<verb>` (e.g.
    /// "invoicing.invoice.filled"). Consumers match on this string, so
    /// renaming one is a breaking change.
    fn event_type(&self) -> &'static str;

    /// Business time at which the event occurred.
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Schema version of the serialized payload. Bump on shape changes;
    /// every current payload is still at its first version.
    fn version(&self) -> u32 {
        1
    }
}
