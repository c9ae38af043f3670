use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cyclebill_core::{AggregateId, TenantId};

/// A recorded event together with the stream metadata the store keeps
/// around it.
///
/// Envelopes are what an invoice stream is made of. The payload is the
/// domain event; everything else says where it sits: `tenant_id` fences
/// streams per tenant, `aggregate_type` tags the kind of stream, and
/// `sequence_number` positions the event within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    tenant_id: TenantId,

    aggregate_id: AggregateId,
    aggregate_type: String,

    /// Position in the aggregate stream, starting at 1.
    sequence_number: u64,

    payload: E,
}

impl<E> EventEnvelope<E> {
    /// Record `payload` at `sequence_number` in its stream.
    ///
    /// Stamps a fresh UUIDv7 event id, so a merged audit trail still sorts
    /// by creation time.
    pub fn record(
        tenant_id: TenantId,
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        sequence_number: u64,
        payload: E,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            tenant_id,
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            sequence_number,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }
}
