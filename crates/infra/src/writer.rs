//! Write side of a billing run: persisting fills and discards.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use cyclebill_core::{DomainError, TenantId};
use cyclebill_invoicing::{
    ComputedInvoice, DiscardReason, InvoiceId, LineageId, PriorInvoicedSnapshot,
};

/// Invoice persistence failure.
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("unknown invoice: {0}")]
    UnknownInvoice(InvoiceId),

    /// The draft aggregate refused the write (already filled, discarded,
    /// wrong tenant).
    #[error("write rejected: {0}")]
    Rejected(#[from] DomainError),

    #[error("invoice store unavailable: {0}")]
    Unavailable(anyhow::Error),
}

/// Persists the outcome of a computed draft.
///
/// Implementations route both operations through the draft aggregate so
/// its lifecycle rules hold; in particular, a finalized invoice rejects
/// repeat fills, which is what makes redelivered billing requests safe.
pub trait InvoiceWriter: Send + Sync {
    /// Record computed amounts and lines on the draft, plus what each
    /// amendment chain bills at from now on.
    ///
    /// `billed_basis` feeds the ledger behind future off-cycle deltas.
    /// Dry-run drafts keep their computed state but must leave the ledger
    /// untouched.
    fn fill(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
        computed: &ComputedInvoice,
        billed_basis: &HashMap<LineageId, PriorInvoicedSnapshot>,
    ) -> Result<(), WriterError>;

    /// Remove a draft whose computation produced nothing billable.
    ///
    /// The draft disappears from the invoice registry; customers never see
    /// empty invoices.
    fn permanently_delete(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
        reason: DiscardReason,
    ) -> Result<(), WriterError>;
}

impl<W> InvoiceWriter for Arc<W>
where
    W: InvoiceWriter + ?Sized,
{
    fn fill(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
        computed: &ComputedInvoice,
        billed_basis: &HashMap<LineageId, PriorInvoicedSnapshot>,
    ) -> Result<(), WriterError> {
        (**self).fill(tenant_id, invoice_id, computed, billed_basis)
    }

    fn permanently_delete(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
        reason: DiscardReason,
    ) -> Result<(), WriterError> {
        (**self).permanently_delete(tenant_id, invoice_id, reason)
    }
}
