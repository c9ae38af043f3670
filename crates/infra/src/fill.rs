//! Billing run orchestration: compute a draft invoice, then fill or
//! discard it.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use cyclebill_invoicing::{
    ComputedInvoice, ContractId, DiscardReason, ExcludedItem, Invoice, InvoiceId, InvoiceOutcome,
    LineageId, PriorInvoicedSnapshot, ServiceLineItem, assemble_lineages, decide,
    fill_cycle_invoice, fill_off_cycle_invoice,
};

use crate::source::{ContractBillingSource, SourceError};
use crate::writer::{InvoiceWriter, WriterError};

/// Failure of a billing run for one draft.
#[derive(Debug, Error)]
pub enum BillingRunError {
    /// The draft was never initialized with a contract and period.
    #[error("draft {0} has no contract or billing period")]
    MissingContractData(InvoiceId),

    #[error("contract source failed: {0}")]
    Source(#[from] SourceError),

    #[error("invoice write failed: {0}")]
    Writer(#[from] WriterError),
}

/// How a draft ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FillDisposition {
    Filled {
        amount: Decimal,
        vat: Decimal,
        total: Decimal,
        line_count: usize,
    },
    Discarded {
        reason: DiscardReason,
    },
}

/// Outcome of one draft in a billing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FillReport {
    pub invoice_id: InvoiceId,
    pub contract_id: ContractId,
    pub disposition: FillDisposition,
    /// Items that produced no line, with their reasons.
    pub excluded: Vec<ExcludedItem>,
}

impl FillReport {
    pub fn is_filled(&self) -> bool {
        matches!(self.disposition, FillDisposition::Filled { .. })
    }
}

/// Computes and persists invoices, one draft at a time.
///
/// Wiring is by value; share one store between both seams with `Arc`.
pub struct InvoiceFiller<S, W> {
    source: S,
    writer: W,
}

impl<S, W> InvoiceFiller<S, W>
where
    S: ContractBillingSource,
    W: InvoiceWriter,
{
    pub fn new(source: S, writer: W) -> Self {
        Self { source, writer }
    }

    /// Compute the given draft and fill or permanently delete it.
    ///
    /// Deterministic given the same contract state: rerunning a draft
    /// after a partial failure either lands the identical invoice or is
    /// rejected by the writer because the first attempt already finalized
    /// it.
    pub fn fill_draft(&self, draft: &Invoice) -> Result<FillReport, BillingRunError> {
        let invoice_id = draft.id_typed();
        let (Some(tenant_id), Some(contract_id), Some(reference)) = (
            draft.tenant_id(),
            draft.contract_id(),
            draft.reference_date(),
        ) else {
            return Err(BillingRunError::MissingContractData(invoice_id));
        };

        let items = self
            .source
            .service_line_items(tenant_id, contract_id, reference)?;

        let (computed, excluded) = if draft.is_off_cycle() {
            let snapshots = self
                .source
                .prior_invoiced_snapshots(tenant_id, contract_id)?;
            let (lineages, mut excluded) = assemble_lineages(&items, &snapshots, reference);
            let (computed, mut skipped) = fill_off_cycle_invoice(draft, &lineages);
            excluded.append(&mut skipped);
            (computed, excluded)
        } else {
            fill_cycle_invoice(draft, &items)
        };

        for skip in &excluded {
            if skip.reason.is_malformed() {
                warn!(
                    invoice = %invoice_id,
                    item = %skip.item_id,
                    reason = ?skip.reason,
                    "skipped malformed service line item"
                );
            } else {
                debug!(
                    invoice = %invoice_id,
                    item = %skip.item_id,
                    reason = ?skip.reason,
                    "service line item produced no invoice line"
                );
            }
        }

        let disposition = match decide(computed) {
            InvoiceOutcome::Fill(computed) => {
                let basis = billed_basis(&items, &computed);
                self.writer.fill(tenant_id, invoice_id, &computed, &basis)?;
                info!(
                    invoice = %invoice_id,
                    contract = %contract_id,
                    total = %computed.total,
                    lines = computed.lines.len(),
                    dry_run = draft.is_dry_run(),
                    "invoice filled"
                );
                FillDisposition::Filled {
                    amount: computed.amount,
                    vat: computed.vat,
                    total: computed.total,
                    line_count: computed.lines.len(),
                }
            }
            InvoiceOutcome::Discard { reason } => {
                self.writer
                    .permanently_delete(tenant_id, invoice_id, reason)?;
                info!(
                    invoice = %invoice_id,
                    contract = %contract_id,
                    reason = ?reason,
                    "empty draft discarded"
                );
                FillDisposition::Discarded { reason }
            }
        };

        Ok(FillReport {
            invoice_id,
            contract_id,
            disposition,
            excluded,
        })
    }
}

/// What each chain bills at after this fill: the source item behind every
/// line, at its contracted unit price (invoice lines carry cycle-normalized
/// prices, which must not feed the annualized delta).
fn billed_basis(
    items: &[ServiceLineItem],
    computed: &ComputedInvoice,
) -> HashMap<LineageId, PriorInvoicedSnapshot> {
    let mut basis = HashMap::new();
    for line in &computed.lines {
        if let Some(item) = items.iter().find(|it| it.id == line.service_line_item_id) {
            basis.insert(
                item.lineage_id,
                PriorInvoicedSnapshot {
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    billed: item.billed,
                },
            );
        }
    }
    basis
}
