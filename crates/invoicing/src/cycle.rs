//! Cycle invoice computation: recurring charges for a regular billing period.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use cyclebill_core::round2;

use crate::invoice::Invoice;
use crate::line_item::{ExcludedItem, ExclusionReason, LineageId, ServiceLineItem};
use crate::rate::{BillingFrequency, cycle_unit_price, monthly_rate};
use crate::totals::{ComputedInvoice, InvoiceLine};

/// Compute the lines of a cycle invoice from the contract's service line
/// items.
///
/// Pure and deterministic: items are processed in input order, no clocks, no
/// IO. Exclusions come back as data for the caller to log. Service activity
/// is judged at the period start for prepaid drafts and the period end for
/// postpaid ones.
///
/// `Once` items bill flat whenever active; routing never-billed `Once` items
/// into cycle fills is the caller's contract, and re-billing is stopped by
/// the filled invoice's immutability and the lineage snapshot ledger.
pub fn fill_cycle_invoice(
    invoice: &Invoice,
    items: &[ServiceLineItem],
) -> (ComputedInvoice, Vec<ExcludedItem>) {
    let mut excluded = Vec::new();

    let Some(period) = invoice.period() else {
        return (ComputedInvoice::empty(), excluded);
    };
    let reference = period.reference_date(invoice.is_postpaid());
    let cycle_months = invoice.billing_cycle_months();

    let canceled: HashSet<LineageId> = items
        .iter()
        .filter(|item| item.is_canceled)
        .map(|item| item.lineage_id)
        .collect();

    let mut lines = Vec::new();
    for item in items {
        if let Some(reason) = exclusion_for(item, reference, &canceled) {
            excluded.push(ExcludedItem {
                item_id: item.id,
                lineage_id: item.lineage_id,
                reason,
            });
            continue;
        }

        let amount = match monthly_rate(item.unit_price, item.billed) {
            Some(rate) => round2(
                rate * Decimal::from(cycle_months) * Decimal::from(item.quantity),
            ),
            // Only Once survives the exclusion checks without a rate.
            None => round2(Decimal::from(item.quantity) * item.unit_price),
        };
        let unit_price = cycle_unit_price(item.unit_price, item.billed, cycle_months)
            .unwrap_or(item.unit_price);

        lines.push(InvoiceLine::from_item(item, unit_price, amount));
    }

    (ComputedInvoice::from_lines(lines), excluded)
}

fn exclusion_for(
    item: &ServiceLineItem,
    reference: NaiveDate,
    canceled: &HashSet<LineageId>,
) -> Option<ExclusionReason> {
    match item.billed {
        BillingFrequency::Usage => return Some(ExclusionReason::UsageBilled),
        BillingFrequency::None => return Some(ExclusionReason::NoneBilled),
        _ => {}
    }
    if item.quantity < 0 {
        return Some(ExclusionReason::NegativeQuantity);
    }
    if item.unit_price < Decimal::ZERO {
        return Some(ExclusionReason::NegativeUnitPrice);
    }
    if canceled.contains(&item.lineage_id) {
        return Some(ExclusionReason::CanceledLineage);
    }
    if !item.is_active_at(reference) {
        return Some(ExclusionReason::NotActiveInPeriod);
    }
    if item.quantity == 0 {
        return Some(ExclusionReason::ZeroQuantity);
    }
    None
}
