//! Off-cycle invoice computation: mid-cycle additions and upsells.

use rust_decimal::Decimal;

use cyclebill_core::round2;

use crate::invoice::Invoice;
use crate::line_item::{ExcludedItem, ExclusionReason};
use crate::lineage::ItemLineage;
use crate::rate::{self, BillingFrequency, DAYS_PER_YEAR, cycle_unit_price, daily_rate};
use crate::totals::{ComputedInvoice, InvoiceLine};

/// Compute the lines of an off-cycle invoice from resolved amendment chains
/// (see [`crate::lineage::assemble_lineages`]).
///
/// Off-cycle drafts are prepaid and cover the remainder date range. Chains
/// that never billed charge prorated over the period (flat for `Once`);
/// chains that billed before charge only a positive annualized delta, at the
/// current version's VAT rate. Nothing here ever credits: a shrink produces
/// no line at all, and a chain that ever billed a `Once` item never bills
/// again.
pub fn fill_off_cycle_invoice(
    invoice: &Invoice,
    lineages: &[ItemLineage],
) -> (ComputedInvoice, Vec<ExcludedItem>) {
    let mut excluded = Vec::new();

    let Some(period) = invoice.period() else {
        return (ComputedInvoice::empty(), excluded);
    };
    let days = Decimal::from(period.days_inclusive());
    let cycle_months = invoice.billing_cycle_months();

    let mut lines = Vec::new();
    for lineage in lineages {
        match off_cycle_line(lineage, days, cycle_months) {
            Ok(line) => lines.push(line),
            Err(reason) => excluded.push(ExcludedItem {
                item_id: lineage.current.id,
                lineage_id: lineage.current.lineage_id,
                reason,
            }),
        }
    }

    (ComputedInvoice::from_lines(lines), excluded)
}

fn off_cycle_line(
    lineage: &ItemLineage,
    days: Decimal,
    cycle_months: u32,
) -> Result<InvoiceLine, ExclusionReason> {
    let current = &lineage.current;

    if current.is_canceled {
        return Err(ExclusionReason::CanceledLineage);
    }
    if current.quantity < 0 {
        return Err(ExclusionReason::NegativeQuantity);
    }
    if current.unit_price < Decimal::ZERO {
        return Err(ExclusionReason::NegativeUnitPrice);
    }

    if let Some(prior) = lineage.prior {
        // The chain billed before. Once charges exactly once, no matter how
        // the chain was edited afterwards.
        if prior.billed.is_once() {
            return Err(ExclusionReason::OnceAlreadyInvoiced);
        }
        if current.quantity == 0 {
            return Err(ExclusionReason::ZeroQuantity);
        }

        let annuals = (
            rate::annual_total(current.quantity, current.unit_price, current.billed),
            rate::annual_total(prior.quantity, prior.unit_price, prior.billed),
        );
        let (Some(current_annual), Some(previous_annual)) = annuals else {
            // A chain mutated to or from a non-recurring frequency has no
            // comparable annual value.
            return Err(ExclusionReason::NoAnnualBasis);
        };

        let delta = current_annual - previous_annual;
        if delta <= Decimal::ZERO {
            // Downgrades and unchanged chains produce no line and no credit.
            return Err(ExclusionReason::NonPositiveDelta);
        }

        let amount = round2(delta / Decimal::from(DAYS_PER_YEAR) * days);
        let unit_price =
            cycle_unit_price(current.unit_price, current.billed, cycle_months)
                .unwrap_or(current.unit_price);
        return Ok(InvoiceLine::from_item(current, unit_price, amount));
    }

    // Brand-new chain.
    if current.quantity == 0 {
        return Err(ExclusionReason::ZeroQuantity);
    }
    let amount = match daily_rate(current.unit_price, current.billed) {
        Some(daily) => round2(daily * Decimal::from(current.quantity) * days),
        None if current.billed.is_once() => {
            // Full charge, never prorated.
            round2(Decimal::from(current.quantity) * current.unit_price)
        }
        None => {
            return Err(match current.billed {
                BillingFrequency::Usage => ExclusionReason::UsageBilled,
                _ => ExclusionReason::NoneBilled,
            });
        }
    };
    let unit_price = cycle_unit_price(current.unit_price, current.billed, cycle_months)
        .unwrap_or(current.unit_price);
    Ok(InvoiceLine::from_item(current, unit_price, amount))
}
