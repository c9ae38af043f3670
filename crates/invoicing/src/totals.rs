//! Invoice lines, per-line VAT, and total aggregation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cyclebill_core::round2;

use crate::line_item::{LineageId, ServiceLineItem, ServiceLineItemId};
use crate::rate::BillingFrequency;

/// VAT for an already-rounded line amount, at a percent rate.
pub fn line_vat(amount: Decimal, vat_rate: Decimal) -> Decimal {
    round2(amount * vat_rate / Decimal::ONE_HUNDRED)
}

/// A computed invoice line.
///
/// `amount` and `vat` are rounded to 2 decimal places when the line is
/// built; `total` is their plain sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub service_line_item_id: ServiceLineItemId,
    pub lineage_id: LineageId,
    pub name: String,
    pub billed: BillingFrequency,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub amount: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
}

impl InvoiceLine {
    /// Build a line for an item from an already-rounded amount; VAT comes
    /// from the item's rate.
    pub fn from_item(item: &ServiceLineItem, unit_price: Decimal, amount: Decimal) -> Self {
        let vat = line_vat(amount, item.vat_rate);
        Self {
            service_line_item_id: item.id,
            lineage_id: item.lineage_id,
            name: item.name.clone(),
            billed: item.billed,
            quantity: item.quantity,
            unit_price,
            amount,
            vat,
            total: amount + vat,
        }
    }
}

/// The monetary outcome of a billing computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedInvoice {
    pub lines: Vec<InvoiceLine>,
    pub amount: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
}

impl ComputedInvoice {
    /// Sum already-rounded lines. Totals are never re-rounded; rounding
    /// happens exactly once per line component.
    pub fn from_lines(lines: Vec<InvoiceLine>) -> Self {
        let amount: Decimal = lines.iter().map(|l| l.amount).sum();
        let vat: Decimal = lines.iter().map(|l| l.vat).sum();
        Self {
            lines,
            amount,
            vat,
            total: amount + vat,
        }
    }

    pub fn empty() -> Self {
        Self::from_lines(Vec::new())
    }
}
