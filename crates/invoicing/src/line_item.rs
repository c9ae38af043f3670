//! Service line items, prior-billed snapshots, and exclusion reporting.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cyclebill_core::AggregateId;

use crate::rate::BillingFrequency;

/// Service line item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceLineItemId(pub AggregateId);

impl ServiceLineItemId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ServiceLineItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Identifier of an amendment chain.
///
/// The first version of an item carries its own id as the lineage id;
/// every later amendment keeps pointing at it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineageId(pub AggregateId);

impl LineageId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for LineageId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// One version of a contracted service line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLineItem {
    pub id: ServiceLineItemId,
    pub lineage_id: LineageId,
    pub name: String,
    pub billed: BillingFrequency,
    pub quantity: i64,
    pub unit_price: Decimal,
    /// VAT rate in percent (`20` means 20%).
    pub vat_rate: Decimal,
    pub active_from: NaiveDate,
    pub active_until: Option<NaiveDate>,
    pub is_canceled: bool,
}

impl ServiceLineItem {
    /// Whether this version is active at the reference date.
    ///
    /// The end boundary is strict: an item ending exactly at `r` is no
    /// longer active.
    pub fn is_active_at(&self, r: NaiveDate) -> bool {
        self.active_from <= r && self.active_until.is_none_or(|until| until > r)
    }

    /// Negative quantities and negative unit prices are data corruption,
    /// not billable state. Malformed items are skipped and reported, never
    /// fatal.
    pub fn is_malformed(&self) -> bool {
        self.quantity < 0 || self.unit_price < Decimal::ZERO
    }
}

/// What an amendment chain last billed on a finalized invoice.
///
/// Its presence alone marks the chain as ever billed; the fields feed the
/// off-cycle delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorInvoicedSnapshot {
    pub quantity: i64,
    pub unit_price: Decimal,
    pub billed: BillingFrequency,
}

/// Why a line item (or its whole chain) produced no invoice line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    UsageBilled,
    NoneBilled,
    NotActiveInPeriod,
    CanceledLineage,
    NegativeQuantity,
    NegativeUnitPrice,
    ZeroQuantity,
    OnceAlreadyInvoiced,
    NonPositiveDelta,
    NoAnnualBasis,
    NoActiveLineageRecord,
}

impl ExclusionReason {
    /// Malformed data deserves a louder log line than an ordinary skip.
    pub fn is_malformed(self) -> bool {
        matches!(
            self,
            ExclusionReason::NegativeQuantity | ExclusionReason::NegativeUnitPrice
        )
    }
}

/// A skipped item with its reason, reported by the computers so the caller
/// can log what did not bill and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedItem {
    pub item_id: ServiceLineItemId,
    pub lineage_id: LineageId,
    pub reason: ExclusionReason,
}
