//! Billing frequencies and rate normalization.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cyclebill_core::round2;

/// Days per year used for proration. Fixed at 365, leap years included, so
/// a given daily rate never depends on which year the period falls in.
pub const DAYS_PER_YEAR: u32 = 365;

const MONTHS_PER_YEAR: u32 = 12;

/// How a service line item is billed.
///
/// Only `Monthly`, `Quarterly` and `Annually` normalize to per-month and
/// per-day rates. `Once` bills a flat charge; `Usage` and `None` never
/// produce invoice lines here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingFrequency {
    Once,
    Monthly,
    Quarterly,
    Annually,
    Usage,
    None,
}

impl BillingFrequency {
    /// Cycle length in months for recurring frequencies.
    pub fn months_in_cycle(self) -> Option<u32> {
        match self {
            BillingFrequency::Monthly => Some(1),
            BillingFrequency::Quarterly => Some(3),
            BillingFrequency::Annually => Some(12),
            BillingFrequency::Once | BillingFrequency::Usage | BillingFrequency::None => None,
        }
    }

    pub fn is_recurring(self) -> bool {
        self.months_in_cycle().is_some()
    }

    pub fn is_once(self) -> bool {
        matches!(self, BillingFrequency::Once)
    }
}

/// Per-month rate for a recurring unit price.
pub fn monthly_rate(unit_price: Decimal, billed: BillingFrequency) -> Option<Decimal> {
    let months = billed.months_in_cycle()?;
    Some(unit_price / Decimal::from(months))
}

/// Annualized rate for a recurring unit price.
///
/// Multiplies before dividing so whole-cent prices stay exact for every
/// recurring frequency.
pub fn annual_rate(unit_price: Decimal, billed: BillingFrequency) -> Option<Decimal> {
    let months = billed.months_in_cycle()?;
    Some(unit_price * Decimal::from(MONTHS_PER_YEAR) / Decimal::from(months))
}

/// Daily rate: the annualized rate spread over a fixed 365-day year.
pub fn daily_rate(unit_price: Decimal, billed: BillingFrequency) -> Option<Decimal> {
    Some(annual_rate(unit_price, billed)? / Decimal::from(DAYS_PER_YEAR))
}

/// Annualized value of a whole line (`quantity * unit_price` per year).
/// The off-cycle upsell delta is a difference of two of these.
pub fn annual_total(
    quantity: i64,
    unit_price: Decimal,
    billed: BillingFrequency,
) -> Option<Decimal> {
    let months = billed.months_in_cycle()?;
    Some(
        Decimal::from(quantity) * unit_price * Decimal::from(MONTHS_PER_YEAR)
            / Decimal::from(months),
    )
}

/// Display unit price for an invoice line covering `cycle_months`.
///
/// A monthly 50 item on a quarterly invoice shows 150. `Once` items keep
/// their raw price.
pub fn cycle_unit_price(
    unit_price: Decimal,
    billed: BillingFrequency,
    cycle_months: u32,
) -> Option<Decimal> {
    if billed.is_once() {
        return Some(unit_price);
    }
    let months = billed.months_in_cycle()?;
    Some(round2(
        unit_price * Decimal::from(cycle_months) / Decimal::from(months),
    ))
}
