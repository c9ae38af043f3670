//! Billing periods and reference dates.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use cyclebill_core::{DomainError, DomainResult};

/// The date range an invoice covers. Day-granular, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl BillingPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if end <= start {
            return Err(DomainError::validation(
                "billing period end must be after its start",
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Inclusive day count: March 1st through March 15th is 15 days.
    pub fn days_inclusive(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The date service activity is judged at: period start for prepaid
    /// invoices, period end for postpaid.
    pub fn reference_date(&self, postpaid: bool) -> NaiveDate {
        if postpaid { self.end } else { self.start }
    }
}

/// Last day of a billing cycle starting at `start` and spanning
/// `cycle_months` calendar months (month-end clamped).
pub fn cycle_end(start: NaiveDate, cycle_months: u32) -> Option<NaiveDate> {
    start
        .checked_add_months(Months::new(cycle_months))
        .and_then(|d| d.pred_opt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rejects_inverted_and_empty_periods() {
        let d1 = date(2025, 3, 1);
        assert!(BillingPeriod::new(d1, d1).is_err());
        assert!(BillingPeriod::new(date(2025, 3, 2), d1).is_err());
        assert!(BillingPeriod::new(d1, date(2025, 3, 2)).is_ok());
    }

    #[test]
    fn day_count_is_inclusive_of_both_ends() {
        let p = BillingPeriod::new(date(2026, 3, 1), date(2026, 3, 15)).unwrap();
        assert_eq!(p.days_inclusive(), 15);
        let feb = BillingPeriod::new(date(2025, 2, 1), date(2025, 2, 28)).unwrap();
        assert_eq!(feb.days_inclusive(), 28);
        // Leap day counts like any other day; only the 365 divisor is fixed.
        let leap = BillingPeriod::new(date(2024, 2, 1), date(2024, 2, 29)).unwrap();
        assert_eq!(leap.days_inclusive(), 29);
    }

    #[test]
    fn reference_date_follows_billing_direction() {
        let p = BillingPeriod::new(date(2025, 4, 1), date(2025, 4, 30)).unwrap();
        assert_eq!(p.reference_date(false), date(2025, 4, 1));
        assert_eq!(p.reference_date(true), date(2025, 4, 30));
    }

    #[test]
    fn cycle_end_spans_whole_calendar_months() {
        assert_eq!(cycle_end(date(2025, 1, 15), 1), Some(date(2025, 2, 14)));
        assert_eq!(cycle_end(date(2025, 1, 1), 3), Some(date(2025, 3, 31)));
        assert_eq!(cycle_end(date(2025, 2, 1), 12), Some(date(2026, 1, 31)));
        // Month-end clamping: a monthly cycle starting Jan 31st ends Feb 27th.
        assert_eq!(cycle_end(date(2025, 1, 31), 1), Some(date(2025, 2, 27)));
    }
}
