//! Fill-or-discard decision for computed drafts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::totals::ComputedInvoice;

/// Why a draft was discarded instead of filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    /// No service line item produced a line.
    NoBillableLines,
    /// Lines exist but sum to nothing.
    ZeroTotal,
}

/// What to do with a computed draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceOutcome {
    /// Persist amount, VAT, total and lines.
    Fill(ComputedInvoice),
    /// Permanently remove the speculative draft. Customers never see empty
    /// invoices.
    Discard { reason: DiscardReason },
}

/// Decide whether a computed draft is worth filling.
pub fn decide(computed: ComputedInvoice) -> InvoiceOutcome {
    if computed.lines.is_empty() {
        return InvoiceOutcome::Discard {
            reason: DiscardReason::NoBillableLines,
        };
    }
    if computed.total == Decimal::ZERO {
        return InvoiceOutcome::Discard {
            reason: DiscardReason::ZeroTotal,
        };
    }
    InvoiceOutcome::Fill(computed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_item::{LineageId, ServiceLineItemId};
    use crate::rate::BillingFrequency;
    use crate::totals::InvoiceLine;
    use cyclebill_core::AggregateId;
    use proptest::prelude::*;

    fn line(amount: Decimal, vat: Decimal) -> InvoiceLine {
        InvoiceLine {
            service_line_item_id: ServiceLineItemId::new(AggregateId::new()),
            lineage_id: LineageId::new(AggregateId::new()),
            name: "seats".into(),
            billed: BillingFrequency::Monthly,
            quantity: 1,
            unit_price: amount,
            amount,
            vat,
            total: amount + vat,
        }
    }

    #[test]
    fn empty_computations_are_discarded() {
        match decide(ComputedInvoice::empty()) {
            InvoiceOutcome::Discard { reason } => {
                assert_eq!(reason, DiscardReason::NoBillableLines);
            }
            _ => panic!("Expected Discard for an empty computation"),
        }
    }

    #[test]
    fn zero_total_computations_are_discarded() {
        let computed = ComputedInvoice::from_lines(vec![line(Decimal::ZERO, Decimal::ZERO)]);
        match decide(computed) {
            InvoiceOutcome::Discard { reason } => {
                assert_eq!(reason, DiscardReason::ZeroTotal);
            }
            _ => panic!("Expected Discard for a zero-total computation"),
        }
    }

    #[test]
    fn billable_computations_are_filled() {
        let computed = ComputedInvoice::from_lines(vec![line(Decimal::from(100), Decimal::ZERO)]);
        match decide(computed.clone()) {
            InvoiceOutcome::Fill(filled) => assert_eq!(filled, computed),
            _ => panic!("Expected Fill for a billable computation"),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, ..ProptestConfig::default() })]

        /// Drafts are filled exactly when something non-zero was computed.
        #[test]
        fn fill_iff_lines_exist_and_total_is_non_zero(
            cents in proptest::collection::vec(0i64..10_000, 0..6)
        ) {
            let lines: Vec<InvoiceLine> = cents
                .iter()
                .map(|c| line(Decimal::new(*c, 2), Decimal::ZERO))
                .collect();
            let computed = ComputedInvoice::from_lines(lines);
            let expect_fill = !computed.lines.is_empty() && computed.total != Decimal::ZERO;

            match decide(computed) {
                InvoiceOutcome::Fill(_) => prop_assert!(expect_fill),
                InvoiceOutcome::Discard { .. } => prop_assert!(!expect_fill),
            }
        }
    }
}
