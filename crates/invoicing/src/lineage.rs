//! Amendment-chain assembly for off-cycle billing.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::line_item::{
    ExcludedItem, ExclusionReason, LineageId, PriorInvoicedSnapshot, ServiceLineItem,
};
use crate::rate::BillingFrequency;

/// One amendment chain, resolved to the version that should bill for an
/// off-cycle period, paired with what the chain already billed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLineage {
    pub current: ServiceLineItem,
    pub prior: Option<PriorInvoicedSnapshot>,
}

/// Group service line items into amendment chains and pick the billing
/// version per chain: the latest version active at `reference` (the period
/// start). Resolved once per billing run and reused.
///
/// Chains keep the first-encounter order of the input so repeated runs
/// produce identical line order. A canceled version anywhere in a chain
/// excludes the whole chain; usage- and none-billed versions and malformed
/// versions are dropped with a reported reason.
pub fn assemble_lineages(
    items: &[ServiceLineItem],
    snapshots: &HashMap<LineageId, PriorInvoicedSnapshot>,
    reference: NaiveDate,
) -> (Vec<ItemLineage>, Vec<ExcludedItem>) {
    let mut excluded = Vec::new();

    let mut order: Vec<LineageId> = Vec::new();
    let mut groups: HashMap<LineageId, Vec<&ServiceLineItem>> = HashMap::new();
    for item in items {
        if !groups.contains_key(&item.lineage_id) {
            order.push(item.lineage_id);
        }
        groups.entry(item.lineage_id).or_default().push(item);
    }

    let mut lineages = Vec::new();
    'chains: for lineage_id in order {
        let group = &groups[&lineage_id];

        for item in group.iter() {
            if item.is_canceled {
                excluded.push(ExcludedItem {
                    item_id: item.id,
                    lineage_id,
                    reason: ExclusionReason::CanceledLineage,
                });
                continue 'chains;
            }
        }

        let mut reported = false;
        let mut candidates: Vec<&ServiceLineItem> = Vec::new();
        for item in group.iter() {
            let reason = match item.billed {
                BillingFrequency::Usage => Some(ExclusionReason::UsageBilled),
                BillingFrequency::None => Some(ExclusionReason::NoneBilled),
                _ if item.quantity < 0 => Some(ExclusionReason::NegativeQuantity),
                _ if item.unit_price < Decimal::ZERO => Some(ExclusionReason::NegativeUnitPrice),
                _ => None,
            };
            if let Some(reason) = reason {
                excluded.push(ExcludedItem {
                    item_id: item.id,
                    lineage_id,
                    reason,
                });
                reported = true;
            } else if item.is_active_at(reference) {
                candidates.push(item);
            }
        }

        // Latest start wins; `max_by_key` keeps the later input position on
        // ties, matching how amendments supersede one another.
        match candidates.into_iter().max_by_key(|item| item.active_from) {
            Some(current) => lineages.push(ItemLineage {
                current: current.clone(),
                prior: snapshots.get(&lineage_id).copied(),
            }),
            None => {
                if !reported {
                    if let Some(last) = group.last() {
                        excluded.push(ExcludedItem {
                            item_id: last.id,
                            lineage_id,
                            reason: ExclusionReason::NoActiveLineageRecord,
                        });
                    }
                }
            }
        }
    }

    (lineages, excluded)
}
