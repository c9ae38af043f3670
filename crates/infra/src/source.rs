//! Read side of a billing run: the contract state invoices are computed from.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use cyclebill_core::TenantId;
use cyclebill_invoicing::{ContractId, LineageId, PriorInvoicedSnapshot, ServiceLineItem};

/// Contract data source failure.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unknown contract: {0}")]
    UnknownContract(ContractId),

    #[error("contract data unavailable: {0}")]
    Unavailable(#[from] anyhow::Error),
}

/// Supplies the contract data a billing run reads.
///
/// Contracts live outside this engine; implementations fetch service line
/// item versions and the billed-lineage ledger. The computation decides
/// what actually bills, so sources return data as-is, malformed rows
/// included.
pub trait ContractBillingSource: Send + Sync {
    /// Service line item versions of a contract, as of the given reference
    /// date.
    ///
    /// Temporal stores can cut their query at `as_of`, but must still
    /// return whole amendment chains: lineage assembly needs superseded and
    /// expired versions to resolve each chain.
    fn service_line_items(
        &self,
        tenant_id: TenantId,
        contract_id: ContractId,
        as_of: NaiveDate,
    ) -> Result<Vec<ServiceLineItem>, SourceError>;

    /// What each amendment chain of the contract last billed on a
    /// finalized invoice. Chains that never billed are absent.
    fn prior_invoiced_snapshots(
        &self,
        tenant_id: TenantId,
        contract_id: ContractId,
    ) -> Result<HashMap<LineageId, PriorInvoicedSnapshot>, SourceError>;
}

impl<S> ContractBillingSource for Arc<S>
where
    S: ContractBillingSource + ?Sized,
{
    fn service_line_items(
        &self,
        tenant_id: TenantId,
        contract_id: ContractId,
        as_of: NaiveDate,
    ) -> Result<Vec<ServiceLineItem>, SourceError> {
        (**self).service_line_items(tenant_id, contract_id, as_of)
    }

    fn prior_invoiced_snapshots(
        &self,
        tenant_id: TenantId,
        contract_id: ContractId,
    ) -> Result<HashMap<LineageId, PriorInvoicedSnapshot>, SourceError> {
        (**self).prior_invoiced_snapshots(tenant_id, contract_id)
    }
}
