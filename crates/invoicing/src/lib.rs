//! Billing computation for cycle and off-cycle invoices.
//!
//! Pure, deterministic domain logic: no IO, no clocks, no logging. Given a
//! draft invoice, the contract's service line items and (for off-cycle
//! billing) what each amendment chain already billed, the computers produce
//! rounded lines, VAT and totals, and the decision turns empty results into
//! discards. The draft itself is an event-sourced aggregate whose filled,
//! non-dry-run state is immutable.

pub mod cycle;
pub mod invoice;
pub mod line_item;
pub mod lineage;
pub mod off_cycle;
pub mod outcome;
pub mod period;
pub mod rate;
pub mod totals;

pub use cycle::fill_cycle_invoice;
pub use invoice::{
    ContractId, DiscardInvoice, FillInvoice, InitializeInvoice, Invoice, InvoiceCommand,
    InvoiceDiscarded, InvoiceEvent, InvoiceFilled, InvoiceId, InvoiceInitialized, InvoiceStatus,
};
pub use line_item::{
    ExcludedItem, ExclusionReason, LineageId, PriorInvoicedSnapshot, ServiceLineItem,
    ServiceLineItemId,
};
pub use lineage::{ItemLineage, assemble_lineages};
pub use off_cycle::fill_off_cycle_invoice;
pub use outcome::{DiscardReason, InvoiceOutcome, decide};
pub use period::{BillingPeriod, cycle_end};
pub use rate::BillingFrequency;
pub use totals::{ComputedInvoice, InvoiceLine, line_vat};
