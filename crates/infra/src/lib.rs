//! Infrastructure for the billing engine: the collaborator seams a billing
//! run plugs into (contract source, invoice writer), the run orchestrator,
//! and an in-memory store backing tests and benchmarks.

pub mod fill;
pub mod memory;
pub mod source;
pub mod writer;


pub use fill::{BillingRunError, FillDisposition, FillReport, InvoiceFiller};
pub use memory::{INVOICE_AGGREGATE_TYPE, InMemoryBillingStore};
pub use source::{ContractBillingSource, SourceError};
pub use writer::{InvoiceWriter, WriterError};
