//! `cyclebill-core` — shared kernel for the billing engine.
//!
//! Pure domain primitives only: typed identifiers, the domain error model,
//! aggregate traits, and money rounding. No infrastructure concerns.

pub mod aggregate;
pub mod error;
pub mod id;
pub mod money;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use error::{DomainError, DomainResult};
pub use id::{AggregateId, TenantId};
pub use money::round2;
