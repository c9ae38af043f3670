//! `cyclebill-events` — event trait, typed envelopes, and command execution.
//!
//! The billing engine records what happened to an invoice draft as events.
//! This crate holds the transport-free plumbing: the [`Event`] trait, the
//! [`EventEnvelope`] that stores append to a stream, and the [`execute`]
//! helper that runs a command through an aggregate.

pub mod envelope;
pub mod event;
pub mod handler;

pub use envelope::EventEnvelope;
pub use event::Event;
pub use handler::execute;
