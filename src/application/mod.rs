//! Application layer: builds processor calls, classifies their responses and
//! composes both into the authorize / capture / cancel lifecycle.
//!
//! `ProcessorConnector` is the entry point; it performs at most two sequential
//! transport calls per operation and keeps no state between operations.

pub mod classifier;
pub mod connector;
pub mod request_builder;
