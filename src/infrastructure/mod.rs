//! Transport adapters for the `HttpTransport` port.

#[cfg(feature = "http-reqwest")]
pub mod http;
pub mod in_memory;
