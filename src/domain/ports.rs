use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// A fully built request, ready to hand to a transport.
#[derive(Clone, PartialEq, Eq)]
pub struct OutboundCall {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Form-encoded body; empty for action-only calls.
    pub body: String,
}

impl OutboundCall {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

// Headers and body carry the API key and card data.
impl fmt::Debug for OutboundCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundCall")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("body_len", &self.body.len())
            .finish_non_exhaustive()
    }
}

/// Status code and raw body text returned by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status_code: u16,
    pub response_text: String,
}

impl TransportResponse {
    pub fn new(status_code: u16, response_text: impl Into<String>) -> Self {
        Self {
            status_code,
            response_text: response_text.into(),
        }
    }
}

/// Port to whatever actually moves bytes to the processor.
///
/// An `Err` means no HTTP response was obtained at all; any status code,
/// including 4xx/5xx, is an `Ok`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, call: &OutboundCall) -> Result<TransportResponse>;
}

pub type HttpTransportBox = Box<dyn HttpTransport>;
