use crate::domain::ports::{HttpTransport, Method, OutboundCall, TransportResponse};
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport backed by a pooled `reqwest::Client`.
///
/// Any status code is returned as a response; only connection-level
/// failures (DNS, TLS, timeout) become errors.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, call: &OutboundCall) -> Result<TransportResponse> {
        let mut request = match call.method {
            Method::Get => self.client.get(&call.url),
            Method::Post => self.client.post(&call.url),
        };
        for (name, value) in &call.headers {
            request = request.header(name, value);
        }
        if !call.body.is_empty() {
            request = request.body(call.body.clone());
        }

        let response = request.send().await?;
        let status_code = response.status().as_u16();
        let response_text = response.text().await?;

        Ok(TransportResponse {
            status_code,
            response_text,
        })
    }
}
