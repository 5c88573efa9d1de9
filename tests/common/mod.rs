#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use stripe_connector::application::connector::ProcessorConnector;
use stripe_connector::config::ConnectorConfig;
use stripe_connector::domain::credentials::Credentials;
use stripe_connector::domain::ports::{HttpTransport, OutboundCall, TransportResponse};
use stripe_connector::domain::transaction::{
    AuthorizationRequest, CancelRequest, CaptureRequest, CardDetails, ExternalTransactionId,
};
use stripe_connector::error::{ConnectorError, Result};
use stripe_connector::infrastructure::in_memory::{CARD_SUCCESS, InMemoryProcessor};
use tokio::sync::Mutex;

pub const API_KEY: &str = "sk_test_lifecycle";
pub const ACCOUNT_ID: &str = "acct_lifecycle";

pub fn credentials() -> Credentials {
    Credentials::new(ACCOUNT_ID, API_KEY)
}

pub fn sandbox() -> (ProcessorConnector, InMemoryProcessor) {
    let processor = InMemoryProcessor::new(API_KEY);
    let config = ConnectorConfig::new(credentials()).unwrap();
    let connector = ProcessorConnector::new(config, Box::new(processor.clone()));
    (connector, processor)
}

pub fn card(number: &str) -> CardDetails {
    CardDetails {
        number: number.to_string(),
        expiry_month: 4,
        expiry_year: 2030,
        holder_name: "Mr Foo Bar".to_string(),
        cvv: "020".to_string(),
    }
}

pub fn authorization(number: &str) -> AuthorizationRequest {
    AuthorizationRequest {
        credentials: credentials(),
        amount: 100,
        currency_code: "EUR".to_string(),
        card: card(number),
    }
}

pub fn valid_authorization() -> AuthorizationRequest {
    authorization(CARD_SUCCESS)
}

pub fn capture(id: &ExternalTransactionId, credentials: Credentials) -> CaptureRequest {
    CaptureRequest {
        credentials,
        external_transaction_id: id.clone(),
    }
}

pub fn cancel(id: &ExternalTransactionId, credentials: Credentials) -> CancelRequest {
    CancelRequest {
        credentials,
        external_transaction_id: id.clone(),
    }
}

/// Transport that answers from a fixed script, for shapes the sandbox never produces.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<TransportResponse>>>,
    pub calls: Arc<Mutex<Vec<OutboundCall>>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<TransportResponse>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            calls: Arc::default(),
        }
    }

    pub fn connector(&self) -> ProcessorConnector {
        let config = ConnectorConfig::new(credentials()).unwrap();
        ProcessorConnector::new(config, Box::new(self.clone()))
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, call: &OutboundCall) -> Result<TransportResponse> {
        self.calls.lock().await.push(call.clone());
        self.script
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| ConnectorError::Transport("script exhausted".to_string()))
    }
}
