use crate::application::classifier::ResponseClassifier;
use crate::application::request_builder::RequestBuilder;
use crate::config::ConnectorConfig;
use crate::domain::outcome::{
    AuthorizeOutcome, CancelOutcome, CanonicalOutcome, CaptureOutcome, Rejection,
};
use crate::domain::ports::{HttpTransportBox, OutboundCall, TransportResponse};
use crate::domain::transaction::{
    AuthorizationRequest, CancelRequest, CaptureRequest, TransactionRequest,
};
use crate::error::Result;
use tracing::{debug, info, instrument, warn};

pub const CONNECTOR_NAME: &str = "STRIPE";
pub const CONNECTOR_WEBSITE: &str = "stripe.com";

/// Translates host lifecycle requests into processor API calls.
///
/// Holds no per-transaction state: the external transaction id returned by
/// [`authorize`](Self::authorize) is the only thing threaded into
/// [`capture`](Self::capture) and [`cancel`](Self::cancel), and the processor
/// remains the source of truth for whether those transitions are legal.
pub struct ProcessorConnector {
    config: ConnectorConfig,
    builder: RequestBuilder,
    transport: HttpTransportBox,
}

impl ProcessorConnector {
    /// Creates a new `ProcessorConnector` instance.
    ///
    /// # Arguments
    ///
    /// * `config` - Static configuration built once by the host.
    /// * `transport` - The transport used for every outbound call.
    pub fn new(config: ConnectorConfig, transport: HttpTransportBox) -> Self {
        let builder = RequestBuilder::new(config.api_base.clone());
        Self {
            config,
            builder,
            transport,
        }
    }

    pub fn name(&self) -> &'static str {
        CONNECTOR_NAME
    }

    pub fn website(&self) -> &'static str {
        CONNECTOR_WEBSITE
    }

    pub fn configuration(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Reserves funds: creates a payment method, then a confirmed intent with
    /// manual capture. The intent is never created if the first stage fails.
    #[instrument(
        skip_all,
        fields(amount = req.amount, currency = %req.currency_code)
    )]
    pub async fn authorize(&self, req: &AuthorizationRequest) -> AuthorizeOutcome {
        let method_call = self.builder.payment_method_call(req);
        let payment_method =
            match ResponseClassifier::payment_method(self.send(&method_call).await) {
                Ok(id) => id,
                Err(rejection) => {
                    log_rejection("payment method", &rejection);
                    return AuthorizeOutcome::Rejected(rejection);
                }
            };

        let intent_call = self.builder.payment_intent_call(req, &payment_method);
        let outcome = ResponseClassifier::authorization(self.send(&intent_call).await);
        match &outcome {
            AuthorizeOutcome::Authorized(id) => info!(transaction_id = %id, "authorized"),
            AuthorizeOutcome::Rejected(rejection) => log_rejection("authorization", rejection),
        }
        outcome
    }

    /// Settles the funds held by a prior authorization.
    #[instrument(skip_all, fields(transaction_id = %req.external_transaction_id))]
    pub async fn capture(&self, req: &CaptureRequest) -> CaptureOutcome {
        let call = self
            .builder
            .capture_call(&req.credentials, &req.external_transaction_id);
        let outcome = ResponseClassifier::capture(self.send(&call).await);
        match &outcome {
            CaptureOutcome::Settled => info!("settled"),
            CaptureOutcome::Rejected(rejection) => log_rejection("capture", rejection),
        }
        outcome
    }

    /// Releases the hold of a prior, uncaptured authorization.
    #[instrument(skip_all, fields(transaction_id = %req.external_transaction_id))]
    pub async fn cancel(&self, req: &CancelRequest) -> CancelOutcome {
        let call = self
            .builder
            .cancel_call(&req.credentials, &req.external_transaction_id);
        let outcome = ResponseClassifier::cancel(self.send(&call).await);
        match &outcome {
            CancelOutcome::Cancelled => info!("cancelled"),
            CancelOutcome::Rejected(rejection) => log_rejection("cancel", rejection),
        }
        outcome
    }

    /// Routes any request to its operation.
    pub async fn process(&self, request: &TransactionRequest) -> CanonicalOutcome {
        match request {
            TransactionRequest::Authorization(req) => self.authorize(req).await.into(),
            TransactionRequest::Capture(req) => self.capture(req).await.into(),
            TransactionRequest::Cancel(req) => self.cancel(req).await.into(),
        }
    }

    async fn send(&self, call: &OutboundCall) -> Result<TransportResponse> {
        debug!(method = %call.method, url = %call.url, "calling processor");
        let result = self.transport.send(call).await;
        if let Ok(response) = &result {
            debug!(status = response.status_code, "processor responded");
        }
        result
    }
}

fn log_rejection(stage: &str, rejection: &Rejection) {
    match rejection {
        Rejection::Declined(reason) => warn!(stage, ?reason, "declined"),
        Rejection::Failed(message) => warn!(stage, %message, "failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credentials::Credentials;
    use crate::domain::outcome::DeclineReason;
    use crate::domain::ports::HttpTransport;
    use crate::domain::transaction::{CardDetails, ExternalTransactionId};
    use crate::error::ConnectorError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays canned responses and remembers what was sent.
    #[derive(Clone, Default)]
    struct Replay {
        responses: Arc<Mutex<VecDeque<Result<TransportResponse>>>>,
        sent: Arc<Mutex<Vec<OutboundCall>>>,
    }

    impl Replay {
        fn with(responses: Vec<Result<TransportResponse>>) -> Self {
            let replay = Self::default();
            replay.responses.lock().unwrap().extend(responses);
            replay
        }

        fn sent_urls(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|c| c.url.clone())
                .collect()
        }
    }

    #[async_trait]
    impl HttpTransport for Replay {
        async fn send(&self, call: &OutboundCall) -> Result<TransportResponse> {
            self.sent.lock().unwrap().push(call.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ConnectorError::Transport("no response queued".into())))
        }
    }

    fn ok(status: u16, body: &str) -> Result<TransportResponse> {
        Ok(TransportResponse::new(status, body))
    }

    fn connector(replay: &Replay) -> ProcessorConnector {
        let config = ConnectorConfig::new(Credentials::new("acct_1", "sk_test_1")).unwrap();
        ProcessorConnector::new(config, Box::new(replay.clone()))
    }

    fn authorization() -> AuthorizationRequest {
        AuthorizationRequest {
            credentials: Credentials::new("acct_1", "sk_test_1"),
            amount: 100,
            currency_code: "EUR".into(),
            card: CardDetails {
                number: "4111111111111111".into(),
                expiry_month: 4,
                expiry_year: 2030,
                holder_name: "Mr Foo Bar".into(),
                cvv: "020".into(),
            },
        }
    }

    #[test]
    fn test_host_metadata() {
        let connector = connector(&Replay::default());
        assert_eq!(connector.name(), "STRIPE");
        assert_eq!(connector.website(), "stripe.com");
        assert_eq!(connector.configuration().credentials.account_id, "acct_1");
    }

    #[tokio::test]
    async fn test_authorize_runs_both_stages() {
        let replay = Replay::with(vec![
            ok(200, r#"{"id":"pm_1"}"#),
            ok(200, r#"{"id":"pi_1","status":"requires_capture"}"#),
        ]);
        let outcome = connector(&replay).authorize(&authorization()).await;

        assert_eq!(
            outcome,
            AuthorizeOutcome::Authorized(ExternalTransactionId::new("pi_1"))
        );
        assert_eq!(
            replay.sent_urls(),
            vec![
                "https://api.stripe.com/v1/payment_methods",
                "https://api.stripe.com/v1/payment_intents",
            ]
        );
        let sent = replay.sent.lock().unwrap();
        assert!(sent[1].body.contains("payment_method=pm_1"));
    }

    #[tokio::test]
    async fn test_authorize_short_circuits_on_method_failure() {
        let replay = Replay::with(vec![ok(
            402,
            r#"{"error":{"code":"incorrect_number","message":"Your card number is incorrect."}}"#,
        )]);
        let outcome = connector(&replay).authorize(&authorization()).await;

        assert_eq!(
            outcome,
            AuthorizeOutcome::Rejected(Rejection::Failed("Your card number is incorrect.".into()))
        );
        assert_eq!(replay.sent_urls().len(), 1);
    }

    #[tokio::test]
    async fn test_authorize_intent_decline() {
        let replay = Replay::with(vec![
            ok(200, r#"{"id":"pm_1"}"#),
            ok(
                402,
                r#"{"error":{"code":"card_declined","decline_code":"insufficient_funds","message":"Your card has insufficient funds."}}"#,
            ),
        ]);
        let outcome = connector(&replay).authorize(&authorization()).await;

        assert_eq!(
            outcome,
            AuthorizeOutcome::Rejected(Rejection::Declined(DeclineReason::InsufficientFunds))
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_failed_outcome() {
        let replay = Replay::with(vec![Err(ConnectorError::Transport("timed out".into()))]);
        let outcome = connector(&replay)
            .capture(&CaptureRequest {
                credentials: Credentials::new("acct_1", "sk_test_1"),
                external_transaction_id: "pi_1".into(),
            })
            .await;

        assert_eq!(
            outcome,
            CaptureOutcome::Rejected(Rejection::Failed("Transport error: timed out".into()))
        );
    }

    #[tokio::test]
    async fn test_capture_uses_request_credentials() {
        let replay = Replay::with(vec![ok(200, r#"{"id":"pi_1","status":"succeeded"}"#)]);
        let outcome = connector(&replay)
            .capture(&CaptureRequest {
                credentials: Credentials::new("acct_1", "sk_test_per_call"),
                external_transaction_id: "pi_1".into(),
            })
            .await;

        assert_eq!(outcome, CaptureOutcome::Settled);
        let sent = replay.sent.lock().unwrap();
        assert_eq!(sent[0].header("Authorization"), Some("Bearer sk_test_per_call"));
    }

    #[tokio::test]
    async fn test_process_dispatches_cancel() {
        let replay = Replay::with(vec![ok(200, r#"{"id":"pi_9","status":"canceled"}"#)]);
        let request = TransactionRequest::Cancel(CancelRequest {
            credentials: Credentials::new("acct_1", "sk_test_1"),
            external_transaction_id: "pi_9".into(),
        });

        let outcome = connector(&replay).process(&request).await;
        assert_eq!(outcome, CanonicalOutcome::Cancelled);
        assert_eq!(
            replay.sent_urls(),
            vec!["https://api.stripe.com/v1/payment_intents/pi_9/cancel"]
        );
    }
}
