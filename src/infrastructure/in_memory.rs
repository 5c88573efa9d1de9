use crate::domain::ports::{HttpTransport, Method, OutboundCall, TransportResponse};
use crate::error::{ConnectorError, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use url::Url;
use url::form_urlencoded;

/// Test card that authorizes and captures normally.
pub const CARD_SUCCESS: &str = "4111111111111111";
/// Declined by the issuer with `insufficient_funds`.
pub const CARD_INSUFFICIENT_FUNDS: &str = "4000000000009995";
/// Declined with `generic_decline`.
pub const CARD_GENERIC_DECLINE: &str = "4000000000000002";
/// Declined with `expired_card`.
pub const CARD_EXPIRED: &str = "4000000000000069";
/// Fails with `processing_error`, no decline code.
pub const CARD_PROCESSING_ERROR: &str = "4000000000000119";
/// Fails the Luhn check, so payment-method creation is rejected.
pub const CARD_INCORRECT_NUMBER: &str = "4242424242424241";

const CANCELABLE: [&str; 5] = [
    "requires_payment_method",
    "requires_capture",
    "requires_confirmation",
    "requires_action",
    "processing",
];

#[derive(Debug, Clone)]
struct StoredPaymentMethod {
    number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredIntent {
    pub id: String,
    pub object: &'static str,
    pub amount: u64,
    pub currency: String,
    pub payment_method: String,
    pub capture_method: String,
    pub status: String,
}

#[derive(Debug, Default)]
struct Ledger {
    next_id: u64,
    payment_methods: HashMap<String, StoredPaymentMethod>,
    intents: HashMap<String, StoredIntent>,
}

impl Ledger {
    fn mint(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_{:016}", self.next_id)
    }
}

/// An in-process stand-in for the processor's test mode.
///
/// Implements the transport port by interpreting each call against a shared
/// ledger of payment methods and intents, reproducing the sandbox's test
/// cards, API-key check and intent state transitions. Cloning shares the
/// ledger.
#[derive(Clone)]
pub struct InMemoryProcessor {
    api_key: Arc<String>,
    ledger: Arc<RwLock<Ledger>>,
    offline: Arc<AtomicBool>,
}

impl InMemoryProcessor {
    /// Creates a processor that accepts only `api_key`.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Arc::new(api_key.into()),
            ledger: Arc::new(RwLock::new(Ledger::default())),
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    /// While offline every call fails before a response is produced.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn intent(&self, id: &str) -> Option<StoredIntent> {
        self.ledger.read().await.intents.get(id).cloned()
    }

    pub async fn intent_count(&self) -> usize {
        self.ledger.read().await.intents.len()
    }

    pub async fn payment_method_count(&self) -> usize {
        self.ledger.read().await.payment_methods.len()
    }

    fn authorized(&self, call: &OutboundCall) -> std::result::Result<(), TransportResponse> {
        let presented = call
            .header("Authorization")
            .and_then(|value| value.strip_prefix("Bearer "))
            .unwrap_or_default();
        if presented == self.api_key.as_str() {
            return Ok(());
        }

        let shown: String = presented.chars().take(8).collect();
        Err(error_response(
            401,
            json!({
                "type": "invalid_request_error",
                "message": format!("Invalid API Key provided: {shown}****"),
            }),
        ))
    }

    async fn create_payment_method(&self, form: &HashMap<String, String>) -> TransportResponse {
        let required = ["card[number]", "card[exp_month]", "card[exp_year]", "card[cvc]"];
        if let Some(missing) = required.iter().find(|key| !form.contains_key(**key)) {
            return parameter_missing(missing);
        }

        let number = &form["card[number]"];
        if !luhn_valid(number) {
            return error_response(
                402,
                json!({
                    "type": "card_error",
                    "code": "incorrect_number",
                    "param": "card[number]",
                    "message": "Your card number is incorrect.",
                }),
            );
        }

        let month_ok = form["card[exp_month]"]
            .parse::<u8>()
            .is_ok_and(|m| (1..=12).contains(&m));
        if !month_ok {
            return error_response(
                402,
                json!({
                    "type": "card_error",
                    "code": "invalid_expiry_month",
                    "param": "card[exp_month]",
                    "message": "Your card's expiration month is invalid.",
                }),
            );
        }

        let mut ledger = self.ledger.write().await;
        let id = ledger.mint("pm");
        ledger.payment_methods.insert(
            id.clone(),
            StoredPaymentMethod {
                number: number.clone(),
            },
        );

        let last4: String = number.chars().skip(number.len().saturating_sub(4)).collect();
        ok_response(json!({
            "id": id,
            "object": "payment_method",
            "type": "card",
            "card": {"last4": last4},
            "billing_details": {"name": form.get("billing_details[name]")},
        }))
    }

    async fn create_intent(&self, form: &HashMap<String, String>) -> TransportResponse {
        for key in ["amount", "currency", "payment_method"] {
            if !form.contains_key(key) {
                return parameter_missing(key);
            }
        }
        let amount = match form["amount"].parse::<u64>() {
            Ok(amount) if amount > 0 => amount,
            _ => {
                return error_response(
                    400,
                    json!({
                        "type": "invalid_request_error",
                        "code": "parameter_invalid_integer",
                        "param": "amount",
                        "message": "Invalid positive integer",
                    }),
                );
            }
        };

        let mut ledger = self.ledger.write().await;
        let method_id = &form["payment_method"];
        let Some(method) = ledger.payment_methods.get(method_id).cloned() else {
            return resource_missing("payment_method", method_id);
        };

        let id = ledger.mint("pi");
        let capture_method = form
            .get("capture_method")
            .cloned()
            .unwrap_or_else(|| "automatic".to_string());
        let mut intent = StoredIntent {
            id: id.clone(),
            object: "payment_intent",
            amount,
            currency: form["currency"].clone(),
            payment_method: method_id.clone(),
            capture_method: capture_method.clone(),
            status: "requires_confirmation".to_string(),
        };

        if form.get("confirm").map(String::as_str) != Some("true") {
            let body = intent_json(&intent);
            ledger.intents.insert(id, intent);
            return ok_response(body);
        }

        if let Some(error) = card_outcome(&method.number) {
            intent.status = "requires_payment_method".to_string();
            let mut error = error;
            error["payment_intent"] = intent_json(&intent);
            ledger.intents.insert(id, intent);
            return error_response(402, error);
        }

        intent.status = if capture_method == "manual" {
            "requires_capture".to_string()
        } else {
            "succeeded".to_string()
        };
        let body = intent_json(&intent);
        ledger.intents.insert(id, intent);
        ok_response(body)
    }

    async fn retrieve_intent(&self, id: &str) -> TransportResponse {
        match self.ledger.read().await.intents.get(id) {
            Some(intent) => ok_response(intent_json(intent)),
            None => resource_missing("payment_intent", id),
        }
    }

    async fn capture_intent(&self, id: &str) -> TransportResponse {
        let mut ledger = self.ledger.write().await;
        let Some(intent) = ledger.intents.get_mut(id) else {
            return resource_missing("payment_intent", id);
        };
        if intent.status != "requires_capture" {
            return unexpected_state(format!(
                "This PaymentIntent could not be captured because it has a status of {}. \
                 Only a PaymentIntent with one of the following statuses may be captured: \
                 requires_capture.",
                intent.status
            ));
        }
        intent.status = "succeeded".to_string();
        ok_response(intent_json(intent))
    }

    async fn cancel_intent(&self, id: &str) -> TransportResponse {
        let mut ledger = self.ledger.write().await;
        let Some(intent) = ledger.intents.get_mut(id) else {
            return resource_missing("payment_intent", id);
        };
        if !CANCELABLE.contains(&intent.status.as_str()) {
            return unexpected_state(format!(
                "You cannot cancel this PaymentIntent because it has a status of {}. \
                 Only a PaymentIntent with one of the following statuses may be canceled: {}.",
                intent.status,
                CANCELABLE.join(", ")
            ));
        }
        intent.status = "canceled".to_string();
        ok_response(intent_json(intent))
    }
}

#[async_trait]
impl HttpTransport for InMemoryProcessor {
    async fn send(&self, call: &OutboundCall) -> Result<TransportResponse> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ConnectorError::Transport(format!(
                "connection refused: {}",
                call.url
            )));
        }
        if let Err(response) = self.authorized(call) {
            return Ok(response);
        }

        let url = Url::parse(&call.url).map_err(|e| ConnectorError::Transport(e.to_string()))?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.skip_while(|seg| *seg != "v1").collect())
            .unwrap_or_default();
        let form: HashMap<String, String> = form_urlencoded::parse(call.body.as_bytes())
            .into_owned()
            .collect();

        let response = match (call.method, segments.as_slice()) {
            (Method::Post, ["v1", "payment_methods"]) => self.create_payment_method(&form).await,
            (Method::Post, ["v1", "payment_intents"]) => self.create_intent(&form).await,
            (Method::Get, ["v1", "payment_intents", id]) => self.retrieve_intent(id).await,
            (Method::Post, ["v1", "payment_intents", id, "capture"]) => {
                self.capture_intent(id).await
            }
            (Method::Post, ["v1", "payment_intents", id, "cancel"]) => self.cancel_intent(id).await,
            _ => error_response(
                404,
                json!({
                    "type": "invalid_request_error",
                    "message": format!("Unrecognized request URL ({}: {})", call.method, url.path()),
                }),
            ),
        };
        Ok(response)
    }
}

/// Error body the sandbox returns when confirming an intent with `number`.
fn card_outcome(number: &str) -> Option<Value> {
    let declined = |decline_code: &str, message: &str| {
        json!({
            "type": "card_error",
            "code": "card_declined",
            "decline_code": decline_code,
            "message": message,
        })
    };
    match number {
        CARD_INSUFFICIENT_FUNDS => Some(declined(
            "insufficient_funds",
            "Your card has insufficient funds.",
        )),
        CARD_GENERIC_DECLINE => Some(declined("generic_decline", "Your card was declined.")),
        CARD_EXPIRED => Some(json!({
            "type": "card_error",
            "code": "expired_card",
            "decline_code": "expired_card",
            "message": "Your card has expired.",
        })),
        CARD_PROCESSING_ERROR => Some(json!({
            "type": "card_error",
            "code": "processing_error",
            "message": "An error occurred while processing your card. Try again in a little bit.",
        })),
        _ => None,
    }
}

fn luhn_valid(number: &str) -> bool {
    if number.len() < 12 || !number.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = number
        .bytes()
        .rev()
        .map(|b| u32::from(b - b'0'))
        .enumerate()
        .map(|(i, d)| match (i % 2, d * 2) {
            (0, _) => d,
            (_, doubled) if doubled > 9 => doubled - 9,
            (_, doubled) => doubled,
        })
        .sum();
    sum % 10 == 0
}

fn intent_json(intent: &StoredIntent) -> Value {
    serde_json::to_value(intent).unwrap_or(Value::Null)
}

fn ok_response(body: Value) -> TransportResponse {
    TransportResponse::new(200, body.to_string())
}

fn error_response(status: u16, error: Value) -> TransportResponse {
    TransportResponse::new(status, json!({ "error": error }).to_string())
}

fn parameter_missing(param: &str) -> TransportResponse {
    error_response(
        400,
        json!({
            "type": "invalid_request_error",
            "code": "parameter_missing",
            "param": param,
            "message": format!("Missing required param: {param}."),
        }),
    )
}

fn resource_missing(kind: &str, id: &str) -> TransportResponse {
    error_response(
        404,
        json!({
            "type": "invalid_request_error",
            "code": "resource_missing",
            "message": format!("No such {kind}: '{id}'"),
        }),
    )
}

fn unexpected_state(message: String) -> TransportResponse {
    error_response(
        400,
        json!({
            "type": "invalid_request_error",
            "code": "payment_intent_unexpected_state",
            "message": message,
        }),
    )
}
