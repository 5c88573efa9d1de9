use crate::domain::outcome::{
    AuthorizeOutcome, CancelOutcome, CaptureOutcome, DeclineReason, Rejection,
};
use crate::domain::ports::TransportResponse;
use crate::domain::transaction::{ExternalTransactionId, PaymentMethodId};
use crate::error::Result;
use serde_json::Value;
use tracing::warn;

/// Field of the processor's error object that carries the issuer decline code.
pub const DECLINE_CODE_FIELD: &str = "decline_code";
pub const MESSAGE_FIELD: &str = "message";

pub const STATUS_REQUIRES_CAPTURE: &str = "requires_capture";
pub const STATUS_SUCCEEDED: &str = "succeeded";
pub const STATUS_CANCELED: &str = "canceled";

const HTTP_OK: u16 = 200;

/// Maps transport results onto per-operation outcomes.
///
/// Every input, including transport failures and unparseable bodies,
/// produces exactly one outcome. Nothing here returns an error or panics.
pub struct ResponseClassifier;

impl ResponseClassifier {
    pub fn payment_method(
        result: Result<TransportResponse>,
    ) -> std::result::Result<PaymentMethodId, Rejection> {
        let body = accepted(result)?;
        resource_id(&body).map(PaymentMethodId::new)
    }

    pub fn authorization(result: Result<TransportResponse>) -> AuthorizeOutcome {
        match expect_status(result, STATUS_REQUIRES_CAPTURE)
            .and_then(|body| resource_id(&body).map(ExternalTransactionId::new))
        {
            Ok(id) => AuthorizeOutcome::Authorized(id),
            Err(rejection) => AuthorizeOutcome::Rejected(rejection),
        }
    }

    pub fn capture(result: Result<TransportResponse>) -> CaptureOutcome {
        match expect_status(result, STATUS_SUCCEEDED) {
            Ok(_) => CaptureOutcome::Settled,
            Err(rejection) => CaptureOutcome::Rejected(rejection),
        }
    }

    pub fn cancel(result: Result<TransportResponse>) -> CancelOutcome {
        match expect_status(result, STATUS_CANCELED) {
            Ok(_) => CancelOutcome::Cancelled,
            Err(rejection) => CancelOutcome::Rejected(rejection),
        }
    }

    /// Decline when the error carries a decline code, failure otherwise.
    ///
    /// `status_code` only feeds the fallback message used when the error has
    /// no usable `message` of its own.
    pub fn classify_error(error: &Value, status_code: u16) -> Rejection {
        if let Some(code) = error.get(DECLINE_CODE_FIELD).and_then(Value::as_str) {
            return Rejection::Declined(DeclineReason::from_code(code));
        }

        let message = error
            .get(MESSAGE_FIELD)
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty());
        match message {
            Some(message) => Rejection::Failed(message.to_string()),
            None => {
                let code = error.get("code").and_then(Value::as_str);
                Rejection::Failed(fallback_message(status_code, code))
            }
        }
    }
}

/// Unwraps a 200 response into its JSON body, classifying anything else.
fn accepted(result: Result<TransportResponse>) -> std::result::Result<Value, Rejection> {
    let response = result.map_err(|e| {
        warn!(error = %e, "transport failed before a response was received");
        Rejection::Failed(e.to_string())
    })?;

    let body: Value = serde_json::from_str(&response.response_text).map_err(|e| {
        warn!(
            status = response.status_code,
            error = %e,
            "processor response is not valid JSON"
        );
        Rejection::Failed(fallback_message(response.status_code, None))
    })?;

    if response.status_code != HTTP_OK {
        return Err(match body.get("error") {
            Some(error) if error.is_object() => {
                ResponseClassifier::classify_error(error, response.status_code)
            }
            _ => {
                warn!(
                    status = response.status_code,
                    "error response without an error object"
                );
                Rejection::Failed(fallback_message(response.status_code, None))
            }
        });
    }

    Ok(body)
}

fn expect_status(
    result: Result<TransportResponse>,
    expected: &str,
) -> std::result::Result<Value, Rejection> {
    let body = accepted(result)?;
    match body.get("status").and_then(Value::as_str) {
        Some(status) if status == expected => Ok(body),
        Some(status) => {
            warn!(status, expected, "unexpected resource status");
            match body.get("last_payment_error") {
                Some(error) if error.is_object() => {
                    Err(ResponseClassifier::classify_error(error, HTTP_OK))
                }
                _ => Err(Rejection::Failed(format!(
                    "Unexpected payment status: {status}"
                ))),
            }
        }
        None => Err(Rejection::Failed(
            "Processor response is missing a status".to_string(),
        )),
    }
}

fn resource_id(body: &Value) -> std::result::Result<String, Rejection> {
    body.get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Rejection::Failed("Processor response is missing an id".to_string()))
}

fn fallback_message(status_code: u16, code: Option<&str>) -> String {
    match code {
        Some(code) => format!("Processor request failed with HTTP {status_code} ({code})"),
        None => format!("Processor request failed with HTTP {status_code}"),
    }
}
