use super::credentials::Credentials;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw card data, passed through to the processor untouched.
///
/// Number format, expiry and cvv are validated upstream, never here.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub number: String,
    pub expiry_month: u8,
    pub expiry_year: u16,
    pub holder_name: String,
    pub cvv: String,
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible = self.number.len().saturating_sub(4);
        let last4 = self.number.get(visible..).unwrap_or_default();
        f.debug_struct("CardDetails")
            .field("number", &format_args!("****{last4}"))
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("holder_name", &self.holder_name)
            .field("cvv", &"***")
            .finish()
    }
}

/// Identifier the processor assigns to an authorized payment intent.
///
/// Opaque: it is only ever handed back to the processor verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalTransactionId(String);

impl ExternalTransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalTransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ExternalTransactionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ExternalTransactionId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Identifier of the payment-method resource created in the first
/// authorization stage and consumed by the second.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaymentMethodId(String);

impl PaymentMethodId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationRequest {
    pub credentials: Credentials,
    /// Amount in minor currency units.
    pub amount: u64,
    /// ISO-4217 code, any case.
    pub currency_code: String,
    pub card: CardDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRequest {
    pub credentials: Credentials,
    pub external_transaction_id: ExternalTransactionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub credentials: Credentials,
    pub external_transaction_id: ExternalTransactionId,
}

/// Any request the host can hand to the connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionRequest {
    Authorization(AuthorizationRequest),
    Capture(CaptureRequest),
    Cancel(CancelRequest),
}

impl TransactionRequest {
    pub fn credentials(&self) -> &Credentials {
        match self {
            TransactionRequest::Authorization(req) => &req.credentials,
            TransactionRequest::Capture(req) => &req.credentials,
            TransactionRequest::Cancel(req) => &req.credentials,
        }
    }
}

impl From<AuthorizationRequest> for TransactionRequest {
    fn from(req: AuthorizationRequest) -> Self {
        Self::Authorization(req)
    }
}

impl From<CaptureRequest> for TransactionRequest {
    fn from(req: CaptureRequest) -> Self {
        Self::Capture(req)
    }
}

impl From<CancelRequest> for TransactionRequest {
    fn from(req: CancelRequest) -> Self {
        Self::Cancel(req)
    }
}
