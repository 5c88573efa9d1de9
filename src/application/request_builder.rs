use crate::domain::credentials::Credentials;
use crate::domain::ports::{Method, OutboundCall};
use crate::domain::transaction::{AuthorizationRequest, ExternalTransactionId, PaymentMethodId};
use url::Url;
use url::form_urlencoded::Serializer;

pub const PAYMENT_METHODS_PATH: &str = "v1/payment_methods";
pub const PAYMENT_INTENTS_PATH: &str = "v1/payment_intents";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Builds outbound calls against the processor's REST API.
///
/// Pure: every method only assembles strings.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    api_base: Url,
}

impl RequestBuilder {
    pub fn new(api_base: Url) -> Self {
        Self { api_base }
    }

    /// Headers attached to every call.
    pub fn headers(credentials: &Credentials) -> Vec<(String, String)> {
        vec![
            (
                "Authorization".to_string(),
                format!("Bearer {}", credentials.api_key),
            ),
            ("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()),
        ]
    }

    /// First authorization stage: create a card payment method.
    pub fn payment_method_call(&self, req: &AuthorizationRequest) -> OutboundCall {
        let card = &req.card;
        let body = Serializer::new(String::new())
            .append_pair("type", "card")
            .append_pair("billing_details[name]", &card.holder_name)
            .append_pair("card[number]", &card.number)
            .append_pair("card[exp_month]", &card.expiry_month.to_string())
            .append_pair("card[exp_year]", &card.expiry_year.to_string())
            .append_pair("card[cvc]", &card.cvv)
            .finish();

        self.post(&req.credentials, self.endpoint(&[PAYMENT_METHODS_PATH]), body)
    }

    /// Second authorization stage: a confirmed, manually captured intent
    /// for the payment method created by the first stage.
    pub fn payment_intent_call(
        &self,
        req: &AuthorizationRequest,
        payment_method: &PaymentMethodId,
    ) -> OutboundCall {
        let body = Serializer::new(String::new())
            .append_pair("amount", &req.amount.to_string())
            .append_pair("currency", &req.currency_code.to_lowercase())
            .append_pair("confirm", "true")
            .append_pair("payment_method", payment_method.as_str())
            .append_pair("capture_method", "manual")
            .finish();

        self.post(&req.credentials, self.endpoint(&[PAYMENT_INTENTS_PATH]), body)
    }

    pub fn capture_call(
        &self,
        credentials: &Credentials,
        id: &ExternalTransactionId,
    ) -> OutboundCall {
        self.intent_action(credentials, id, "capture")
    }

    pub fn cancel_call(&self, credentials: &Credentials, id: &ExternalTransactionId) -> OutboundCall {
        self.intent_action(credentials, id, "cancel")
    }

    fn intent_action(
        &self,
        credentials: &Credentials,
        id: &ExternalTransactionId,
        action: &str,
    ) -> OutboundCall {
        let url = self.endpoint(&[PAYMENT_INTENTS_PATH, id.as_str(), action]);
        self.post(credentials, url, String::new())
    }

    fn post(&self, credentials: &Credentials, url: Url, body: String) -> OutboundCall {
        OutboundCall {
            method: Method::Post,
            url: url.into(),
            headers: Self::headers(credentials),
            body,
        }
    }

    /// Appends each part as path segments; `/` inside a part only splits the
    /// static prefixes, caller-supplied ids are pushed as single segments.
    fn endpoint(&self, parts: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            for (i, part) in parts.iter().enumerate() {
                if i == 0 {
                    segments.extend(part.split('/'));
                } else {
                    segments.push(part);
                }
            }
        }
        url
    }
}
