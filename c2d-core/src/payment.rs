use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::CoreResult;

/// Everything a gateway needs to open a hosted checkout session.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    /// Our correlation key; the gateway echoes it back in webhooks.
    pub reference: String,
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
    pub customer_email: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// Gateway-assigned session id.
    pub session_id: String,
    /// Where to send the payer. A gateway response may omit this; callers
    /// must treat a missing URL as a gateway error, never return it as-is.
    pub redirect_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WebhookOutcome {
    Success,
    Failure,
    Cancelled,
}

/// A verified, parsed webhook delivery.
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    pub reference: String,
    pub outcome: WebhookOutcome,
}

/// The single polymorphic capability both gateways implement. Clients are
/// constructed once at startup from config and passed in explicitly.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a hosted checkout session with the provider.
    async fn create_session(&self, request: &SessionRequest) -> CoreResult<CheckoutSession>;

    /// Verify the delivery signature against the shared webhook secret and
    /// parse the raw body into a reconcilable event. The payload must not
    /// be trusted before the signature checks out.
    fn parse_webhook(&self, raw_body: &[u8], signature: Option<&str>) -> CoreResult<WebhookEvent>;
}
