use async_trait::async_trait;
use serde::Deserialize;

use c2d_core::payment::{CheckoutSession, PaymentGateway, SessionRequest, WebhookEvent, WebhookOutcome};
use c2d_core::{CoreError, CoreResult};

use crate::signature;

const API_BASE: &str = "https://api.stripe.com";

/// Hosted-checkout client for Stripe. One instance per process, built from
/// config at startup.
pub struct StripeGateway {
    http: reqwest::Client,
    secret_key: String,
    webhook_secret: String,
    success_url: String,
    cancel_url: String,
    api_base: String,
}

impl StripeGateway {
    pub fn new(
        http: reqwest::Client,
        secret_key: String,
        webhook_secret: String,
        success_url: String,
        cancel_url: String,
    ) -> Self {
        Self {
            http,
            secret_key,
            webhook_secret,
            success_url,
            cancel_url,
            api_base: API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base;
        self
    }
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Event {
    #[serde(rename = "type")]
    type_: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: SessionObject,
}

#[derive(Debug, Deserialize)]
struct SessionObject {
    #[allow(dead_code)]
    id: Option<String>,
    client_reference_id: Option<String>,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_session(&self, request: &SessionRequest) -> CoreResult<CheckoutSession> {
        let amount = request.amount_minor.to_string();
        let currency = request.currency.to_lowercase();
        let params = [
            ("mode", "payment"),
            ("payment_method_types[0]", "card"),
            ("line_items[0][quantity]", "1"),
            ("line_items[0][price_data][currency]", currency.as_str()),
            ("line_items[0][price_data][unit_amount]", amount.as_str()),
            (
                "line_items[0][price_data][product_data][name]",
                request.description.as_str(),
            ),
            ("customer_email", request.customer_email.as_str()),
            ("client_reference_id", request.reference.as_str()),
            ("success_url", self.success_url.as_str()),
            ("cancel_url", self.cancel_url.as_str()),
        ];

        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| CoreError::Gateway(format!("Stripe request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, %body, "Stripe session creation rejected");
            return Err(CoreError::Gateway(format!(
                "Stripe returned {} creating checkout session",
                status
            )));
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| CoreError::Gateway(format!("Stripe response unreadable: {}", e)))?;

        Ok(CheckoutSession {
            session_id: session.id,
            redirect_url: session.url,
        })
    }

    fn parse_webhook(&self, raw_body: &[u8], header: Option<&str>) -> CoreResult<WebhookEvent> {
        let header = header
            .ok_or_else(|| CoreError::Unauthorized("Missing Stripe-Signature header".into()))?;
        signature::verify_timestamped_hmac_sha256(
            raw_body,
            header,
            &self.webhook_secret,
            signature::DEFAULT_TOLERANCE_SECS,
        )?;

        let event: Event = serde_json::from_slice(raw_body)
            .map_err(|e| CoreError::InvalidPayload(format!("Stripe event unreadable: {}", e)))?;

        let outcome = match event.type_.as_str() {
            "checkout.session.completed" => WebhookOutcome::Success,
            "checkout.session.async_payment_failed" => WebhookOutcome::Failure,
            "checkout.session.expired" => WebhookOutcome::Cancelled,
            other => {
                return Err(CoreError::InvalidPayload(format!(
                    "Unhandled Stripe event type: {}",
                    other
                )))
            }
        };

        let reference = event.data.object.client_reference_id.ok_or_else(|| {
            CoreError::InvalidPayload("Stripe session carries no client_reference_id".into())
        })?;

        Ok(WebhookEvent { reference, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hmac::{Hmac, Mac};
    use sha2::Sha256;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn gateway() -> StripeGateway {
        StripeGateway::new(
            reqwest::Client::new(),
            "sk_test_123".to_string(),
            "whsec_test".to_string(),
            "https://app.test/checkout/success".to_string(),
            "https://app.test/programs".to_string(),
        )
    }

    fn sign(body: &[u8]) -> String {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let mut mac = Hmac::<Sha256>::new_from_slice(b"whsec_test").unwrap();
        mac.update(format!("{}.", timestamp).as_bytes());
        mac.update(body);
        format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
    }

    fn completed_event(reference: &str) -> Vec<u8> {
        serde_json::json!({
            "type": "checkout.session.completed",
            "data": { "object": {
                "id": "cs_test_1",
                "client_reference_id": reference,
            }}
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_completed_session_maps_to_success() {
        let body = completed_event("c2d_abc");
        let header = sign(&body);

        let event = gateway().parse_webhook(&body, Some(&header)).unwrap();
        assert_eq!(event.reference, "c2d_abc");
        assert_eq!(event.outcome, WebhookOutcome::Success);
    }

    #[test]
    fn test_expired_session_maps_to_cancelled() {
        let body = serde_json::json!({
            "type": "checkout.session.expired",
            "data": { "object": { "id": "cs_test_1", "client_reference_id": "c2d_abc" }}
        })
        .to_string()
        .into_bytes();
        let header = sign(&body);

        let event = gateway().parse_webhook(&body, Some(&header)).unwrap();
        assert_eq!(event.outcome, WebhookOutcome::Cancelled);
    }

    #[test]
    fn test_unhandled_event_type_is_invalid_payload() {
        let body = serde_json::json!({
            "type": "invoice.paid",
            "data": { "object": { "id": "in_1", "client_reference_id": "c2d_abc" }}
        })
        .to_string()
        .into_bytes();
        let header = sign(&body);

        assert!(matches!(
            gateway().parse_webhook(&body, Some(&header)),
            Err(CoreError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_missing_reference_is_invalid_payload() {
        let body = serde_json::json!({
            "type": "checkout.session.completed",
            "data": { "object": { "id": "cs_test_1" }}
        })
        .to_string()
        .into_bytes();
        let header = sign(&body);

        assert!(matches!(
            gateway().parse_webhook(&body, Some(&header)),
            Err(CoreError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_missing_signature_is_unauthorized() {
        let body = completed_event("c2d_abc");
        assert!(matches!(
            gateway().parse_webhook(&body, None),
            Err(CoreError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_bad_signature_never_parses_payload() {
        let body = completed_event("c2d_abc");
        assert!(matches!(
            gateway().parse_webhook(&body, Some("t=1,v1=deadbeef")),
            Err(CoreError::Unauthorized(_))
        ));
    }
}
