use async_trait::async_trait;
use serde::Deserialize;

use c2d_core::payment::{CheckoutSession, PaymentGateway, SessionRequest, WebhookEvent, WebhookOutcome};
use c2d_core::{CoreError, CoreResult};

use crate::signature;

const API_BASE: &str = "https://api.paystack.co";

/// Hosted-checkout client for Paystack. Amounts are sent in the smallest
/// currency unit (kobo for NGN, cents for USD), same convention as Stripe.
pub struct PaystackGateway {
    http: reqwest::Client,
    secret_key: String,
    callback_url: String,
    api_base: String,
}

impl PaystackGateway {
    pub fn new(http: reqwest::Client, secret_key: String, callback_url: String) -> Self {
        Self {
            http,
            secret_key,
            callback_url,
            api_base: API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base;
        self
    }
}

#[derive(Debug, Deserialize)]
struct InitializeResponse {
    status: bool,
    data: Option<InitializeData>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    authorization_url: Option<String>,
    access_code: String,
}

#[derive(Debug, Deserialize)]
struct Event {
    event: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    reference: Option<String>,
}

#[async_trait]
impl PaymentGateway for PaystackGateway {
    async fn create_session(&self, request: &SessionRequest) -> CoreResult<CheckoutSession> {
        let payload = serde_json::json!({
            "amount": request.amount_minor.to_string(),
            "currency": request.currency,
            "email": request.customer_email,
            "reference": request.reference,
            "callback_url": self.callback_url,
            "metadata": { "description": request.description },
        });

        let response = self
            .http
            .post(format!("{}/transaction/initialize", self.api_base))
            .bearer_auth(&self.secret_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CoreError::Gateway(format!("Paystack request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, %body, "Paystack transaction initialize rejected");
            return Err(CoreError::Gateway(format!(
                "Paystack returned {} initializing transaction",
                status
            )));
        }

        let init: InitializeResponse = response
            .json()
            .await
            .map_err(|e| CoreError::Gateway(format!("Paystack response unreadable: {}", e)))?;

        let data = match (init.status, init.data) {
            (true, Some(data)) => data,
            _ => {
                return Err(CoreError::Gateway(
                    "Paystack reported failure initializing transaction".into(),
                ))
            }
        };

        Ok(CheckoutSession {
            session_id: data.access_code,
            redirect_url: data.authorization_url,
        })
    }

    fn parse_webhook(&self, raw_body: &[u8], header: Option<&str>) -> CoreResult<WebhookEvent> {
        let header = header.ok_or_else(|| {
            CoreError::Unauthorized("Missing x-paystack-signature header".into())
        })?;
        // Paystack signs the raw body with the account secret key.
        signature::verify_hmac_sha512(raw_body, header, &self.secret_key)?;

        let event: Event = serde_json::from_slice(raw_body)
            .map_err(|e| CoreError::InvalidPayload(format!("Paystack event unreadable: {}", e)))?;

        let outcome = match event.event.as_str() {
            "charge.success" => WebhookOutcome::Success,
            "charge.failed" => WebhookOutcome::Failure,
            other => {
                return Err(CoreError::InvalidPayload(format!(
                    "Unhandled Paystack event type: {}",
                    other
                )))
            }
        };

        let reference = event.data.reference.ok_or_else(|| {
            CoreError::InvalidPayload("Paystack event carries no reference".into())
        })?;

        Ok(WebhookEvent { reference, outcome })
    }
}
