use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    routing::post,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use c2d_core::order::Gateway;
use c2d_payments::Reconciliation;

use crate::error::AppError;
use crate::middleware::auth::{current_profile, Claims};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateIntentRequest {
    pub program_id: Uuid,
    pub gateway: Gateway,
}

#[derive(Debug, Serialize)]
pub struct CreateIntentResponse {
    pub order_id: Uuid,
    pub redirect_url: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
}

pub fn intent_routes() -> Router<AppState> {
    Router::new().route("/v1/payments/intents", post(create_intent))
}

pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/v1/payments/webhooks/{gateway}", post(handle_webhook))
}

/// POST /v1/payments/intents
/// Create a PENDING order and return the hosted checkout redirect.
async fn create_intent(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateIntentRequest>,
) -> Result<Json<CreateIntentResponse>, AppError> {
    let profile = current_profile(&state, &claims).await?;

    let redirect = state
        .orchestrator
        .create_intent(req.program_id, profile.id, req.gateway)
        .await?;

    Ok(Json(CreateIntentResponse {
        order_id: redirect.order_id,
        redirect_url: redirect.redirect_url,
    }))
}

/// POST /v1/payments/webhooks/{gateway}
/// Receive an asynchronous delivery from a gateway. Unauthenticated but
/// signed; the raw body is handed to the orchestrator untouched so the
/// signature can be checked over the exact bytes.
async fn handle_webhook(
    State(state): State<AppState>,
    Path(gateway): Path<Gateway>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError> {
    let signature_header = match gateway {
        Gateway::Stripe => "stripe-signature",
        Gateway::Paystack => "x-paystack-signature",
    };
    let signature = headers
        .get(signature_header)
        .and_then(|h| h.to_str().ok());

    let outcome = state
        .orchestrator
        .process_webhook(gateway, &body, signature)
        .await?;

    let status = match outcome {
        Reconciliation::Fulfilled { .. } => "fulfilled",
        Reconciliation::Failed { .. } => "failed",
        Reconciliation::AlreadySettled { .. } => "already_processed",
    };

    Ok(Json(WebhookAck { status }))
}
