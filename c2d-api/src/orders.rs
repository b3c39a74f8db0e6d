use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use c2d_core::order::Order;
use c2d_core::CoreError;

use crate::error::AppError;
use crate::middleware::auth::{current_profile, Claims};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub program_id: Uuid,
    pub gateway: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub fulfilled_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            program_id: order.program_id,
            gateway: order.gateway.to_string(),
            amount_minor: order.amount_minor,
            currency: order.currency,
            status: order.status.as_str().to_string(),
            created_at: order.created_at,
            fulfilled_at: order.fulfilled_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/orders", get(list_orders))
        .route("/v1/orders/{id}", get(get_order))
}

/// GET /v1/orders
/// The caller's own orders, newest first.
async fn list_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let profile = current_profile(&state, &claims).await?;
    let orders = state.orders.list_orders(profile.id).await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// GET /v1/orders/:id
async fn get_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, AppError> {
    let profile = current_profile(&state, &claims).await?;

    let order = state
        .orders
        .get_order(order_id)
        .await?
        // Another payer's order answers NOT_FOUND, not FORBIDDEN, to avoid
        // leaking order existence.
        .filter(|order| order.profile_id == profile.id)
        .ok_or_else(|| CoreError::NotFound(format!("Order {} not found", order_id)))?;

    Ok(Json(OrderResponse::from(order)))
}
