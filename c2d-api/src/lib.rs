use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod enrollments;
pub mod error;
pub mod middleware;
pub mod orders;
pub mod payments;
pub mod programs;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    // Intent creation and the payer-facing reads need a verified bearer
    // token; webhook deliveries are signed instead.
    let protected = Router::new()
        .merge(payments::intent_routes())
        .merge(orders::routes())
        .merge(enrollments::routes())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(programs::routes())
        .merge(payments::webhook_routes())
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
