use axum::{extract::State, routing::get, Extension, Json, Router};

use c2d_core::enrollment::Enrollment;

use crate::error::AppError;
use crate::middleware::auth::{current_profile, Claims};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/enrollments", get(list_enrollments))
}

/// GET /v1/enrollments
/// The caller's enrollments across programs.
async fn list_enrollments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Enrollment>>, AppError> {
    let profile = current_profile(&state, &claims).await?;
    let enrollments = state.enrollments.list_enrollments(profile.id).await?;
    Ok(Json(enrollments))
}
