use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use c2d_core::program::Program;
use c2d_core::CoreError;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/programs", get(list_programs))
        .route("/v1/programs/{id}", get(get_program))
}

/// GET /v1/programs
async fn list_programs(State(state): State<AppState>) -> Result<Json<Vec<Program>>, AppError> {
    let programs = state.programs.list_programs().await?;
    Ok(Json(programs))
}

/// GET /v1/programs/:id
async fn get_program(
    State(state): State<AppState>,
    Path(program_id): Path<Uuid>,
) -> Result<Json<Program>, AppError> {
    let program = state
        .programs
        .get_program(program_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Program {} not found", program_id)))?;

    Ok(Json(program))
}
