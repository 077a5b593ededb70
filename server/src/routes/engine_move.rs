use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use engine::Difficulty;

use crate::api::{ApiError, ApiResponse, EngineMoveRequest};
use crate::state::AppState;

/// `POST /api/get_move`: ask the engine for a reply in the given position.
pub(super) async fn get_move(
    State(state): State<Arc<AppState>>,
    body: Result<Json<EngineMoveRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, ApiError> {
    let Json(request) = body.map_err(|rejection| {
        ApiError::new(rejection.status(), rejection.body_text())
    })?;

    let fen = engine::validate_fen(request.fen.as_deref())?;
    let difficulty = Difficulty::from_label(
        request
            .difficulty
            .as_ref()
            .and_then(serde_json::Value::as_str),
    );

    let mv = state.engine.compute_move(Some(fen), difficulty).await?;
    Ok(Json(ApiResponse::engine_move(mv)))
}
