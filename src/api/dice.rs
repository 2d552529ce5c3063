//! Dice rolling endpoint

use axum::{http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::engine;

/// Build dice router
pub fn router() -> Router<AppState> {
    Router::new().route("/roll", post(roll))
}

/// Roll request
#[derive(Debug, Deserialize)]
struct RollRequest {
    /// Dice expression, e.g. "2d6+3" or "d20"
    expr: String,
    #[serde(default)]
    advantage: bool,
    #[serde(default)]
    disadvantage: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// POST /roll
async fn roll(Json(req): Json<RollRequest>) -> impl IntoResponse {
    match engine::roll(&req.expr, req.advantage, req.disadvantage) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: e.to_string() }),
        )
            .into_response(),
    }
}
