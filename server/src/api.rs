//! JSON bodies exchanged with the web client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use engine::EngineError;
use serde::{Deserialize, Serialize};

/// Body of `POST /move`.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    #[serde(rename = "move", default)]
    pub san: Option<String>,
}

/// Body of `POST /api/get_move`.
#[derive(Debug, Deserialize)]
pub struct EngineMoveRequest {
    #[serde(default)]
    pub fen: Option<String>,
    /// Kept loose so that a non-string label still plays at medium.
    #[serde(default)]
    pub difficulty: Option<serde_json::Value>,
}

/// Every response carries `"status"`; the remaining field depends on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ApiResponse {
    Success {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        board: Option<String>,
        #[serde(rename = "move", default, skip_serializing_if = "Option::is_none")]
        mv: Option<String>,
    },
    Error {
        message: String,
    },
}

impl ApiResponse {
    pub fn board(fen: impl Into<String>) -> Self {
        Self::Success {
            board: Some(fen.into()),
            mv: None,
        }
    }

    pub fn engine_move(uci: impl Into<String>) -> Self {
        Self::Success {
            board: None,
            mv: Some(uci.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// An error response with a status code other than 200.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::error(self.message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_response_shape() {
        let json = serde_json::to_value(ApiResponse::board(chess::STARTING_FEN)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "success", "board": chess::STARTING_FEN})
        );
    }

    #[test]
    fn test_engine_move_response_shape() {
        let json = serde_json::to_value(ApiResponse::engine_move("e2e4")).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "move": "e2e4"}));
    }

    #[test]
    fn test_error_response_shape() {
        let json = serde_json::to_value(ApiResponse::error("FEN not provided")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "error", "message": "FEN not provided"})
        );
    }

    #[test]
    fn test_engine_error_status() {
        assert_eq!(
            ApiError::from(EngineError::MissingPosition).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(EngineError::NoMoveFound).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(EngineError::NoMoveFound).message,
            "Could not compute move"
        );
    }
}
