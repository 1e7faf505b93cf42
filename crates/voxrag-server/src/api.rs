//! API handlers for the token server.

use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use voxrag_voice::{IssuedToken, VoiceError};

/// Request body for `POST /getToken`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// API error type mapping to HTTP status codes.
///
/// Every variant renders as `{"detail": <message>}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error("{0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "detail": message
        }));

        (status, body).into_response()
    }
}

impl From<VoiceError> for ApiError {
    fn from(e: VoiceError) -> Self {
        match e {
            VoiceError::InvalidIdentity => ApiError::BadRequest("Invalid userId".to_string()),
            other => ApiError::InternalServerError(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Unprocessable(rejection.body_text())
    }
}

/// Handler for `POST /getToken`.
///
/// Issues a join credential for the caller's per-user room with the voice
/// agent dispatched into it.
pub async fn get_token_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IssuedToken>), ApiError> {
    let Json(payload) = payload?;

    let issued = state.issuer.issue(&payload.user_id).map_err(|e| {
        match &e {
            VoiceError::InvalidIdentity => tracing::debug!("rejected blank userId"),
            _ => tracing::error!(error = %e, "failed to issue participant token"),
        }
        ApiError::from(e)
    })?;

    tracing::info!(
        room = %issued.room_name,
        agent = state.issuer.agent_name(),
        "issued participant token"
    );

    Ok((StatusCode::CREATED, Json(issued)))
}
