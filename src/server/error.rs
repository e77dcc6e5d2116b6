//! Failures surfaced by the HTTP handlers.
//!
//! Every handler picks one `ApiError` variant per failure; the conversion into
//! a response happens once, in `IntoResponse`. The detail string is logged and
//! never sent to the client, which only sees the fixed message of the status.

use std::any::Any;
use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// 400, used when a category lookup misses.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// 404, used for missing questions, empty pages and every quiz failure.
    #[error("not found: {0}")]
    NotFound(String),

    /// 422, used for store failures and unreadable bodies while handling questions.
    #[error("unprocessable: {0}")]
    Unprocessable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: u16,
    message: &'static str,
}

impl ApiError {
    pub fn not_found(err: impl Display) -> Self {
        Self::NotFound(err.to_string())
    }

    pub fn unprocessable(err: impl Display) -> Self {
        Self::Unprocessable(err.to_string())
    }

    pub fn internal(err: impl Display) -> Self {
        Self::Internal(err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "Bad request",
            Self::NotFound(_) => "Page not found",
            Self::Unprocessable(_) => "Unprocessable",
            Self::Internal(_) => "Internal server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(_) => tracing::error!("{}", self),
            Self::Unprocessable(_) => tracing::warn!("{}", self),
            Self::BadRequest(_) | Self::NotFound(_) => tracing::info!("{}", self),
        }
        let status = self.status();
        let body = ErrorBody {
            success: false,
            error: status.as_u16(),
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

pub async fn fallback() -> ApiError {
    ApiError::NotFound("no route matched".to_owned())
}

pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_owned()
    } else {
        "unknown panic payload".to_owned()
    };
    ApiError::Internal(format!("handler panicked: {detail}")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    async fn body_of(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn every_variant_has_a_fixed_body() {
        let cases = [
            (ApiError::BadRequest("x".into()), 400, "Bad request"),
            (ApiError::NotFound("x".into()), 404, "Page not found"),
            (ApiError::Unprocessable("x".into()), 422, "Unprocessable"),
            (ApiError::Internal("x".into()), 500, "Internal server error"),
        ];
        for (err, code, message) in cases {
            let response = err.into_response();
            assert_eq!(response.status().as_u16(), code);
            assert_eq!(
                body_of(response).await,
                json!({"success": false, "error": code, "message": message})
            );
        }
    }

    #[tokio::test]
    async fn detail_is_not_leaked() {
        let response = ApiError::unprocessable("NOT NULL constraint failed: questions.difficulty")
            .into_response();
        let body = body_of(response).await;
        assert_eq!(body["message"], "Unprocessable");
        assert!(!body.to_string().contains("constraint"));
    }

    #[tokio::test]
    async fn panics_become_internal_errors() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await["error"], 500);
    }
}
