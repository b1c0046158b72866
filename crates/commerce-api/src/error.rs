//! API error mapping

use crate::models::ApiResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use commerce_guard::GuardError;

/// Request-level failure rendered with the standard envelope
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error("request is not tenant-scoped: the {0} header is required")]
    TenantRequired(String),

    #[error("invalid request body: {0}")]
    BadRequest(String),

    #[error("request body does not match the expected shape: {0}")]
    Unprocessable(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Guard(e) => e.status(),
            Self::TenantRequired(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Guard(e) => e.code(),
            Self::TenantRequired(_) => "tenant_required",
            Self::BadRequest(_) => "bad_request",
            Self::Unprocessable(_) => "unprocessable_entity",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        if matches!(self, Self::Guard(_)) {
            metrics::counter!("guard_requests_rejected_total", "reason" => code).increment(1);
        }
        if status.is_server_error() {
            tracing::warn!(code, error = %self, "request failed");
        } else {
            tracing::debug!(code, error = %self, "request rejected");
        }

        let body = ApiResponse::<()>::error(code, &self.to_string());
        (status, Json(body)).into_response()
    }
}
