//! Request extractors

use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use commerce_guard::sanitize::sanitize_value_mut;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// JSON body with every string leaf sanitized before deserialization.
///
/// Handlers only ever see markup-free strings; non-string fields and the
/// body's structure are untouched.
#[derive(Debug, Clone)]
pub struct SanitizedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for SanitizedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(mut value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        sanitize_value_mut(&mut value);

        serde_json::from_value(value)
            .map(SanitizedJson)
            .map_err(|e| ApiError::Unprocessable(e.to_string()))
    }
}
