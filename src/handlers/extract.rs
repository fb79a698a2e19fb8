use crate::error::AppError;
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;

/// A JSON request body with its own answer for malformed input.
pub trait JsonRequestBody: DeserializeOwned {
    /// Error returned when the body is missing, not JSON, or the wrong shape.
    fn rejected() -> AppError;
}

// JSON extractor that answers rejections with the endpoint's 400 instead of
// axum's plain-text 415/422
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: JsonRequestBody,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                debug!(error = %rejection.body_text(), "rejected request body");
                Err(T::rejected())
            }
        }
    }
}
