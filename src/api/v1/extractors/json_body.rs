/*
 * Responsibility
 * - Parse the request body as JSON regardless of Content-Type
 * - Malformed payload -> 400 through AppError (never reaches storage)
 * - Unreadable body keeps axum's status (e.g. 413 over the body limit)
 */
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| {
                AppError::rejected(
                    e.status(),
                    format!("The request body could not be read: {}", e.body_text()),
                )
            })?;

        serde_json::from_slice(&bytes).map(JsonBody).map_err(|e| {
            AppError::bad_request(format!("The request body is not a valid JSON object: {e}"))
        })
    }
}
