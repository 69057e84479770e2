/*
 * Responsibility
 * - POST /authorize: expose the authorizer decision on its own
 * - Success -> the policy document as-is; any failure -> opaque 401
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::{dto::authorize::AuthorizeRequest, extractors::JsonBody},
    error::AppError,
    services::auth::AuthPolicy,
    state::AppState,
};

pub async fn authorize(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AuthorizeRequest>,
) -> Result<Json<AuthPolicy>, AppError> {
    tracing::debug!(kind = ?req.kind, method_arn = %req.method_arn, "authorizer invoked");

    let authorized = state
        .auth
        .authorize(&req.authorization_token, &req.method_arn)
        .await
        .map_err(|_| AppError::Unauthorized)?;

    Ok(Json(authorized.policy))
}
