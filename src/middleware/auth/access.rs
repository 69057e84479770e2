//! Authorizer gate: bearer token -> authorizer decision -> AuthCtx in extensions.
//!
//! The resource handed to the authorizer mirrors an API Gateway method ARN:
//! `<resource_prefix>/<METHOD><path>`, e.g. `notes-api/v1/GET/api/v1/notes/42`.
//! The returned policy is then enforced against that same resource, so a
//! decision scoped to some other resource does not let the request through.

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

/// Put the given routes behind the authorizer.
///
/// ```ignore
/// let notes = middleware::auth::access::apply(notes_routes(), state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8: State has to be passed explicitly with from_fn_with_state.
    // route_layer: unknown paths stay 404 instead of turning into 401.
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

pub fn resource_for(prefix: &str, method: &str, path: &str) -> String {
    format!("{prefix}/{method}{path}")
}

async fn access_middleware(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let resource = resource_for(
        &state.resource_prefix,
        req.method().as_str(),
        original_uri.path(),
    );

    // cause of a failure is logged inside the authorizer
    let authorized = state
        .auth
        .authorize(token, &resource)
        .await
        .map_err(|_| AppError::Unauthorized)?;

    if !authorized.policy.permits(&resource) {
        tracing::warn!(
            principal_id = %authorized.policy.principal_id,
            resource = %resource,
            "policy does not allow this resource"
        );
        return Err(AppError::Forbidden);
    }

    let auth_ctx = AuthCtx::new(authorized.claims.sub);

    // middleware -> extractor hand-off
    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}
