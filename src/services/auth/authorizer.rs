/*
 * Responsibility
 * - token + resource -> allow policy scoped to that resource, or an opaque error
 * - The cause of a rejection is logged, never returned
 */
use std::collections::BTreeMap;

use thiserror::Error;

use crate::services::auth::id_token::{IdTokenClaims, IdTokenVerifier};
use crate::services::auth::policy::{AuthPolicy, Effect};

pub const DEFAULT_PRINCIPAL_ID: &str = "user";

/// Rejections carry no detail; callers cannot tell an expired token from a forged one.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthorizerError {
    #[error("Unauthorized")]
    Unauthorized,
}

/// Outcome of a successful authorization.
#[derive(Debug, Clone)]
pub struct Authorized {
    pub policy: AuthPolicy,
    pub claims: IdTokenClaims,
}

#[derive(Debug, Clone)]
pub struct Authorizer {
    verifier: IdTokenVerifier,
    principal_id: String,
    context: BTreeMap<String, String>,
}

impl Authorizer {
    pub fn new(verifier: IdTokenVerifier) -> Self {
        Self {
            verifier,
            principal_id: DEFAULT_PRINCIPAL_ID.to_string(),
            context: BTreeMap::from([("foo".to_string(), "bar".to_string())]),
        }
    }

    pub async fn authorize(
        &self,
        authorization_token: &str,
        resource: &str,
    ) -> Result<Authorized, AuthorizerError> {
        let Some(token) = bearer_token(authorization_token) else {
            tracing::warn!(resource, "authorization token missing");
            return Err(AuthorizerError::Unauthorized);
        };

        let claims = match self.verifier.verify(token).await {
            Ok(claims) => claims,
            Err(err) => {
                tracing::warn!(error = %err, resource, "identity token verification failed");
                return Err(AuthorizerError::Unauthorized);
            }
        };

        match serde_json::to_string(&claims) {
            Ok(json) => tracing::info!(claims = %json, resource, "identity token verified"),
            Err(_) => tracing::info!(sub = %claims.sub, resource, "identity token verified"),
        }

        let policy = AuthPolicy::generate(
            self.principal_id.clone(),
            Some(Effect::Allow),
            // no document at all for an empty resource
            Some(resource).filter(|r| !r.is_empty()),
            self.context.clone(),
        );

        Ok(Authorized { policy, claims })
    }
}

/// Accepts both `Bearer <jwt>` and a bare `<jwt>`, as API Gateway forwards the header verbatim.
pub fn bearer_token(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = match raw.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        Some(_) => return None,
        None => raw,
    };
    (!token.is_empty()).then_some(token)
}
