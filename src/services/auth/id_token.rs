use jsonwebtoken::{Algorithm, Validation};
use serde::{Deserialize, Serialize};
use std::{error::Error as StdError, fmt, sync::Arc};

use crate::services::auth::jwks::{JwksError, KeySource};

/// The only `token_use` accepted at the gate: identity tokens, not access tokens.
pub const ID_TOKEN_USE: &str = "id";

// Errors returned by identity-token verification.
#[derive(Debug)]
pub enum IdTokenError {
    Malformed(jsonwebtoken::errors::Error),
    MissingKid,
    Keys(JwksError),
    Jwt(jsonwebtoken::errors::Error),
    WrongTokenUse(String),
    EmptyClaim(&'static str),
}

impl fmt::Display for IdTokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(e) => write!(f, "malformed token: {}", e),
            Self::MissingKid => write!(f, "token header has no 'kid'"),
            Self::Keys(e) => write!(f, "signing key unavailable: {}", e),
            Self::Jwt(e) => write!(f, "jwt verification failed: {}", e),
            Self::WrongTokenUse(found) => {
                write!(f, "expected token_use '{}', got '{}'", ID_TOKEN_USE, found)
            }
            Self::EmptyClaim(name) => write!(f, "empty '{}' claim", name),
        }
    }
}

impl StdError for IdTokenError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Malformed(e) | Self::Jwt(e) => Some(e),
            Self::Keys(e) => Some(e),
            _ => None,
        }
    }
}

impl From<JwksError> for IdTokenError {
    fn from(e: JwksError) -> Self {
        Self::Keys(e)
    }
}

impl From<jsonwebtoken::errors::Error> for IdTokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::Jwt(e)
    }
}

/// Identity token claims.
///
/// NOTE:
/// - `aud` of an identity token is the app client id; jsonwebtoken checks it via `Validation::set_audience`.
/// - Everything the user pool adds beyond the fields below is kept in `extra` so it can be logged as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub sub: String,
    pub iss: String,
    #[serde(default)]
    pub aud: serde_json::Value,
    pub exp: u64,
    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub auth_time: Option<u64>,

    pub token_use: String,

    #[serde(default, rename = "cognito:username", skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// RS256 identity-token verifier for one user pool and one app client.
///
/// `jsonwebtoken::Validation` checks signature, `exp`, `iss` and `aud`;
/// this type adds key selection by `kid` and the `token_use` check.
#[derive(Clone)]
pub struct IdTokenVerifier {
    keys: Arc<dyn KeySource>,
    validation: Validation,
}

impl std::fmt::Debug for IdTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdTokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl IdTokenVerifier {
    pub fn new(
        keys: Arc<dyn KeySource>,
        issuer: &str,
        client_id: &str,
        leeway_seconds: u64,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[client_id]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = leeway_seconds;

        Self { keys, validation }
    }

    pub async fn verify(&self, token: &str) -> Result<IdTokenClaims, IdTokenError> {
        let header = jsonwebtoken::decode_header(token).map_err(IdTokenError::Malformed)?;
        let kid = header.kid.ok_or(IdTokenError::MissingKid)?;
        let key = self.keys.decoding_key(&kid).await?;

        let claims =
            jsonwebtoken::decode::<IdTokenClaims>(token, &key, &self.validation)?.claims;

        if claims.token_use != ID_TOKEN_USE {
            return Err(IdTokenError::WrongTokenUse(claims.token_use));
        }
        if claims.sub.trim().is_empty() {
            return Err(IdTokenError::EmptyClaim("sub"));
        }

        Ok(claims)
    }
}
