/// Factory: build the `Authorizer` from application `Config`.
use std::sync::Arc;

use crate::config::{Config, JwksSourceConfig};
use crate::services::auth::{
    Authorizer, IdTokenVerifier,
    jwks::{JwksError, KeySource, RemoteJwks, StaticJwks},
};

pub fn build_authorizer(config: &Config) -> Result<Arc<Authorizer>, JwksError> {
    let keys: Arc<dyn KeySource> = match &config.jwks_source {
        JwksSourceConfig::Remote(url) => Arc::new(RemoteJwks::new(url.clone())?),
        JwksSourceConfig::Inline(json) => Arc::new(StaticJwks::from_json(json)?),
    };

    let verifier = IdTokenVerifier::new(
        keys,
        &config.cognito_issuer,
        &config.cognito_client_id,
        config.id_token_leeway_seconds,
    );

    tracing::info!(
        issuer = %config.cognito_issuer,
        client_id = %config.cognito_client_id,
        "authorizer configured"
    );

    Ok(Arc::new(Authorizer::new(verifier)))
}
