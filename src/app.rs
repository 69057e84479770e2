/*
 * Responsibility
 * - Config -> note store + authorizer -> Router
 * - Process-level setup: tracing subscriber, panic hook
 * - axum::serve()
 */
use std::{panic, process};

use anyhow::Result;
use axum::{Router, routing::get};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::health::health;
use crate::config::Config;
use crate::middleware::{self, http::HttpLimits};
use crate::repos::build_note_store;
use crate::services::auth::build_authorizer;
use crate::state::AppState;

const DEFAULT_LOG_FILTER: &str = "info,tower_http=info";

// RUST_LOG wins when it parses, e.g.
// RUST_LOG=info,notes_api=debug,tower_http=debug cargo run
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn init_tracing() {
    // .env first, so a RUST_LOG set only there is honoured
    dotenvy::dotenv().ok();
    let filter = log_filter(std::env::var("RUST_LOG").ok());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: crash loudly; production: default hook, server keeps running
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting notes API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Clients are created once per process; none of them connects until first use.
pub fn build_state(config: &Config) -> Result<AppState> {
    let notes = build_note_store(config)?;
    let auth = build_authorizer(config)?;

    Ok(AppState::new(
        notes,
        auth,
        config.authorizer_resource_prefix.as_str(),
    ))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, HttpLimits::default())
}
