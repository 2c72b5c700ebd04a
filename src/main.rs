//! Storefront API server

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use storefront_api::auth::TokenKeys;
use storefront_api::config::Config;
use storefront_api::http::{self, AppState};
use storefront_api::services::{catalog, users::SignupPolicy};
use storefront_api::store::Store;
use storefront_api::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    telemetry::init(config.log_format);
    tracing::debug!(?config, "configuration loaded");

    let store = match &config.database_url {
        Some(url) => {
            let db = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(url)
                .await
                .context("connecting to DATABASE_URL")?;
            sqlx::migrate!("./migrations").run(&db).await.context("running migrations")?;
            Store::postgres(db)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            Store::memory()
        }
    };

    if config.seed_categories {
        catalog::seed_default_categories(&store).await.context("seeding categories")?;
    }

    let tokens = Arc::new(TokenKeys::new(config.jwt_secret.as_bytes(), config.token_ttl));
    let signup = SignupPolicy { allow_admin: config.allow_admin_signup };
    let app = http::router(AppState { store, tokens, signup });

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "storefront-api listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
