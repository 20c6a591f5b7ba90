use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use watch_hut_api::app::{app, AppState};
use watch_hut_api::auth::verifier_from_config;
use watch_hut_api::cli::{Cli, Commands};
use watch_hut_api::config::AppConfig;
use watch_hut_api::database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up DATABASE_URL, FIREBASE_SERVICE_ACCOUNT, etc.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = AppConfig::from_env_with(|config| cli.apply(config))
        .context("invalid configuration")?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Watch Hut API in {:?} mode", config.environment);

    let store = database::connect(&config.database)
        .await
        .context("failed to open document store")?;

    if cli.command() == Commands::InitStore {
        tracing::info!("Store collections ready");
        store.close().await;
        return Ok(());
    }

    let verifier = verifier_from_config(&config.auth).context("failed to set up token verifier")?;
    let app = app(AppState::new(store.clone(), verifier), &config.security);

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Watch Hut API listening on http://{}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    store.close().await;
    tracing::info!("Document store closed");

    served.context("server error")
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
