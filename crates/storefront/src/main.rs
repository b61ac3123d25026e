//! Storefront - product CRUD service behind Basic or token authentication

use anyhow::{Context, Result};
use chrono::Duration;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{AuthModeConfig, Config, LoggingConfig};
use storefront_api::{AppState, AuthMode, create_router};
use storefront_auth::{BasicAuthGuard, JwtManager, TokenAuthenticator};
use storefront_db::Database;

/// Storefront - product CRUD service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "STOREFRONT_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "STOREFRONT_PORT")]
    port: Option<u16>,

    /// Authentication variant: "basic" or "jwt"
    #[arg(long, env = "STOREFRONT_AUTH_MODE")]
    mode: Option<AuthModeConfig>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;
    if let Some(mode) = args.mode {
        config.auth.mode = mode;
        config.validate()?;
    }

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting Storefront v{}", env!("CARGO_PKG_VERSION"));

    // Create data directory
    if let Some(parent) = Path::new(&config.database.path).parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create data directory {:?}", parent))?;
    }

    // Initialize database
    let db = Database::new(&config.database_url()).await?;

    // Build the authentication variant
    let mode = match config.auth.mode {
        AuthModeConfig::Basic => {
            info!(
                "Basic auth enabled with {} configured user(s)",
                config.auth.basic_users.len()
            );
            AuthMode::Basic(Arc::new(BasicAuthGuard::new(
                config.auth.basic_users.clone(),
            )))
        }
        AuthModeConfig::Jwt => {
            let jwt = JwtManager::new(
                &config.auth.jwt_secret,
                Duration::seconds(config.auth.token_ttl_secs),
            );
            info!(
                "Token auth enabled, tokens valid for {}s",
                config.auth.token_ttl_secs
            );
            AuthMode::Jwt(Arc::new(TokenAuthenticator::new(jwt, Arc::new(db.clone()))))
        }
    };

    // Install the Prometheus recorder if requested
    let metrics_handle = if config.metrics.enabled {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        Some(Arc::new(handle))
    } else {
        None
    };

    // Create router
    let state = AppState::new(db, mode);
    let app = create_router(state, metrics_handle)?.layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {} ({} mode)", addr, config.auth.mode);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}
