//! Wallet-ledger server for the care-services marketplace.
//!
//! Wires the database pool, the ledger managers, and the password-recovery
//! throttle into the HTTP API and serves it until interrupted.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use pico_args::Arguments;

use care_ledger::{
    db::Database,
    recovery::ResetThrottle,
    users::UserStore,
    wallet::{TransactionManager, WalletStore},
};
use cl_server::{api, config::ServerConfig, logging};

const HELP: &str = "\
Run the care-marketplace wallet ledger server

USAGE:
  cl_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:3000]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  JWT_SECRET               JWT signing secret (required)
  PASSWORD_PEPPER          Password hashing pepper (required)
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let database_url_override: Option<String> = pargs.opt_value_from_str("--db-url")?;

    logging::init();

    let config = ServerConfig::from_env(bind_override, database_url_override)
        .map_err(|e| anyhow::anyhow!("Configuration error: {e}"))?;

    tracing::info!("Starting wallet-ledger server at {}", config.bind);

    tracing::info!("Connecting to database");
    let db = Database::new(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {e}"))?;

    db.run_migrations()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {e}"))?;

    tracing::info!("Database connected and migrated");

    let pool = Arc::new(db.pool().clone());
    let state = api::AppState {
        transactions: Arc::new(TransactionManager::new(pool.clone())),
        wallets: Arc::new(WalletStore::new(pool.clone())),
        users: Arc::new(UserStore::new(pool.clone())),
        resets: Arc::new(ResetThrottle::new(pool.clone())),
        security: Arc::new(config.security.clone()),
        pool,
    };

    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {e}", config.bind))?;

    tracing::info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {e}"))?;

    tracing::info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
}
