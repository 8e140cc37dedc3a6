//! Valuation engine binary for the Stockyard simulator.
//!
//! This is the main entry point that wires together the data layer, the
//! simulation engine, and the broadcast hub, then runs until a shutdown
//! signal arrives.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `stockyard-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Connect to `PostgreSQL` (retrying until reachable) and migrate
//! 4. Start the simulation engine (tick loop + retention sweeper)
//! 5. Wait for Ctrl-C
//! 6. Stop the engine, draining any in-flight tick, and close the pool

mod error;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use stockyard_core::{EngineConfig, SimulationEngine};
use stockyard_db::{PgAssetStore, PostgresPool};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Configuration file looked up relative to the working directory.
const CONFIG_FILE: &str = "stockyard-config.yaml";

/// Delay between connection attempts while `PostgreSQL` is unreachable.
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Application entry point for the valuation engine.
///
/// # Errors
///
/// Returns an error if configuration loading or shutdown signal handling
/// fails. An unreachable database does not fail startup; the engine keeps
/// retrying the connection until it succeeds or the process is killed.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config
    //    file's level when set.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("stockyard-engine starting");
    info!(
        tick_interval_ms = config.simulation.tick_interval_ms,
        sweep_interval_ms = config.retention.sweep_interval_ms,
        retention_days = config.retention.retention_days,
        broadcast_capacity = config.broadcast.capacity,
        "Configuration loaded"
    );

    // 3. Connect to PostgreSQL and run migrations.
    let pool = connect_with_retry(&config.infrastructure.postgres_url).await;
    let store = Arc::new(PgAssetStore::new(&pool));

    // 4. Start the engine.
    let engine = SimulationEngine::new(store, config);
    engine.start().await;

    // 5. Run until Ctrl-C.
    tokio::signal::ctrl_c().await.map_err(EngineError::from)?;
    info!("Shutdown signal received");

    // 6. Drain and close.
    engine.stop().await;
    pool.close().await;

    info!("stockyard-engine shutdown complete");
    Ok(())
}

/// Load the engine configuration from `stockyard-config.yaml`.
///
/// Falls back to compiled-in defaults when the file does not exist.
fn load_config() -> Result<EngineConfig, EngineError> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        let config = EngineConfig::from_file(config_path)?;
        Ok(config)
    } else {
        Ok(EngineConfig::default())
    }
}

/// Connect to `PostgreSQL` and run migrations, retrying until both
/// succeed.
///
/// The engine is useless without its store, so boot blocks here rather
/// than ticking against nothing. Each failed attempt is logged and
/// retried after a fixed delay.
async fn connect_with_retry(url: &str) -> PostgresPool {
    loop {
        match PostgresPool::connect_url(url).await {
            Ok(pool) => match pool.run_migrations().await {
                Ok(()) => return pool,
                Err(error) => {
                    tracing::error!(%error, "Migrations failed, retrying");
                }
            },
            Err(error) => {
                tracing::error!(%error, "PostgreSQL unreachable, retrying");
            }
        }
        tokio::time::sleep(CONNECT_RETRY_DELAY).await;
    }
}
