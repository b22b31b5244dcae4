//! MallBots monolith: hosts the modules in one process.
//!
//! Selects the storage backends from [`config::Config`], applies the
//! database migrations and starts each module.

use std::future::Future;
use std::io;
use std::sync::Arc;

use mallbots_core::clock::SystemClock;
use mallbots_core::event_store::EventStorage;
use mallbots_core::memory::{InMemoryEventStorage, InMemorySnapshotStorage};
use mallbots_core::snapshot_store::SnapshotStorage;
use mallbots_event_store::pg_event_storage::PgEventStorage;
use mallbots_event_store::pg_snapshot_storage::PgSnapshotStorage;
use mallbots_stores::application::StoresApplication;
use mallbots_stores::module::{ReadModels, StoresModule};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

pub mod config;
pub mod error;
pub mod logging;

use crate::config::Config;
use crate::error::AppError;

struct Backends {
    events: Arc<dyn EventStorage>,
    snapshots: Arc<dyn SnapshotStorage>,
    read_models: ReadModels,
}

async fn backends(config: &Config) -> Result<Backends, AppError> {
    let Some(url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL is not set; events and read models are kept in memory only");
        return Ok(Backends {
            events: Arc::new(InMemoryEventStorage::new()),
            snapshots: Arc::new(InMemorySnapshotStorage::new()),
            read_models: ReadModels::in_memory(),
        });
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(url)
        .await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;
    info!(
        max_connections = config.database_max_connections,
        "connected to postgres and applied migrations"
    );
    Ok(Backends {
        events: Arc::new(PgEventStorage::new(pool.clone())),
        snapshots: Arc::new(PgSnapshotStorage::new(pool.clone())),
        read_models: ReadModels::postgres(&pool),
    })
}

/// Connects the storage backends and starts the Stores module.
///
/// With a database the event log, snapshots and read models all live in
/// PostgreSQL; without one they all live in memory.
///
/// # Errors
///
/// Returns `AppError::Database` or `AppError::Migration` if PostgreSQL is
/// configured but unreachable or cannot be migrated, and `AppError::Startup`
/// if the module fails to register its types.
pub async fn start(config: &Config) -> Result<StoresApplication, AppError> {
    let Backends {
        events,
        snapshots,
        read_models,
    } = backends(config).await?;
    let stores = StoresModule::startup(
        events,
        snapshots,
        read_models,
        &config.stores,
        Arc::new(SystemClock),
    )?;
    Ok(stores)
}

/// Starts the modules, then serves until `shutdown` resolves.
///
/// # Errors
///
/// Returns any [`start`] error, `AppError::Startup` if the read models cannot
/// be queried, and `AppError::Server` if waiting for shutdown fails.
pub async fn run(
    config: &Config,
    shutdown: impl Future<Output = io::Result<()>>,
) -> Result<(), AppError> {
    let stores = start(config).await?;
    let participating = stores.get_participating_stores().await?.len();
    info!(participating, "stores module ready");

    shutdown.await?;
    info!("shutting down");
    Ok(())
}
