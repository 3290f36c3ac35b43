// src/application/state.rs

use std::sync::Arc;

use crate::application::config::ResolverConfig;
use crate::db::{create_connection_pool, initialize_database, ConnectionPool};
use crate::error::AppResult;
use crate::events::{create_event_bus, EventBus};
use crate::repositories::{CheckpointRepository, SqliteCheckpointRepository};
use crate::services::{CheckpointRowLoader, ResolutionRegistry, RowLoader};

/// Process-wide application state.
/// All fields are Arc-wrapped and shared by every controller instance; the
/// registry in particular outlives any one controller.
pub struct AppState {
    pub config: ResolverConfig,
    pub pool: Arc<ConnectionPool>,
    pub event_bus: Arc<EventBus>,
    pub repository: Arc<dyn CheckpointRepository>,
    pub loader: Arc<dyn RowLoader>,
    pub registry: Arc<ResolutionRegistry>,
}

impl AppState {
    /// Open the database described by `config` and wire every collaborator.
    pub fn initialize(config: ResolverConfig) -> AppResult<Self> {
        let pool = Arc::new(create_connection_pool(&config.database_path, config.pool_size)?);

        {
            let conn = pool.get()?;
            initialize_database(&conn)?;
        }

        let event_bus = Arc::new(create_event_bus());

        let repository: Arc<dyn CheckpointRepository> =
            Arc::new(SqliteCheckpointRepository::new(pool.clone()));
        let loader: Arc<dyn RowLoader> =
            Arc::new(CheckpointRowLoader::new(repository.clone(), event_bus.clone()));
        let registry = Arc::new(ResolutionRegistry::new(repository.clone(), event_bus.clone()));

        log::debug!("Application state ready ({})", config.database_path.display());

        Ok(Self {
            config,
            pool,
            event_bus,
            repository,
            loader,
            registry,
        })
    }
}
