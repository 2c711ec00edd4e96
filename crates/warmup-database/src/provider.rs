//! Opens the configured persistence backend.

use std::sync::Arc;

use tracing::info;

use warmup_core::config::{DatabaseConfig, DatabaseProvider};
use warmup_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::{MemoryDeviceStore, MemoryTaskStore};
use crate::migration::run_migrations;
use crate::repositories::{DeviceRepository, TaskRepository};
use crate::store::{DeviceStore, TaskStore};

/// The stores the services run against, plus the pool behind them when
/// the backend is PostgreSQL.
#[derive(Clone)]
pub struct Persistence {
    /// Task rows.
    pub tasks: Arc<dyn TaskStore>,
    /// Device rows.
    pub devices: Arc<dyn DeviceStore>,
    pool: Option<DatabasePool>,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence")
            .field("provider", &self.provider())
            .finish()
    }
}

impl Persistence {
    /// Open the backend named by `config.provider`.
    pub async fn open(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider {
            DatabaseProvider::Memory => {
                info!("Using in-memory stores; data is lost on restart");
                Ok(Self::in_memory())
            }
            DatabaseProvider::Postgres => {
                let pool = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(pool.pool()).await?;
                }
                Ok(Self::postgres(pool))
            }
        }
    }

    /// Fresh process-local stores.
    pub fn in_memory() -> Self {
        Self {
            tasks: Arc::new(MemoryTaskStore::new()),
            devices: Arc::new(MemoryDeviceStore::new()),
            pool: None,
        }
    }

    /// Repositories over an open pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        Self {
            tasks: Arc::new(TaskRepository::new(pool.pool().clone())),
            devices: Arc::new(DeviceRepository::new(pool.pool().clone())),
            pool: Some(pool),
        }
    }

    /// Which backend is active.
    pub fn provider(&self) -> DatabaseProvider {
        if self.pool.is_some() {
            DatabaseProvider::Postgres
        } else {
            DatabaseProvider::Memory
        }
    }

    /// The PostgreSQL pool, if any.
    pub fn pool(&self) -> Option<&DatabasePool> {
        self.pool.as_ref()
    }

    /// Whether the backend answers. Memory stores always do.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(true),
        }
    }

    /// Release backend resources.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
