//! Application state - shared across all handlers.

use std::sync::Arc;

use roster_core::ports::{PasswordService, Stores, UserRepository};
use roster_infra::{BcryptPasswordService, InMemoryUserRepository};

#[cfg(feature = "postgres")]
use roster_infra::PostgresUserRepository;

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub stores: Arc<Stores>,
    pub passwords: Arc<dyn PasswordService>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// Fails when a database is configured but cannot be reached.
    pub async fn new(config: &AppConfig) -> std::io::Result<Self> {
        let passwords: Arc<dyn PasswordService> =
            Arc::new(BcryptPasswordService::with_cost(config.bcrypt_cost));

        #[cfg(feature = "postgres")]
        let stores = match &config.database {
            Some(db_config) => {
                let conn = roster_infra::database::connect(db_config)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to connect to database: {}", e);
                        std::io::Error::other(e)
                    })?;
                Stores::new_cyclic(|stores| {
                    Arc::new(PostgresUserRepository::new(conn).with_stores(stores))
                        as Arc<dyn UserRepository>
                })
            }
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                in_memory_stores()
            }
        };

        #[cfg(not(feature = "postgres"))]
        let stores = {
            tracing::info!("Running without postgres feature - using in-memory repository");
            in_memory_stores()
        };

        tracing::info!(bcrypt_cost = config.bcrypt_cost, "Application state initialized");

        Ok(Self { stores, passwords })
    }

    /// State backed by the in-memory store.
    pub fn in_memory(passwords: Arc<dyn PasswordService>) -> Self {
        Self {
            stores: in_memory_stores(),
            passwords,
        }
    }

    pub fn users(&self) -> &dyn UserRepository {
        self.stores.users.as_ref()
    }
}

fn in_memory_stores() -> Arc<Stores> {
    Stores::new_cyclic(|stores| {
        Arc::new(InMemoryUserRepository::new().with_stores(stores)) as Arc<dyn UserRepository>
    })
}
