//! MySQL backend, compiled with the `mysql` feature. The CLI is synchronous,
//! so the pool is driven by a private current-thread runtime and every call
//! blocks until the driver answers.

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::Row;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

use super::resources::{like_pattern, ResourceRow, ResourceStore, SEARCH_SQL};
use crate::config::DatabaseConfig;
use crate::error::{Error, Result};

pub struct MySqlStore {
    runtime: Runtime,
    pool: MySqlPool,
}

impl MySqlStore {
    /// Connect with a single-connection pool. Parameters are expected to have
    /// been validated by the connection provider.
    pub fn connect(config: &DatabaseConfig) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| Error::storage("mysql connection error", err))?;

        let host = config.host.as_deref().unwrap_or("localhost");
        let database = config.database.as_deref().unwrap_or_default();
        let options = MySqlConnectOptions::new()
            .host(host)
            .port(config.port)
            .database(database)
            .username(config.username.as_deref().unwrap_or_default())
            .password(config.password.as_deref().unwrap_or_default())
            .charset(&config.charset)
            .collation(&config.collation);

        let pool = runtime
            .block_on(
                MySqlPoolOptions::new()
                    .max_connections(1)
                    .connect_with(options),
            )
            .map_err(|err| Error::storage("mysql connection error", err))?;

        info!(host, port = config.port, database, "connected to mysql");
        Ok(Self { runtime, pool })
    }
}

impl ResourceStore for MySqlStore {
    fn find_rows_by_name(&self, term: &str) -> Result<Vec<ResourceRow>> {
        let rows = self.runtime.block_on(
            sqlx::query(SEARCH_SQL)
                .bind(like_pattern(term))
                .fetch_all(&self.pool),
        )?;
        debug!(term, rows = rows.len(), "mysql search finished");

        rows.iter()
            .map(|row| -> Result<ResourceRow> {
                Ok(ResourceRow {
                    id: row.try_get(0)?,
                    name: row.try_get(1)?,
                    kind: row.try_get(2)?,
                    rating: row.try_get(3)?,
                    exam_type: row.try_get(4)?,
                })
            })
            .collect()
    }
}
