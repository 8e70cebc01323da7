//! Persistence module split across logical submodules.

mod connection;
#[cfg(feature = "mysql")]
mod mysql;
mod resources;

pub use connection::{ensure_schema, open_sqlite, validate, ConnectionProvider, Handle};
#[cfg(feature = "mysql")]
pub use mysql::MySqlStore;
pub use resources::{like_pattern, ResourceRow, ResourceStore, SEARCH_SQL};
