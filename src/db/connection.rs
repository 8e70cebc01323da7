use once_cell::unsync::OnceCell;
use rusqlite::{Connection, OpenFlags};
use tracing::info;

use super::resources::ResourceStore;
use crate::config::{DatabaseConfig, Driver};
use crate::error::{Error, Result};

/// Special SQLite path that keeps the database in memory.
const IN_MEMORY: &str = ":memory:";

/// Opened storage handle, boxed so callers do not care which engine backs it.
pub type Handle = Box<dyn ResourceStore>;

/// Lazily opens one storage handle and hands out the same one for the rest
/// of its lifetime. Build a new provider to start over.
pub struct ConnectionProvider {
    config: Option<DatabaseConfig>,
    handle: OnceCell<Handle>,
}

impl ConnectionProvider {
    /// Provider that connects on first use with `config`.
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config: Some(config),
            handle: OnceCell::new(),
        }
    }

    /// Provider around a pre-built handle, such as an in-memory SQLite
    /// connection or a test double. No connection parameters are consulted.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            config: None,
            handle: OnceCell::with_value(handle),
        }
    }

    /// Return the handle, opening it on the first call.
    pub fn handle(&self) -> Result<&dyn ResourceStore> {
        let handle = self.handle.get_or_try_init(|| match &self.config {
            Some(config) => open(config),
            None => Err(Error::configuration("no connection parameters or handle supplied")),
        })?;
        Ok(&**handle)
    }

    pub fn is_connected(&self) -> bool {
        self.handle.get().is_some()
    }
}

/// Check that every parameter the chosen engine needs is present.
pub fn validate(config: &DatabaseConfig) -> Result<()> {
    let required: Vec<(&str, &Option<String>)> = match config.driver {
        Driver::Sqlite => vec![("database", &config.database)],
        Driver::MySql => vec![
            ("host", &config.host),
            ("database", &config.database),
            ("username", &config.username),
            ("password", &config.password),
        ],
    };

    for (key, value) in required {
        if value.is_none() {
            return Err(Error::configuration(format!(
                "incomplete {} configuration, missing: {key}",
                config.driver
            )));
        }
    }
    Ok(())
}

fn open(config: &DatabaseConfig) -> Result<Handle> {
    validate(config)?;
    match config.driver {
        Driver::Sqlite => {
            let path = config.database.as_deref().unwrap_or(IN_MEMORY);
            Ok(Box::new(open_sqlite(path)?))
        }
        Driver::MySql => open_mysql(config),
    }
}

#[cfg(feature = "mysql")]
fn open_mysql(config: &DatabaseConfig) -> Result<Handle> {
    Ok(Box::new(super::mysql::MySqlStore::connect(config)?))
}

#[cfg(not(feature = "mysql"))]
fn open_mysql(_config: &DatabaseConfig) -> Result<Handle> {
    Err(Error::configuration(
        "this build has no mysql support, rebuild with `--features mysql` or use DB_CONNECTION=sqlite",
    ))
}

/// Open an existing SQLite database read-only. Nothing is created: a missing
/// file or missing tables surface as storage errors. `:memory:` gets an empty
/// schema so it behaves as an empty catalogue.
pub fn open_sqlite(path: &str) -> Result<Connection> {
    let conn = if path == IN_MEMORY {
        let conn = Connection::open_in_memory()
            .map_err(|err| Error::storage("sqlite connection error", err))?;
        ensure_schema(&conn)?;
        conn
    } else {
        Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|err| Error::storage(&format!("sqlite connection error ({path})"), err))?
    };

    info!(path, "opened sqlite database");
    Ok(conn)
}

/// Create the resource tables when they are missing. Only used to seed
/// in-memory databases; files opened by the tool are never written.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS resources (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('class', 'exam')),
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS classes (
            resource_id INTEGER PRIMARY KEY,
            rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
            FOREIGN KEY (resource_id) REFERENCES resources(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS exams (
            resource_id INTEGER PRIMARY KEY,
            exam_type TEXT NOT NULL CHECK (exam_type IN (
                'selección',
                'pregunta y respuesta',
                'completación'
            )),
            FOREIGN KEY (resource_id) REFERENCES resources(id) ON DELETE CASCADE
        );",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::db::resources::ResourceRow;

    struct CountingStore(Rc<Cell<usize>>);

    impl ResourceStore for CountingStore {
        fn find_rows_by_name(&self, _term: &str) -> Result<Vec<ResourceRow>> {
            self.0.set(self.0.get() + 1);
            Ok(Vec::new())
        }
    }

    #[test]
    fn injected_handle_is_returned_as_is() {
        let calls = Rc::new(Cell::new(0));
        let provider = ConnectionProvider::with_handle(Box::new(CountingStore(calls.clone())));

        assert!(provider.is_connected());
        provider.handle().unwrap().find_rows_by_name("abc").unwrap();
        provider.handle().unwrap().find_rows_by_name("abc").unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn handle_is_opened_once() {
        let provider = ConnectionProvider::new(DatabaseConfig::sqlite(IN_MEMORY));
        assert!(!provider.is_connected());

        let first = provider.handle().unwrap();
        let second = provider.handle().unwrap();
        assert!(provider.is_connected());
        assert!(std::ptr::addr_eq(first, second));
    }

    #[test]
    fn missing_parameters_are_reported_before_connecting() {
        let mut config = DatabaseConfig::sqlite(IN_MEMORY);
        config.database = None;
        let err = ConnectionProvider::new(config).handle().err().unwrap();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("missing: database"));

        let mut config = DatabaseConfig::sqlite("idiomas_db");
        config.driver = Driver::MySql;
        config.host = Some("localhost".into());
        config.username = Some("root".into());
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("missing: password"));
    }

    #[test]
    fn missing_file_is_a_storage_error_and_stays_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("idiomas.sqlite");

        let err = open_sqlite(path.to_str().unwrap()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("sqlite connection error"));
        assert!(!path.exists());
        assert!(!dir.path().join("nested").exists());
    }

    #[test]
    fn file_without_tables_fails_at_query_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.sqlite");
        Connection::open(&path)
            .unwrap()
            .execute_batch("PRAGMA user_version = 1;")
            .unwrap();

        let conn = open_sqlite(path.to_str().unwrap()).unwrap();
        let err = conn.find_rows_by_name("english").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("no such table"));

        let tables: i64 = conn
            .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get(0))
            .unwrap();
        assert_eq!(tables, 0);
    }

    #[test]
    fn existing_file_is_opened_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idiomas.sqlite");
        ensure_schema(&Connection::open(&path).unwrap()).unwrap();

        let conn = open_sqlite(path.to_str().unwrap()).unwrap();
        assert!(conn.find_rows_by_name("anything").unwrap().is_empty());
        assert!(conn
            .execute("INSERT INTO resources (name, type) VALUES ('x', 'class')", [])
            .is_err());
    }

    #[test]
    fn unreadable_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.sqlite");
        std::fs::write(&path, vec![b'x'; 4096]).unwrap();

        let err = open_sqlite(path.to_str().unwrap())
            .and_then(|conn| conn.find_rows_by_name("abc"))
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
