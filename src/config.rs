//! Runtime settings read from the process environment, optionally seeded from
//! a `.env` style key-value file. Parsing runs over a plain key lookup so tests
//! can feed a map instead of mutating the real environment.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use directories::BaseDirs;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Folder name used beneath the user's home directory for the default
/// SQLite file.
const DATA_DIR_NAME: &str = ".idiomas-search";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "idiomas.sqlite";

pub const DEFAULT_MIN_SEARCH_LENGTH: usize = 3;
pub const DEFAULT_MYSQL_PORT: u16 = 3306;
const DEFAULT_ENV_FILE: &str = ".env";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Which database engine the connection provider talks to.
pub enum Driver {
    /// Embedded file or `:memory:` database through rusqlite.
    Sqlite,
    /// Networked server, available with the `mysql` feature.
    MySql,
}

impl Driver {
    /// Value accepted by `DB_CONNECTION`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::MySql => "mysql",
        }
    }
}

impl FromStr for Driver {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "mysql" => Ok(Self::MySql),
            other => Err(Error::configuration(format!(
                "unsupported DB_CONNECTION '{other}', expected 'sqlite' or 'mysql'"
            ))),
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, PartialEq, Eq)]
/// Connection parameters. Optional fields are checked by the connection
/// provider against what the chosen driver requires.
pub struct DatabaseConfig {
    /// Engine selected by `DB_CONNECTION`.
    pub driver: Driver,
    /// Server host (`DB_HOST`), MySQL only.
    pub host: Option<String>,
    /// Server port (`DB_PORT`), MySQL only.
    pub port: u16,
    /// Schema name for MySQL, file path or `:memory:` for SQLite.
    pub database: Option<String>,
    /// Login user (`DB_USER`).
    pub username: Option<String>,
    /// Login password (`DB_PASS`); hidden from `Debug` output.
    pub password: Option<String>,
    /// Connection character set (`DB_CHARSET`).
    pub charset: String,
    /// Connection collation (`DB_COLLATION`), which governs `LIKE` matching.
    pub collation: String,
}

impl DatabaseConfig {
    /// SQLite settings pointing at `path` (or `:memory:`).
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            driver: Driver::Sqlite,
            host: None,
            port: DEFAULT_MYSQL_PORT,
            database: Some(path.into()),
            username: None,
            password: None,
            charset: "utf8mb4".to_string(),
            collation: "utf8mb4_unicode_ci".to_string(),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("charset", &self.charset)
            .field("collation", &self.collation)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Everything one invocation needs: where the data lives and how long a
/// search term must be.
pub struct Config {
    /// Connection parameters for the provider.
    pub database: DatabaseConfig,
    /// Minimum search term length, counted in characters.
    pub min_search_length: usize,
}

impl Config {
    /// Load the env file (if any) into the process environment, then build
    /// the config from it. Variables already set in the environment win over
    /// file entries.
    pub fn load(env_file: Option<&Path>) -> Result<Self> {
        load_env_file(env_file)?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup, applying defaults for
    /// absent keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let driver = match get("DB_CONNECTION") {
            Some(value) => value.parse()?,
            None => Driver::Sqlite,
        };

        let database = match (get("DB_NAME"), driver) {
            (Some(name), _) => name,
            (None, Driver::MySql) => "idiomas_db".to_string(),
            (None, Driver::Sqlite) => default_sqlite_path()?.display().to_string(),
        };

        let database = DatabaseConfig {
            driver,
            host: Some(get("DB_HOST").unwrap_or_else(|| "localhost".to_string())),
            port: parse_number("DB_PORT", get("DB_PORT"), DEFAULT_MYSQL_PORT)?,
            database: Some(database),
            username: Some(get("DB_USER").unwrap_or_else(|| "root".to_string())),
            password: Some(lookup("DB_PASS").unwrap_or_default()),
            charset: get("DB_CHARSET").unwrap_or_else(|| "utf8mb4".to_string()),
            collation: get("DB_COLLATION").unwrap_or_else(|| "utf8mb4_unicode_ci".to_string()),
        };

        let min_search_length = parse_number(
            "SEARCH_MIN_LENGTH",
            get("SEARCH_MIN_LENGTH"),
            DEFAULT_MIN_SEARCH_LENGTH,
        )?;

        let config = Self {
            database,
            min_search_length,
        };
        debug!(?config, "configuration resolved");
        Ok(config)
    }
}

fn parse_number<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            Error::configuration(format!("{key} must be a non-negative integer, got '{raw}'"))
        }),
    }
}

/// An explicit file must exist; the implicit `./.env` is optional.
fn load_env_file(path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path).map_err(|err| {
                Error::configuration(format!(
                    "failed to load env file {}: {err}",
                    path.display()
                ))
            })?;
            debug!(path = %path.display(), "loaded env file");
        }
        None => match dotenvy::from_filename(DEFAULT_ENV_FILE) {
            Ok(path) => debug!(path = %path.display(), "loaded env file"),
            Err(err) if err.not_found() => debug!("no .env file found, using environment only"),
            Err(err) => warn!(%err, "ignoring unreadable .env file"),
        },
    }
    Ok(())
}

/// Resolve the absolute path to the default SQLite database inside the
/// user's home.
fn default_sqlite_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new()
        .ok_or_else(|| Error::configuration("could not locate home directory for DB_NAME"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
