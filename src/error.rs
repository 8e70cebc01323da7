//! Error taxonomy shared by every layer of the search pipeline. Each kind
//! travels unchanged from where it is detected up to the entry point, which
//! turns it into a message on stderr and a process exit code.

use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad input: a short search term, an out-of-range rating, an unknown
    /// exam kind or resource type.
    #[error("{0}")]
    Validation(String),

    /// Missing or malformed connection/search settings.
    #[error("{0}")]
    Configuration(String),

    /// Connection or query failure reported by the database driver. The
    /// driver message is kept verbatim.
    #[error("{message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Wrap a driver error, prefixing its message with `context`.
    pub fn storage<E>(context: &str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            message: format!("{context}: {source}"),
            source: Some(Box::new(source)),
        }
    }

    /// Process exit code reported by the CLI for this kind of failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Configuration(_) => 1,
            Self::Storage { .. } => 2,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "mysql")]
impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
