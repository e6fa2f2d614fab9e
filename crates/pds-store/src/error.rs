use std::fmt;

use pds_core::PdsError;

#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    Core(PdsError),
    NotFound(String),
    InvalidData(String),
    Config(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Sqlite(e) => write!(f, "SQLite error: {e}"),
            StoreError::Core(e) => write!(f, "{e}"),
            StoreError::NotFound(what) => write!(f, "not found: {what}"),
            StoreError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            StoreError::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Sqlite(e) => Some(e),
            StoreError::Core(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Sqlite(e)
    }
}

impl From<PdsError> for StoreError {
    fn from(e: PdsError) -> Self {
        StoreError::Core(e)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
