use thiserror::Error;

/// Unified error type for the dnssec-sync tool
#[derive(Error, Debug)]
pub enum SyncError {
    /// Session or transport failure against either API. Always fatal; the
    /// run aborts before any mutating action executes.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A single add/delete call was rejected by the registrar. Recoverable:
    /// reported per item, the batch continues.
    #[error("Provider error {code}: {message}")]
    Provider { code: i64, message: String },

    /// The local export artifact is missing, unreadable or not valid JSON.
    #[error("Malformed export file: {0}")]
    MalformedExport(String),

    /// Invalid or missing environment configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An origin-scoped query named a zone the registry does not contain.
    #[error("Unknown zone: {0}")]
    UnknownZone(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Connection(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
