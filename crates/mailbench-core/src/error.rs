use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::XlsxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Output path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("No result files found in {}", .0.display())]
    NoResultFiles(PathBuf),

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Missing required column(s): {}", .0.join(", "))]
    MalformedTable(Vec<String>),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Classifier failed: {0}")]
    Classifier(String),

    #[error("Classifier did not finish within {0:?}")]
    ClassifierTimeout(Duration),
}

impl Error {
    /// Errors that abort a whole analysis batch rather than a single file.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(self, Error::PathNotFound(_) | Error::NoResultFiles(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
