use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForecastError>;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Failed to load gazetteer {}: {message}", path.display())]
    DataLoad { path: PathBuf, message: String },

    #[error("Scratch directory error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Failed to decode {} at ({lat}, {lng}): {message}", file.display())]
    Decode {
        file: PathBuf,
        lat: f64,
        lng: f64,
        message: String,
    },

    #[error("Failed to write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("City {city}, {state} not found in forecast table")]
    CityNotFound { city: String, state: String },

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl ForecastError {
    pub fn data_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::DataLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub fn fetch(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn decode(file: impl Into<PathBuf>, lat: f64, lng: f64, message: impl Into<String>) -> Self {
        Self::Decode {
            file: file.into(),
            lat,
            lng,
            message: message.into(),
        }
    }

    pub fn write(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Write {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
