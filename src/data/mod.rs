/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (fatal DataLoadError on failure)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<LaunchRecord>, site/booster index, payload bounds
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  (Dataset, selection) → outcome summary / scatter set
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;

use std::path::PathBuf;

use thiserror::Error;

/// Why the dataset could not be loaded. Always fatal: nothing can be drawn
/// without it.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: invalid value '{value}' in column '{column}'")]
    Malformed {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("column '{column}' has unsupported type {found}")]
    ColumnType { column: &'static str, found: String },

    #[error("dataset contains no records")]
    Empty,

    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// Non-fatal derivation faults. The affected chart renders empty.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("site '{0}' is not present in the dataset")]
    InvalidSelection(String),

    #[error("invalid payload range [{low}, {high}]")]
    InvalidRange { low: f64, high: f64 },
}
