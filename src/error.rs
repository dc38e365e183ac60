//! Error types for the geotree pipeline

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeoError>;

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("Input file not found: {}", .0.display())]
    InputFileMissing(PathBuf),

    #[error("Invalid line format: expected {expected} fields, got {found}")]
    InvalidLineFormat { expected: usize, found: usize },

    #[error("Record {child} references missing parent {parent}")]
    MissingParent { child: u32, parent: u32 },

    #[error("Transaction already in progress")]
    TransactionInProgress,

    #[error("No transaction in progress")]
    NoTransaction,

    #[error("Invalid store file: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
