// src/utils/error.rs
use std::path::PathBuf;
use thiserror::Error;

use crate::filing::models::MetadataField;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Every fallback tier came up empty for this section id.
    #[error("Section not locatable: {0}")]
    SectionNotLocatable(String),

    /// The section is in the catalog but was not located in this filing.
    #[error("Section not found in filing: {0}")]
    SectionNotFound(String),

    #[error("Unknown section id: {0}")]
    UnknownSectionId(String),

    #[error("Metadata field missing: {0}")]
    MetadataFieldMissing(MetadataField),
}

#[derive(Error, Debug)]
pub enum FilingError {
    #[error("Failed to load filing {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid section catalog: {0}")]
    InvalidCatalog(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Nothing to save: {0}")]
    Section(#[from] ExtractError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Filing could not be loaded: {0}")]
    Filing(#[from] FilingError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
