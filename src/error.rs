// src/error.rs

//! Error types for the migration pipeline

use thiserror::Error;

/// Errors produced by the pipeline and its collaborators
///
/// Only a small subset of these ever crosses the coordinator boundary:
/// client construction and record-listing failures are fatal, everything
/// else is absorbed into per-resource outcomes and statistics.
#[derive(Error, Debug)]
pub enum Error {
    /// Client construction failures (HTTP clients, object store handles)
    #[error("Initialization error: {0}")]
    InitError(String),

    /// Content store failures (listing records, persisting rewrites)
    #[error("Content store error: {0}")]
    StoreError(String),

    /// Resource download failures
    #[error("Download error: {0}")]
    DownloadError(String),

    /// Object store failures (upload, delete)
    #[error("Object store error: {0}")]
    ObjectStoreError(String),

    /// Malformed configuration values or payloads
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Convenience result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
