// src/store/mod.rs

//! External store clients
//!
//! The pipeline talks to three remote collaborators, each behind a trait so
//! tests can stand in process-local fakes:
//! - [`ContentStore`] lists and persists the textual records
//! - [`ResourceFetcher`] downloads resource bytes from the origin
//! - [`ObjectStore`] uploads bytes to the destination and removes them again
//!   during compensation

pub mod content;
pub mod fetcher;
pub mod object;

pub use content::{ContentStore, HttpContentStore, Record};
pub use fetcher::{HttpResourceFetcher, ResourceFetcher};
pub use object::{ObjectStore, S3ObjectStore, S3Options};
