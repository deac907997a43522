// src/lib.rs

//! Rehome Resource Migration Pipeline
//!
//! Batch tool that moves embedded binary resources (images, archives) out of
//! textual content records and into an object store, rewriting each record to
//! point at the new locations.
//!
//! # Architecture
//!
//! - Trait-backed collaborators: content store, resource fetcher and object
//!   store sit behind traits so the pipeline runs against fakes in tests
//! - Failure isolation: a failed resource degrades one reference, a failed
//!   persistence degrades one record, and only a failed record listing
//!   aborts the run
//! - Bounded fan-out: records and resources-within-a-record are both
//!   processed under configurable concurrency limits
//! - Compensation: when a record cannot be persisted, its freshly uploaded
//!   objects are deleted again so the store holds no orphans

pub mod config;
mod error;
pub mod extract;
pub mod pipeline;
pub mod rewrite;
pub mod stats;
pub mod store;

pub use error::{Error, Result};
pub use extract::ResourceExtractor;
pub use pipeline::{
    Migration, MigrationOptions, RecordOutcome, ResourceOutcome, RunReport, ScanReport,
};
pub use rewrite::{rewrite, UpdateMap};
pub use stats::{GlobalStats, RecordDisposition, RecordStats};
pub use store::{ContentStore, ObjectStore, Record, ResourceFetcher};
