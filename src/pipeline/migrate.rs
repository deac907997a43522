// src/pipeline/migrate.rs

//! Single-resource migration
//!
//! Moves one resource from the origin host into the object store. A failed
//! migration is an outcome, not an error: the resource keeps its old
//! reference in the rewritten content and the rest of the record proceeds.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::store::{ObjectStore, ResourceFetcher};

/// What happened to one extracted reference
#[derive(Debug)]
pub enum ResourceOutcome {
    /// The resource now lives in the object store
    Migrated {
        reference: String,
        new_location: String,
    },
    /// The resource stays where it was; the reference is left untouched
    Failed { reference: String, cause: Error },
}

impl ResourceOutcome {
    /// The extracted reference this outcome belongs to
    pub fn reference(&self) -> &str {
        match self {
            ResourceOutcome::Migrated { reference, .. } => reference,
            ResourceOutcome::Failed { reference, .. } => reference,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, ResourceOutcome::Migrated { .. })
    }
}

/// Fetches a resource from the origin and uploads it to the object store
pub struct ResourceMigrator {
    fetcher: Arc<dyn ResourceFetcher>,
    objects: Arc<dyn ObjectStore>,
    origin: String,
    key_prefix: Option<String>,
}

impl ResourceMigrator {
    pub fn new(
        fetcher: Arc<dyn ResourceFetcher>,
        objects: Arc<dyn ObjectStore>,
        origin: &str,
        key_prefix: Option<String>,
    ) -> Self {
        Self {
            fetcher,
            objects,
            origin: origin.trim_end_matches('/').to_string(),
            key_prefix,
        }
    }

    /// Migrate one reference, reporting failure as an outcome
    pub async fn migrate(&self, record_id: &str, reference: &str) -> ResourceOutcome {
        match self.try_migrate(record_id, reference).await {
            Ok(new_location) => {
                debug!("Migrated {} to {}", reference, new_location);
                ResourceOutcome::Migrated {
                    reference: reference.to_string(),
                    new_location,
                }
            }
            Err(cause) => {
                warn!(
                    "Failed to migrate {} for record {}: {}",
                    reference, record_id, cause
                );
                ResourceOutcome::Failed {
                    reference: reference.to_string(),
                    cause,
                }
            }
        }
    }

    async fn try_migrate(&self, record_id: &str, reference: &str) -> Result<String> {
        let url = self.resolve(reference);
        let bytes = self.fetcher.fetch(&url).await?;

        // `bytes` is owned here and dropped on both paths once the upload settles.
        let key = self.object_key(record_id, reference);
        self.objects.put(&key, &bytes).await
    }

    /// Resolve a reference to a fetchable URL
    fn resolve(&self, reference: &str) -> String {
        let absolute = reference
            .get(..7)
            .is_some_and(|p| p.eq_ignore_ascii_case("http://"))
            || reference
                .get(..8)
                .is_some_and(|p| p.eq_ignore_ascii_case("https://"));

        if absolute {
            reference.to_string()
        } else {
            format!("{}{}", self.origin, reference)
        }
    }

    /// Bucket key for a record's resource: `[prefix/]record-id/<reference path>`
    ///
    /// The reference's own path segments are kept, so two resources sharing
    /// a file name inside one record map to distinct keys.
    fn object_key(&self, record_id: &str, reference: &str) -> String {
        let segments: Vec<String> = reference_path(reference)
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(sanitize_segment)
            .collect();

        let id = sanitize_segment(record_id);
        let tail = if segments.is_empty() {
            sanitize_segment(reference)
        } else {
            segments.join("/")
        };

        match &self.key_prefix {
            Some(prefix) => format!("{prefix}/{id}/{tail}"),
            None => format!("{id}/{tail}"),
        }
    }
}

/// Path component of a reference; an absolute URL loses its scheme and host
fn reference_path(reference: &str) -> &str {
    match reference.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |start| &rest[start..]),
        None => reference,
    }
}

/// Replace anything outside `[A-Za-z0-9._-]` so the segment is a safe key part
fn sanitize_segment(segment: &str) -> String {
    let out: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();

    if out.is_empty() { "_".to_string() } else { out }
}
