// src/pipeline/record.rs

//! Per-record migration
//!
//! One record is one unit of isolation: its resources are migrated with a
//! bounded fan-out, the outcomes are joined, and only then is the rewritten
//! content persisted. A persistence failure rolls back this record's uploads
//! and degrades this record alone.
//!
//! # Record Lifecycle
//!
//! ```text
//! PENDING -> EXTRACTED -> NO_RESOURCES                          => Untouched
//!                      -> DISPATCHED -> SETTLED -> REWRITTEN
//!                             -> PERSISTED                      => Updated
//!                             -> PERSIST_FAILED -> COMPENSATING => Degraded
//! ```

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::extract::ResourceExtractor;
use crate::pipeline::migrate::{ResourceMigrator, ResourceOutcome};
use crate::rewrite::{rewrite, UpdateMap};
use crate::stats::{RecordDisposition, RecordStats};
use crate::store::{ContentStore, ObjectStore, Record};

/// Result of pushing one record through the pipeline
#[derive(Debug)]
pub struct RecordOutcome {
    pub id: String,
    pub stats: RecordStats,
    pub disposition: RecordDisposition,
}

/// Drives a single record through extract, migrate, rewrite and persist
pub struct RecordProcessor {
    store: Arc<dyn ContentStore>,
    objects: Arc<dyn ObjectStore>,
    migrator: ResourceMigrator,
    extractor: ResourceExtractor,
    resource_concurrency: usize,
}

impl RecordProcessor {
    pub fn new(
        store: Arc<dyn ContentStore>,
        objects: Arc<dyn ObjectStore>,
        migrator: ResourceMigrator,
        extractor: ResourceExtractor,
        resource_concurrency: usize,
    ) -> Self {
        Self {
            store,
            objects,
            migrator,
            extractor,
            resource_concurrency: resource_concurrency.max(1),
        }
    }

    pub fn extractor(&self) -> &ResourceExtractor {
        &self.extractor
    }

    /// Process one record end to end; never fails the surrounding run
    pub async fn process(&self, record: &Record) -> RecordOutcome {
        let references = self.extractor.extract(&record.content);
        if references.is_empty() {
            debug!("Record {} has no migratable resources", record.id);
            return RecordOutcome {
                id: record.id.clone(),
                stats: RecordStats::default(),
                disposition: RecordDisposition::Untouched,
            };
        }

        let found = references.len();
        info!("Record {}: migrating {} resources", record.id, found);

        // The collect is the join barrier: every resource settles before
        // the record is rewritten.
        let outcomes: Vec<ResourceOutcome> = stream::iter(references)
            .map(|reference| {
                let migrator = &self.migrator;
                let id = record.id.as_str();
                async move { migrator.migrate(id, &reference).await }
            })
            .buffer_unordered(self.resource_concurrency)
            .collect()
            .await;

        let mut stats = RecordStats {
            found,
            processed: 0,
            failed: 0,
        };
        let mut updates = UpdateMap::new();
        for outcome in outcomes {
            match outcome {
                ResourceOutcome::Migrated {
                    reference,
                    new_location,
                } => {
                    stats.processed += 1;
                    updates.insert(reference, new_location);
                }
                ResourceOutcome::Failed { .. } => stats.failed += 1,
            }
        }

        let new_content = rewrite(&record.content, &updates);
        match self.store.update_record(&record.id, &new_content).await {
            Ok(()) => {
                debug!(
                    "Record {} persisted with {} rewritten references",
                    record.id,
                    updates.len()
                );
                RecordOutcome {
                    id: record.id.clone(),
                    stats,
                    disposition: RecordDisposition::Updated,
                }
            }
            Err(e) => {
                warn!("Failed to persist record {}: {}", record.id, e);
                self.compensate(&record.id, &updates).await;
                RecordOutcome {
                    id: record.id.clone(),
                    stats,
                    disposition: RecordDisposition::Degraded,
                }
            }
        }
    }

    /// Best-effort removal of this record's uploaded objects
    async fn compensate(&self, record_id: &str, updates: &UpdateMap) {
        if updates.is_empty() {
            return;
        }

        info!(
            "Compensating record {}: removing {} uploaded objects",
            record_id,
            updates.len()
        );
        for location in updates.values() {
            if let Err(e) = self.objects.delete(location).await {
                warn!(
                    "Failed to remove {} while compensating record {}: {}",
                    location, record_id, e
                );
            }
        }
    }
}
