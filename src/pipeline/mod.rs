// src/pipeline/mod.rs

//! Migration pipeline orchestration
//!
//! A [`Migration`] owns the collaborators behind their traits and drives the
//! whole run: list every record, push each through a [`RecordProcessor`]
//! under a bounded record fan-out, and fold the per-record outcomes into a
//! [`GlobalStats`]. Only the initial record listing can fail the run; every
//! later fault is absorbed as a per-resource or per-record outcome.

mod migrate;
mod record;

pub use migrate::{ResourceMigrator, ResourceOutcome};
pub use record::{RecordOutcome, RecordProcessor};

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::Result;
use crate::extract::ResourceExtractor;
use crate::stats::GlobalStats;
use crate::store::{ContentStore, ObjectStore, Record, ResourceFetcher};

/// Tuning for one migration run
#[derive(Debug, Clone)]
pub struct MigrationOptions {
    /// Origin host rooted references are fetched from
    pub origin: String,
    /// Key prefix for uploaded objects
    pub key_prefix: Option<String>,
    /// Rooted-path prefixes recognized as resource directories
    pub path_prefixes: Vec<String>,
    /// Maximum records in flight
    pub record_concurrency: usize,
    /// Maximum resources in flight within one record
    pub resource_concurrency: usize,
}

/// The complete pipeline, ready to run against the configured stores
pub struct Migration {
    store: Arc<dyn ContentStore>,
    processor: RecordProcessor,
    record_concurrency: usize,
}

impl Migration {
    pub fn new(
        store: Arc<dyn ContentStore>,
        objects: Arc<dyn ObjectStore>,
        fetcher: Arc<dyn ResourceFetcher>,
        options: MigrationOptions,
    ) -> Result<Self> {
        let extractor = ResourceExtractor::new(&options.origin, &options.path_prefixes)?;
        let migrator = ResourceMigrator::new(
            fetcher,
            objects.clone(),
            &options.origin,
            options.key_prefix.clone(),
        );
        let processor = RecordProcessor::new(
            store.clone(),
            objects,
            migrator,
            extractor,
            options.resource_concurrency,
        );

        Ok(Self {
            store,
            processor,
            // A zero bound would leave `buffer_unordered` pending forever.
            record_concurrency: options.record_concurrency.max(1),
        })
    }

    /// Run the full migration and report what happened
    pub async fn run(&self, progress: Option<&ProgressBar>) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();
        info!("Starting migration run {}", run_id);

        let records = self.store.list_records().await?;
        info!("Found {} records to examine", records.len());

        let stats = self.process_records(records, progress).await;

        let report = RunReport {
            run_id,
            started_at,
            elapsed: start.elapsed(),
            stats,
        };
        info!(
            "Migration run {} complete: {} records settled, {} resources migrated, {} failed",
            run_id, report.stats.records, report.stats.processed, report.stats.failed
        );
        Ok(report)
    }

    async fn process_records(
        &self,
        records: Vec<Record>,
        progress: Option<&ProgressBar>,
    ) -> GlobalStats {
        if let Some(pb) = progress {
            pb.set_length(records.len() as u64);
        }

        let mut stats = GlobalStats::default();
        let mut outcomes = stream::iter(records)
            .map(|record| {
                let processor = &self.processor;
                async move { processor.process(&record).await }
            })
            .buffer_unordered(self.record_concurrency);

        while let Some(outcome) = outcomes.next().await {
            debug!(
                "Record {} settled as {:?} ({} found, {} migrated, {} failed)",
                outcome.id,
                outcome.disposition,
                outcome.stats.found,
                outcome.stats.processed,
                outcome.stats.failed
            );
            stats.absorb(outcome.stats, outcome.disposition);
            if let Some(pb) = progress {
                pb.inc(1);
            }
        }

        stats
    }

    /// Count migratable references without touching anything
    pub async fn scan(&self) -> Result<ScanReport> {
        let records = self.store.list_records().await?;
        let total = records.len();

        let mut details = Vec::new();
        let mut references = 0;
        for record in &records {
            let found = self.extractor().extract(&record.content).len();
            if found > 0 {
                references += found;
                details.push((record.id.clone(), found));
            }
        }

        Ok(ScanReport {
            records: total,
            records_with_resources: details.len(),
            references,
            details,
        })
    }

    fn extractor(&self) -> &ResourceExtractor {
        self.processor.extractor()
    }
}

/// Summary of a completed migration run
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub stats: GlobalStats,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Migration run {}", self.run_id)?;
        writeln!(f, "  Started:   {}", self.started_at.to_rfc3339())?;
        writeln!(f, "  Elapsed:   {:.2}s", self.elapsed.as_secs_f64())?;
        write!(f, "{}", self.stats)
    }
}

/// Summary of a read-only scan
#[derive(Debug)]
pub struct ScanReport {
    pub records: usize,
    pub records_with_resources: usize,
    pub references: usize,
    /// Record id and reference count, for every record with at least one
    pub details: Vec<(String, usize)>,
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scanned {} records", self.records)?;
        write!(
            f,
            "  {} records reference {} migratable resources",
            self.records_with_resources, self.references
        )
    }
}
