// src/stats.rs

//! Per-record and run-wide migration accounting
//!
//! Every record settles with a `RecordStats` whose counts always balance:
//! `processed + failed == found`. The coordinator folds them into a
//! `GlobalStats` as records settle; the fold is commutative, so settle
//! order never affects the final tally.

use std::fmt;

/// Counts of resource references for a single record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordStats {
    /// Unique references discovered in the record's content
    pub found: usize,
    /// References successfully migrated
    pub processed: usize,
    /// References whose migration failed
    pub failed: usize,
}

impl RecordStats {
    /// True when every discovered reference has a terminal outcome
    pub fn is_settled(&self) -> bool {
        self.processed + self.failed == self.found
    }
}

/// Terminal state of one record's migration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordDisposition {
    /// No resource references; the stored content was not modified
    Untouched,
    /// Rewritten content was persisted
    Updated,
    /// Persistence failed after uploads; compensation was attempted and
    /// the stored content remains the original
    Degraded,
}

/// Aggregate statistics for a whole migration run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalStats {
    /// Records that settled
    pub records: usize,
    /// Records persisted with rewritten content
    pub updated: usize,
    /// Records left in their original state after a persistence failure
    pub degraded: usize,
    /// Records with no resource references
    pub untouched: usize,
    /// Sum of per-record `found` counts
    pub found: usize,
    /// Sum of per-record `processed` counts
    pub processed: usize,
    /// Sum of per-record `failed` counts
    pub failed: usize,
}

impl GlobalStats {
    /// Fold one settled record into the aggregate
    pub fn absorb(&mut self, stats: RecordStats, disposition: RecordDisposition) {
        self.records += 1;
        match disposition {
            RecordDisposition::Untouched => self.untouched += 1,
            RecordDisposition::Updated => self.updated += 1,
            RecordDisposition::Degraded => self.degraded += 1,
        }
        self.found += stats.found;
        self.processed += stats.processed;
        self.failed += stats.failed;
    }
}

impl fmt::Display for GlobalStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  Records:   {} settled, {} updated, {} degraded, {} without resources",
            self.records, self.updated, self.degraded, self.untouched
        )?;
        write!(
            f,
            "  Resources: {} found, {} migrated, {} failed",
            self.found, self.processed, self.failed
        )
    }
}
