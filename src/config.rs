// src/config.rs

//! Configuration file parsing for the rehome pipeline
//!
//! Supports TOML configuration files with the following sections:
//! - [content_store] - Record listing/persistence API
//! - [object_store] - S3-compatible destination bucket
//! - [fetch] - Origin the resources are downloaded from
//! - [extract] - Reference recognition tuning
//! - [migration] - Concurrency bounds

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// TOML configuration file structure
#[derive(Debug, Deserialize)]
pub struct RehomeConfig {
    /// Content store settings
    pub content_store: ContentStoreSection,

    /// Object store settings
    pub object_store: ObjectStoreSection,

    /// Resource fetch settings
    pub fetch: FetchSection,

    /// Extraction settings
    #[serde(default)]
    pub extract: ExtractSection,

    /// Migration settings
    #[serde(default)]
    pub migration: MigrationSection,
}

/// Content store configuration section
#[derive(Debug, Deserialize)]
pub struct ContentStoreSection {
    /// Base URL of the record API
    pub base_url: String,

    /// Bearer token for authenticated stores
    #[serde(default)]
    pub token: Option<String>,

    /// Request timeout (e.g., "30s", "2m")
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

/// Object store configuration section
#[derive(Debug, Deserialize)]
pub struct ObjectStoreSection {
    /// Destination bucket name
    pub bucket: String,

    /// Region name (defaults to "auto" for custom endpoints)
    #[serde(default)]
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible stores (R2, MinIO)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Access key (falls back to the AWS environment variables)
    #[serde(default)]
    pub access_key: Option<String>,

    /// Secret key (falls back to the AWS environment variables)
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Public base URL rewritten references will point at
    pub public_base_url: String,

    /// Key prefix for every uploaded object
    #[serde(default)]
    pub key_prefix: Option<String>,
}

/// Resource fetch configuration section
#[derive(Debug, Deserialize)]
pub struct FetchSection {
    /// Origin rooted references are resolved against
    pub origin: String,

    /// Request timeout (e.g., "30s", "2m")
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

/// Extraction configuration section
#[derive(Debug, Default, Deserialize)]
pub struct ExtractSection {
    /// Rooted-path prefixes recognized as resource directories
    /// (empty accepts any rooted path)
    #[serde(default)]
    pub path_prefixes: Vec<String>,
}

/// Migration configuration section
#[derive(Debug, Deserialize)]
pub struct MigrationSection {
    /// Maximum records processed concurrently
    #[serde(default = "default_record_concurrency")]
    pub record_concurrency: usize,

    /// Maximum resources migrated concurrently within one record
    #[serde(default = "default_resource_concurrency")]
    pub resource_concurrency: usize,
}

impl Default for MigrationSection {
    fn default() -> Self {
        Self {
            record_concurrency: default_record_concurrency(),
            resource_concurrency: default_resource_concurrency(),
        }
    }
}

fn default_timeout() -> String {
    "30s".to_string()
}

fn default_record_concurrency() -> usize {
    4
}

fn default_resource_concurrency() -> usize {
    8
}

impl RehomeConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: RehomeConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_http_url("content_store.base_url", &self.content_store.base_url)?;
        validate_http_url("fetch.origin", &self.fetch.origin)?;
        validate_http_url("object_store.public_base_url", &self.object_store.public_base_url)?;

        if let Some(endpoint) = &self.object_store.endpoint {
            validate_http_url("object_store.endpoint", endpoint)?;
        }

        if self.object_store.bucket.trim().is_empty() {
            anyhow::bail!("object_store.bucket must not be empty");
        }

        if self.object_store.access_key.is_some() != self.object_store.secret_key.is_some() {
            anyhow::bail!(
                "object_store.access_key and object_store.secret_key must be set together"
            );
        }

        for prefix in &self.extract.path_prefixes {
            if !prefix.starts_with('/') {
                anyhow::bail!("extract.path_prefixes entries must be rooted, got '{}'", prefix);
            }
        }

        if self.migration.record_concurrency == 0 {
            anyhow::bail!("migration.record_concurrency must be at least 1");
        }
        if self.migration.resource_concurrency == 0 {
            anyhow::bail!("migration.resource_concurrency must be at least 1");
        }

        self.content_timeout()?;
        self.fetch_timeout()?;

        Ok(())
    }

    /// Parse the content store timeout to a Duration
    pub fn content_timeout(&self) -> Result<Duration> {
        parse_duration(&self.content_store.timeout)
    }

    /// Parse the resource fetch timeout to a Duration
    pub fn fetch_timeout(&self) -> Result<Duration> {
        parse_duration(&self.fetch.timeout)
    }

    /// Object key prefix with surrounding slashes stripped
    pub fn key_prefix(&self) -> Option<String> {
        self.object_store
            .key_prefix
            .as_deref()
            .map(|prefix| prefix.trim_matches('/').to_string())
            .filter(|prefix| !prefix.is_empty())
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).with_context(|| format!("Invalid {field}: {value}"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("{field} must use http or https, got '{}'", url.scheme());
    }
    Ok(())
}

/// Parse a human-readable duration string (e.g., "15m", "1h", "30s")
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if s.ends_with('d') {
        (&s[..s.len() - 1], 24 * 60 * 60)
    } else if s.ends_with('h') {
        (&s[..s.len() - 1], 60 * 60)
    } else if s.ends_with('m') {
        (&s[..s.len() - 1], 60)
    } else if s.ends_with('s') {
        (&s[..s.len() - 1], 1)
    } else {
        // Assume seconds
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .with_context(|| format!("Invalid duration number: {}", num_str))?;

    Ok(Duration::from_secs(num * multiplier))
}
