// src/store/object.rs

//! Object store client
//!
//! Uploads migrated resources to an S3-compatible bucket and deletes them
//! again when a record's persistence fails. The public location of an
//! uploaded object is derived from the configured public base URL, not from
//! the bucket endpoint, so the rewritten references work behind a CDN.

use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::region::Region;
use tracing::debug;

use crate::error::{Error, Result};

/// Destination for migrated resource bytes
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload bytes under the given key and return the public location
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String>;

    /// Remove a previously uploaded object by its public location
    async fn delete(&self, location: &str) -> Result<()>;
}

/// Connection settings for an S3-compatible bucket
#[derive(Debug, Clone)]
pub struct S3Options {
    pub bucket: String,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub public_base_url: String,
}

/// S3-compatible object store (AWS, R2, MinIO)
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    public_base_url: String,
}

impl S3ObjectStore {
    pub fn new(options: &S3Options) -> Result<Self> {
        let credentials = match (&options.access_key, &options.secret_key) {
            (Some(access), Some(secret)) => {
                Credentials::new(Some(access.as_str()), Some(secret.as_str()), None, None, None)
            }
            _ => Credentials::from_env(),
        }
        .map_err(|e| Error::InitError(format!("Failed to resolve bucket credentials: {e}")))?;

        let region = match &options.endpoint {
            Some(endpoint) => Region::Custom {
                region: options.region.clone().unwrap_or_else(|| "auto".to_string()),
                endpoint: endpoint.trim_end_matches('/').to_string(),
            },
            None => options
                .region
                .as_deref()
                .unwrap_or("us-east-1")
                .parse::<Region>()
                .map_err(|e| Error::InitError(format!("Invalid bucket region: {e}")))?,
        };

        let bucket = Bucket::new(&options.bucket, region, credentials)
            .map_err(|e| Error::InitError(format!("Failed to open bucket: {e}")))?
            .with_path_style();

        Ok(Self {
            bucket,
            public_base_url: options.public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Public location an uploaded key is reachable at
    fn location_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key.trim_start_matches('/'))
    }

    /// Bucket key behind a public location
    fn key_for(&self, location: &str) -> Result<String> {
        let key = location
            .strip_prefix(&self.public_base_url)
            .ok_or_else(|| {
                Error::ObjectStoreError(format!(
                    "Location {location} is not under {}",
                    self.public_base_url
                ))
            })?
            .trim_start_matches('/');

        if key.is_empty() {
            return Err(Error::ObjectStoreError(format!(
                "Location {location} has no object key"
            )));
        }

        Ok(key.to_string())
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String> {
        debug!("Uploading {} bytes to {}", bytes.len(), key);

        let response = self
            .bucket
            .put_object(key, bytes)
            .await
            .map_err(|e| Error::ObjectStoreError(format!("Failed to upload {key}: {e}")))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(Error::ObjectStoreError(format!(
                "Upload of {key} returned HTTP {status}"
            )));
        }

        Ok(self.location_for(key))
    }

    async fn delete(&self, location: &str) -> Result<()> {
        let key = self.key_for(location)?;
        debug!("Deleting object {}", key);

        let response = self
            .bucket
            .delete_object(&key)
            .await
            .map_err(|e| Error::ObjectStoreError(format!("Failed to delete {key}: {e}")))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(Error::ObjectStoreError(format!(
                "Delete of {key} returned HTTP {status}"
            )));
        }

        Ok(())
    }
}
