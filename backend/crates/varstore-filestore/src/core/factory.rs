//! Storage factory for all configured backends.
//!
//! Remote backends are built with the `object_store` builders and wrapped in a
//! `PrefixStore` when the configuration names a key prefix.
//!
//! # Timeout Configuration
//!
//! `[storage.remote_timeouts]` is applied through `ClientOptions`:
//! - `request_timeout_secs` - timeout for S3/GCS/Azure operations (default: 60s)
//! - `connect_timeout_secs` - timeout for connection establishment (default: 10s)

use crate::core::paths::parse_remote_url;
use crate::error::{FilestoreError, Result};
use crate::object_storage::ObjectStorage;
use crate::storage::Storage;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::path::Path as ObjectStorePath;
use object_store::prefix::PrefixStore;
use object_store::{ClientOptions, ObjectStore};
use std::sync::Arc;
use std::time::Duration;
use varstore_configs::{RemoteStorageTimeouts, StorageBackend, StorageSettings};

/// Build the storage backend described by `settings`.
pub fn build_storage(settings: &StorageSettings) -> Result<Arc<dyn Storage>> {
    let storage = match settings.backend {
        StorageBackend::Local => ObjectStorage::local(settings.base_directory.trim())?,
        StorageBackend::Memory => ObjectStorage::in_memory(),
        StorageBackend::S3 => build_s3(settings)?,
        StorageBackend::Gcs => build_gcs(settings)?,
        StorageBackend::Azure => build_azure(settings)?,
    };

    tracing::debug!(backend = %settings.backend, storage = %storage.describe(), "Storage initialised");
    Ok(Arc::new(storage))
}

/// Build ClientOptions with timeouts from configuration.
fn build_client_options(timeouts: &RemoteStorageTimeouts) -> ClientOptions {
    ClientOptions::new()
        .with_timeout(Duration::from_secs(timeouts.request_timeout_secs))
        .with_connect_timeout(Duration::from_secs(timeouts.connect_timeout_secs))
}

/// Bucket and key prefix, from `bucket` + `base_directory` or from a URL in `base_directory`.
fn remote_location(settings: &StorageSettings, schemes: &[&str]) -> Result<(String, String)> {
    let base = settings.base_directory.trim();
    if base.contains("://") {
        return parse_remote_url(base, schemes);
    }

    let bucket = settings.bucket.clone().ok_or_else(|| {
        FilestoreError::Config(format!("Storage backend '{}' requires a bucket", settings.backend))
    })?;
    let prefix = match base {
        "" | "." | "./" => String::new(),
        other => other.to_string(),
    };
    Ok((bucket, prefix))
}

fn build_s3(settings: &StorageSettings) -> Result<ObjectStorage> {
    let (bucket, prefix) = remote_location(settings, &["s3://"])?;

    // Credentials come from the standard AWS environment variables
    let mut builder = AmazonS3Builder::from_env().with_bucket_name(&bucket);

    let region = settings.region.as_deref().unwrap_or("us-east-1");
    builder = builder.with_region(region);

    if let Some(endpoint) = &settings.endpoint {
        builder = builder
            .with_endpoint(endpoint)
            .with_virtual_hosted_style_request(false)
            .with_allow_http(endpoint.starts_with("http://"));
    }

    builder = builder.with_client_options(build_client_options(&settings.remote_timeouts));

    let store = builder.build().map_err(|e| FilestoreError::Config(format!("S3: {}", e)))?;

    Ok(ObjectStorage::remote(wrap_with_prefix(store, &prefix)?, format!("s3://{}", bucket)))
}

fn build_gcs(settings: &StorageSettings) -> Result<ObjectStorage> {
    let (bucket, prefix) = remote_location(settings, &["gs://", "gcs://"])?;

    let builder = GoogleCloudStorageBuilder::from_env()
        .with_bucket_name(&bucket)
        .with_client_options(build_client_options(&settings.remote_timeouts));

    let store = builder.build().map_err(|e| FilestoreError::Config(format!("GCS: {e}")))?;

    Ok(ObjectStorage::remote(wrap_with_prefix(store, &prefix)?, format!("gs://{}", bucket)))
}

fn build_azure(settings: &StorageSettings) -> Result<ObjectStorage> {
    let (container, prefix) = remote_location(settings, &["az://", "azure://"])?;

    let builder = MicrosoftAzureBuilder::from_env()
        .with_container_name(&container)
        .with_client_options(build_client_options(&settings.remote_timeouts));

    let store = builder.build().map_err(|e| FilestoreError::Config(format!("Azure: {e}")))?;

    Ok(ObjectStorage::remote(wrap_with_prefix(store, &prefix)?, format!("az://{}", container)))
}

/// Wrap a store with a PrefixStore if prefix is non-empty.
fn wrap_with_prefix<T: ObjectStore + 'static>(
    store: T,
    prefix: &str,
) -> Result<Arc<dyn ObjectStore>> {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        Ok(Arc::new(store) as Arc<dyn ObjectStore>)
    } else {
        let prefix_path =
            ObjectStorePath::parse(prefix).map_err(|e| FilestoreError::Path(e.to_string()))?;
        Ok(Arc::new(PrefixStore::new(store, prefix_path)) as Arc<dyn ObjectStore>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_local_storage() {
        let dir = tempfile::tempdir().unwrap();
        let settings = StorageSettings {
            base_directory: dir.path().join("store").to_string_lossy().into_owned(),
            ..Default::default()
        };
        let storage = build_storage(&settings).unwrap();
        assert!(storage.describe().starts_with("local:"));
        assert!(dir.path().join("store").is_dir());
    }

    #[test]
    fn test_build_memory_storage() {
        let settings = StorageSettings {
            backend: StorageBackend::Memory,
            ..Default::default()
        };
        let storage = build_storage(&settings).unwrap();
        assert!(storage.engine_store().is_some());
    }

    #[test]
    fn test_remote_location() {
        let settings = StorageSettings {
            backend: StorageBackend::S3,
            base_directory: "s3://pipelines/team-a".to_string(),
            ..Default::default()
        };
        assert_eq!(
            remote_location(&settings, &["s3://"]).unwrap(),
            ("pipelines".to_string(), "team-a".to_string())
        );

        let settings = StorageSettings {
            backend: StorageBackend::S3,
            bucket: Some("pipelines".to_string()),
            ..Default::default()
        };
        assert_eq!(
            remote_location(&settings, &["s3://"]).unwrap(),
            ("pipelines".to_string(), String::new())
        );
    }

    #[test]
    fn test_remote_without_bucket() {
        let settings = StorageSettings {
            backend: StorageBackend::Gcs,
            ..Default::default()
        };
        assert!(matches!(build_storage(&settings), Err(FilestoreError::Config(_))));
    }
}
