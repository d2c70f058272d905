//! Remote object-store backend for any S3-compatible endpoint.

use super::{BackendResult, StorageBackend, StoredLocation, ensure_key_safe};
use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::{
    Attribute, Attributes, ObjectStore, PutOptions, PutPayload, aws::AmazonS3Builder,
    path::Path as ObjectPath,
};
use std::{env, sync::Arc};

/// S3-compatible storage for one bucket.
///
/// Credentials and region come from the standard `AWS_*` environment
/// variables. Setting `AWS_ENDPOINT_URL` points the client at a
/// localstack/minio-style endpoint; plain-http endpoints are allowed
/// there for testing.
pub struct S3Backend {
    client: Arc<dyn ObjectStore>,
    public_base_url: Option<String>,
}

impl S3Backend {
    pub fn new(
        bucket: &str,
        region: Option<&str>,
        public_base_url: Option<String>,
    ) -> BackendResult<Self> {
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
        if let Some(region) = region {
            builder = builder.with_region(region);
        }
        if let Ok(endpoint) = env::var("AWS_ENDPOINT_URL") {
            builder = builder.with_endpoint(endpoint.clone());
            if endpoint.starts_with("http://") {
                builder = builder.with_allow_http(true);
            }
        }
        let client = builder.build()?;
        Ok(Self {
            client: Arc::new(client),
            public_base_url,
        })
    }

    fn url_for(&self, key: &str) -> Option<String> {
        self.public_base_url
            .as_ref()
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), key))
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> BackendResult<StoredLocation> {
        ensure_key_safe(key)?;
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        self.client
            .put_opts(
                &ObjectPath::from(key),
                PutPayload::from(bytes),
                PutOptions::from(attributes),
            )
            .await?;
        Ok(StoredLocation {
            key: key.to_string(),
            url: self.url_for(key),
        })
    }

    async fn get(&self, key: &str) -> BackendResult<Option<Bytes>> {
        ensure_key_safe(key)?;
        match self.client.get(&ObjectPath::from(key)).await {
            Ok(result) => Ok(Some(result.bytes().await?)),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, key: &str) -> BackendResult<()> {
        ensure_key_safe(key)?;
        match self.client.delete(&ObjectPath::from(key)).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn list(&self, prefix: &str) -> BackendResult<Vec<StoredLocation>> {
        // Stored names are flat (`carousel_<token>_<name>`), so the prefix
        // is a partial filename rather than a path segment; list the whole
        // bucket and filter here instead of relying on path-delimited
        // prefix semantics.
        let metas: Vec<object_store::ObjectMeta> = self.client.list(None).try_collect().await?;
        let mut locations: Vec<StoredLocation> = metas
            .into_iter()
            .filter(|meta| meta.location.as_ref().starts_with(prefix))
            .map(|meta| {
                let key = meta.location.as_ref().to_string();
                let url = self.url_for(&key);
                StoredLocation { key, url }
            })
            .collect();
        locations.sort_unstable_by(|a, b| a.key.cmp(&b.key));
        Ok(locations)
    }
}
