use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("object not found")]
    NotFound,
    #[error("object storage failure: {0}")]
    Backend(String),
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError>;

    async fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject, StorageError>;
}

pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    /// Path-style addressing so MinIO-type endpoints work.
    pub async fn connect(endpoint: Option<&str>) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest()).load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared).force_path_style(true);
        if let Some(url) = endpoint {
            builder = builder.endpoint_url(url);
        }
        log::info!("S3 client initialized (endpoint: {})", endpoint.unwrap_or("default"));
        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                log::error!("S3 PUT failed - Bucket: {bucket}, Key: {key}, Error: {e:?}");
                StorageError::Backend(e.to_string())
            })?;
        log::debug!("stored {size} bytes at {bucket}/{key}");
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject, StorageError> {
        let output = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(output) => output,
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    return Err(StorageError::NotFound);
                }
                log::error!("S3 GET failed - Bucket: {bucket}, Key: {key}, Error: {service_error:?}");
                return Err(StorageError::Backend(service_error.to_string()));
            }
        };

        let content_type = output.content_type().map(str::to_owned);
        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Backend(format!("failed to collect body: {e}")))?
            .into_bytes();

        Ok(StoredObject { body, content_type })
    }
}

/// In-process bucket map for tests and local runs.
#[derive(Default)]
pub struct MemoryObjectStorage {
    objects: RwLock<HashMap<(String, String), StoredObject>>,
}

impl MemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let mut objects = self
            .objects
            .write()
            .map_err(|_| StorageError::Backend("lock poisoned".into()))?;
        objects.insert(
            (bucket.to_owned(), key.to_owned()),
            StoredObject {
                body,
                content_type: Some(content_type.to_owned()),
            },
        );
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject, StorageError> {
        let objects = self
            .objects
            .read()
            .map_err(|_| StorageError::Backend("lock poisoned".into()))?;
        objects
            .get(&(bucket.to_owned(), key.to_owned()))
            .cloned()
            .ok_or(StorageError::NotFound)
    }
}
