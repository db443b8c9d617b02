//! Object storage seam. Production talks to S3/MinIO; tests use a recorder.

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

/// Storage failures carry the backend's message so callers can show it as-is.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    Upload(String),

    #[error("{0}")]
    SignUrl(String),
}

/// Object store operations the application needs.
///
/// Carried in `AppState` as `Arc<dyn Storage>`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Stores `bytes` at `key`, replacing any existing object at that key.
    async fn upload(&self, key: &str, bytes: Bytes, content_type: &str)
        -> Result<(), StorageError>;

    /// Mints a time-limited GET URL for the object at `key`.
    async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<String, StorageError>;
}

/// S3-backed implementation. Works against MinIO locally and AWS in
/// production; the endpoint comes from config at client build time.
#[derive(Clone)]
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        // put_object overwrites in place, so one key holds at most one object
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        tracing::debug!("uploaded object at {key}");
        Ok(())
    }

    async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::SignUrl(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::SignUrl(e.to_string()))?;

        Ok(request.uri().to_string())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Records upload calls and hands out deterministic fake URLs.
    #[derive(Default)]
    pub struct MockStorage {
        pub uploads: Mutex<Vec<(String, String, usize)>>,
    }

    #[async_trait]
    impl Storage for MockStorage {
        async fn upload(
            &self,
            key: &str,
            bytes: Bytes,
            content_type: &str,
        ) -> Result<(), StorageError> {
            self.uploads
                .lock()
                .unwrap()
                .push((key.to_string(), content_type.to_string(), bytes.len()));
            Ok(())
        }

        async fn signed_url(
            &self,
            key: &str,
            expires_in: Duration,
        ) -> Result<String, StorageError> {
            Ok(format!("mock://{key}?expires={}", expires_in.as_secs()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockStorage;
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn upload_records_key_and_content_type() {
        let mock = Arc::new(MockStorage::default());
        let storage: Arc<dyn Storage> = mock.clone();
        storage
            .upload(
                "abc/resume.pdf",
                Bytes::from_static(b"%PDF-1.7"),
                "application/pdf",
            )
            .await
            .unwrap();

        let uploads = mock.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].0, "abc/resume.pdf");
        assert_eq!(uploads[0].1, "application/pdf");
        assert_eq!(uploads[0].2, 8);
    }

    #[tokio::test]
    async fn signed_url_embeds_key_and_ttl() {
        let storage = MockStorage::default();
        let url = storage
            .signed_url("abc/resume.pdf", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(url, "mock://abc/resume.pdf?expires=60");
    }
}
