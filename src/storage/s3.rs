use super::{StorageService, StoredObject};
use crate::models::SelectedFile;
use crate::{Error, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{config::Region, types::ObjectCannedAcl, Client as S3Client};

/// S3-compatible backend: the container is the bucket, the object id the key.
pub struct S3StorageClient {
    client: S3Client,
    public_base_url: String,
}

impl S3StorageClient {
    pub async fn new(
        access_key_id: String,
        secret_access_key: String,
        endpoint: String,
        region: String,
        public_base_url: String,
    ) -> Result<Self> {
        let credentials = aws_sdk_s3::config::Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "imgshare",
        );

        let config = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(region))
            .endpoint_url(endpoint)
            .load()
            .await;

        Ok(Self {
            client: S3Client::new(&config),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    async fn create_object(
        &self,
        container_id: &str,
        object_id: &str,
        file: &SelectedFile,
    ) -> Result<StoredObject> {
        let body = ByteStream::from(file.bytes.clone());

        self.client
            .put_object()
            .bucket(container_id)
            .key(object_id)
            .body(body)
            .content_type(&file.mime_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| Error::Storage(format!("Failed to upload file: {}", e)))?;

        tracing::info!(
            "Stored {} ({} bytes) as {}/{}",
            file.name,
            file.len(),
            container_id,
            object_id
        );

        Ok(StoredObject {
            id: object_id.to_string(),
        })
    }

    fn view_url(&self, _container_id: &str, id: &str) -> String {
        format!("{}/{}", self.public_base_url, id)
    }
}
