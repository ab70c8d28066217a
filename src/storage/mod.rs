//! Object storage integration for uploaded images
//!
//! Uploads the selected file into a container (Appwrite bucket or an
//! S3-compatible bucket) and derives the URL the stored object is viewed at.

pub mod appwrite;
pub mod mock;
pub mod s3;

pub use appwrite::AppwriteStorageClient;
pub use mock::MockStorageClient;
pub use s3::S3StorageClient;

use crate::models::SelectedFile;
use crate::Result;
use async_trait::async_trait;

/// Identifier the storage service assigned to a created object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub id: String,
}

#[async_trait]
pub trait StorageService: Send + Sync {
    async fn create_object(
        &self,
        container_id: &str,
        object_id: &str,
        file: &SelectedFile,
    ) -> Result<StoredObject>;

    fn view_url(&self, container_id: &str, id: &str) -> String;
}
