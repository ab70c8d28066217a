use super::{StorageService, StoredObject};
use crate::appwrite::AppwriteHttpClient;
use crate::models::{AppwriteFile, SelectedFile};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

pub struct AppwriteStorageClient {
    http: AppwriteHttpClient,
}

impl AppwriteStorageClient {
    pub fn new_with_client(
        endpoint: String,
        project_id: String,
        api_key: Option<String>,
        client: Client,
    ) -> Self {
        Self {
            http: AppwriteHttpClient::new(endpoint, project_id, api_key, client),
        }
    }
}

#[async_trait]
impl StorageService for AppwriteStorageClient {
    async fn create_object(
        &self,
        container_id: &str,
        object_id: &str,
        file: &SelectedFile,
    ) -> Result<StoredObject> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)?;
        let form = Form::new()
            .text("fileId", object_id.to_string())
            .part("file", part);

        let path = format!("/storage/buckets/{}/files", container_id);
        let created: AppwriteFile = self.http.post_multipart(&path, form, Error::Storage).await?;

        tracing::info!(
            "Stored {} ({} bytes) as {} in bucket {}",
            file.name,
            file.len(),
            created.id,
            container_id
        );

        Ok(StoredObject { id: created.id })
    }

    fn view_url(&self, container_id: &str, id: &str) -> String {
        format!(
            "{}/storage/buckets/{}/files/{}/view?project={}",
            self.http.endpoint, container_id, id, self.http.project_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn png_file() -> SelectedFile {
        SelectedFile::new(
            "photo.png",
            vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00],
        )
        .unwrap()
    }

    fn client_for(server: &MockServer) -> AppwriteStorageClient {
        AppwriteStorageClient::new_with_client(
            format!("{}/v1", server.uri()),
            "proj".to_string(),
            None,
            Client::new(),
        )
    }

    #[tokio::test]
    async fn test_create_object_returns_assigned_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/storage/buckets/images/files"))
            .and(header("X-Appwrite-Project", "proj"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "$id": "abc123",
                "bucketId": "images",
                "sizeOriginal": 9
            })))
            .expect(1)
            .mount(&server)
            .await;

        let stored = client_for(&server)
            .create_object("images", "abc123", &png_file())
            .await
            .unwrap();
        assert_eq!(stored.id, "abc123");
    }

    #[tokio::test]
    async fn test_create_object_surfaces_service_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/storage/buckets/images/files"))
            .respond_with(ResponseTemplate::new(413).set_body_json(serde_json::json!({
                "message": "File size not allowed",
                "code": 413
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_object("images", "id", &png_file())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert!(err.to_string().contains("File size not allowed"));
    }

    #[test]
    fn test_view_url_format() {
        let client = AppwriteStorageClient::new_with_client(
            "https://cloud.appwrite.io/v1".to_string(),
            "proj".to_string(),
            None,
            Client::new(),
        );
        assert_eq!(
            client.view_url("images", "abc123"),
            "https://cloud.appwrite.io/v1/storage/buckets/images/files/abc123/view?project=proj"
        );
    }
}
