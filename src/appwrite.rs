//! Shared HTTP plumbing for the Appwrite REST API, used by both the storage
//! and the identity adapters.

use crate::models::AppwriteErrorResponse;
use crate::{Error, Result};
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Maps a failure message into the error variant of the calling adapter.
pub type ErrorKind = fn(String) -> Error;

pub struct AppwriteHttpClient {
    pub(crate) client: Client,
    pub(crate) endpoint: String,
    pub(crate) project_id: String,
    api_key: Option<String>,
}

impl AppwriteHttpClient {
    pub fn new(
        endpoint: String,
        project_id: String,
        api_key: Option<String>,
        client: Client,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id,
            api_key,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.endpoint, path);
        let builder = self
            .client
            .request(method, url)
            .header("X-Appwrite-Project", &self.project_id);

        match &self.api_key {
            Some(key) => builder.header("X-Appwrite-Key", key),
            None => builder,
        }
    }

    pub async fn post_json<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        path: &str,
        body: &Req,
        kind: ErrorKind,
    ) -> Result<Resp> {
        tracing::debug!("POST {} (json)", path);
        let response = self
            .request(Method::POST, path)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Appwrite: {}", e);
                kind(format!("Request failed: {}", e))
            })?;

        Self::parse(response, kind).await
    }

    pub async fn post_multipart<Resp: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
        kind: ErrorKind,
    ) -> Result<Resp> {
        tracing::debug!("POST {} (multipart)", path);
        let response = self
            .request(Method::POST, path)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send upload to Appwrite: {}", e);
                kind(format!("Request failed: {}", e))
            })?;

        Self::parse(response, kind).await
    }

    async fn parse<Resp: DeserializeOwned>(response: Response, kind: ErrorKind) -> Result<Resp> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<AppwriteErrorResponse>(&body)
                .map(|err| err.message)
                .unwrap_or(body);
            tracing::error!("Appwrite API error (status {}): {}", status, message);
            return Err(kind(format!("{} (status {})", message, status)));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Appwrite response: {}\nBody: {}", e, body);
            kind(format!("Failed to parse Appwrite response: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_post_json_sends_project_and_key_headers() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/ping"))
            .and(header("X-Appwrite-Project", "proj"))
            .and(header("X-Appwrite-Key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let http = AppwriteHttpClient::new(
            format!("{}/v1/", server.uri()),
            "proj".to_string(),
            Some("secret".to_string()),
            Client::new(),
        );

        let body: Value = http
            .post_json("/ping", &serde_json::json!({}), Error::Storage)
            .await
            .unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_error_message_extracted_from_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/ping"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "message": "Invalid credentials",
                "code": 401,
                "type": "user_invalid_credentials"
            })))
            .mount(&server)
            .await;

        let http = AppwriteHttpClient::new(
            format!("{}/v1", server.uri()),
            "proj".to_string(),
            None,
            Client::new(),
        );

        let err = http
            .post_json::<_, Value>("/ping", &serde_json::json!({}), Error::Identity)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Identity(_)));
        assert!(err.to_string().contains("Invalid credentials"));
    }
}
