use super::IdentityService;
use crate::appwrite::AppwriteHttpClient;
use crate::models::{CreateAccountRequest, CreateSessionRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

pub struct AppwriteIdentityClient {
    http: AppwriteHttpClient,
}

impl AppwriteIdentityClient {
    pub fn new_with_client(endpoint: String, project_id: String, client: Client) -> Self {
        Self {
            http: AppwriteHttpClient::new(endpoint, project_id, None, client),
        }
    }
}

#[async_trait]
impl IdentityService for AppwriteIdentityClient {
    async fn create_session(&self, email: &str, password: &str) -> Result<()> {
        let _: Value = self
            .http
            .post_json(
                "/account/sessions/email",
                &CreateSessionRequest { email, password },
                Error::Identity,
            )
            .await?;
        tracing::info!("Created session for {}", email);
        Ok(())
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<()> {
        let _: Value = self
            .http
            .post_json(
                "/account",
                &CreateAccountRequest {
                    user_id: "unique()",
                    email,
                    password,
                },
                Error::Identity,
            )
            .await?;
        tracing::info!("Created account for {}", email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AppwriteIdentityClient {
        AppwriteIdentityClient::new_with_client(
            format!("{}/v1", server.uri()),
            "proj".to_string(),
            Client::new(),
        )
    }

    #[tokio::test]
    async fn test_create_account_posts_unique_user_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/account"))
            .and(body_json(serde_json::json!({
                "userId": "unique()",
                "email": "user@example.com",
                "password": "hunter22"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "$id": "user1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .create_account("user@example.com", "hunter22")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_session_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/account/sessions/email"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "message": "Invalid credentials. Please check the email and password.",
                "code": 401
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_session("user@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Identity(_)));
    }
}
