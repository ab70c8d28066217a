use super::ShortenerService;
use crate::models::{ShortenRequest, ShortenResponse};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;

const DEFAULT_BASE_URL: &str = "https://api-ssl.bitly.com";

pub struct BitlyClient {
    client: Client,
    access_token: String,
    base_url: String,
}

impl BitlyClient {
    pub fn new_with_client(access_token: String, client: Client) -> Self {
        Self {
            client,
            access_token,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ShortenerService for BitlyClient {
    async fn shorten(&self, long_url: &str) -> Result<String> {
        let url = format!("{}/v4/shorten", self.base_url);
        tracing::debug!("Sending shorten request to Bitly");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&ShortenRequest { long_url })
            .send()
            .await
            .map_err(|e| Error::Shortener(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Shortener(format!(
                "Bitly API error (status {}): {}",
                status, error_text
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Shortener(format!("Failed to read response: {}", e)))?;
        let parsed: ShortenResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Shortener(format!("Failed to parse Bitly response: {}", e)))?;

        Ok(parsed.link)
    }
}
