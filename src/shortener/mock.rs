use super::ShortenerService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockShortenerClient {
    link: Option<String>,
    fail: bool,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockShortenerClient {
    pub fn new() -> Self {
        Self {
            link: None,
            fail: false,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_link(mut self, link: String) -> Self {
        self.link = Some(link);
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn get_requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockShortenerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShortenerService for MockShortenerClient {
    async fn shorten(&self, long_url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(long_url.to_string());

        if self.fail {
            return Err(Error::Shortener("Mock shortener unavailable".to_string()));
        }

        Ok(self
            .link
            .clone()
            .unwrap_or_else(|| format!("https://short.test/{}", self.requests.lock().unwrap().len())))
    }
}
