//! Link shortening for uploaded image URLs
//!
//! Wraps the Bitly API. Failures here are never fatal to an upload; the
//! workflow falls back to the long URL.

pub mod bitly;
pub mod mock;

pub use bitly::BitlyClient;
pub use mock::MockShortenerClient;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ShortenerService: Send + Sync {
    async fn shorten(&self, long_url: &str) -> Result<String>;
}
