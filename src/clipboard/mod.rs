//! Clipboard access for copying the result URL

pub mod mock;
pub mod system;

pub use mock::MockClipboard;
pub use system::SystemClipboard;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ClipboardService: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<()>;
}
