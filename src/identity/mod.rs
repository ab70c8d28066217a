//! User authentication against the Appwrite account service

pub mod appwrite;
pub mod mock;

pub use appwrite::AppwriteIdentityClient;
pub use mock::MockIdentityClient;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn create_session(&self, email: &str, password: &str) -> Result<()>;
    async fn create_account(&self, email: &str, password: &str) -> Result<()>;
}
