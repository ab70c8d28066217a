//! Image upload and link sharing
//!
//! Lets a user pick an image, optionally run a simulated compression step,
//! upload it to hosted object storage, shorten the resulting view URL, and
//! authenticate against a hosted identity service.

pub mod appwrite;
pub mod clipboard;
pub mod display;
pub mod error;
pub mod identity;
pub mod models;
pub mod shortener;
pub mod storage;
pub mod workflow;

pub use error::{Error, Result};
