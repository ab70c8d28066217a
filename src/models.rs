//! Data models and structures
//!
//! Defines the transient workflow entities, the request/response shapes of
//! the Appwrite and Bitly APIs, and environment configuration.

use crate::display::mime_for;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// An image picked by the user, held entirely in memory.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl SelectedFile {
    /// Build a selection from raw bytes, rejecting empty and non-image data.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let name = name.into();
        if bytes.is_empty() {
            return Err(Error::Validation(format!("File '{}' is empty", name)));
        }
        let mime_type = mime_for(&bytes)
            .ok_or_else(|| Error::Validation(format!("File '{}' is not an image", name)))?;

        Ok(Self {
            name,
            bytes,
            mime_type: mime_type.to_string(),
        })
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("image")
            .to_string();
        Self::new(name, bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Outcome of the simulated compression step. The preview is the original
/// bytes; only the reported size changes.
#[derive(Debug, Clone)]
pub struct CompressionResult {
    pub original_size: usize,
    pub simulated_size: f64,
    pub preview: Vec<u8>,
}

impl CompressionResult {
    pub fn simulate(file: &SelectedFile, ratio: f64) -> Self {
        Self {
            original_size: file.len(),
            simulated_size: simulated_size(file.len(), ratio),
            preview: file.bytes.clone(),
        }
    }
}

/// `max(original * ratio, 1)`.
pub fn simulated_size(original: usize, ratio: f64) -> f64 {
    (original as f64 * ratio).max(1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub id: String,
    pub container_id: String,
    pub view_url: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortenedLink {
    pub url: String,
    pub shortened: bool,
}

impl ShortenedLink {
    pub fn short(url: String) -> Self {
        Self {
            url,
            shortened: true,
        }
    }

    pub fn fallback(original: String) -> Self {
        Self {
            url: original,
            shortened: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    Login,
    Signup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub email: String,
    pub authenticated: bool,
}

// Appwrite API Request/Response models
#[derive(Debug, Deserialize)]
pub struct AppwriteFile {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "bucketId", default)]
    pub bucket_id: Option<String>,
    #[serde(rename = "sizeOriginal", default)]
    pub size_original: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct AppwriteErrorResponse {
    pub message: String,
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateAccountRequest<'a> {
    #[serde(rename = "userId")]
    pub user_id: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

// Bitly API Request/Response models
#[derive(Debug, Serialize)]
pub struct ShortenRequest<'a> {
    pub long_url: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ShortenResponse {
    pub link: String,
    #[serde(default)]
    pub id: Option<String>,
}

// Configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Appwrite,
    S3,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub appwrite_endpoint: String,
    pub appwrite_project_id: String,
    pub appwrite_bucket_id: String,
    pub appwrite_api_key: Option<String>,
    pub storage_backend: StorageBackend,
    pub s3_access_key_id: Option<String>,
    pub s3_secret_access_key: Option<String>,
    pub s3_endpoint: Option<String>,
    pub s3_public_base_url: Option<String>,
    pub s3_region: String,
    pub bitly_access_token: Option<String>,
    pub bitly_base_url: String,
    pub compression_ratio: f64,
    pub compression_delay: Duration,
    pub confirmation_duration: Duration,
    pub http_timeout: Duration,
    pub dry_run: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        accept_missing_env_file(dotenvy::dotenv())?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required =
            |key: &str| get(key).ok_or_else(|| Error::Config(format!("{} not set", key)));

        let dry_run = get("DRY_RUN")
            .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let storage_backend = match get("STORAGE_BACKEND").as_deref() {
            None | Some("appwrite") => StorageBackend::Appwrite,
            Some("s3") => StorageBackend::S3,
            Some(other) => {
                return Err(Error::Config(format!(
                    "STORAGE_BACKEND must be 'appwrite' or 's3', got '{}'",
                    other
                )))
            }
        };

        let compression_ratio = parse_or(&get, "COMPRESSION_RATIO", 0.5_f64)?;
        if !(compression_ratio > 0.0 && compression_ratio <= 1.0) {
            return Err(Error::Config(format!(
                "COMPRESSION_RATIO must be in (0, 1], got {}",
                compression_ratio
            )));
        }

        let config = Self {
            appwrite_endpoint: required("APPWRITE_ENDPOINT")?
                .trim_end_matches('/')
                .to_string(),
            appwrite_project_id: required("APPWRITE_PROJECT_ID")?,
            appwrite_bucket_id: required("APPWRITE_BUCKET_ID")?,
            appwrite_api_key: get("APPWRITE_API_KEY"),
            storage_backend,
            s3_access_key_id: get("S3_ACCESS_KEY_ID"),
            s3_secret_access_key: get("S3_SECRET_ACCESS_KEY"),
            s3_endpoint: get("S3_ENDPOINT"),
            s3_public_base_url: get("S3_PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            s3_region: get("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            bitly_access_token: get("BITLY_ACCESS_TOKEN"),
            bitly_base_url: get("BITLY_BASE_URL")
                .unwrap_or_else(|| "https://api-ssl.bitly.com".to_string()),
            compression_ratio,
            compression_delay: Duration::from_millis(parse_or(
                &get,
                "COMPRESSION_DELAY_MS",
                2000_u64,
            )?),
            confirmation_duration: Duration::from_millis(parse_or(
                &get,
                "CONFIRMATION_MS",
                3000_u64,
            )?),
            http_timeout: Duration::from_secs(parse_or(&get, "HTTP_TIMEOUT_SECS", 30_u64)?),
            dry_run,
        };

        if config.storage_backend == StorageBackend::S3 && !config.dry_run {
            for (key, value) in [
                ("S3_ACCESS_KEY_ID", &config.s3_access_key_id),
                ("S3_SECRET_ACCESS_KEY", &config.s3_secret_access_key),
                ("S3_ENDPOINT", &config.s3_endpoint),
                ("S3_PUBLIC_BASE_URL", &config.s3_public_base_url),
            ] {
                if value.is_none() {
                    return Err(Error::Config(format!(
                        "{} is required when STORAGE_BACKEND=s3",
                        key
                    )));
                }
            }
        }

        Ok(config)
    }
}

/// A missing `.env` is fine; an unreadable or malformed one is not.
fn accept_missing_env_file<T>(result: dotenvy::Result<T>) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has an invalid value '{}'", key, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("APPWRITE_ENDPOINT", "https://cloud.appwrite.io/v1/"),
            ("APPWRITE_PROJECT_ID", "project"),
            ("APPWRITE_BUCKET_ID", "bucket"),
        ])
    }

    fn config_from(env: &HashMap<&str, &str>) -> Result<Config> {
        Config::from_lookup(|key| env.get(key).map(|value| value.to_string()))
    }

    #[test]
    fn test_selected_file_detects_png() {
        let file = SelectedFile::new("photo.png", PNG_MAGIC.to_vec()).unwrap();
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.len(), 8);
    }

    #[test]
    fn test_selected_file_rejects_non_image() {
        let err = SelectedFile::new("notes.txt", b"hello world".to_vec()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("not an image"));
    }

    #[test]
    fn test_selected_file_rejects_empty() {
        let err = SelectedFile::new("empty.png", Vec::new()).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_simulated_size_halves_and_floors_at_one() {
        assert_eq!(simulated_size(2_000_000, 0.5), 1_000_000.0);
        assert_eq!(simulated_size(3, 0.5), 1.5);
        assert_eq!(simulated_size(1, 0.5), 1.0);
    }

    #[test]
    fn test_simulated_size_never_exceeds_original() {
        for n in [1_usize, 2, 3, 7, 1024, 999_999, 2_000_000] {
            let size = simulated_size(n, 0.5);
            assert_eq!(size, (n as f64 * 0.5).max(1.0));
            assert!(size <= n as f64);
        }
    }

    #[test]
    fn test_compression_preview_matches_original_bytes() {
        let file = SelectedFile::new("photo.png", PNG_MAGIC.to_vec()).unwrap();
        let result = CompressionResult::simulate(&file, 0.5);
        assert_eq!(result.preview, file.bytes);
        assert_eq!(result.original_size, 8);
        assert_eq!(result.simulated_size, 4.0);
    }

    #[test]
    fn test_appwrite_file_deserialization() {
        let file: AppwriteFile =
            serde_json::from_str(r#"{"$id":"abc123","bucketId":"bucket","sizeOriginal":42}"#)
                .unwrap();
        assert_eq!(file.id, "abc123");
        assert_eq!(file.bucket_id.as_deref(), Some("bucket"));
        assert_eq!(file.size_original, Some(42));
    }

    #[test]
    fn test_missing_env_file_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join(".env");
        assert!(accept_missing_env_file(dotenvy::from_path(&missing)).is_ok());
    }

    #[test]
    fn test_malformed_env_file_is_env_var_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "this line has no equals sign\n").unwrap();

        let err = accept_missing_env_file(dotenvy::from_path(&path)).unwrap_err();
        assert!(matches!(err, Error::EnvVar(_)));
    }

    #[test]
    fn test_config_defaults() {
        let config = config_from(&base_env()).unwrap();
        assert_eq!(config.appwrite_endpoint, "https://cloud.appwrite.io/v1");
        assert_eq!(config.storage_backend, StorageBackend::Appwrite);
        assert_eq!(config.compression_ratio, 0.5);
        assert_eq!(config.compression_delay, Duration::from_secs(2));
        assert_eq!(config.confirmation_duration, Duration::from_secs(3));
        assert_eq!(config.bitly_base_url, "https://api-ssl.bitly.com");
        assert!(config.bitly_access_token.is_none());
        assert!(!config.dry_run);
    }

    #[test]
    fn test_config_missing_required() {
        let mut env = base_env();
        env.remove("APPWRITE_BUCKET_ID");
        let err = config_from(&env).unwrap_err();
        assert!(err.to_string().contains("APPWRITE_BUCKET_ID"));
    }

    #[test]
    fn test_config_rejects_bad_ratio() {
        let mut env = base_env();
        env.insert("COMPRESSION_RATIO", "1.5");
        assert!(config_from(&env).is_err());

        env.insert("COMPRESSION_RATIO", "half");
        assert!(config_from(&env).is_err());
    }

    #[test]
    fn test_config_s3_requires_credentials() {
        let mut env = base_env();
        env.insert("STORAGE_BACKEND", "s3");
        let err = config_from(&env).unwrap_err();
        assert!(err.to_string().contains("S3_ACCESS_KEY_ID"));

        env.insert("DRY_RUN", "true");
        let config = config_from(&env).unwrap();
        assert_eq!(config.storage_backend, StorageBackend::S3);
        assert!(config.dry_run);
    }
}
