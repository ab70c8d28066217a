//! Upload workflow controller.
//!
//! Drives one image through selection, simulated compression, upload and
//! link shortening. Every stage is an awaited operation whose outcome is
//! routed back into [`WorkflowState`]; the controller is the single source
//! of truth for what the user sees.

use crate::clipboard::{ClipboardService, MockClipboard, SystemClipboard};
use crate::display::{format_kb, mime_for, truncate_url};
use crate::identity::{AppwriteIdentityClient, IdentityService, MockIdentityClient};
use crate::models::{
    AuthMode, AuthSession, CompressionResult, Config, SelectedFile, ShortenedLink, StorageBackend,
    UploadRecord,
};
use crate::shortener::{BitlyClient, MockShortenerClient, ShortenerService};
use crate::storage::{AppwriteStorageClient, MockStorageClient, S3StorageClient, StorageService};
use crate::{Error, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

/// File name used when saving the compressed preview to disk.
pub const COMPRESSED_FILE_NAME: &str = "compressed_image.jpg";

const AUTH_FAILED: &str = "Authentication failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    FileSelected,
    Compressing,
    Uploading,
    Uploaded,
    Shortening,
    Ready,
    Error(String),
}

impl WorkflowState {
    /// True while an asynchronous stage is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            WorkflowState::Compressing | WorkflowState::Uploading | WorkflowState::Shortening
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Ready | WorkflowState::Error(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthPrompt {
    pub open: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
struct Notice {
    message: String,
    expires_at: Instant,
}

/// Tunables for a workflow run.
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub container_id: String,
    pub compression_ratio: f64,
    pub compression_delay: Duration,
    pub confirmation_duration: Duration,
    pub auto_shorten: bool,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            container_id: "images".to_string(),
            compression_ratio: 0.5,
            compression_delay: Duration::from_secs(2),
            confirmation_duration: Duration::from_secs(3),
            auto_shorten: true,
        }
    }
}

impl WorkflowSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            container_id: config.appwrite_bucket_id.clone(),
            compression_ratio: config.compression_ratio,
            compression_delay: config.compression_delay,
            confirmation_duration: config.confirmation_duration,
            auto_shorten: true,
        }
    }
}

/// Injectable adapter bundle used to construct [`UploadWorkflow`].
pub struct WorkflowServices {
    pub storage: Box<dyn StorageService>,
    /// `None` disables shortening; the view URL is used as-is.
    pub shortener: Option<Box<dyn ShortenerService>>,
    pub identity: Box<dyn IdentityService>,
    pub clipboard: Box<dyn ClipboardService>,
}

pub struct UploadWorkflow {
    storage: Box<dyn StorageService>,
    shortener: Option<Box<dyn ShortenerService>>,
    identity: Box<dyn IdentityService>,
    clipboard: Box<dyn ClipboardService>,
    settings: WorkflowSettings,
    state: WorkflowState,
    history: Vec<WorkflowState>,
    file: Option<SelectedFile>,
    compression: Option<CompressionResult>,
    upload: Option<UploadRecord>,
    link: Option<ShortenedLink>,
    session: Option<AuthSession>,
    auth_prompt: AuthPrompt,
    notice: Option<Notice>,
    status: String,
}

impl UploadWorkflow {
    /// Build a workflow from concrete service dependencies.
    pub fn with_services(services: WorkflowServices, settings: WorkflowSettings) -> Self {
        Self {
            storage: services.storage,
            shortener: services.shortener,
            identity: services.identity,
            clipboard: services.clipboard,
            settings,
            state: WorkflowState::Idle,
            history: vec![WorkflowState::Idle],
            file: None,
            compression: None,
            upload: None,
            link: None,
            session: None,
            auth_prompt: AuthPrompt::default(),
            notice: None,
            status: String::new(),
        }
    }

    /// Construct a workflow wired to the hosted services described by `config`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let settings = WorkflowSettings::from_config(config);

        if config.dry_run {
            info!("DRY_RUN enabled, network services replaced with in-memory mocks");
            return Ok(Self::with_services(
                WorkflowServices {
                    storage: Box::new(
                        MockStorageClient::new().with_base_url(config.appwrite_endpoint.clone()),
                    ),
                    shortener: config
                        .bitly_access_token
                        .as_ref()
                        .map(|_| Box::new(MockShortenerClient::new()) as Box<dyn ShortenerService>),
                    identity: Box::new(MockIdentityClient::new()),
                    clipboard: Box::new(MockClipboard::new()),
                },
                settings,
            ));
        }

        // Reuse one HTTP connection pool across adapters.
        let http_client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        let storage: Box<dyn StorageService> = match config.storage_backend {
            StorageBackend::Appwrite => {
                info!("Storage backend: Appwrite ({})", config.appwrite_endpoint);
                Box::new(AppwriteStorageClient::new_with_client(
                    config.appwrite_endpoint.clone(),
                    config.appwrite_project_id.clone(),
                    config.appwrite_api_key.clone(),
                    http_client.clone(),
                ))
            }
            StorageBackend::S3 => {
                let require = |value: &Option<String>, key: &str| {
                    value
                        .clone()
                        .ok_or_else(|| Error::Config(format!("{} not set", key)))
                };
                info!("Storage backend: S3-compatible");
                Box::new(
                    S3StorageClient::new(
                        require(&config.s3_access_key_id, "S3_ACCESS_KEY_ID")?,
                        require(&config.s3_secret_access_key, "S3_SECRET_ACCESS_KEY")?,
                        require(&config.s3_endpoint, "S3_ENDPOINT")?,
                        config.s3_region.clone(),
                        require(&config.s3_public_base_url, "S3_PUBLIC_BASE_URL")?,
                    )
                    .await?,
                )
            }
        };

        let shortener = match &config.bitly_access_token {
            Some(token) => Some(Box::new(
                BitlyClient::new_with_client(token.clone(), http_client.clone())
                    .with_base_url(config.bitly_base_url.clone()),
            ) as Box<dyn ShortenerService>),
            None => {
                info!("BITLY_ACCESS_TOKEN not set, links will not be shortened");
                None
            }
        };

        let identity = Box::new(AppwriteIdentityClient::new_with_client(
            config.appwrite_endpoint.clone(),
            config.appwrite_project_id.clone(),
            http_client,
        ));

        Ok(Self::with_services(
            WorkflowServices {
                storage,
                shortener,
                identity,
                clipboard: Box::new(SystemClipboard::new()),
            },
            settings,
        ))
    }

    pub fn settings_mut(&mut self) -> &mut WorkflowSettings {
        &mut self.settings
    }

    fn transition(&mut self, next: WorkflowState) {
        info!("Workflow: {:?} -> {:?}", self.state, next);
        self.history.push(next.clone());
        self.state = next;
    }

    /// Select a file, resetting any previous run.
    pub fn select_file(&mut self, file: SelectedFile) -> Result<()> {
        if file.is_empty() || mime_for(&file.bytes).is_none() {
            return Err(Error::Validation(format!(
                "File '{}' is not an image",
                file.name
            )));
        }

        info!("Selected {} ({} bytes, {})", file.name, file.len(), file.mime_type);
        self.file = Some(file);
        self.compression = None;
        self.upload = None;
        self.link = None;
        self.notice = None;
        self.status = "Image selected. Ready to compress!".to_string();
        self.transition(WorkflowState::FileSelected);
        Ok(())
    }

    /// Read and select an image from disk. Leaves state untouched on failure.
    pub async fn select_path(&mut self, path: &Path) -> Result<()> {
        let file = SelectedFile::from_path(path).await?;
        self.select_file(file)
    }

    /// Placeholder compression: waits the configured delay and reports
    /// `max(size * ratio, 1)` bytes. The preview is the original bytes.
    pub async fn simulate_compress(&mut self) -> Result<&CompressionResult> {
        let result = match &self.file {
            Some(file) => CompressionResult::simulate(file, self.settings.compression_ratio),
            None => return Err(Error::Validation("Please select an image to compress".to_string())),
        };

        self.upload = None;
        self.link = None;
        self.status = "Compressing image...".to_string();
        self.transition(WorkflowState::Compressing);

        tokio::time::sleep(self.settings.compression_delay).await;

        info!(
            "Simulated compression: {} -> {}",
            format_kb(result.original_size as f64),
            format_kb(result.simulated_size)
        );
        self.status = "Image compressed successfully!".to_string();
        self.transition(WorkflowState::FileSelected);
        Ok(self.compression.insert(result))
    }

    /// Upload the selected file, then shorten the view URL when enabled.
    pub async fn upload(&mut self) -> Result<()> {
        let Some(file) = self.file.take() else {
            self.status = "Please select an image to upload".to_string();
            return Err(Error::Validation(self.status.clone()));
        };

        self.upload = None;
        self.link = None;
        self.notice = None;
        self.transition(WorkflowState::Uploading);

        let object_id = Uuid::new_v4().simple().to_string();
        let outcome = self
            .storage
            .create_object(&self.settings.container_id, &object_id, &file)
            .await;
        self.file = Some(file);

        let stored = match outcome {
            Ok(stored) => stored,
            Err(e) => {
                let message = e.to_string();
                error!("Upload failed: {}", message);
                self.status = format!("Error during upload: {}", message);
                self.transition(WorkflowState::Error(message));
                return Err(e);
            }
        };

        let view_url = self.storage.view_url(&self.settings.container_id, &stored.id);
        self.status = format!("Upload successful! Image ID: {}", stored.id);
        self.upload = Some(UploadRecord {
            id: stored.id,
            container_id: self.settings.container_id.clone(),
            view_url: view_url.clone(),
            uploaded_at: Utc::now(),
        });
        self.transition(WorkflowState::Uploaded);

        if self.settings.auto_shorten {
            self.finish_with_link(view_url).await;
        }
        Ok(())
    }

    /// Shorten `url`; any shortener failure falls back to `url` itself.
    pub async fn shorten(&mut self, url: &str) -> Result<&ShortenedLink> {
        if self.upload.is_none() {
            return Err(Error::Validation("Nothing has been uploaded yet".to_string()));
        }
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| Error::Validation(format!("Invalid URL '{}': {}", url, e)))?;
        if !parsed.has_host() {
            return Err(Error::Validation(format!("Invalid URL '{}'", url)));
        }

        Ok(self.finish_with_link(url.to_string()).await)
    }

    async fn finish_with_link(&mut self, url: String) -> &ShortenedLink {
        let link = match self.shortener.take() {
            Some(shortener) => {
                self.transition(WorkflowState::Shortening);
                let outcome = shortener.shorten(&url).await;
                self.shortener = Some(shortener);
                match outcome {
                    Ok(short) => {
                        info!("Shortened {} to {}", url, short);
                        ShortenedLink::short(short)
                    }
                    Err(e) => {
                        warn!("Error shortening URL, using original: {}", e);
                        ShortenedLink::fallback(url)
                    }
                }
            }
            None => ShortenedLink::fallback(url),
        };

        self.status = "Image uploaded successfully!".to_string();
        self.transition(WorkflowState::Ready);
        self.link.insert(link)
    }

    /// Copy the result URL and show a confirmation that dismisses itself.
    pub async fn copy_result_url(&mut self) -> Result<()> {
        let url = self
            .result_url()
            .ok_or_else(|| Error::Validation("No URL to copy".to_string()))?
            .to_string();

        match self.clipboard.write_text(&url).await {
            Ok(()) => {
                info!("Copied {} to clipboard", url);
                self.notice = Some(Notice {
                    message: "URL copied to clipboard!".to_string(),
                    expires_at: Instant::now() + self.settings.confirmation_duration,
                });
                Ok(())
            }
            Err(e) => {
                error!("Failed to copy URL: {}", e);
                Err(e)
            }
        }
    }

    pub fn confirmation_visible(&self) -> bool {
        self.confirmation_message().is_some()
    }

    pub fn confirmation_message(&self) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|notice| Instant::now() < notice.expires_at)
            .map(|notice| notice.message.as_str())
    }

    pub fn open_auth_prompt(&mut self) {
        self.auth_prompt = AuthPrompt {
            open: true,
            error: None,
        };
    }

    pub fn close_auth_prompt(&mut self) {
        self.auth_prompt = AuthPrompt::default();
    }

    /// Log in, or sign up and then log in. The password is not retained.
    pub async fn authenticate(&mut self, mode: AuthMode, email: &str, password: &str) -> Result<()> {
        self.auth_prompt.open = true;

        if email.trim().is_empty() || password.is_empty() {
            self.auth_prompt.error = Some("Email and password are required".to_string());
            return Err(Error::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let outcome = match mode {
            AuthMode::Signup => match self.identity.create_account(email, password).await {
                Ok(()) => self.identity.create_session(email, password).await,
                Err(e) => Err(e),
            },
            AuthMode::Login => self.identity.create_session(email, password).await,
        };

        match outcome {
            Ok(()) => {
                info!("Authenticated {} ({:?})", email, mode);
                self.session = Some(AuthSession {
                    email: email.to_string(),
                    authenticated: true,
                });
                self.close_auth_prompt();
                Ok(())
            }
            Err(e) => {
                error!("Authentication error ({:?}): {}", mode, e);
                self.auth_prompt.error = Some(AUTH_FAILED.to_string());
                Err(Error::Identity(AUTH_FAILED.to_string()))
            }
        }
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            info!("Logged out {}", session.email);
        }
    }

    /// Write the compressed preview into `dir` under a fixed name.
    pub async fn download_compressed(&self, dir: &Path) -> Result<PathBuf> {
        let compression = self
            .compression
            .as_ref()
            .ok_or_else(|| Error::Validation("No compressed image to download".to_string()))?;

        let path = dir.join(COMPRESSED_FILE_NAME);
        tokio::fs::write(&path, &compression.preview).await?;
        info!("Saved compressed image to {}", path.display());
        Ok(path)
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    pub fn history(&self) -> &[WorkflowState] {
        &self.history
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn compression(&self) -> Option<&CompressionResult> {
        self.compression.as_ref()
    }

    pub fn upload_record(&self) -> Option<&UploadRecord> {
        self.upload.as_ref()
    }

    pub fn link(&self) -> Option<&ShortenedLink> {
        self.link.as_ref()
    }

    /// Shortened link when available, otherwise the view URL.
    pub fn result_url(&self) -> Option<&str> {
        self.link
            .as_ref()
            .map(|link| link.url.as_str())
            .or_else(|| self.upload.as_ref().map(|record| record.view_url.as_str()))
    }

    pub fn display_url(&self) -> String {
        self.result_url().map(truncate_url).unwrap_or_default()
    }

    /// Old and new sizes in KB once compression has run.
    pub fn size_summary(&self) -> Option<(String, String)> {
        self.compression.as_ref().map(|result| {
            (
                format_kb(result.original_size as f64),
                format_kb(result.simulated_size),
            )
        })
    }

    pub fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    pub fn auth_prompt(&self) -> &AuthPrompt {
        &self.auth_prompt
    }
}
