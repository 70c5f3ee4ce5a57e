//! HTTP submission to the scoring platform
//!
//! Authentication is a basic-auth POST that returns a bearer token; the
//! token is cached and reused for every submission until invalidated.
//! There is no retry or backoff here: failures surface as typed errors and
//! the caller decides what to do with them.

use std::path::Path;
use std::time::Duration;

use reqwest::{multipart, Client, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use sigpost_core::Signal;

/// The authentication endpoint, relative to the base URL.
pub const AUTH_ENDPOINT: &str = "/api/v3/auth";

/// The single-signal submission endpoint.
pub const SIGNALS_ENDPOINT: &str = "/api/v3/signals";

/// The zip-bundle submission endpoint.
pub const ZIP_SIGNALS_ENDPOINT: &str = "/api/v3/signals/zip";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the scoring platform.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the platform, without a trailing slash.
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(base_url: &str, username: &str, password: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Errors from talking to the platform.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("authentication failed with status {0}")]
    Auth(StatusCode),

    #[error("platform rejected the request with status {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Signal(#[from] sigpost_core::SignalError),

    #[error("signal directory {0} does not exist")]
    MissingDirectory(std::path::PathBuf),

    #[error("no .json or .zip files found in {0}")]
    EmptyDirectory(std::path::PathBuf),
}

/// Response to the auth endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub expires_in: Option<String>,
}

/// Response to a signal or zip submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalResponse {
    /// The platform answers "true" or "false" as a string.
    pub success: String,

    #[serde(default)]
    pub message: String,

    /// Set when the platform asks the submitter to come back later.
    #[serde(default)]
    pub retry_in: Option<String>,
}

impl SignalResponse {
    pub fn is_success(&self) -> bool {
        self.success.eq_ignore_ascii_case("true")
    }
}

/// Connection to the scoring platform with a cached bearer token.
pub struct Communication {
    config: ClientConfig,
    http: Client,
    access_token: RwLock<Option<String>>,
}

impl Communication {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::ClientBuild(e.to_string()))?;

        Ok(Self {
            config,
            http,
            access_token: RwLock::new(None),
        })
    }

    /// The cached bearer token, fetching one via basic auth on first use.
    pub async fn access_token(&self) -> Result<String, ClientError> {
        {
            let cached = self.access_token.read().await;
            if let Some(token) = cached.as_ref() {
                return Ok(token.clone());
            }
        }

        let url = format!("{}{}", self.config.base_url, AUTH_ENDPOINT);
        debug!(%url, "fetching access token");
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Auth(response.status()));
        }

        let auth: AuthResponse = response.json().await?;
        *self.access_token.write().await = Some(auth.access_token.clone());
        Ok(auth.access_token)
    }

    /// Drop the cached token so the next call authenticates again.
    pub async fn invalidate_token(&self) {
        *self.access_token.write().await = None;
    }

    /// POST one signal as JSON.
    pub async fn submit_signal(&self, signal: &Signal) -> Result<SignalResponse, ClientError> {
        let token = self.access_token().await?;
        let url = format!("{}{}", self.config.base_url, SIGNALS_ENDPOINT);
        debug!(id = %signal.id, "submitting signal");

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(signal)
            .send()
            .await?;

        Self::read_response(response).await
    }

    /// POST a zip bundle of signals as multipart form data.
    pub async fn submit_zip(&self, path: &Path) -> Result<SignalResponse, ClientError> {
        let token = self.access_token().await?;
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("signals.zip")
            .to_string();

        let form = multipart::Form::new()
            .part("file", multipart::Part::bytes(bytes).file_name(file_name));
        let url = format!("{}{}", self.config.base_url, ZIP_SIGNALS_ENDPOINT);
        debug!(path = %path.display(), "submitting zip bundle");

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;

        Self::read_response(response).await
    }

    async fn read_response(response: Response) -> Result<SignalResponse, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, message });
        }
        Ok(response.json().await?)
    }
}
