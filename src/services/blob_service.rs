use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde_json::json;
use thiserror::Error;

use crate::config::BlobConfig;

pub const SCREENSHOT_FOLDER: &str = "payment-screenshots";

const DEFAULT_EXTENSION: &str = "bin";

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("blob store rejected {path} with {status}: {body}")]
    Rejected {
        path: String,
        status: StatusCode,
        body: String,
    },

    #[error("screenshot file is empty")]
    Empty,
}

/// Remote file storage that hands back a public URL for each upload.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(
        &self,
        bytes: &[u8],
        file_name: &str,
        ticket_id: &str,
    ) -> Result<String, BlobError>;
}

/// Stores files in a GitHub repository through the contents API and serves
/// them from raw.githubusercontent.com.
#[derive(Debug, Clone)]
pub struct GithubBlobStore {
    client: reqwest::Client,
    config: BlobConfig,
}

impl GithubBlobStore {
    pub fn new(config: BlobConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {}", self.config.token)) {
            headers.insert(AUTHORIZATION, bearer);
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("diwali-night"));
        headers
    }

    fn repo_url(&self) -> String {
        format!(
            "{}/repos/{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.repo_owner,
            self.config.repo_name
        )
    }

    pub fn public_url(&self, path: &str) -> String {
        format!(
            "https://raw.githubusercontent.com/{}/{}/{}/{}",
            self.config.repo_owner, self.config.repo_name, self.config.branch, path
        )
    }

    /// Confirms the token can see the configured repository.
    pub async fn check_repository_access(&self) -> Result<(), BlobError> {
        let url = self.repo_url();
        let resp = self
            .client
            .get(&url)
            .headers(self.headers())
            .send()
            .await
            .map_err(|source| BlobError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BlobError::Rejected {
                path: url,
                status,
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for GithubBlobStore {
    async fn upload(
        &self,
        bytes: &[u8],
        file_name: &str,
        ticket_id: &str,
    ) -> Result<String, BlobError> {
        if bytes.is_empty() {
            return Err(BlobError::Empty);
        }

        let path = screenshot_path(ticket_id, file_name, Utc::now().timestamp_millis());
        let url = format!("{}/contents/{}", self.repo_url(), path);
        let resp = self
            .client
            .put(&url)
            .headers(self.headers())
            .json(&json!({
                "message": format!("Upload payment screenshot for ticket {}", ticket_id),
                "content": general_purpose::STANDARD.encode(bytes),
                "branch": self.config.branch,
            }))
            .send()
            .await
            .map_err(|source| BlobError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BlobError::Rejected { path, status, body });
        }

        Ok(self.public_url(&path))
    }
}

/// `payment-screenshots/<ticket>-<millis>.<ext>`
pub fn screenshot_path(ticket_id: &str, file_name: &str, epoch_millis: i64) -> String {
    format!(
        "{}/{}-{}.{}",
        SCREENSHOT_FOLDER,
        ticket_id,
        epoch_millis,
        file_extension(file_name)
    )
}

fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.bytes().all(|b| b.is_ascii_alphanumeric()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}
