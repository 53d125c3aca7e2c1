use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::GatewayError;
use crate::models::{repositories_from_values, Repository, UserProfile};

/// Page size of the single repository request. Only the first page is read.
pub const REPOS_PER_PAGE: u32 = 100;

/// Read-only access to the two GitHub resources the dashboard needs.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn fetch_profile(&self, username: &str) -> Result<UserProfile, GatewayError>;

    async fn fetch_repositories(&self, username: &str) -> Result<Vec<Repository>, GatewayError>;
}

/// Decoded avatar image: RGBA8 pixels plus dimensions.
pub type AvatarPixels = (Vec<u8>, u32, u32);

/// GitHub REST client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_url: String,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            http: build_client(config)?,
            api_url: config.api_url.clone(),
        })
    }

    fn profile_url(&self, username: &str) -> String {
        format!("{}/users/{}", self.api_url, urlencoding::encode(username))
    }

    fn repositories_url(&self, username: &str) -> String {
        format!(
            "{}/users/{}/repos?per_page={REPOS_PER_PAGE}&sort=updated",
            self.api_url,
            urlencoding::encode(username)
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, username: &str) -> Result<T, GatewayError> {
        tracing::debug!(%url, "GET");
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, %status, "GitHub API returned an error status");
            return Err(GatewayError::from_status(status, username));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Transient(format!("failed to decode response: {e}")))
    }

    /// Downloads the avatar at `size` pixels square and decodes it to RGBA.
    /// Any failure just means no avatar is shown.
    pub async fn fetch_avatar(&self, url: &str, size: u32) -> Option<AvatarPixels> {
        if url.is_empty() {
            return None;
        }

        let sized_url = if url.contains('?') {
            format!("{url}&s={size}")
        } else {
            format!("{url}?s={size}")
        };

        let bytes = match self.http.get(&sized_url).send().await.and_then(|r| r.error_for_status()) {
            Ok(response) => response.bytes().await.ok()?,
            Err(e) => {
                tracing::debug!(error = %e, "avatar download failed");
                return None;
            }
        };
        let image = image::load_from_memory(&bytes).ok()?;

        // GitHub sometimes serves a cached avatar larger than requested.
        let rgba = image.thumbnail_exact(size, size).to_rgba8();
        let (w, h) = rgba.dimensions();
        Some((rgba.into_raw(), w, h))
    }
}

#[async_trait]
impl Gateway for GitHubClient {
    async fn fetch_profile(&self, username: &str) -> Result<UserProfile, GatewayError> {
        let username = normalize_username(username)?;
        self.get_json(&self.profile_url(username), username).await
    }

    async fn fetch_repositories(&self, username: &str) -> Result<Vec<Repository>, GatewayError> {
        let username = normalize_username(username)?;
        let values: Vec<serde_json::Value> = self.get_json(&self.repositories_url(username), username).await?;
        Ok(repositories_from_values(values))
    }
}

/// Trims the username and rejects an empty one before any request is made.
pub fn normalize_username(username: &str) -> Result<&str, GatewayError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        Err(GatewayError::InvalidUsername)
    } else {
        Ok(trimmed)
    }
}

/// Creates a preconfigured HTTP client with required headers.
fn build_client(config: &Config) -> Result<Client> {
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("github-dashboard"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));

    if let Some(token) = config.token.as_deref() {
        let mut val = HeaderValue::from_str(&format!("Bearer {token}")).context("Invalid token value")?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
    }

    Client::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .build()
        .context("Failed to build HTTP client")
}
