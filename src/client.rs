use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::download::download_media;
use crate::errors::{check_response, Result};
use crate::models::{
    ApiLimits, MatchResult, MediaDownloadOptions, MediaKind, RawApiLimits, RawSearchResponse,
    SearchOptions, SearchResponse,
};
use crate::request::{build_limits_request, build_search_request, MediaSource, RequestDescriptor};
use crate::response::{map_api_limits, map_search_response};

const DEFAULT_BASE_URL: &str = "https://api.trace.moe";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const API_KEY_ENV: &str = "TRACE_MOE_API_KEY";

/// Builder for constructing a [`Client`] with custom configuration.
///
/// # Example
///
/// ```no_run
/// use tracemoe::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> tracemoe::Result<()> {
/// let client = ClientBuilder::new()
///     .api_key("your_api_key")
///     .timeout(Duration::from_secs(120))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
}

impl ClientBuilder {
    /// Create a new builder with default settings and no API key.
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Like [`new`](Self::new), with the key taken from `TRACE_MOE_API_KEY`
    /// when that variable is set.
    pub fn from_env() -> Self {
        let mut builder = Self::new();
        builder.api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        builder
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the API host (defaults to `https://api.trace.moe`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the HTTP request timeout (defaults to 60 seconds).
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = d;
        self
    }

    /// Build the [`Client`].
    ///
    /// Fails with [`TraceMoeError::InvalidUrl`](crate::TraceMoeError::InvalidUrl)
    /// if the base URL does not parse.
    pub fn build(self) -> Result<Client> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)?;

        let http = reqwest::Client::builder().timeout(self.timeout).build()?;

        Ok(Client {
            base_url,
            api_key: self.api_key,
            http,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The trace.moe API client.
///
/// The API key is optional and can be changed at any time; each request
/// reads the current value.
///
/// # Example
///
/// ```no_run
/// use tracemoe::Client;
///
/// # async fn example() -> tracemoe::Result<()> {
/// let client = Client::new();
///
/// let response = client
///     .search_by_url("https://images.plurk.com/32B15UXxymfSMwKGTObY5e.jpg", None)
///     .await?;
/// if let Some(best) = response.results.first() {
///     println!("AniList {} at {:.1}s ({:.1}%)", best.anilist_id(), best.from, best.similarity * 100.0);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    base_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl Client {
    /// Create an anonymous client with default settings.
    ///
    /// For customization, use [`ClientBuilder`] instead.
    pub fn new() -> Self {
        Self::with_http(None)
    }

    /// Create a client that authenticates with `api_key`.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self::with_http(Some(api_key.into()))
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    fn with_http(api_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            http,
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn set_api_key(&mut self, key: impl Into<String>) {
        self.api_key = Some(key.into());
    }

    /// Go back to anonymous requests.
    pub fn clear_api_key(&mut self) {
        self.api_key = None;
    }

    /// Search for the scene shown in the image or video at `url`.
    ///
    /// The server fetches the media itself, so it must be publicly reachable.
    pub async fn search_by_url(
        &self,
        url: &str,
        options: Option<SearchOptions>,
    ) -> Result<SearchResponse> {
        self.search(MediaSource::Url(url.to_string()), options.unwrap_or_default())
            .await
    }

    /// Upload a local image or video and search for its scene.
    ///
    /// # Errors
    ///
    /// - [`TraceMoeError::Io`](crate::TraceMoeError::Io) if the file cannot be read.
    pub async fn search_by_file(
        &self,
        path: impl AsRef<Path>,
        options: Option<SearchOptions>,
    ) -> Result<SearchResponse> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        self.search_by_bytes(bytes, options).await
    }

    /// Upload in-memory media and search for its scene.
    pub async fn search_by_bytes(
        &self,
        bytes: Vec<u8>,
        options: Option<SearchOptions>,
    ) -> Result<SearchResponse> {
        self.search(MediaSource::Bytes(bytes), options.unwrap_or_default())
            .await
    }

    /// Search quota for the current key, or for this address when anonymous.
    pub async fn fetch_quota(&self) -> Result<ApiLimits> {
        let key = self.api_key();
        let request = build_limits_request(&self.base_url, key)?;
        let raw: RawApiLimits = self.send_json(request).await?;
        Ok(map_api_limits(raw, key.is_some()))
    }

    /// Save the preview clip of `result` and return its absolute path.
    ///
    /// The target directory must already exist; an existing file is overwritten.
    pub async fn download_video(
        &self,
        result: &MatchResult,
        options: Option<MediaDownloadOptions>,
    ) -> Result<PathBuf> {
        let options = options.unwrap_or_default();
        download_media(&self.http, result, MediaKind::Video, &options).await
    }

    /// Save the preview frame of `result` and return its absolute path.
    ///
    /// [`MediaDownloadOptions::mute`] has no effect here.
    pub async fn download_image(
        &self,
        result: &MatchResult,
        options: Option<MediaDownloadOptions>,
    ) -> Result<PathBuf> {
        let options = options.unwrap_or_default();
        download_media(&self.http, result, MediaKind::Image, &options).await
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    async fn search(&self, source: MediaSource, options: SearchOptions) -> Result<SearchResponse> {
        let request = build_search_request(&self.base_url, self.api_key(), source, &options)?;
        let raw: RawSearchResponse = self.send_json(request).await?;
        Ok(map_search_response(raw, &options))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestDescriptor) -> Result<T> {
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    /// Execute a built request once. No retries.
    async fn send(&self, request: RequestDescriptor) -> Result<Response> {
        debug!(
            method = %request.method,
            path = request.url.path(),
            keyed = self.api_key.is_some(),
            "sending trace.moe request"
        );

        let mut builder = self
            .http
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        check_response(response).await
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TraceMoeError;

    #[test]
    fn builder_trims_trailing_slash() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8080/")
            .build()
            .unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
        assert!(client.api_key().is_none());
    }

    #[test]
    fn builder_rejects_bad_base_url() {
        let err = ClientBuilder::new().base_url("nope").build().err().unwrap();
        assert!(matches!(err, TraceMoeError::InvalidUrl(_)));
    }

    #[test]
    fn api_key_is_mutable() {
        let mut client = Client::new();
        assert_eq!(client.api_key(), None);

        client.set_api_key("first");
        assert_eq!(client.api_key(), Some("first"));
        client.set_api_key("second");
        assert_eq!(client.api_key(), Some("second"));
        client.clear_api_key();
        assert_eq!(client.api_key(), None);

        assert_eq!(Client::with_api_key("k").api_key(), Some("k"));
    }
}
