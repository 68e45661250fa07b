//! VirusTotal HTTP backend.
//!
//! This module provides the client that talks to the VirusTotal v3 API.
//!
//! # Requirements
//!
//! - VirusTotal API key
//! - Network access to www.virustotal.com
//!
//! # API Usage
//!
//! - `GET /files/{hash}` - file report
//! - `POST /files` - upload (below 32 MiB)
//! - `GET /files/upload_url` - upload URL for larger files
//!
//! The client sends each request once. It does not poll for analysis
//! completion, retry, or throttle; those are left to the caller.

use crate::core::{
    decode, ApiResponse, FileReport, FileUpload, HashKind, ResponseSchema, UploadReceipt,
    UploadUrl, VirusTotalApi, VtError,
};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Url};
use secrecy::{ExposeSecret, SecretString};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://www.virustotal.com/api/v3";

/// Exclusive size limit for `POST /files`.
pub const MAX_UPLOAD_SIZE: u64 = 32 * 1024 * 1024;

/// Exclusive size limit for uploads through a dedicated upload URL.
pub const MAX_LARGE_UPLOAD_SIZE: u64 = 650 * 1024 * 1024;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "VIRUSTOTAL_API_KEY";

/// Environment variable overriding the API root.
pub const BASE_URL_ENV: &str = "VIRUSTOTAL_BASE_URL";

const API_KEY_HEADER: &str = "x-apikey";

/// VirusTotal client configuration.
#[derive(Debug, Clone)]
pub struct VirusTotalConfig {
    /// API key (kept secret).
    pub api_key: SecretString,

    /// Base URL for the API.
    pub base_url: String,

    /// Uploads must be strictly smaller than this (bytes).
    pub max_file_size: u64,

    /// Limit for uploads through an upload URL (bytes).
    pub max_large_file_size: u64,

    /// `User-Agent` sent with every request.
    pub user_agent: String,
}

impl VirusTotalConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_file_size: MAX_UPLOAD_SIZE,
            max_large_file_size: MAX_LARGE_UPLOAD_SIZE,
            user_agent: concat!("vtbridge/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Reads `VIRUSTOTAL_API_KEY` and, if set, `VIRUSTOTAL_BASE_URL`.
    pub fn from_env() -> Result<Self, VtError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, VtError> {
        let api_key = lookup(API_KEY_ENV)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| VtError::configuration(format!("{} is not set", API_KEY_ENV)))?;

        let mut config = Self::new(api_key);
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|url| !url.trim().is_empty()) {
            config = config.with_base_url(base_url.trim());
        }
        Ok(config)
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the standard upload limit.
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Sets the large upload limit.
    pub fn with_max_large_file_size(mut self, size: u64) -> Self {
        self.max_large_file_size = size;
        self
    }

    /// Sets the `User-Agent`.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// VirusTotal API client.
///
/// Cloning is cheap; clones share the connection pool.
///
/// # Example
///
/// ```rust,no_run
/// use vtbridge::backends::VirusTotalClient;
///
/// # async fn run() -> Result<(), vtbridge::VtError> {
/// let client = VirusTotalClient::from_env()?;
/// let report = client.file_report("d41d8cd98f00b204e9800998ecf8427e").await?;
/// if let Some(report) = report.success() {
///     println!("{} engines flagged it", report.attributes().last_analysis_stats.detections());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct VirusTotalClient {
    config: VirusTotalConfig,
    base_url: Url,
    client: reqwest::Client,
}

impl VirusTotalClient {
    /// Creates a client with its own HTTP connection pool.
    pub fn new(config: VirusTotalConfig) -> Result<Self, VtError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| VtError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Self::with_http_client(config, client)
    }

    /// Creates a client on top of an existing `reqwest::Client`.
    ///
    /// Use this to apply timeouts, proxies or TLS settings; the client itself
    /// sets none.
    pub fn with_http_client(
        config: VirusTotalConfig,
        client: reqwest::Client,
    ) -> Result<Self, VtError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            VtError::configuration(format!("invalid base URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(VtError::configuration(format!(
                "base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    /// Creates a client configured from the environment.
    pub fn from_env() -> Result<Self, VtError> {
        Self::new(VirusTotalConfig::from_env()?)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &VirusTotalConfig {
        &self.config
    }

    /// Fetches the report for a file hash.
    ///
    /// The hash is sent as-is; a malformed hash comes back as the service's
    /// `InvalidArgumentError` payload.
    ///
    /// # Errors
    ///
    /// Returns `VtError::InvalidInput` for `""`, `"."` and `".."`, which URL
    /// normalization would turn into a request for another endpoint.
    pub async fn file_report(&self, hash: &str) -> Result<ApiResponse<FileReport>, VtError> {
        const ENDPOINT: &str = "files/{hash}";

        if matches!(hash, "" | "." | "..") {
            return Err(VtError::invalid_input(format!(
                "'{}' is not a file identifier",
                hash
            )));
        }
        let url = self.endpoint_url(&["files", hash]);
        tracing::debug!(
            endpoint = ENDPOINT,
            hash = %hash,
            hash_kind = ?HashKind::detect(hash),
            "Fetching file report"
        );

        self.execute(ENDPOINT, self.client.get(url)).await
    }

    /// Uploads a file for analysis.
    pub async fn upload_file(
        &self,
        upload: FileUpload,
    ) -> Result<ApiResponse<UploadReceipt>, VtError> {
        const ENDPOINT: &str = "files";

        upload.ensure_below(self.config.max_file_size)?;
        let url = self.endpoint_url(&["files"]);
        self.submit(ENDPOINT, url, upload).await
    }

    /// Requests an upload URL for files above the standard limit.
    pub async fn upload_url(&self) -> Result<ApiResponse<UploadUrl>, VtError> {
        const ENDPOINT: &str = "files/upload_url";

        let url = self.endpoint_url(&["files", "upload_url"]);
        tracing::debug!(endpoint = ENDPOINT, "Requesting upload URL");

        self.execute(ENDPOINT, self.client.get(url)).await
    }

    /// Uploads a file to an upload URL obtained from [`upload_url`](Self::upload_url).
    ///
    /// This only sends the file; obtaining the URL is up to the caller.
    pub async fn upload_large_file(
        &self,
        upload_url: &UploadUrl,
        upload: FileUpload,
    ) -> Result<ApiResponse<UploadReceipt>, VtError> {
        const ENDPOINT: &str = "upload_url";

        upload.ensure_below(self.config.max_large_file_size)?;
        let url = Url::parse(upload_url.as_str())
            .map_err(|e| VtError::invalid_input(format!("invalid upload URL: {}", e)))?;
        self.submit(ENDPOINT, url, upload).await
    }

    async fn submit(
        &self,
        endpoint: &str,
        url: Url,
        upload: FileUpload,
    ) -> Result<ApiResponse<UploadReceipt>, VtError> {
        let sha256 = upload.sha256();
        tracing::debug!(
            endpoint,
            filename = %upload.filename(),
            size = upload.len(),
            sha256 = %sha256,
            with_password = upload.password().is_some(),
            "Submitting file"
        );

        let response: ApiResponse<UploadReceipt> = self
            .execute(endpoint, self.client.post(url).multipart(multipart_form(upload)))
            .await?;

        if let ApiResponse::Success(receipt) = &response {
            tracing::info!(
                analysis_id = %receipt.analysis_id(),
                sha256 = %sha256,
                "File submitted for analysis"
            );
        }
        Ok(response)
    }

    async fn execute<T: ResponseSchema>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<ApiResponse<T>, VtError> {
        let response = request
            .header(API_KEY_HEADER, self.config.api_key.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| VtError::transport(endpoint, e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| VtError::transport(endpoint, e.to_string()))?;

        let result = decode::<T>(endpoint, status, &body);
        match &result {
            Ok(ApiResponse::Error(err)) => tracing::warn!(
                endpoint,
                status = status.as_u16(),
                code = %err.code,
                error_message = %err.message,
                "VirusTotal returned an error payload"
            ),
            Err(e) => tracing::warn!(
                endpoint,
                status = status.as_u16(),
                error = %e,
                "VirusTotal response failed validation"
            ),
            Ok(ApiResponse::Success(_)) => {}
        }
        result
    }

    fn endpoint_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base() was rejected in the constructor.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

fn multipart_form(upload: FileUpload) -> Form {
    let (filename, content, password) = upload.into_parts();
    let form = Form::new().part("file", Part::bytes(content).file_name(filename));
    match password {
        Some(password) => form.text("password", password.expose_secret().to_string()),
        None => form,
    }
}

#[async_trait]
impl VirusTotalApi for VirusTotalClient {
    async fn file_report(&self, hash: &str) -> Result<ApiResponse<FileReport>, VtError> {
        VirusTotalClient::file_report(self, hash).await
    }

    async fn upload_file(&self, upload: FileUpload) -> Result<ApiResponse<UploadReceipt>, VtError> {
        VirusTotalClient::upload_file(self, upload).await
    }

    async fn upload_url(&self) -> Result<ApiResponse<UploadUrl>, VtError> {
        VirusTotalClient::upload_url(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_builder() {
        let config = VirusTotalConfig::new("test-key")
            .with_base_url("http://localhost:8080/api/v3")
            .with_max_file_size(1024)
            .with_user_agent("scanner/1.0");

        assert_eq!(config.base_url, "http://localhost:8080/api/v3");
        assert_eq!(config.max_file_size, 1024);
        assert_eq!(config.max_large_file_size, MAX_LARGE_UPLOAD_SIZE);
        assert_eq!(config.user_agent, "scanner/1.0");
        assert_eq!(config.api_key.expose_secret(), "test-key");
    }

    #[test]
    fn test_config_defaults() {
        let config = VirusTotalConfig::new("k");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_file_size, 32 * 1024 * 1024);
        assert!(config.user_agent.starts_with("vtbridge/"));
    }

    #[test]
    fn test_config_debug_hides_key() {
        let config = VirusTotalConfig::new("super-secret-key");
        assert!(!format!("{:?}", config).contains("super-secret-key"));
    }

    #[test]
    fn test_from_lookup() {
        let config = VirusTotalConfig::from_lookup(lookup(&[(API_KEY_ENV, " abc123 ")])).unwrap();
        assert_eq!(config.api_key.expose_secret(), "abc123");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);

        let config = VirusTotalConfig::from_lookup(lookup(&[
            (API_KEY_ENV, "abc123"),
            (BASE_URL_ENV, "http://127.0.0.1:9000/v3"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:9000/v3");
    }

    #[test]
    fn test_from_lookup_requires_key() {
        let err = VirusTotalConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, VtError::Configuration { .. }));
        assert!(err.to_string().contains(API_KEY_ENV));

        let err = VirusTotalConfig::from_lookup(lookup(&[(API_KEY_ENV, "   ")])).unwrap_err();
        assert!(matches!(err, VtError::Configuration { .. }));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = VirusTotalClient::new(VirusTotalConfig::new("k").with_base_url("not a url"))
            .unwrap_err();
        assert!(matches!(err, VtError::Configuration { .. }));

        let err = VirusTotalClient::new(VirusTotalConfig::new("k").with_base_url("mailto:a@b.c"))
            .unwrap_err();
        assert!(matches!(err, VtError::Configuration { .. }));
    }

    #[test]
    fn test_endpoint_url() {
        let client = VirusTotalClient::new(VirusTotalConfig::new("k")).unwrap();
        assert_eq!(
            client.endpoint_url(&["files", "upload_url"]).as_str(),
            "https://www.virustotal.com/api/v3/files/upload_url"
        );

        let client = VirusTotalClient::new(
            VirusTotalConfig::new("k").with_base_url("http://localhost:1234/api/v3/"),
        )
        .unwrap();
        assert_eq!(
            client.endpoint_url(&["files", "abc"]).as_str(),
            "http://localhost:1234/api/v3/files/abc"
        );
    }

    #[test]
    fn test_hash_stays_in_one_segment() {
        let client = VirusTotalClient::new(VirusTotalConfig::new("k")).unwrap();
        let url = client.endpoint_url(&["files", "../users/me"]);
        assert_eq!(
            url.as_str(),
            "https://www.virustotal.com/api/v3/files/..%2Fusers%2Fme"
        );
    }

    #[tokio::test]
    async fn test_dot_and_empty_hashes_are_rejected() {
        // Unroutable base: a request that slipped through would be a transport error.
        let client =
            VirusTotalClient::new(VirusTotalConfig::new("k").with_base_url("http://127.0.0.1:9"))
                .unwrap();

        for hash in ["", ".", ".."] {
            let err = client.file_report(hash).await.unwrap_err();
            assert!(
                matches!(err, VtError::InvalidInput { .. }),
                "{:?} gave {:?}",
                hash,
                err
            );
        }
    }
}
