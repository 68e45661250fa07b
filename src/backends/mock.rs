//! Mock VirusTotal backend for testing.
//!
//! This module provides an in-memory implementation of [`VirusTotalApi`]
//! so code that depends on the trait can be tested without network access.

use crate::backends::virustotal::MAX_UPLOAD_SIZE;
use crate::core::{
    AnalysisDescriptor, ApiError, ApiResponse, FileReport, FileUpload, Links, UploadReceipt,
    UploadUrl, VirusTotalApi, VtError,
};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

const MOCK_ROOT: &str = "https://mock.invalid/api/v3";

/// An in-memory stand-in for the VirusTotal API.
///
/// Reports are looked up by any of the digests they carry (md5, sha1,
/// sha256). Unknown hashes yield a `NotFoundError` payload, like the service.
///
/// # Examples
///
/// ```rust
/// use vtbridge::backends::MockVirusTotal;
/// use vtbridge::core::ApiError;
///
/// // Every call answers with a quota error
/// let mock = MockVirusTotal::new()
///     .with_forced_error(ApiError::new("QuotaExceededError", "Quota exceeded"));
/// ```
#[derive(Debug)]
pub struct MockVirusTotal {
    /// Reports keyed by lower-case hash.
    reports: RwLock<HashMap<String, FileReport>>,
    /// Error returned by every operation, if set.
    forced_error: Option<ApiError>,
    /// URL handed out by `upload_url`.
    upload_url: String,
    /// Exclusive upload limit.
    max_file_size: u64,
    /// Counter for calls of any kind.
    call_count: AtomicU64,
}

impl MockVirusTotal {
    /// Creates an empty mock.
    pub fn new() -> Self {
        Self {
            reports: RwLock::new(HashMap::new()),
            forced_error: None,
            upload_url: "https://mock.invalid/_ah/upload/mock-upload-token".to_string(),
            max_file_size: MAX_UPLOAD_SIZE,
            call_count: AtomicU64::new(0),
        }
    }

    /// Adds a report, reachable by each of its digests.
    pub fn with_report(self, report: FileReport) -> Self {
        self.add_report(report);
        self
    }

    /// Makes every operation return `error`.
    pub fn with_forced_error(mut self, error: ApiError) -> Self {
        self.forced_error = Some(error);
        self
    }

    /// Sets the URL returned by `upload_url`.
    pub fn with_upload_url(mut self, url: impl Into<String>) -> Self {
        self.upload_url = url.into();
        self
    }

    /// Sets the upload limit.
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Adds a report (shared-reference version).
    pub fn add_report(&self, report: FileReport) {
        let attrs = report.attributes();
        let keys = [
            attrs.md5.to_ascii_lowercase(),
            attrs.sha1.to_ascii_lowercase(),
            attrs.sha256.to_ascii_lowercase(),
        ];
        let mut reports = self.reports.write().unwrap_or_else(|e| e.into_inner());
        for key in keys {
            reports.insert(key, report.clone());
        }
    }

    /// Returns the number of calls served.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    fn begin(&self) -> Option<ApiError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.forced_error.clone()
    }
}

impl Default for MockVirusTotal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VirusTotalApi for MockVirusTotal {
    async fn file_report(&self, hash: &str) -> Result<ApiResponse<FileReport>, VtError> {
        if let Some(err) = self.begin() {
            return Ok(ApiResponse::Error(err));
        }

        let reports = self.reports.read().unwrap_or_else(|e| e.into_inner());
        Ok(match reports.get(&hash.to_ascii_lowercase()) {
            Some(report) => ApiResponse::Success(report.clone()),
            None => ApiResponse::Error(
                ApiError::new("NotFoundError", format!("File \"{}\" not found", hash))
                    .with_status(404),
            ),
        })
    }

    async fn upload_file(&self, upload: FileUpload) -> Result<ApiResponse<UploadReceipt>, VtError> {
        upload.ensure_below(self.max_file_size)?;
        if let Some(err) = self.begin() {
            return Ok(ApiResponse::Error(err));
        }

        let id = format!("mock-{}", &upload.sha256()[..16]);
        Ok(ApiResponse::Success(UploadReceipt {
            data: AnalysisDescriptor {
                kind: "analysis".to_string(),
                links: Links {
                    self_link: format!("{}/analyses/{}", MOCK_ROOT, id),
                },
                id,
            },
        }))
    }

    async fn upload_url(&self) -> Result<ApiResponse<UploadUrl>, VtError> {
        if let Some(err) = self.begin() {
            return Ok(ApiResponse::Error(err));
        }
        Ok(ApiResponse::Success(UploadUrl {
            data: self.upload_url.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> FileReport {
        serde_json::from_str(include_str!("../../tests/fixtures/file_report.json")).unwrap()
    }

    #[tokio::test]
    async fn test_report_by_any_digest() {
        let mock = MockVirusTotal::new().with_report(fixture());

        for hash in [
            "d41d8cd98f00b204e9800998ecf8427e",
            "DA39A3EE5E6B4B0D3255BFEF95601890AFD80709",
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        ] {
            let report = mock.file_report(hash).await.unwrap().success().unwrap();
            assert_eq!(report.attributes().md5, "d41d8cd98f00b204e9800998ecf8427e");
        }
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_unknown_hash_is_not_found() {
        let mock = MockVirusTotal::new();
        let response = mock
            .file_report("0123456789abcdef0123456789abcdef")
            .await
            .unwrap();

        let err = response.api_error().unwrap();
        assert!(err.is_not_found());
        assert_eq!(err.status, Some(404));
    }

    #[tokio::test]
    async fn test_upload_receipt() {
        let mock = MockVirusTotal::new();
        let receipt = mock
            .upload_file(FileUpload::new("test.txt", b"hello".to_vec()))
            .await
            .unwrap()
            .success()
            .unwrap();

        assert_eq!(receipt.data.kind, "analysis");
        assert_eq!(receipt.analysis_id(), "mock-2cf24dba5fb0a30e");
        assert!(receipt.data.links.self_link.ends_with("/analyses/mock-2cf24dba5fb0a30e"));
    }

    #[tokio::test]
    async fn test_upload_size_limit() {
        let mock = MockVirusTotal::new().with_max_file_size(5);
        let err = mock
            .upload_file(FileUpload::new("test.txt", b"hello".to_vec()))
            .await
            .unwrap_err();

        assert!(matches!(err, VtError::FileTooLarge { size: 5, max: 5 }));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_forced_error() {
        let mock = MockVirusTotal::new()
            .with_report(fixture())
            .with_forced_error(ApiError::new("QuotaExceededError", "Quota exceeded"));

        let response = mock
            .file_report("d41d8cd98f00b204e9800998ecf8427e")
            .await
            .unwrap();
        assert!(response.api_error().unwrap().is_quota_exceeded());
        assert!(mock.upload_url().await.unwrap().is_error());
    }

    #[tokio::test]
    async fn test_as_trait_object() {
        let api: crate::core::ArcVirusTotalApi =
            std::sync::Arc::new(MockVirusTotal::new().with_upload_url("https://example.com/up"));
        let url = api.upload_url().await.unwrap().success().unwrap();
        assert_eq!(url.as_str(), "https://example.com/up");
    }
}
