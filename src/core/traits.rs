//! Core traits for the vtbridge library.
//!
//! `VirusTotalApi` is the seam between callers and the service: the HTTP
//! client implements it, and so does the in-memory mock used in tests.

use crate::core::error::VtError;
use crate::core::input::FileUpload;
use crate::core::response::ApiResponse;
use crate::core::types::{FileReport, UploadReceipt, UploadUrl};

use async_trait::async_trait;
use std::fmt::Debug;

/// The VirusTotal file operations.
///
/// Each call is a single, independent round-trip. Implementations hold no
/// per-call state, so one instance can serve any number of concurrent calls.
///
/// Every method distinguishes three outcomes:
///
/// * `Ok(ApiResponse::Success(_))` - the service returned the expected payload.
/// * `Ok(ApiResponse::Error(_))` - the service returned an error payload.
/// * `Err(VtError)` - the exchange failed or the body matched neither schema.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use vtbridge::prelude::*;
///
/// #[derive(Debug)]
/// struct Offline;
///
/// #[async_trait]
/// impl VirusTotalApi for Offline {
///     async fn file_report(&self, _hash: &str) -> Result<ApiResponse<FileReport>, VtError> {
///         Ok(ApiResponse::Error(ApiError::new("NotFoundError", "offline")))
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait VirusTotalApi: Send + Sync + Debug {
    /// Fetches the analysis report of the file identified by `hash`
    /// (md5, sha1 or sha256).
    async fn file_report(&self, hash: &str) -> Result<ApiResponse<FileReport>, VtError>;

    /// Submits a file for analysis.
    ///
    /// # Errors
    ///
    /// Returns `VtError::FileTooLarge` without sending anything when the
    /// content is not below the standard upload limit.
    async fn upload_file(&self, upload: FileUpload) -> Result<ApiResponse<UploadReceipt>, VtError>;

    /// Requests a one-off URL for uploading a file above the standard limit.
    async fn upload_url(&self) -> Result<ApiResponse<UploadUrl>, VtError>;
}

/// A boxed client for type-erased storage.
pub type BoxedVirusTotalApi = Box<dyn VirusTotalApi>;

/// An arc-wrapped client for shared ownership.
pub type ArcVirusTotalApi = std::sync::Arc<dyn VirusTotalApi>;
