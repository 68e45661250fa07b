//! # vtbridge
//!
//! A typed async client for the VirusTotal v3 file endpoints.
//!
//! ## Overview
//!
//! vtbridge covers three independent operations:
//!
//! - Fetch a file report by md5, sha1 or sha256
//! - Upload a file (below 32 MiB) for analysis
//! - Request an upload URL for larger files
//!
//! Every response is checked against the expected schema. Each call has
//! three distinguishable outcomes:
//!
//! - `Ok(ApiResponse::Success(_))` - the documented payload
//! - `Ok(ApiResponse::Error(_))` - an error payload from VirusTotal
//! - `Err(VtError)` - transport failure, or a body matching neither schema
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vtbridge::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads VIRUSTOTAL_API_KEY
//!     let client = VirusTotalClient::from_env()?;
//!
//!     match client.file_report("d41d8cd98f00b204e9800998ecf8427e").await? {
//!         ApiResponse::Success(report) => {
//!             let stats = report.attributes().last_analysis_stats;
//!             println!("{}/{} engines flagged the file", stats.detections(), stats.total());
//!         }
//!         ApiResponse::Error(err) if err.is_not_found() => println!("unknown file"),
//!         ApiResponse::Error(err) => println!("VirusTotal error: {}", err),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Not included
//!
//! The client sends each request exactly once. Polling for analysis
//! completion, retries, rate limiting, timeouts and caching belong to the
//! caller (timeouts can be set on a `reqwest::Client` passed to
//! [`VirusTotalClient::with_http_client`](backends::VirusTotalClient::with_http_client)).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod backends;
pub mod core;

// Re-export commonly used types at the crate root
pub use crate::core::{
    AnalysisStats, ApiError, ApiResponse, EngineResult, FileAttributes, FileReport, FileUpload,
    HashKind, UploadReceipt, UploadUrl, VerdictCategory, VirusTotalApi, VtError, VtResult,
};

pub use crate::backends::{MockVirusTotal, VirusTotalClient, VirusTotalConfig};

/// Prelude module for convenient imports.
///
/// ```rust
/// use vtbridge::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backends::{MockVirusTotal, VirusTotalClient, VirusTotalConfig};
    pub use crate::core::{
        AnalysisStats, ApiError, ApiResponse, EngineResult, FileAttributes, FileReport,
        FileUpload, HashKind, UploadReceipt, UploadUrl, VerdictCategory, VirusTotalApi, VtError,
        VtResult,
    };
}
