//! Core types and traits for the vtbridge library.
//!
//! - [`types`] - Report, upload and error payload structures
//! - [`response`] - The `ApiResponse` envelope and schema validation
//! - [`traits`] - The `VirusTotalApi` trait
//! - [`error`] - Structured error types
//! - [`input`] - Upload input
//! - [`hasher`] - SHA-256 content digests

pub mod error;
pub mod hasher;
pub mod input;
pub mod response;
pub mod traits;
pub mod types;

pub use error::{VtError, VtResult};
pub use input::FileUpload;
pub use response::{decode, ApiResponse, ResponseSchema};
pub use traits::{ArcVirusTotalApi, BoxedVirusTotalApi, VirusTotalApi};
pub use types::{
    AnalysisDescriptor, AnalysisStats, ApiError, EngineResult, FileAttributes, FileObject,
    FileReport, HashKind, Links, TypeGuess, UploadReceipt, UploadUrl, VerdictCategory, Votes,
};
