//! Core types used throughout the vtbridge library.
//!
//! These mirror the JSON objects returned by the VirusTotal v3 `files`
//! endpoints. Required attributes are plain fields so that a response lacking
//! them fails to decode; attributes the service omits for some files are
//! `Option`s. Unknown attributes are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of digest a hash string represents, inferred from its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashKind {
    /// 32 hex characters.
    Md5,
    /// 40 hex characters.
    Sha1,
    /// 64 hex characters.
    Sha256,
}

impl HashKind {
    /// Classifies `hash` by length and hex alphabet.
    ///
    /// Returns `None` for anything that is not a well-formed md5, sha1 or
    /// sha256 hex digest.
    pub fn detect(hash: &str) -> Option<Self> {
        if !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        match hash.len() {
            32 => Some(Self::Md5),
            40 => Some(Self::Sha1),
            64 => Some(Self::Sha256),
            _ => None,
        }
    }
}

impl fmt::Display for HashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Md5 => write!(f, "md5"),
            Self::Sha1 => write!(f, "sha1"),
            Self::Sha256 => write!(f, "sha256"),
        }
    }
}

/// Verdict an individual engine assigned to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerdictCategory {
    /// The engine considers the file safe.
    Harmless,
    /// The engine flagged the file as malware.
    Malicious,
    /// The engine flagged the file as possibly harmful.
    Suspicious,
    /// The engine found nothing.
    Undetected,
    /// The engine did not answer in time.
    Timeout,
    /// The engine timed out and the timeout was confirmed.
    ConfirmedTimeout,
    /// The engine failed to scan the file.
    Failure,
    /// The engine cannot handle this file type.
    TypeUnsupported,
}

impl VerdictCategory {
    /// Returns `true` for categories that count as a detection.
    pub fn is_detection(&self) -> bool {
        matches!(self, Self::Malicious | Self::Suspicious)
    }
}

impl fmt::Display for VerdictCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Harmless => "harmless",
            Self::Malicious => "malicious",
            Self::Suspicious => "suspicious",
            Self::Undetected => "undetected",
            Self::Timeout => "timeout",
            Self::ConfirmedTimeout => "confirmed-timeout",
            Self::Failure => "failure",
            Self::TypeUnsupported => "type-unsupported",
        };
        f.pad(s)
    }
}

/// One engine's entry in `last_analysis_results`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineResult {
    /// Verdict category.
    pub category: VerdictCategory,

    /// Engine name as reported by the service.
    pub engine_name: String,

    /// Engine version, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,

    /// Signature database date (`YYYYMMDD`), if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_update: Option<String>,

    /// Detection method (e.g. "blacklist").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Detection label, `null` when nothing was found.
    #[serde(default)]
    pub result: Option<String>,
}

/// Aggregate verdict counts across all engines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    /// Engines reporting harmless.
    pub harmless: u32,
    /// Engines reporting malicious.
    pub malicious: u32,
    /// Engines reporting suspicious.
    pub suspicious: u32,
    /// Engines reporting undetected.
    pub undetected: u32,
    /// Engines that timed out.
    pub timeout: u32,
    /// Engines with a confirmed timeout.
    #[serde(rename = "confirmed-timeout")]
    pub confirmed_timeout: u32,
    /// Engines that failed.
    pub failure: u32,
    /// Engines that do not support the file type.
    #[serde(rename = "type-unsupported")]
    pub type_unsupported: u32,
}

impl AnalysisStats {
    /// Number of engines that flagged the file (malicious or suspicious).
    pub fn detections(&self) -> u64 {
        u64::from(self.malicious) + u64::from(self.suspicious)
    }

    /// Total number of engine verdicts.
    pub fn total(&self) -> u64 {
        [
            self.harmless,
            self.malicious,
            self.suspicious,
            self.undetected,
            self.timeout,
            self.confirmed_timeout,
            self.failure,
            self.type_unsupported,
        ]
        .into_iter()
        .map(u64::from)
        .sum()
    }
}

/// Community vote tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Votes {
    /// Votes for harmless.
    pub harmless: u32,
    /// Votes for malicious.
    pub malicious: u32,
}

/// A file-type guess with its probability (TrID output).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeGuess {
    /// Human-readable file type.
    pub file_type: String,
    /// Probability in percent.
    pub probability: f64,
}

/// Link block attached to every returned object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    /// Canonical URL of the object.
    #[serde(rename = "self")]
    pub self_link: String,
}

/// Attributes of a file object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAttributes {
    /// MD5 digest.
    pub md5: String,
    /// SHA-1 digest.
    pub sha1: String,
    /// SHA-256 digest.
    pub sha256: String,
    /// ssdeep fuzzy hash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssdeep: Option<String>,
    /// TLSH fuzzy hash (absent for very small files).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tlsh: Option<String>,

    /// File size in bytes.
    pub size: u64,

    /// First time the file was submitted (unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_submission_date: Option<i64>,
    /// Most recent submission (unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_submission_date: Option<i64>,
    /// Last modification of the object (unix seconds).
    pub last_modification_date: i64,
    /// Date of the most recent analysis (unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_analysis_date: Option<i64>,

    /// Per-engine verdicts, keyed by engine name.
    pub last_analysis_results: BTreeMap<String, EngineResult>,
    /// Verdict counts.
    pub last_analysis_stats: AnalysisStats,
    /// Community votes.
    pub total_votes: Votes,
    /// Descriptive tags.
    pub tags: Vec<String>,

    /// Type guesses with probabilities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trid: Option<Vec<TypeGuess>>,
    /// Human-readable file type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_description: Option<String>,
    /// Most representative name among submitted names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meaningful_name: Option<String>,
    /// Names the file was submitted under.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    /// Community reputation score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reputation: Option<i64>,
    /// Number of times the file was submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times_submitted: Option<u64>,
}

impl FileAttributes {
    /// First submission as a timestamp.
    pub fn first_submitted_at(&self) -> Option<DateTime<Utc>> {
        self.first_submission_date.and_then(unix_to_utc)
    }

    /// Last submission as a timestamp.
    pub fn last_submitted_at(&self) -> Option<DateTime<Utc>> {
        self.last_submission_date.and_then(unix_to_utc)
    }

    /// Last modification as a timestamp.
    pub fn last_modified_at(&self) -> Option<DateTime<Utc>> {
        unix_to_utc(self.last_modification_date)
    }

    /// Last analysis as a timestamp.
    pub fn last_analyzed_at(&self) -> Option<DateTime<Utc>> {
        self.last_analysis_date.and_then(unix_to_utc)
    }

    /// Engines whose verdict counts as a detection, with their labels.
    pub fn detections(&self) -> impl Iterator<Item = (&str, &EngineResult)> {
        self.last_analysis_results
            .iter()
            .filter(|(_, r)| r.category.is_detection())
            .map(|(name, r)| (name.as_str(), r))
    }

    /// Most probable type guess, if any.
    pub fn top_type_guess(&self) -> Option<&TypeGuess> {
        self.trid
            .as_deref()?
            .iter()
            .max_by(|a, b| a.probability.total_cmp(&b.probability))
    }
}

fn unix_to_utc(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// The `data` object of a file report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileObject {
    /// Object type, `"file"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Object identifier (the sha256).
    pub id: String,
    /// Object links.
    pub links: Links,
    /// File attributes.
    pub attributes: FileAttributes,
}

/// Response of `GET /files/{hash}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    /// The file object.
    pub data: FileObject,
}

impl FileReport {
    /// Shortcut to the file attributes.
    pub fn attributes(&self) -> &FileAttributes {
        &self.data.attributes
    }
}

/// Descriptor of the analysis started by an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisDescriptor {
    /// Object type, `"analysis"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Analysis identifier.
    pub id: String,
    /// Analysis links.
    pub links: Links,
}

/// Response of `POST /files`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// The analysis descriptor.
    pub data: AnalysisDescriptor,
}

impl UploadReceipt {
    /// Identifier of the started analysis.
    pub fn analysis_id(&self) -> &str {
        &self.data.id
    }
}

/// Response of `GET /files/upload_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadUrl {
    /// The upload URL.
    pub data: String,
}

impl UploadUrl {
    /// Returns the URL as a string slice.
    pub fn as_str(&self) -> &str {
        &self.data
    }
}

impl fmt::Display for UploadUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data)
    }
}

/// Application-level error reported by VirusTotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code, e.g. `NotFoundError`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// HTTP status that carried the payload.
    #[serde(skip)]
    pub status: Option<u16>,
}

impl ApiError {
    /// Creates an error payload without a status.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Sets the HTTP status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// The requested object does not exist.
    pub fn is_not_found(&self) -> bool {
        self.code == "NotFoundError"
    }

    /// The API key ran out of quota.
    pub fn is_quota_exceeded(&self) -> bool {
        self.code == "QuotaExceededError"
    }

    /// The API key is missing or wrong.
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self.code.as_str(),
            "WrongCredentialsError" | "AuthenticationRequiredError" | "UserNotActiveError"
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_kind_detect() {
        assert_eq!(
            HashKind::detect("d41d8cd98f00b204e9800998ecf8427e"),
            Some(HashKind::Md5)
        );
        assert_eq!(
            HashKind::detect("da39a3ee5e6b4b0d3255bfef95601890afd80709"),
            Some(HashKind::Sha1)
        );
        assert_eq!(
            HashKind::detect("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"),
            Some(HashKind::Sha256)
        );
        assert_eq!(HashKind::detect("not-a-hash"), None);
        assert_eq!(HashKind::detect("zz1d8cd98f00b204e9800998ecf8427e"), None);
        assert_eq!(HashKind::detect(""), None);
    }

    #[test]
    fn test_verdict_category_wire_names() {
        let cat: VerdictCategory = serde_json::from_str("\"confirmed-timeout\"").unwrap();
        assert_eq!(cat, VerdictCategory::ConfirmedTimeout);
        let cat: VerdictCategory = serde_json::from_str("\"type-unsupported\"").unwrap();
        assert_eq!(cat, VerdictCategory::TypeUnsupported);
        assert_eq!(VerdictCategory::TypeUnsupported.to_string(), "type-unsupported");

        assert!(serde_json::from_str::<VerdictCategory>("\"clean\"").is_err());
    }

    #[test]
    fn test_analysis_stats_totals() {
        let stats = AnalysisStats {
            harmless: 1,
            malicious: 3,
            suspicious: 2,
            undetected: 60,
            timeout: 0,
            confirmed_timeout: 0,
            failure: 1,
            type_unsupported: 7,
        };
        assert_eq!(stats.detections(), 5);
        assert_eq!(stats.total(), 74);
    }

    #[test]
    fn test_analysis_stats_do_not_overflow() {
        let json = include_str!("../../tests/fixtures/file_report.json");
        let mut value: serde_json::Value = serde_json::from_str(json).unwrap();
        let stats = &mut value["data"]["attributes"]["last_analysis_stats"];
        stats["malicious"] = serde_json::Value::from(u32::MAX);
        stats["suspicious"] = serde_json::Value::from(u32::MAX);

        let report: FileReport = serde_json::from_value(value).unwrap();
        let stats = report.attributes().last_analysis_stats;
        assert_eq!(stats.detections(), 2 * u64::from(u32::MAX));
        assert_eq!(stats.total(), 2 * u64::from(u32::MAX) + 3);
    }

    #[test]
    fn test_api_error_classification() {
        assert!(ApiError::new("NotFoundError", "File not found").is_not_found());
        assert!(ApiError::new("QuotaExceededError", "Quota exceeded").is_quota_exceeded());
        assert!(ApiError::new("WrongCredentialsError", "Wrong API key").is_authentication_error());

        let err = ApiError::new("InvalidArgumentError", "bad hash").with_status(400);
        assert!(!err.is_not_found());
        assert_eq!(err.status, Some(400));
        assert_eq!(err.to_string(), "InvalidArgumentError: bad hash");
    }

    #[test]
    fn test_top_type_guess() {
        let json = include_str!("../../tests/fixtures/file_report.json");
        let report: FileReport = serde_json::from_str(json).unwrap();
        let attrs = report.attributes();

        let top = attrs.top_type_guess().unwrap();
        assert_eq!(top.file_type, "Text - UTF-8 encoded");
        assert_eq!(attrs.last_modified_at().unwrap().timestamp(), 1_697_000_000);
        assert_eq!(attrs.detections().count(), 1);
    }
}
