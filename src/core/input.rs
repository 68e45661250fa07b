//! Upload input.
//!
//! `FileUpload` bundles what `POST /files` needs: a filename, the raw
//! content, and an optional password for protected archives.

use crate::core::error::VtError;
use crate::core::hasher::sha256_hex;

use secrecy::SecretString;
#[cfg(feature = "tokio-runtime")]
use std::path::Path;

/// A file to submit for analysis.
///
/// # Examples
///
/// ```rust
/// use vtbridge::core::FileUpload;
///
/// let upload = FileUpload::new("test.txt", b"hello".to_vec());
/// assert_eq!(upload.len(), 5);
///
/// let archive = FileUpload::new("sample.zip", vec![0x50, 0x4B, 0x03, 0x04])
///     .with_password("infected");
/// assert!(archive.password().is_some());
/// ```
#[derive(Clone)]
pub struct FileUpload {
    filename: String,
    content: Vec<u8>,
    password: Option<SecretString>,
}

impl std::fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileUpload")
            .field("filename", &self.filename)
            .field("content_len", &self.content.len())
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl FileUpload {
    /// Creates an upload from in-memory content.
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            password: None,
        }
    }

    /// Reads a file from disk; the filename is taken from the path.
    #[cfg(feature = "tokio-runtime")]
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, VtError> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                VtError::invalid_input(format!("path has no usable filename: {}", path.display()))
            })?
            .to_string();

        let content = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VtError::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                VtError::Io(e)
            }
        })?;

        Ok(Self::new(filename, content))
    }

    /// Sets the password for an encrypted archive.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Returns the filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Returns the content.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Returns the archive password, if set.
    pub fn password(&self) -> Option<&SecretString> {
        self.password.as_ref()
    }

    /// Content size in bytes.
    pub fn len(&self) -> u64 {
        self.content.len() as u64
    }

    /// Returns `true` if the content is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// SHA-256 of the content, usable as a report lookup key.
    pub fn sha256(&self) -> String {
        sha256_hex(&self.content)
    }

    /// Rejects content that is not strictly below `max` bytes.
    pub fn ensure_below(&self, max: u64) -> Result<(), VtError> {
        if self.len() >= max {
            return Err(VtError::FileTooLarge {
                size: self.len(),
                max,
            });
        }
        Ok(())
    }

    pub(crate) fn into_parts(self) -> (String, Vec<u8>, Option<SecretString>) {
        (self.filename, self.content, self.password)
    }
}
