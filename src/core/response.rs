//! Response envelope and schema validation.
//!
//! Every VirusTotal response body is decoded by [`decode`], which accepts
//! exactly two shapes: the operation's success schema or the service's error
//! schema. Anything else is a [`VtError::Validation`].

use crate::core::error::VtError;
use crate::core::types::{ApiError, FileReport, UploadReceipt, UploadUrl};

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of an exchange that reached the service and returned a valid body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ApiResponse<T> {
    /// The success payload.
    Success(T),
    /// The service reported an application-level error.
    Error(ApiError),
}

impl<T> ApiResponse<T> {
    /// Returns `true` for a success payload.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` for an error payload.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns the success payload, if any.
    pub fn success(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Error(_) => None,
        }
    }

    /// Returns the error payload, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Success(_) => None,
            Self::Error(err) => Some(err),
        }
    }

    /// Converts into a `Result`, with the error payload as `Err`.
    pub fn into_result(self) -> Result<T, ApiError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Error(err) => Err(err),
        }
    }

    /// Maps the success payload.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        match self {
            Self::Success(value) => ApiResponse::Success(f(value)),
            Self::Error(err) => ApiResponse::Error(err),
        }
    }
}

/// A success schema with checks serde cannot express.
pub trait ResponseSchema: DeserializeOwned {
    /// Validates the decoded value. The default accepts everything.
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

impl ResponseSchema for FileReport {
    fn check(&self) -> Result<(), String> {
        if self.data.id.is_empty() {
            return Err("file object has an empty id".to_string());
        }
        Ok(())
    }
}

impl ResponseSchema for UploadReceipt {
    fn check(&self) -> Result<(), String> {
        if self.data.id.is_empty() {
            return Err("analysis descriptor has an empty id".to_string());
        }
        Ok(())
    }
}

impl ResponseSchema for UploadUrl {
    fn check(&self) -> Result<(), String> {
        let url = Url::parse(&self.data).map_err(|e| format!("upload URL is not a URL: {}", e))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(format!("upload URL has unsupported scheme '{}'", other)),
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

/// Decodes a response body into the success or error schema.
pub fn decode<T: ResponseSchema>(
    endpoint: &str,
    status: StatusCode,
    body: &[u8],
) -> Result<ApiResponse<T>, VtError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| VtError::validation(endpoint, format!("malformed JSON: {}", e)))?;

    let (has_error, has_data) = match &value {
        Value::Object(map) => (map.contains_key("error"), map.contains_key("data")),
        _ => {
            return Err(VtError::validation(
                endpoint,
                "response body is not a JSON object",
            ))
        }
    };

    if has_error && has_data {
        return Err(VtError::validation(
            endpoint,
            "response carries both `data` and `error`",
        ));
    }

    if has_error {
        let envelope: ErrorEnvelope = serde_json::from_value(value)
            .map_err(|e| VtError::validation(endpoint, format!("error payload: {}", e)))?;
        return Ok(ApiResponse::Error(
            envelope.error.with_status(status.as_u16()),
        ));
    }

    if !status.is_success() {
        return Err(VtError::validation(
            endpoint,
            format!("HTTP {} without an error payload", status),
        ));
    }

    let payload: T = serde_json::from_value(value)
        .map_err(|e| VtError::validation(endpoint, e.to_string()))?;
    payload
        .check()
        .map_err(|details| VtError::validation(endpoint, details))?;

    Ok(ApiResponse::Success(payload))
}
