//! API error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One entry of a multi-part validation payload (e.g. a bulk import).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<u32>,
    pub cause: String,
}

impl ValidationIssue {
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            sheet: None,
            row: None,
            cause: cause.into(),
        }
    }

    pub fn at(sheet: impl Into<String>, row: u32, cause: impl Into<String>) -> Self {
        Self {
            sheet: Some(sheet.into()),
            row: Some(row),
            cause: cause.into(),
        }
    }
}

/// Error body returned by the backend for any non-2xx response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ValidationIssue>,
}

/// API error types.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request rejected ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        issues: Vec<ValidationIssue>,
    },
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Status {
            status: 400,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Status {
            status: 403,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>, issues: Vec<ValidationIssue>) -> Self {
        Self::Validation {
            message: message.into(),
            issues,
        }
    }

    /// HTTP status this error maps to when served.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Status { status, .. } => *status,
            Self::Validation { .. } => 422,
            Self::Serialization(_) => 400,
            Self::Http(e) => e.status().map(|s| s.as_u16()).unwrap_or(502),
        }
    }

    /// Rebuild an error from a backend response status and body.
    pub fn from_response(status: u16, body: ErrorBody) -> Self {
        if !body.issues.is_empty() {
            return Self::Validation {
                message: body.message,
                issues: body.issues,
            };
        }
        match status {
            404 => Self::NotFound(body.message),
            _ => Self::Status {
                status,
                message: body.message,
            },
        }
    }

    /// Body to serve for this error.
    pub fn to_body(&self) -> ErrorBody {
        match self {
            Self::Validation { message, issues } => ErrorBody {
                message: message.clone(),
                issues: issues.clone(),
            },
            Self::NotFound(what) => ErrorBody {
                message: what.clone(),
                issues: Vec::new(),
            },
            Self::Status { message, .. } => ErrorBody {
                message: message.clone(),
                issues: Vec::new(),
            },
            other => ErrorBody {
                message: other.to_string(),
                issues: Vec::new(),
            },
        }
    }
}
