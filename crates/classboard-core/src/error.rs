//! Centralized error types for the board.

use classboard_api::{ApiError, ValidationIssue};
use thiserror::Error;

/// Main error type for board operations.
#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Failed to load board: {0}")]
    Load(#[source] ApiError),

    #[error("Malformed board data: {0}")]
    Malformed(String),

    #[error("Board has not been loaded")]
    NotLoaded,

    #[error("{action} failed: {source}")]
    Mutation {
        action: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("Work item not found: {0}")]
    WorkItemNotFound(String),

    #[error("Sprint not found: {0}")]
    SprintNotFound(u64),

    #[error("{key} is assigned by the lecturer and cannot be {action}")]
    LecturerAssigned { key: String, action: &'static str },

    #[error("Invalid status transition: cannot move from '{from}' to '{to}'")]
    InvalidStatusTransition { from: String, to: String },

    #[error("{key} cannot be done while {open} sub-item(s) are not done")]
    OpenSubItems { key: String, open: usize },

    #[error("Invalid sprint transition: cannot move from '{from}' to '{to}'")]
    InvalidSprintTransition { from: String, to: String },

    #[error("Not permitted: {0}")]
    NotPermitted(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Coarse classification used when reporting errors to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fetching the board failed; the previous state is kept.
    Load,
    /// A request for a specific action failed; nothing was applied.
    Mutation,
    /// Rejected before any request was sent.
    Validation,
    /// Local session or configuration problem.
    Config,
}

impl BoardError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Load(_) | Self::Malformed(_) | Self::NotLoaded => ErrorKind::Load,
            Self::Mutation { .. } => ErrorKind::Mutation,
            Self::Io(_) | Self::Config(_) => ErrorKind::Config,
            _ => ErrorKind::Validation,
        }
    }

    /// Structured issues carried by a multi-part server validation error.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::Load(ApiError::Validation { issues, .. })
            | Self::Mutation {
                source: ApiError::Validation { issues, .. },
                ..
            } => issues.as_slice(),
            _ => &[],
        }
    }
}
