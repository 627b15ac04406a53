//! Error types for configuration, generation and publishing.
//!
//! The three enums mirror how a run treats each failure: configuration
//! errors are fatal before any I/O, generation errors are recovered into a
//! [`GenerationResult::Failed`](crate::domain::GenerationResult), and publish
//! errors abort the run.

use thiserror::Error;

/// Missing or invalid startup configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required environment variable is absent or blank
    #[error("missing required setting {0}")]
    Missing(&'static str),
    /// A variable is present but cannot be interpreted
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Failure to obtain usable output from the completion API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("completion request failed: {0}")]
    Transport(String),
    #[error("completion API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed completion response: {0}")]
    Malformed(String),
    #[error("completion response contained no choices")]
    NoChoices,
    #[error("completion response was empty")]
    EmptyResponse,
    #[error("completion response contained no [code] block")]
    EmptyCode,
}

/// Failure reported by (or while talking to) the hosting API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("hosting request failed: {0}")]
    Transport(String),
    #[error("authentication failed (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rate limit exceeded (HTTP {status}): {message}")]
    RateLimited { status: u16, message: String },
    /// The supplied revision handle no longer matches the stored file
    #[error("revision of {path} changed since it was listed (HTTP {status})")]
    StaleRevision { path: String, status: u16 },
    #[error("hosting API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("could not decode hosted content: {0}")]
    Decode(String),
}

impl PublishError {
    /// Classify a non-success response from the hosting API.
    ///
    /// `path` is the file being written, if any, so that a rejected update can
    /// be reported as a stale revision handle.
    pub fn from_http_response(status: u16, body: &str, path: Option<&str>) -> Self {
        let message = extract_message(body);
        match (status, path) {
            (401, _) => PublishError::Unauthorized { status, message },
            (403, _) if message.to_lowercase().contains("rate limit") => {
                PublishError::RateLimited { status, message }
            }
            (403, _) => PublishError::Unauthorized { status, message },
            (429, _) => PublishError::RateLimited { status, message },
            (404, Some(path)) => PublishError::NotFound(path.to_string()),
            (404, None) => PublishError::NotFound(message),
            (409, Some(path)) | (422, Some(path)) => PublishError::StaleRevision {
                path: path.to_string(),
                status,
            },
            _ => PublishError::Status { status, message },
        }
    }

    /// Get a hint message for the user
    pub fn user_hint(&self) -> &'static str {
        match self {
            PublishError::Unauthorized { .. } => {
                "Check that GITHUB_TOKEN is valid and has contents:write access to the repository."
            }
            PublishError::RateLimited { .. } => {
                "The GitHub rate limit was hit. The next scheduled run will try again."
            }
            PublishError::StaleRevision { .. } => {
                "The file changed while this run was publishing. Another run may be in progress."
            }
            PublishError::NotFound(_) => {
                "Check CODEDAY_REPO_OWNER and CODEDAY_REPO_NAME."
            }
            _ => "An unexpected error occurred while talking to GitHub.",
        }
    }
}

/// Pull the `message` field out of a GitHub error body, falling back to the raw text.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                "Unknown error".to_string()
            } else {
                body.trim().to_string()
            }
        })
}
