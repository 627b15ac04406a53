//! Domain types shared across modules.
//!
//! These are the values that flow through a run: the request sent to the
//! generator, its typed result, and the files written to the repository.
//! Keeping them here lets the API clients and the pipeline depend on the
//! same definitions without depending on each other.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};

use crate::error::GenerationError;

/// Target repository identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Prompt for one generation, built once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt_text: String,
    pub history_context: Option<String>,
}

/// A file name and its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub file_name: String,
    pub code: String,
}

/// Outcome of one generation.
///
/// A failed generation still carries a placeholder snippet describing the
/// error, but it can only be reached through the `Failed` variant, so it is
/// never handed to the publisher by accident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Generated(Snippet),
    Failed {
        error: GenerationError,
        placeholder: Snippet,
    },
}

impl GenerationResult {
    /// Build a failure whose placeholder names the error and the time it happened.
    pub fn failed(error: GenerationError, now: DateTime<Utc>) -> Self {
        let placeholder = Snippet {
            file_name: format!("Error_{}.txt", now.format("%Y%m%d_%H%M%S")),
            code: format!("// Generation failed: {}", error),
        };
        GenerationResult::Failed { error, placeholder }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, GenerationResult::Generated(_))
    }

    /// The snippet to show for this result: the generated one, or the error placeholder.
    pub fn snippet(&self) -> &Snippet {
        match self {
            GenerationResult::Generated(snippet) => snippet,
            GenerationResult::Failed { placeholder, .. } => placeholder,
        }
    }
}

/// A file as written to the hosting API.
///
/// `revision_handle` is the stored blob sha. Its presence means the file
/// already exists and must be updated conditionally; absence means create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryFile {
    pub path: String,
    pub content_base64: String,
    pub revision_handle: Option<String>,
}

impl RepositoryFile {
    pub fn new(path: impl Into<String>, content_base64: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content_base64: content_base64.into(),
            revision_handle: None,
        }
    }

    /// Encode UTF-8 text for the hosting API.
    pub fn from_text(path: impl Into<String>, text: &str) -> Self {
        Self::new(path, STANDARD.encode(text.as_bytes()))
    }

    pub fn with_revision(mut self, revision_handle: Option<String>) -> Self {
        self.revision_handle = revision_handle;
        self
    }

    /// Final path component, used to match directory listings.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Parent directory, or `None` for a file at the repository root.
    pub fn directory(&self) -> Option<&str> {
        self.path
            .rsplit_once('/')
            .map(|(dir, _)| dir)
            .filter(|dir| !dir.is_empty())
    }
}

/// The README index of published snippets, read and rewritten wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLog {
    pub raw_text: String,
}
