//! Request and response types for the completion and GitHub APIs.

use serde::{Deserialize, Serialize};

// ============================================================================
// Chat Completion Types
// ============================================================================

/// Single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
        }
    }
}

/// Chat completion request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// One completion choice.
///
/// Chat endpoints fill `message`; the legacy completions endpoint fills `text`.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    #[serde(default)]
    pub message: Option<ChatMessage>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Chat completion response
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, from `message.content` or else `text`.
    ///
    /// Returns `None` when there are no choices; `Some(None)` when the first
    /// choice carries no text at all.
    pub fn first_text(&self) -> Option<Option<&str>> {
        let choice = self.choices.first()?;
        let text = choice
            .message
            .as_ref()
            .and_then(|m| m.content.as_deref())
            .or(choice.text.as_deref());
        Some(text)
    }
}

// ============================================================================
// GitHub Types
// ============================================================================

/// Owner of a repository
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

/// Repository metadata from `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub owner: RepositoryOwner,
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// Entry of a directory listing from `GET /repos/{owner}/{repo}/contents/{dir}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    pub sha: String,
    #[serde(rename = "type")]
    pub entry_type: String,
}

/// Single file from `GET /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Clone, Deserialize)]
pub struct FileContent {
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub content: Option<String>,
    /// `base64`, or `none` when the file is too large to be returned inline
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}` for a new file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateFileRequest {
    pub message: String,
    pub content: String,
    pub branch: String,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}` for an existing file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateFileRequest {
    pub message: String,
    pub content: String,
    /// Revision handle of the version being replaced
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct PutFileContent {
    pub path: String,
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct PutFileCommit {
    pub sha: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Response of a create or update
#[derive(Debug, Clone, Deserialize)]
pub(super) struct PutFileResponse {
    #[serde(default)]
    pub content: Option<PutFileContent>,
    pub commit: PutFileCommit,
}

/// What a successful write left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    pub path: String,
    /// Revision handle of the newly stored version
    pub revision_handle: Option<String>,
    pub commit_sha: String,
    pub commit_url: Option<String>,
    pub created: bool,
}

impl PutFileResponse {
    pub(super) fn into_receipt(self, path: &str, created: bool) -> WriteReceipt {
        WriteReceipt {
            path: self
                .content
                .as_ref()
                .map(|c| c.path.clone())
                .unwrap_or_else(|| path.to_string()),
            revision_handle: self.content.map(|c| c.sha),
            commit_sha: self.commit.sha,
            commit_url: self.commit.html_url,
            created,
        }
    }
}
