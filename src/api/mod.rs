//! Clients for the completion API and the GitHub contents API.
//!
//! The pipeline only sees the [`CompletionApi`] and [`ContentsApi`] traits,
//! so tests can swap in the in-memory fakes from `testing`.

mod github;
mod http;
mod openai;
#[cfg(test)]
pub mod testing;
mod types;

pub use github::GitHubClient;
pub use openai::OpenAiClient;
pub use types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ContentEntry, CreateFileRequest,
    FileContent, RepositoryInfo, UpdateFileRequest, WriteReceipt,
};

use async_trait::async_trait;

use crate::domain::RepoRef;
use crate::error::{GenerationError, PublishError};

/// Text-generation backend.
#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// Send one chat completion request.
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, GenerationError>;
}

/// Source-hosting backend.
///
/// Writes are split into create and update so that the presence of a
/// revision handle is visible in the call itself. The host rejects an update
/// whose handle no longer matches the stored file.
#[async_trait]
pub trait ContentsApi: Send + Sync {
    async fn get_repository(&self, repo: &RepoRef) -> Result<RepositoryInfo, PublishError>;

    /// List a directory (the root when `dir` is `None`). Missing directories list as empty.
    async fn list_contents(
        &self,
        repo: &RepoRef,
        dir: Option<&str>,
    ) -> Result<Vec<ContentEntry>, PublishError>;

    /// Fetch a single file, or `None` if it does not exist.
    async fn get_file(&self, repo: &RepoRef, path: &str)
        -> Result<Option<FileContent>, PublishError>;

    async fn create_file(
        &self,
        repo: &RepoRef,
        path: &str,
        request: &CreateFileRequest,
    ) -> Result<WriteReceipt, PublishError>;

    async fn update_file(
        &self,
        repo: &RepoRef,
        path: &str,
        request: &UpdateFileRequest,
    ) -> Result<WriteReceipt, PublishError>;
}
