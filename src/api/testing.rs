//! In-memory fakes of both APIs for tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::types::{
    ChatCompletionRequest, ChatCompletionResponse, ContentEntry, CreateFileRequest, FileContent,
    RepositoryInfo, RepositoryOwner, UpdateFileRequest, WriteReceipt,
};
use super::{CompletionApi, ContentsApi};
use crate::domain::RepoRef;
use crate::error::{GenerationError, PublishError};

// ============================================================================
// Local HTTP server
// ============================================================================

/// Serve `app` on an ephemeral local port; returns its base URL.
pub async fn serve(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/", addr)
}

// ============================================================================
// Completion fake
// ============================================================================

/// Completion backend that answers every request with the same canned result.
pub struct FakeCompletionApi {
    response: Result<serde_json::Value, GenerationError>,
    requests: Mutex<Vec<ChatCompletionRequest>>,
}

impl FakeCompletionApi {
    /// Answer with a chat response whose first message has this content.
    pub fn replying(content: &str) -> Self {
        Self::with_json(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        }))
    }

    pub fn with_json(json: serde_json::Value) -> Self {
        Self {
            response: Ok(json),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: GenerationError) -> Self {
        Self {
            response: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionApi for FakeCompletionApi {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        let json = self.response.clone()?;
        serde_json::from_value(json).map_err(|e| GenerationError::Malformed(e.to_string()))
    }
}

// ============================================================================
// Contents fake
// ============================================================================

/// Every call made against the fake hosting API, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostingCall {
    GetRepository,
    List(Option<String>),
    GetFile(String),
    Create {
        path: String,
        request: CreateFileRequest,
    },
    Update {
        path: String,
        request: UpdateFileRequest,
    },
}

#[derive(Debug, Clone)]
struct StoredFile {
    content_base64: String,
    sha: String,
    /// Too large to be returned inline by the contents endpoint
    oversized: bool,
}

struct FakeRepoState {
    files: BTreeMap<String, StoredFile>,
    calls: Vec<HostingCall>,
    next_sha: usize,
}

impl FakeRepoState {
    fn mint_sha(&mut self) -> String {
        self.next_sha += 1;
        format!("sha-{}", self.next_sha)
    }
}

/// Hosting backend over an in-memory file map with conditional updates.
pub struct FakeContentsApi {
    repo: RepoRef,
    state: Mutex<FakeRepoState>,
    fail_writes: Option<PublishError>,
}

impl FakeContentsApi {
    pub fn new(repo: RepoRef) -> Self {
        Self {
            repo,
            state: Mutex::new(FakeRepoState {
                files: BTreeMap::new(),
                calls: Vec::new(),
                next_sha: 0,
            }),
            fail_writes: None,
        }
    }

    /// Seed a file; it gets a fresh revision handle.
    pub fn with_file(self, path: &str, text: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let sha = state.mint_sha();
            state.files.insert(
                path.to_string(),
                StoredFile {
                    content_base64: STANDARD.encode(text.as_bytes()),
                    sha,
                    oversized: false,
                },
            );
        }
        self
    }

    /// Seed a file that `get_file` reports without inline content.
    pub fn with_oversized_file(self, path: &str, text: &str) -> Self {
        let this = self.with_file(path, text);
        if let Some(file) = this.state.lock().unwrap().files.get_mut(path) {
            file.oversized = true;
        }
        this
    }

    /// Make every create/update fail with this error.
    pub fn failing_writes(mut self, error: PublishError) -> Self {
        self.fail_writes = Some(error);
        self
    }

    /// Simulate a concurrent writer replacing a file behind our back.
    pub fn touch(&self, path: &str) {
        let mut state = self.state.lock().unwrap();
        let sha = state.mint_sha();
        if let Some(file) = state.files.get_mut(path) {
            file.sha = sha;
        }
    }

    pub fn calls(&self) -> Vec<HostingCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Create and update calls only.
    pub fn writes(&self) -> Vec<HostingCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, HostingCall::Create { .. } | HostingCall::Update { .. }))
            .collect()
    }

    pub fn sha_of(&self, path: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(path)
            .map(|f| f.sha.clone())
    }

    pub fn file_text(&self, path: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        let file = state.files.get(path)?;
        let bytes = STANDARD.decode(&file.content_base64).ok()?;
        String::from_utf8(bytes).ok()
    }

    fn check_repo(&self, repo: &RepoRef) -> Result<(), PublishError> {
        if repo == &self.repo {
            Ok(())
        } else {
            Err(PublishError::NotFound(repo.to_string()))
        }
    }
}

fn parent_dir(path: &str) -> Option<&str> {
    path.rsplit_once('/').map(|(dir, _)| dir)
}

/// Wrap base64 at 60 columns the way GitHub returns file content.
fn wrap_base64(encoded: &str) -> String {
    encoded
        .as_bytes()
        .chunks(60)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl ContentsApi for FakeContentsApi {
    async fn get_repository(&self, repo: &RepoRef) -> Result<RepositoryInfo, PublishError> {
        self.state.lock().unwrap().calls.push(HostingCall::GetRepository);
        self.check_repo(repo)?;
        Ok(RepositoryInfo {
            name: self.repo.name.clone(),
            owner: RepositoryOwner {
                login: self.repo.owner.clone(),
            },
            default_branch: Some("main".to_string()),
        })
    }

    async fn list_contents(
        &self,
        repo: &RepoRef,
        dir: Option<&str>,
    ) -> Result<Vec<ContentEntry>, PublishError> {
        self.check_repo(repo)?;
        let mut state = self.state.lock().unwrap();
        state.calls.push(HostingCall::List(dir.map(str::to_string)));
        Ok(state
            .files
            .iter()
            .filter(|(path, _)| parent_dir(path) == dir)
            .map(|(path, file)| ContentEntry {
                name: path.rsplit('/').next().unwrap_or(path).to_string(),
                path: path.clone(),
                sha: file.sha.clone(),
                entry_type: "file".to_string(),
            })
            .collect())
    }

    async fn get_file(
        &self,
        repo: &RepoRef,
        path: &str,
    ) -> Result<Option<FileContent>, PublishError> {
        self.check_repo(repo)?;
        let mut state = self.state.lock().unwrap();
        state.calls.push(HostingCall::GetFile(path.to_string()));
        Ok(state.files.get(path).map(|file| {
            let (content, encoding) = if file.oversized {
                (String::new(), "none")
            } else {
                (wrap_base64(&file.content_base64), "base64")
            };
            FileContent {
                path: path.to_string(),
                sha: file.sha.clone(),
                content: Some(content),
                encoding: Some(encoding.to_string()),
            }
        }))
    }

    async fn create_file(
        &self,
        repo: &RepoRef,
        path: &str,
        request: &CreateFileRequest,
    ) -> Result<WriteReceipt, PublishError> {
        self.check_repo(repo)?;
        let mut state = self.state.lock().unwrap();
        state.calls.push(HostingCall::Create {
            path: path.to_string(),
            request: request.clone(),
        });
        if let Some(err) = &self.fail_writes {
            return Err(err.clone());
        }
        if state.files.contains_key(path) {
            return Err(PublishError::StaleRevision {
                path: path.to_string(),
                status: 422,
            });
        }

        let sha = state.mint_sha();
        state.files.insert(
            path.to_string(),
            StoredFile {
                content_base64: request.content.clone(),
                sha: sha.clone(),
                oversized: false,
            },
        );
        Ok(WriteReceipt {
            path: path.to_string(),
            revision_handle: Some(sha),
            commit_sha: format!("commit-{}", state.next_sha),
            commit_url: None,
            created: true,
        })
    }

    async fn update_file(
        &self,
        repo: &RepoRef,
        path: &str,
        request: &UpdateFileRequest,
    ) -> Result<WriteReceipt, PublishError> {
        self.check_repo(repo)?;
        let mut state = self.state.lock().unwrap();
        state.calls.push(HostingCall::Update {
            path: path.to_string(),
            request: request.clone(),
        });
        if let Some(err) = &self.fail_writes {
            return Err(err.clone());
        }
        let current = state.files.get(path).map(|f| f.sha.clone());
        if current.as_deref() != Some(request.sha.as_str()) {
            return Err(PublishError::StaleRevision {
                path: path.to_string(),
                status: 409,
            });
        }

        let sha = state.mint_sha();
        state.files.insert(
            path.to_string(),
            StoredFile {
                content_base64: request.content.clone(),
                sha: sha.clone(),
                oversized: false,
            },
        );
        Ok(WriteReceipt {
            path: path.to_string(),
            revision_handle: Some(sha),
            commit_sha: format!("commit-{}", state.next_sha),
            commit_url: None,
            created: false,
        })
    }
}
