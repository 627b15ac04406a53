//! GitHub REST client for repository and contents endpoints.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::http::{error_body, HttpClient};
use super::types::{
    ContentEntry, CreateFileRequest, FileContent, PutFileResponse, RepositoryInfo,
    UpdateFileRequest, WriteReceipt,
};
use super::ContentsApi;
use crate::domain::RepoRef;
use crate::error::PublishError;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

#[derive(Debug)]
pub struct GitHubClient {
    http: HttpClient,
    base_url: String,
}

impl GitHubClient {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        Ok(Self {
            http: HttpClient::new(token, timeout)?,
            base_url: base_url.into(),
        })
    }

    fn url(&self, endpoint: &str) -> Result<Url, PublishError> {
        HttpClient::build_url(&self.base_url, endpoint)
            .map_err(|e| PublishError::Transport(format!("invalid URL for {}: {}", endpoint, e)))
    }

    /// URL of a contents path, with each segment percent-encoded.
    fn contents_url(&self, repo: &RepoRef, path: &str) -> Result<Url, PublishError> {
        let mut url = self.url(&contents_endpoint(repo))?;
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if !segments.is_empty() {
            url.path_segments_mut()
                .map_err(|_| PublishError::Transport("base URL cannot carry a path".to_string()))?
                .pop_if_empty()
                .extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("Accept", GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }

    /// Send a request; `Ok(None)` on 404, parsed body on success.
    async fn send_optional<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: Option<&str>,
    ) -> Result<Option<T>, PublishError> {
        let response = request
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        let status = response.status();
        debug!("=== API Response ===");
        debug!("Status: {}", status);

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = error_body(response).await;
            return Err(PublishError::from_http_response(status.as_u16(), &body, path));
        }

        let text = response
            .text()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| PublishError::Decode(e.to_string()))
    }

    /// Send a request where 404 is an error like any other.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
        path: Option<&str>,
    ) -> Result<T, PublishError> {
        self.send_optional(request, path)
            .await?
            .ok_or_else(|| PublishError::NotFound(what.to_string()))
    }
}

fn contents_endpoint(repo: &RepoRef) -> String {
    format!("repos/{}/{}/contents/", repo.owner, repo.name)
}

#[async_trait]
impl ContentsApi for GitHubClient {
    async fn get_repository(&self, repo: &RepoRef) -> Result<RepositoryInfo, PublishError> {
        let url = self.url(&format!("repos/{}/{}", repo.owner, repo.name))?;
        self.send(self.request(Method::GET, url), &repo.to_string(), None)
            .await
    }

    async fn list_contents(
        &self,
        repo: &RepoRef,
        dir: Option<&str>,
    ) -> Result<Vec<ContentEntry>, PublishError> {
        let url = self.contents_url(repo, dir.unwrap_or(""))?;
        // An empty repository or a directory that does not exist yet both answer 404.
        let entries = self
            .send_optional::<Vec<ContentEntry>>(self.request(Method::GET, url), None)
            .await?;
        Ok(entries.unwrap_or_default())
    }

    async fn get_file(
        &self,
        repo: &RepoRef,
        path: &str,
    ) -> Result<Option<FileContent>, PublishError> {
        let url = self.contents_url(repo, path)?;
        self.send_optional(self.request(Method::GET, url), None)
            .await
    }

    async fn create_file(
        &self,
        repo: &RepoRef,
        path: &str,
        request: &CreateFileRequest,
    ) -> Result<WriteReceipt, PublishError> {
        let url = self.contents_url(repo, path)?;
        let response: PutFileResponse = self
            .send(
                self.request(Method::PUT, url).json(request),
                path,
                Some(path),
            )
            .await?;
        Ok(response.into_receipt(path, true))
    }

    async fn update_file(
        &self,
        repo: &RepoRef,
        path: &str,
        request: &UpdateFileRequest,
    ) -> Result<WriteReceipt, PublishError> {
        let url = self.contents_url(repo, path)?;
        let response: PutFileResponse = self
            .send(
                self.request(Method::PUT, url).json(request),
                path,
                Some(path),
            )
            .await?;
        Ok(response.into_receipt(path, false))
    }
}
