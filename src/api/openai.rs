//! Chat completion client.
//!
//! Talks to any endpoint that speaks the OpenAI `chat/completions` shape.

use async_trait::async_trait;
use reqwest::Method;
use std::time::Duration;
use tracing::{debug, error};

use super::http::{error_body, HttpClient};
use super::types::{ChatCompletionRequest, ChatCompletionResponse};
use super::CompletionApi;
use crate::error::GenerationError;

const CHAT_COMPLETIONS_ENDPOINT: &str = "chat/completions";

#[derive(Debug)]
pub struct OpenAiClient {
    http: HttpClient,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        Ok(Self {
            http: HttpClient::new(api_key, timeout)?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl CompletionApi for OpenAiClient {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, GenerationError> {
        let url = HttpClient::build_url(&self.base_url, CHAT_COMPLETIONS_ENDPOINT)
            .map_err(|e| GenerationError::Transport(format!("invalid base URL: {}", e)))?;

        debug!("Model: {}, max_tokens: {}", request.model, request.max_tokens);

        let response = self
            .http
            .request(Method::POST, url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        debug!("=== API Response ===");
        debug!("Status: {}", status);

        if !status.is_success() {
            let body = error_body(response).await;
            error!("Completion request failed with status {}: {}", status, body);
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        serde_json::from_str(&response_text).map_err(|e| GenerationError::Malformed(e.to_string()))
    }
}
