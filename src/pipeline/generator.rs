//! Prompt construction and the call to the completion API.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::parser::{default_file_name, parse_response};
use crate::api::{ChatCompletionRequest, ChatMessage, CompletionApi};
use crate::config::{FileNaming, GenerationSettings};
use crate::domain::{GenerationRequest, GenerationResult, Snippet};
use crate::error::GenerationError;

const SYSTEM_INSTRUCTION: &str = "You are a code generator. Reply with pure code only: no \
explanations, no markdown fences. Put the file name between [fileName] and [/fileName], then \
put the complete source file between [code] and [/code]. Comments inside the code are welcome.";

/// Builds prompts and turns completion responses into a [`GenerationResult`].
pub struct Generator<'a, C: CompletionApi> {
    client: &'a C,
    settings: &'a GenerationSettings,
}

impl<'a, C: CompletionApi> Generator<'a, C> {
    pub fn new(client: &'a C, settings: &'a GenerationSettings) -> Self {
        Self { client, settings }
    }

    /// Build the user prompt for this run.
    pub fn build_request(&self, history: Option<&str>, now: DateTime<Utc>) -> GenerationRequest {
        let mut prompt_text = format!(
            "Today is {} (timestamp {}). Generate a unique, fun, and executable {} code \
             snippet for 'Code of the Day'. The code should be simple yet interesting. Include \
             comments explaining its functionality. Use a descriptive file name ending in .{}.",
            now.format("%Y-%m-%d"),
            now.to_rfc3339(),
            self.settings.language,
            self.settings.file_extension,
        );

        let history_context = history
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string);

        if let Some(history) = &history_context {
            prompt_text.push_str(
                "\n\nThese snippets have already been published. Do not repeat any of their \
                 topics or file names:\n",
            );
            prompt_text.push_str(history);
        }

        GenerationRequest {
            prompt_text,
            history_context,
        }
    }

    fn to_chat_request(&self, request: &GenerationRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_INSTRUCTION),
                ChatMessage::user(request.prompt_text.clone()),
            ],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        }
    }

    /// Generate one snippet. Failures come back as [`GenerationResult::Failed`].
    pub async fn generate(&self, history: Option<&str>, now: DateTime<Utc>) -> GenerationResult {
        let request = self.build_request(history, now);
        if let Some(history) = &request.history_context {
            debug!("Prompt includes {} bytes of history", history.len());
        }

        let result = match self.try_generate(&request, now).await {
            Ok(snippet) => GenerationResult::Generated(snippet),
            Err(error) => GenerationResult::failed(error, now),
        };

        let snippet = result.snippet();
        if result.succeeded() {
            info!(
                "Generated {} ({} bytes of code)",
                snippet.file_name,
                snippet.code.len()
            );
        } else {
            warn!("{}", snippet.code);
        }
        result
    }

    async fn try_generate(
        &self,
        request: &GenerationRequest,
        now: DateTime<Utc>,
    ) -> Result<Snippet, GenerationError> {
        let response = self.client.complete(&self.to_chat_request(request)).await?;

        if let Some(model) = &response.model {
            debug!("Answered by {}", model);
        }
        let truncated = response
            .choices
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            == Some("length");
        if truncated {
            warn!(
                "Response hit max_tokens ({}); the code block may be incomplete",
                self.settings.max_tokens
            );
        }

        let raw = response.first_text().ok_or(GenerationError::NoChoices)?;
        if raw.map_or(true, |text| text.trim().is_empty()) {
            return Err(GenerationError::EmptyResponse);
        }
        debug!("Raw response: {:?}", raw);

        let parsed = parse_response(raw, now, &self.settings.file_extension);
        if parsed.code.is_empty() {
            return Err(GenerationError::EmptyCode);
        }

        let file_name = match self.settings.file_naming {
            FileNaming::FromResponse => parsed.file_name,
            FileNaming::DateStamped => default_file_name(now, &self.settings.file_extension),
        };

        Ok(Snippet {
            file_name,
            code: parsed.code,
        })
    }
}
