//! README index of published snippets.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::api::ContentsApi;
use crate::domain::{HistoryLog, RepoRef};
use crate::error::PublishError;

/// Written when the history file does not exist yet.
pub const DEFAULT_HISTORY_HEADER: &str =
    "# AI Code of the Day\nOne generated snippet per entry, newest last.\n";

/// Reads the history file from the repository.
pub struct HistoryTracker<'a, H: ContentsApi> {
    hosting: &'a H,
    repo: &'a RepoRef,
    path: &'a str,
}

impl<'a, H: ContentsApi> HistoryTracker<'a, H> {
    pub fn new(hosting: &'a H, repo: &'a RepoRef, path: &'a str) -> Self {
        Self {
            hosting,
            repo,
            path,
        }
    }

    /// Fetch the current history, or the seeded header if there is none yet.
    pub async fn read_history(&self) -> Result<HistoryLog, PublishError> {
        let Some(file) = self.hosting.get_file(self.repo, self.path).await? else {
            info!("No {} in {}; starting a new history", self.path, self.repo);
            return Ok(HistoryLog {
                raw_text: DEFAULT_HISTORY_HEADER.to_string(),
            });
        };

        let content = match (file.encoding.as_deref(), file.content.as_deref()) {
            (None | Some("base64"), Some(content)) => content,
            (encoding, _) => {
                return Err(PublishError::Decode(format!(
                    "{} is not returned inline (encoding {}); refusing to rewrite it",
                    file.path,
                    encoding.unwrap_or("none")
                )))
            }
        };
        let raw_text = decode_content(content)?;
        debug!(
            "Read {} bytes of history from {} at revision {}",
            raw_text.len(),
            file.path,
            file.sha
        );
        Ok(HistoryLog { raw_text })
    }
}

/// Decode base64 file content, ignoring the line breaks GitHub inserts.
pub fn decode_content(encoded: &str) -> Result<String, PublishError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| PublishError::Decode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| PublishError::Decode(e.to_string()))
}

/// Append an entry for `file_name` unless the history already mentions it.
///
/// `link_path` is the file's path relative to the repository root.
pub fn append_if_absent(history: &str, file_name: &str, link_path: &str, date: NaiveDate) -> String {
    if history.contains(file_name) {
        return history.to_string();
    }

    let mut updated = history.to_string();
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(&format!(
        "- [{}](./{}) ({})\n",
        file_name,
        link_path,
        date.format("%Y-%m-%d")
    ));
    updated
}
