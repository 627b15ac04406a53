//! One run: skip check, generate, publish, record.

use chrono::{DateTime, Utc};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::generator::Generator;
use super::history::{append_if_absent, HistoryTracker};
use super::parser::default_file_name;
use super::publisher::Publisher;
use super::skip::SkipPolicy;
use crate::api::{CompletionApi, ContentsApi, WriteReceipt};
use crate::config::Config;
use crate::domain::{GenerationResult, RepoRef, RepositoryFile};
use crate::error::{GenerationError, PublishError};

/// How a run ended, short of a publish error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Skipped,
    GenerationFailed(GenerationError),
    Published {
        artifact: WriteReceipt,
        /// `None` when history tracking is off; otherwise whether a line was added
        history_changed: Option<bool>,
    },
}

pub struct Pipeline<'a, C: CompletionApi, H: ContentsApi> {
    config: &'a Config,
    completion: &'a C,
    hosting: &'a H,
    skip: &'a dyn SkipPolicy,
}

impl<'a, C: CompletionApi, H: ContentsApi> Pipeline<'a, C, H> {
    pub fn new(
        config: &'a Config,
        completion: &'a C,
        hosting: &'a H,
        skip: &'a dyn SkipPolicy,
    ) -> Self {
        Self {
            config,
            completion,
            hosting,
            skip,
        }
    }

    /// Execute one run. Nothing is retried; a publish error ends the run.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<RunOutcome, PublishError> {
        let span = info_span!("run", run_id = %Uuid::new_v4());
        self.run_inner(now).instrument(span).await
    }

    async fn run_inner(&self, now: DateTime<Utc>) -> Result<RunOutcome, PublishError> {
        if self.skip.should_skip() {
            info!("Skipping today's commit to keep activity irregular");
            return Ok(RunOutcome::Skipped);
        }

        let repo_info = self.hosting.get_repository(&self.config.repo).await?;
        if let Some(default_branch) = &repo_info.default_branch {
            if default_branch != &self.config.branch {
                // Listings read the default branch, so existing files on other branches are not seen.
                warn!(
                    "Creating files on {} but {} defaults to {}",
                    self.config.branch, self.config.repo, default_branch
                );
            }
        }
        let repo = RepoRef::new(repo_info.owner.login, repo_info.name);
        info!("Publishing to {}", repo);

        let history = if self.config.history_enabled {
            let tracker = HistoryTracker::new(self.hosting, &repo, &self.config.history_path);
            Some(tracker.read_history().await?)
        } else {
            None
        };

        let generator = Generator::new(self.completion, &self.config.generation);
        let history_text = history.as_ref().map(|h| h.raw_text.as_str());
        let snippet = match generator.generate(history_text, now).await {
            GenerationResult::Generated(snippet) => snippet,
            GenerationResult::Failed { error, placeholder } => {
                warn!("Generator produced no usable code; skipping commit");
                debug!("Discarded placeholder {}", placeholder.file_name);
                return Ok(RunOutcome::GenerationFailed(error));
            }
        };

        let mut file_name = snippet.file_name;
        let mut artifact_path = self.config.artifact_path(&file_name);
        if artifact_path == self.config.history_path {
            file_name = default_file_name(now, &self.config.generation.file_extension);
            warn!(
                "Generated file name collides with {}; using {} instead",
                self.config.history_path, file_name
            );
            artifact_path = self.config.artifact_path(&file_name);
        }

        let publisher = Publisher::new(self.hosting, &repo, &self.config.branch);
        let artifact = RepositoryFile::from_text(&artifact_path, &format!("{}\n", snippet.code));
        let receipt = publisher
            .publish(&artifact.path, &artifact.content_base64)
            .await?;

        let history_changed = match history {
            Some(history) => {
                let updated = append_if_absent(
                    &history.raw_text,
                    &file_name,
                    &artifact_path,
                    now.date_naive(),
                );
                let changed = updated != history.raw_text;
                if !changed {
                    info!("{} already lists {}", self.config.history_path, file_name);
                }
                let history_file = RepositoryFile::from_text(&self.config.history_path, &updated);
                publisher
                    .publish(&history_file.path, &history_file.content_base64)
                    .await?;
                Some(changed)
            }
            None => None,
        };

        Ok(RunOutcome::Published {
            artifact: receipt,
            history_changed,
        })
    }
}
