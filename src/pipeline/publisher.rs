//! Upsert of a single file through the hosting API.

use tracing::{debug, info};

use crate::api::{ContentsApi, CreateFileRequest, UpdateFileRequest, WriteReceipt};
use crate::domain::{RepoRef, RepositoryFile};
use crate::error::PublishError;

/// Creates or updates files in one repository.
pub struct Publisher<'a, H: ContentsApi> {
    hosting: &'a H,
    repo: &'a RepoRef,
    branch: &'a str,
}

impl<'a, H: ContentsApi> Publisher<'a, H> {
    pub fn new(hosting: &'a H, repo: &'a RepoRef, branch: &'a str) -> Self {
        Self {
            hosting,
            repo,
            branch,
        }
    }

    /// Write `content_base64` at `path`, updating the file if it already exists.
    pub async fn publish(
        &self,
        path: &str,
        content_base64: &str,
    ) -> Result<WriteReceipt, PublishError> {
        let file = self.resolve(RepositoryFile::new(path, content_base64)).await?;
        self.write(&file).await
    }

    /// Look up the file's current revision handle from its directory listing.
    async fn resolve(&self, file: RepositoryFile) -> Result<RepositoryFile, PublishError> {
        let entries = self.hosting.list_contents(self.repo, file.directory()).await?;
        let revision = entries
            .into_iter()
            .find(|entry| entry.entry_type != "dir" && entry.name == file.file_name())
            .map(|entry| {
                debug!("Found {} at revision {}", entry.path, entry.sha);
                entry.sha
            });
        Ok(file.with_revision(revision))
    }

    /// Conditional update when a revision handle is present, create otherwise.
    async fn write(&self, file: &RepositoryFile) -> Result<WriteReceipt, PublishError> {
        let name = file.file_name();
        let receipt = match &file.revision_handle {
            Some(sha) => {
                let request = UpdateFileRequest {
                    message: format!("Updating {}", name),
                    content: file.content_base64.clone(),
                    sha: sha.clone(),
                };
                self.hosting
                    .update_file(self.repo, &file.path, &request)
                    .await?
            }
            None => {
                let request = CreateFileRequest {
                    message: format!("Adding {}", name),
                    content: file.content_base64.clone(),
                    branch: self.branch.to_string(),
                };
                self.hosting
                    .create_file(self.repo, &file.path, &request)
                    .await?
            }
        };

        debug!("New revision of {}: {:?}", receipt.path, receipt.revision_handle);
        info!(
            "{} {} in {} (commit {})",
            if receipt.created { "Created" } else { "Updated" },
            receipt.path,
            self.repo,
            receipt.commit_sha
        );
        Ok(receipt)
    }
}
