// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Writes the rendered report locally and commits it to the repository.
//!
//! The remote write is a single create-or-update call. An update carries the
//! previous blob sha so the storage rejects concurrent writers; nothing here
//! retries.

use std::{fs, path::Path};

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    error::{self, Error},
    settings::RepositoryId
};

/// Identity recorded as both committer and author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Committer {
    /// Display name.
    pub name:  String,
    /// E-mail address.
    pub email: String
}

impl Committer {
    /// Builds an identity when both parts are present and non-blank.
    ///
    /// Returns `None` otherwise, which disables the remote publish.
    pub fn from_parts(email: Option<&str>, name: Option<&str>) -> Option<Self> {
        let email = email.map(str::trim).filter(|value| !value.is_empty())?;
        let name = name.map(str::trim).filter(|value| !value.is_empty())?;
        Some(Self {
            name:  name.to_owned(),
            email: email.to_owned()
        })
    }
}

/// Create-or-update request for a repository file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWrite {
    /// Repository-relative path.
    pub path:      String,
    /// Commit message.
    pub message:   String,
    /// Raw file content; the store is responsible for transport encoding.
    pub content:   String,
    /// Committer and author identity.
    pub committer: Committer,
    /// Sha of the version being replaced. `None` creates the file.
    pub sha:       Option<String>,
    /// Target branch. `None` uses the repository default.
    pub branch:    Option<String>
}

/// Remote file storage used for publishing.
#[async_trait]
pub trait RemoteFileStore: Send + Sync {
    /// Looks up the sha of the file at `path`, `Ok(None)` when it does not
    /// exist.
    async fn file_sha(
        &self,
        repository: &RepositoryId,
        path: &str,
        branch: Option<&str>
    ) -> Result<Option<String>, Error>;

    /// Creates the file when `write.sha` is `None`, updates it otherwise.
    async fn put_file(&self, repository: &RepositoryId, write: FileWrite) -> Result<(), Error>;
}

/// What the publish step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// No committer identity was configured; only the local file was written.
    Skipped,
    /// The file did not exist remotely and was created.
    Created,
    /// The existing remote file was replaced.
    Updated {
        /// Sha of the replaced version.
        previous_sha: String
    }
}

/// Commit message used for every publish.
pub fn commit_message(path: &str) -> String {
    format!("Updating {path}")
}

/// Decides between create and update and performs the writes.
#[derive(Debug)]
pub struct PublishCoordinator<'a, S> {
    store:      &'a S,
    repository: &'a RepositoryId,
    branch:     Option<&'a str>
}

impl<'a, S> PublishCoordinator<'a, S>
where
    S: RemoteFileStore
{
    /// Creates a coordinator publishing to `repository` through `store`.
    pub fn new(store: &'a S, repository: &'a RepositoryId) -> Self {
        Self {
            store,
            repository,
            branch: None
        }
    }

    /// Targets `branch` instead of the repository default.
    pub fn with_branch(mut self, branch: Option<&'a str>) -> Self {
        self.branch = branch;
        self
    }

    /// Writes `content` to `local_path`, then commits it to `path`.
    ///
    /// The local write always happens first and completes before any remote
    /// call. Without a committer the remote write is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LocalWrite`](Error::LocalWrite) when the local file
    /// cannot be written and [`Error::PublishWrite`](Error::PublishWrite) when
    /// the create-or-update call fails. A failed lookup is not an error; it
    /// selects the create path.
    pub async fn publish(
        &self,
        content: &str,
        path: &str,
        local_path: &Path,
        committer: Option<&Committer>
    ) -> Result<PublishOutcome, Error> {
        write_local(local_path, content)?;
        info!("Wrote summary to {}", local_path.display());

        let Some(committer) = committer else {
            warn!(
                "Missing COMMITTER_EMAIL or COMMITTER_NAME, skipping commit of {} to {}",
                path, self.repository
            );
            return Ok(PublishOutcome::Skipped);
        };

        let previous_sha = match self.store.file_sha(self.repository, path, self.branch).await {
            Ok(sha) => sha,
            Err(error) => {
                debug!("Lookup of {path} failed, creating it instead: {error}");
                None
            }
        };

        let write = FileWrite {
            path:      path.to_owned(),
            message:   commit_message(path),
            content:   content.to_owned(),
            committer: committer.clone(),
            sha:       previous_sha.clone(),
            branch:    self.branch.map(str::to_owned)
        };
        self.store.put_file(self.repository, write).await?;

        match previous_sha {
            Some(previous_sha) => {
                info!("Updated {} in {} (was {})", path, self.repository, previous_sha);
                Ok(PublishOutcome::Updated {
                    previous_sha
                })
            }
            None => {
                info!("Created {} in {}", path, self.repository);
                Ok(PublishOutcome::Created)
            }
        }
    }
}

fn write_local(path: &Path, content: &str) -> Result<(), Error> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|source| error::local_write_error(path, source))?;
    }

    fs::write(path, content).map_err(|source| error::local_write_error(path, source))
}
