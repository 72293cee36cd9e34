// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! GitHub REST collaborator backed by octocrab.
//!
//! Implements [`IssueSource`] over the issues API and [`RemoteFileStore`]
//! over the contents API. Content is base64-encoded by octocrab.

use async_trait::async_trait;
use octocrab::{
    Octocrab,
    models::{
        issues::Issue,
        repos::{CommitAuthor, Content},
    },
    params,
};
use tracing::{debug, info};

use crate::{
    error::Error,
    issues::{IssueAssignee, IssueLabel, IssueQuery, IssueRecord, IssueSource, IssueState},
    publish::{FileWrite, RemoteFileStore},
    retry::{RetryConfig, retry_with_backoff},
    settings::RepositoryId,
};

const ISSUES_PER_PAGE: u8 = 100;
const NOT_FOUND: u16 = 404;

/// Authenticated GitHub API client.
#[derive(Clone,)]
pub struct GitHubClient
{
    octocrab: Octocrab,
    retry:    RetryConfig,
}

impl GitHubClient
{
    /// Builds a client authenticated with a personal access token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Environment`](Error::Environment) when the client
    /// cannot be constructed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use issue_summary::GitHubClient;
    ///
    /// # async fn example() -> Result<(), issue_summary::Error> {
    /// let token = std::env::var("PAT_FOR_ISSUES",).unwrap_or_default();
    /// let client = GitHubClient::new(&token,)?;
    /// # let _ = client;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(token: &str,) -> Result<Self, Error,>
    {
        let octocrab = Octocrab::builder().personal_token(token,).build().map_err(|e| {
            Error::environment(format!("failed to initialize GitHub client: {e}"),)
        },)?;

        Ok(Self {
            octocrab,
            retry: RetryConfig::default(),
        },)
    }

    /// Replaces the retry policy applied to issue listing.
    pub fn with_retry(mut self, retry: RetryConfig,) -> Self
    {
        self.retry = retry;
        self
    }
}

fn state_param(state: IssueState,) -> params::State
{
    match state {
        IssueState::Open => params::State::Open,
        IssueState::Closed => params::State::Closed,
        IssueState::All => params::State::All,
    }
}

/// The issues API lists pull requests too; they are kept only on request.
fn keep_issue(issue: &Issue, query: &IssueQuery,) -> bool
{
    query.include_pull_requests || issue.pull_request.is_none()
}

fn to_issue_record(issue: Issue,) -> IssueRecord
{
    IssueRecord {
        number:    issue.number,
        labels:    issue
            .labels
            .into_iter()
            .map(|label| IssueLabel {
                name: label.name,
            },)
            .collect(),
        assignees: issue
            .assignees
            .into_iter()
            .map(|author| IssueAssignee {
                login: author.login,
            },)
            .collect(),
    }
}

#[async_trait]
impl IssueSource for GitHubClient
{
    async fn list_issues(
        &self,
        repository: &RepositoryId,
        query: &IssueQuery,
    ) -> Result<Vec<IssueRecord,>, Error,>
    {
        debug!("Listing {} issues for {}", query.state, repository);

        let operation = format!("list issues for {repository}");
        let issues: Vec<Issue,> = retry_with_backoff(&self.retry, &operation, move || async move {
            let first_page = self
                .octocrab
                .issues(repository.owner(), repository.name(),)
                .list()
                .state(state_param(query.state,),)
                .per_page(ISSUES_PER_PAGE,)
                .send()
                .await?;
            self.octocrab.all_pages(first_page,).await
        },)
        .await
        .map_err(|e| Error::fetch(format!("{repository}: {e}"),),)?;

        let listed = issues.len();
        let records: Vec<IssueRecord,> = issues
            .into_iter()
            .filter(|issue| keep_issue(issue, query,),)
            .map(to_issue_record,)
            .collect();

        info!(
            "Fetched {} issues for {} ({} pull requests skipped)",
            records.len(),
            repository,
            listed - records.len()
        );

        Ok(records,)
    }
}

#[async_trait]
impl RemoteFileStore for GitHubClient
{
    async fn file_sha(
        &self,
        repository: &RepositoryId,
        path: &str,
        branch: Option<&str,>,
    ) -> Result<Option<String,>, Error,>
    {
        let repos = self.octocrab.repos(repository.owner(), repository.name(),);
        let mut request = repos.get_content().path(path,);
        if let Some(branch,) = branch {
            request = request.r#ref(branch,);
        }

        match request.send().await {
            Ok(contents,) => Ok(matching_sha(contents.items, path,),),
            Err(error,) => lookup_failure(status_code(&error,), &error, path, repository,),
        }
    }

    async fn put_file(&self, repository: &RepositoryId, write: FileWrite,) -> Result<(), Error,>
    {
        let identity = CommitAuthor {
            name:  write.committer.name.clone(),
            email: write.committer.email.clone(),
            date:  None,
        };

        let repos = self.octocrab.repos(repository.owner(), repository.name(),);
        let request = match write.sha.as_deref() {
            Some(sha,) => repos.update_file(&write.path, &write.message, &write.content, sha,),
            None => repos.create_file(&write.path, &write.message, &write.content,),
        };
        let mut request = request.commiter(identity.clone(),).author(identity,);
        if let Some(branch,) = write.branch.as_deref() {
            request = request.branch(branch,);
        }

        request.send().await.map_err(|e| {
            Error::publish_write(format!("failed to commit {} to {repository}: {e}", write.path),)
        },)?;

        Ok((),)
    }
}

/// Sha of the entry at exactly `path`, ignoring directory listings.
fn matching_sha(items: Vec<Content,>, path: &str,) -> Option<String,>
{
    items.into_iter().find(|item| item.path == path,).map(|item| item.sha,)
}

fn status_code(error: &octocrab::Error,) -> Option<u16,>
{
    match error {
        octocrab::Error::GitHub {
            source, ..
        } => Some(source.status_code.as_u16(),),
        _ => None,
    }
}

/// A 404 means the file does not exist yet; every other failure is an error.
fn lookup_failure(
    status: Option<u16,>,
    error: &dyn std::fmt::Display,
    path: &str,
    repository: &RepositoryId,
) -> Result<Option<String,>, Error,>
{
    if status == Some(NOT_FOUND,) {
        debug!("{} does not exist in {} yet", path, repository);
        return Ok(None,);
    }
    Err(Error::fetch(format!("failed to look up {path} in {repository}: {error}"),),)
}
