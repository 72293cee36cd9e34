// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Issue records consumed by the aggregation stage and the collaborator seam
//! that supplies them.
//!
//! The core never filters by issue state. Whatever [`IssueSource`] returns is
//! counted, so the scope of the dashboard is decided entirely by the
//! [`IssueQuery`] handed to the source.

use std::{fmt, str::FromStr};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{error::Error, settings::RepositoryId};

/// Label attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueLabel {
    /// Label name as shown in the tracker.
    pub name: String
}

/// User assigned to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueAssignee {
    /// Account login of the assignee.
    pub login: String
}

/// Snapshot of a single issue as supplied by the issue tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Issue number within the repository.
    pub number:    u64,
    /// Labels attached to the issue, possibly empty.
    #[serde(default)]
    pub labels:    Vec<IssueLabel>,
    /// Assignees of the issue, possibly empty.
    #[serde(default)]
    pub assignees: Vec<IssueAssignee>
}

impl IssueRecord {
    /// Creates an issue without labels or assignees.
    pub fn new(number: u64) -> Self {
        Self {
            number,
            ..Self::default()
        }
    }

    /// Replaces the labels of the issue.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>
    {
        self.labels = labels
            .into_iter()
            .map(|name| IssueLabel {
                name: name.into()
            })
            .collect();
        self
    }

    /// Replaces the assignees of the issue.
    pub fn with_assignees<I, S>(mut self, assignees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>
    {
        self.assignees = assignees
            .into_iter()
            .map(|login| IssueAssignee {
                login: login.into()
            })
            .collect();
        self
    }
}

/// Issue state requested from the tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    /// Only open issues. The rendered deep links assume this scope.
    #[default]
    Open,
    /// Only closed issues.
    Closed,
    /// Open and closed issues.
    All
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all"
        };
        f.write_str(value)
    }
}

impl FromStr for IssueState {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "all" => Ok(Self::All),
            other => Err(Error::config(format!(
                "issue state must be one of open, closed, all; got '{other}'"
            )))
        }
    }
}

/// Scope of the issue listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssueQuery {
    /// Issue state filter applied by the tracker.
    pub state:                 IssueState,
    /// Whether pull requests, which the tracker lists as issues, are counted.
    pub include_pull_requests: bool
}

/// Supplies the issues of a repository.
///
/// Pagination and transient failures are the implementation's concern. A
/// returned error is fatal for the run.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Lists every issue of `repository` matching `query`.
    async fn list_issues(
        &self,
        repository: &RepositoryId,
        query: &IssueQuery
    ) -> Result<Vec<IssueRecord>, Error>;
}
