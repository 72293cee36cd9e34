// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! In-memory collaborators that record every call.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    error::Error,
    issues::{IssueQuery, IssueRecord, IssueSource},
    publish::{FileWrite, RemoteFileStore},
    settings::RepositoryId
};

/// Issue source returning a fixed snapshot.
#[derive(Debug, Default)]
pub struct FakeIssueSource {
    issues:  Vec<IssueRecord>,
    fail:    bool,
    queries: Mutex<Vec<(String, IssueQuery)>>
}

impl FakeIssueSource {
    pub fn new(issues: Vec<IssueRecord>) -> Self {
        Self {
            issues,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn queries(&self) -> Vec<(String, IssueQuery)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueSource for FakeIssueSource {
    async fn list_issues(
        &self,
        repository: &RepositoryId,
        query: &IssueQuery
    ) -> Result<Vec<IssueRecord>, Error> {
        self.queries
            .lock()
            .unwrap()
            .push((repository.to_string(), *query));
        if self.fail {
            return Err(Error::fetch("issue listing unavailable"));
        }
        Ok(self.issues.clone())
    }
}

/// File store holding at most one existing sha.
#[derive(Debug, Default)]
pub struct FakeFileStore {
    existing_sha: Option<String>,
    fail_lookup:  bool,
    fail_write:   bool,
    lookups:      Mutex<Vec<String>>,
    writes:       Mutex<Vec<FileWrite>>
}

impl FakeFileStore {
    pub fn with_existing(sha: &str) -> Self {
        Self {
            existing_sha: Some(sha.to_owned()),
            ..Self::default()
        }
    }

    pub fn failing_lookup() -> Self {
        Self {
            fail_lookup: true,
            ..Self::default()
        }
    }

    pub fn failing_write() -> Self {
        Self {
            fail_write: true,
            ..Self::default()
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<FileWrite> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteFileStore for FakeFileStore {
    async fn file_sha(
        &self,
        _repository: &RepositoryId,
        path: &str,
        _branch: Option<&str>
    ) -> Result<Option<String>, Error> {
        self.lookups.lock().unwrap().push(path.to_owned());
        if self.fail_lookup {
            return Err(Error::fetch("connection reset"));
        }
        Ok(self.existing_sha.clone())
    }

    async fn put_file(&self, _repository: &RepositoryId, write: FileWrite) -> Result<(), Error> {
        if self.fail_write {
            return Err(Error::publish_write("409 sha does not match"));
        }
        self.writes.lock().unwrap().push(write);
        Ok(())
    }
}
