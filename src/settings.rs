// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Typed run settings assembled from CLI flags and environment variables.
//!
//! Everything here is validated before the first network call so that a
//! misconfigured run fails without side effects.

use std::{fmt, path::PathBuf, str::FromStr};

use serde::Serialize;

use crate::{config::WidgetSpec, error::Error, issues::IssueQuery, publish::Committer};

/// File written locally and committed remotely when no override is given.
pub const DEFAULT_OUTPUT_FILE: &str = "issue_summary.md";

/// Repository identifier in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize,)]
pub struct RepositoryId
{
    owner: String,
    name:  String,
}

impl RepositoryId
{
    /// Parses an `owner/name` identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Environment`](Error::Environment) unless the value
    /// splits on `/` into exactly two non-empty parts.
    ///
    /// # Examples
    ///
    /// ```
    /// use issue_summary::RepositoryId;
    ///
    /// let repository = RepositoryId::parse("olicea/pokefacts",)?;
    /// assert_eq!(repository.owner(), "olicea");
    /// assert_eq!(repository.to_string(), "olicea/pokefacts");
    /// # Ok::<(), issue_summary::Error>(())
    /// ```
    pub fn parse(value: &str,) -> Result<Self, Error,>
    {
        let trimmed = value.trim();
        let parts: Vec<&str,> = trimmed.split('/',).collect();

        match parts.as_slice() {
            [owner, name,] if !owner.trim().is_empty() && !name.trim().is_empty() => Ok(Self {
                owner: owner.trim().to_owned(),
                name:  name.trim().to_owned(),
            },),
            _ => Err(Error::environment(format!(
                "repository must be in the form owner/name, for example olicea/pokefacts; got \
                 '{trimmed}'"
            ),),),
        }
    }

    /// Account or organization owning the repository.
    pub fn owner(&self,) -> &str
    {
        &self.owner
    }

    /// Repository name without the owner.
    pub fn name(&self,) -> &str
    {
        &self.name
    }
}

impl fmt::Display for RepositoryId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryId
{
    type Err = Error;

    fn from_str(value: &str,) -> Result<Self, Self::Err,>
    {
        Self::parse(value,)
    }
}

/// Fully validated settings for a single run.
#[derive(Debug, Clone,)]
pub struct Settings
{
    /// Repository whose issues are summarized and which receives the commit.
    pub repository:  RepositoryId,
    /// Repository-relative path of the report, also used locally.
    pub output_path: String,
    /// Directory the local copy of the report is written under.
    pub local_root:  PathBuf,
    /// Validated widgets in report order.
    pub widgets:     Vec<WidgetSpec,>,
    /// Commit identity. `None` disables the remote publish.
    pub committer:   Option<Committer,>,
    /// Branch receiving the commit. `None` uses the repository default.
    pub branch:      Option<String,>,
    /// Scope of the issue listing.
    pub query:       IssueQuery,
}

impl Settings
{
    /// Creates settings with default output path, local root and query.
    pub fn new(repository: RepositoryId, widgets: Vec<WidgetSpec,>,) -> Self
    {
        Self {
            repository,
            output_path: DEFAULT_OUTPUT_FILE.to_owned(),
            local_root: PathBuf::from(".",),
            widgets,
            committer: None,
            branch: None,
            query: IssueQuery::default(),
        }
    }

    /// Location of the local copy of the report.
    pub fn local_path(&self,) -> PathBuf
    {
        self.local_root.join(&self.output_path,)
    }
}

/// Normalizes the output path input, falling back to [`DEFAULT_OUTPUT_FILE`].
///
/// # Errors
///
/// Returns [`Error::Environment`](Error::Environment) when the path is
/// absolute or escapes the repository root, since the same path addresses
/// the remote file.
pub fn normalize_output_path(value: Option<&str,>,) -> Result<String, Error,>
{
    let Some(path,) = value.map(str::trim,).filter(|value| !value.is_empty(),) else {
        return Ok(DEFAULT_OUTPUT_FILE.to_owned(),);
    };

    let trimmed = path.trim_start_matches("./",);
    if trimmed.starts_with('/',) || trimmed.split('/',).any(|segment| segment == "..",) {
        return Err(Error::environment(format!(
            "output file must be a path inside the repository, got '{path}'"
        ),),);
    }

    // The same path names the local and the remote file, so it must end in a
    // file name.
    if trimmed.split('/',).any(|segment| segment.is_empty() || segment == ".",) {
        return Err(Error::environment(format!(
            "output file must name a file, not a directory, got '{path}'"
        ),),);
    }

    Ok(trimmed.to_owned(),)
}
