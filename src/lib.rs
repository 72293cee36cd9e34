//! Markdown dashboard of repository issues grouped by label and assignee.
//!
//! A run validates the widget configuration, lists the repository's issues,
//! counts them per configured label and per assignee, renders a deterministic
//! markdown document and commits it back to the repository. The library keeps
//! the issue tracker and file storage behind the [`IssueSource`] and
//! [`RemoteFileStore`] traits; [`GitHubClient`] implements both.

mod aggregate;
mod config;
mod error;
mod github;
mod issues;
mod pipeline;
mod publish;
mod report;
pub mod retry;
mod settings;
#[cfg(test)]
mod testing;

pub use aggregate::{
    ALL_ISSUES_TITLE, AggregationResult, AssigneeCounts, AssigneeKey, UNASSIGNED, WidgetTally,
    aggregate,
};
pub use config::{
    DEFAULT_LABEL, DEFAULT_THRESHOLDS, Thresholds, WidgetSpec, load_widgets_file, validate_widgets,
};
pub use error::{Error, config_io_error, local_write_error, output_error};
pub use github::GitHubClient;
pub use issues::{IssueAssignee, IssueLabel, IssueQuery, IssueRecord, IssueSource, IssueState};
pub use pipeline::{RunSummary, run_summary};
pub use publish::{
    Committer, FileWrite, PublishCoordinator, PublishOutcome, RemoteFileStore, commit_message,
};
pub use report::render;
pub use settings::{DEFAULT_OUTPUT_FILE, RepositoryId, Settings, normalize_output_path};
