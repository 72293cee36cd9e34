// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Run-once orchestration: fetch, aggregate, render, publish.
//!
//! Every step is awaited in sequence. Settings arrive already validated, so
//! the first side effect of a run is the issue listing.

use serde::Serialize;
use tracing::info;

use crate::{
    aggregate::{AggregationResult, aggregate},
    error::Error,
    issues::IssueSource,
    publish::{PublishCoordinator, PublishOutcome, RemoteFileStore},
    report::render,
    settings::Settings
};

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Counts the report was rendered from.
    pub aggregation: AggregationResult,
    /// Rendered markdown document.
    #[serde(skip)]
    pub report:      String,
    /// What the publish step did.
    pub publish:     PublishOutcome
}

/// Produces and publishes the issue summary described by `settings`.
///
/// # Errors
///
/// Propagates [`Error::Fetch`](Error::Fetch) from the issue listing and the
/// local or remote write errors from publishing.
pub async fn run_summary<I, S>(
    settings: &Settings,
    issues: &I,
    store: &S
) -> Result<RunSummary, Error>
where
    I: IssueSource,
    S: RemoteFileStore
{
    let snapshot = issues
        .list_issues(&settings.repository, &settings.query)
        .await?;
    info!(
        "Summarizing {} issues of {} across {} widgets",
        snapshot.len(),
        settings.repository,
        settings.widgets.len()
    );

    let aggregation = aggregate(&settings.widgets, &snapshot);
    let report = render(&aggregation, &settings.repository, &settings.query);

    let publish = PublishCoordinator::new(store, &settings.repository)
        .with_branch(settings.branch.as_deref())
        .publish(
            &report,
            &settings.output_path,
            &settings.local_path(),
            settings.committer.as_ref()
        )
        .await?;

    Ok(RunSummary {
        aggregation,
        report,
        publish
    })
}
