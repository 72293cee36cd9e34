// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Renders aggregation results as the markdown dashboard.
//!
//! Output is a pure function of its inputs so that identical snapshots
//! produce byte-identical files and republishing does not create noise
//! commits. Deep links are scoped to the same issue state and kind that the
//! listing was fetched with.

use std::fmt::Write as _;

use crate::{
    aggregate::{AggregationResult, AssigneeKey, WidgetTally},
    issues::{IssueQuery, IssueState},
    settings::RepositoryId
};

const GITHUB_BASE_URL: &str = "https://github.com";
const REPORT_HEADING: &str = "# Issue summary\n";
const LABEL_SECTION_HEADING: &str = "## Issues by label\n";
const OWNER_SECTION_HEADING: &str = "## Issues by owner\n";
/// Stands in for an empty query, which the issues page would replace with
/// its own open-issues default.
const MATCH_EVERYTHING_TERM: &str = "sort%3Acreated-desc";

/// Renders the dashboard for `repository`.
///
/// Label lines appear in widget order with the synthetic total last. Owner
/// lines appear in first-encountered assignee order. Links filter on the
/// state in `query` (no state term for [`IssueState::All`]) and on
/// `is:issue` unless pull requests were counted.
///
/// # Example
///
/// ```
/// use issue_summary::{IssueQuery, IssueRecord, RepositoryId, aggregate, render, validate_widgets};
///
/// # fn main() -> Result<(), issue_summary::Error> {
/// let repository = RepositoryId::parse("octocat/hello-world")?;
/// let widgets = validate_widgets(Some(r#"[{"label":"bug"}]"#))?;
/// let result = aggregate(&widgets, &[IssueRecord::new(1).with_labels(["bug"])]);
/// let markdown = render(&result, &repository, &IssueQuery::default());
/// assert!(markdown.starts_with("# Issue summary\n"));
/// assert!(markdown.contains("* [bug 1](https://github.com/octocat/hello-world/issues?q=is%3Aopen+is%3Aissue+label%3Abug)\n"));
/// # Ok(())
/// # }
/// ```
pub fn render(
    result: &AggregationResult,
    repository: &RepositoryId,
    query: &IssueQuery
) -> String {
    let mut output = String::with_capacity(256);

    output.push_str(REPORT_HEADING);

    output.push_str(LABEL_SECTION_HEADING);
    for widget in &result.widgets {
        let _ = writeln!(
            output,
            "* [{} {}]({})",
            escape_link_text(&widget.title),
            widget.count,
            label_search_url(repository, widget, query)
        );
    }

    output.push_str(OWNER_SECTION_HEADING);
    for (assignee, count) in result.assignees.iter() {
        let _ = writeln!(
            output,
            "* [{} {}]({})",
            escape_link_text(&assignee.to_string()),
            count,
            assignee_search_url(repository, assignee, query)
        );
    }

    output
}

/// Search qualifier matching the listed issue state.
fn state_term(state: IssueState) -> Option<&'static str> {
    match state {
        IssueState::Open => Some("is%3Aopen"),
        IssueState::Closed => Some("is%3Aclosed"),
        IssueState::All => None
    }
}

fn search_url(repository: &RepositoryId, terms: &[&str]) -> String {
    let query = if terms.is_empty() {
        MATCH_EVERYTHING_TERM.to_owned()
    } else {
        terms.join("+")
    };
    format!(
        "{GITHUB_BASE_URL}/{}/{}/issues?q={query}",
        repository.owner(),
        repository.name()
    )
}

/// Search URL listing the issues a widget counts.
fn label_search_url(
    repository: &RepositoryId,
    widget: &WidgetTally,
    query: &IssueQuery
) -> String {
    let label_term = widget
        .label
        .as_deref()
        .map(|label| format!("label%3A{}", encode_query_term(label)));

    let mut terms: Vec<&str> = state_term(query.state).into_iter().collect();
    if !query.include_pull_requests {
        terms.push("is%3Aissue");
    }
    if let Some(label_term) = label_term.as_deref() {
        terms.push(label_term);
    }

    search_url(repository, &terms)
}

/// Search URL listing the issues of one assignee bucket.
fn assignee_search_url(
    repository: &RepositoryId,
    assignee: &AssigneeKey,
    query: &IssueQuery
) -> String {
    let filter = match assignee {
        AssigneeKey::Unassigned => "no%3Aassignee".to_owned(),
        AssigneeKey::Login(login) => format!("assignee%3A{}", encode_query_term(login))
    };

    let mut terms = vec![filter.as_str()];
    terms.extend(state_term(query.state));
    search_url(repository, &terms)
}

/// Encodes a search qualifier value for the `q` query parameter.
///
/// Values containing whitespace are quoted so the search treats them as one
/// term. Spaces become `+`; every byte outside the unreserved set is
/// percent-encoded.
fn encode_query_term(value: &str) -> String {
    let quoted;
    let value = if value.chars().any(char::is_whitespace) {
        quoted = format!("\"{value}\"");
        quoted.as_str()
    } else {
        value
    };

    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(char::from(byte))
            }
            b' ' => encoded.push('+'),
            other => {
                let _ = write!(encoded, "%{other:02X}");
            }
        }
    }
    encoded
}

/// Escapes characters that would terminate markdown link text early.
fn escape_link_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('[', "\\[")
        .replace(']', "\\]")
}
