// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Per-label and per-assignee counting.
//!
//! Aggregation is pure: it reads the validated widgets and the issue snapshot
//! and produces fresh tallies. It cannot fail and tolerates issues without
//! labels or assignees.

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer, ser::SerializeSeq};
use tracing::debug;

use crate::{
    config::{Thresholds, WidgetSpec},
    issues::IssueRecord,
};

/// Title of the synthetic widget holding the total issue count.
pub const ALL_ISSUES_TITLE: &str = "all issues";
/// Display name of the bucket counting issues without assignees.
pub const UNASSIGNED: &str = "unassigned";

/// Counted widget line of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize,)]
pub struct WidgetTally
{
    /// Display name.
    pub title:      String,
    /// Label filter. `None` only for the synthetic total.
    pub label:      Option<String,>,
    /// Presentation tiers carried from configuration.
    pub thresholds: Option<Thresholds,>,
    /// Number of matching label occurrences.
    pub count:      u64,
}

impl WidgetTally
{
    /// Whether this is the synthetic "all issues" line.
    pub fn is_total(&self,) -> bool
    {
        self.label.is_none()
    }
}

impl From<&WidgetSpec,> for WidgetTally
{
    fn from(widget: &WidgetSpec,) -> Self
    {
        Self {
            title:      widget.title.clone(),
            label:      Some(widget.label.clone(),),
            thresholds: Some(widget.thresholds,),
            count:      0,
        }
    }
}

/// Key of an assignee bucket.
///
/// The unassigned bucket is a distinct key so that an account literally named
/// `unassigned` does not merge with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash,)]
pub enum AssigneeKey
{
    /// Issues with no assignees.
    Unassigned,
    /// Issues assigned to the given login.
    Login(String,),
}

impl fmt::Display for AssigneeKey
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        match self {
            Self::Unassigned => f.write_str(UNASSIGNED,),
            Self::Login(login,) => f.write_str(login,),
        }
    }
}

/// Issue counts per assignee in first-encountered order.
#[derive(Debug, Clone, Default, PartialEq, Eq,)]
pub struct AssigneeCounts
{
    counts: IndexMap<AssigneeKey, u64,>,
}

impl AssigneeCounts
{
    /// Adds one issue to the bucket identified by `key`.
    pub fn increment(&mut self, key: AssigneeKey,)
    {
        *self.counts.entry(key,).or_insert(0,) += 1;
    }

    /// Count recorded for `key`, if the bucket exists.
    pub fn get(&self, key: &AssigneeKey,) -> Option<u64,>
    {
        self.counts.get(key,).copied()
    }

    /// Count recorded for a login.
    pub fn login(&self, login: &str,) -> Option<u64,>
    {
        self.get(&AssigneeKey::Login(login.to_owned(),),)
    }

    /// Count recorded for the unassigned bucket.
    pub fn unassigned(&self,) -> Option<u64,>
    {
        self.get(&AssigneeKey::Unassigned,)
    }

    /// Iterates buckets in first-encountered order.
    pub fn iter(&self,) -> impl Iterator<Item = (&AssigneeKey, u64,),> + '_
    {
        self.counts.iter().map(|(key, count,)| (key, *count,),)
    }

    /// Number of buckets.
    pub fn len(&self,) -> usize
    {
        self.counts.len()
    }

    /// Whether no bucket was recorded.
    pub fn is_empty(&self,) -> bool
    {
        self.counts.is_empty()
    }
}

#[derive(Serialize,)]
struct AssigneeEntry
{
    assignee:   String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    unassigned: bool,
    count:      u64,
}

impl Serialize for AssigneeCounts
{
    fn serialize<S,>(&self, serializer: S,) -> Result<S::Ok, S::Error,>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.counts.len(),),)?;
        for (key, count,) in self.iter() {
            seq.serialize_element(&AssigneeEntry {
                assignee: key.to_string(),
                unassigned: matches!(key, AssigneeKey::Unassigned),
                count,
            },)?;
        }
        seq.end()
    }
}

/// Widgets with counts populated, followed by the synthetic total, and the
/// assignee buckets.
#[derive(Debug, Clone, PartialEq, Serialize,)]
pub struct AggregationResult
{
    /// Configured widgets in configuration order, then the total.
    pub widgets:      Vec<WidgetTally,>,
    /// Issue counts per assignee.
    pub assignees:    AssigneeCounts,
    /// Number of issue records aggregated.
    pub total_issues: u64,
}

/// Counts `issues` per widget label and per assignee.
///
/// A label matches a widget when both are equal ignoring case. An issue with
/// several matching labels increments several widgets, and widgets sharing a
/// label accumulate independently. An issue with N assignees adds one to each
/// of the N buckets; an issue with none adds one to the unassigned bucket.
///
/// # Examples
///
/// ```
/// use issue_summary::{IssueRecord, aggregate, validate_widgets};
///
/// let widgets = validate_widgets(Some(r#"[{"label":"bug"}]"#,),)?;
/// let issues = [IssueRecord::new(1,).with_labels(["BUG",],)];
/// let result = aggregate(&widgets, &issues,);
/// assert_eq!(result.widgets[0].count, 1);
/// assert_eq!(result.widgets[1].title, "all issues");
/// assert_eq!(result.assignees.unassigned(), Some(1));
/// # Ok::<(), issue_summary::Error>(())
/// ```
pub fn aggregate(widgets: &[WidgetSpec], issues: &[IssueRecord],) -> AggregationResult
{
    let mut tallies: Vec<WidgetTally,> = widgets.iter().map(WidgetTally::from,).collect();
    let keys: Vec<String,> = widgets.iter().map(|widget| widget.label.to_uppercase(),).collect();
    let mut assignees = AssigneeCounts::default();

    for issue in issues {
        for label in &issue.labels {
            let name = label.name.to_uppercase();
            for (tally, key,) in tallies.iter_mut().zip(&keys,) {
                if *key == name {
                    tally.count += 1;
                }
            }
        }

        if issue.assignees.is_empty() {
            assignees.increment(AssigneeKey::Unassigned,);
        } else {
            for assignee in &issue.assignees {
                assignees.increment(AssigneeKey::Login(assignee.login.clone(),),);
            }
        }
    }

    let total_issues = issues.len() as u64;
    tallies.push(WidgetTally {
        title:      ALL_ISSUES_TITLE.to_owned(),
        label:      None,
        thresholds: None,
        count:      total_issues,
    },);

    debug!(
        "Aggregated {} issues into {} widgets and {} assignee buckets",
        total_issues,
        tallies.len(),
        assignees.len()
    );

    AggregationResult {
        widgets: tallies,
        assignees,
        total_issues,
    }
}
