//! Widget configuration types and validation.
//!
//! A widget is a label-based counter rendered as one dashboard line. Users
//! describe widgets as a JSON array (or a YAML/JSON file with the same shape);
//! the helpers in this module validate that document and apply defaults so
//! the aggregation stage only ever sees well-formed [`WidgetSpec`] values.

use std::{collections::HashSet, fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{self, Error};

/// Label used when no widget configuration is supplied.
pub const DEFAULT_LABEL: &str = "needs-triage";
/// Presentation tiers applied when a widget omits `thresholds`.
pub const DEFAULT_THRESHOLDS: Thresholds = Thresholds([10.0, 20.0, 30.0,],);

/// Three presentation tiers attached to a widget.
///
/// Values are ascending by convention only. The markdown report does not
/// render them; they are carried through to the JSON summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize,)]
#[serde(transparent)]
pub struct Thresholds([f64; 3],);

impl Thresholds
{
    /// Returns the three tier values in configuration order.
    pub fn values(&self,) -> [f64; 3]
    {
        self.0
    }
}

impl Default for Thresholds
{
    fn default() -> Self
    {
        DEFAULT_THRESHOLDS
    }
}

/// Validated widget definition with defaults applied.
///
/// # Examples
///
/// ```
/// use issue_summary::{DEFAULT_THRESHOLDS, validate_widgets};
///
/// let widgets = validate_widgets(Some(r#"[{"label":"bug"}]"#,),)?;
/// assert_eq!(widgets[0].title, "bug");
/// assert_eq!(widgets[0].thresholds, DEFAULT_THRESHOLDS);
/// # Ok::<(), issue_summary::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize,)]
pub struct WidgetSpec
{
    /// Issue label matched case-insensitively. Never empty.
    pub label:      String,
    /// Display name, defaults to the label.
    pub title:      String,
    /// Presentation tiers, defaults to [`DEFAULT_THRESHOLDS`].
    pub thresholds: Thresholds,
}

/// Raw widget entry as it appears in user configuration.
#[derive(Debug, Deserialize,)]
struct RawWidget
{
    #[serde(default)]
    label:      Option<String,>,
    #[serde(default)]
    title:      Option<String,>,
    #[serde(default)]
    thresholds: Option<RawThresholds,>,
}

/// Thresholds are accepted as `"10,20,30"` or as `[10, 20, 30]`.
#[derive(Debug, Deserialize,)]
#[serde(untagged)]
enum RawThresholds
{
    Text(String,),
    List(Vec<f64,>,),
}

/// Validates inline widget configuration text.
///
/// When `raw` is `None` the default configuration is returned: a single
/// `needs-triage` widget with default thresholds. The output preserves input
/// order.
///
/// # Errors
///
/// Returns [`Error::Config`](Error::Config) when the text is not a JSON array,
/// the array is empty, an item has no label, or thresholds are not exactly
/// three numbers.
pub fn validate_widgets(raw: Option<&str,>,) -> Result<Vec<WidgetSpec,>, Error,>
{
    let Some(text,) = raw else {
        debug!("No widget configuration supplied, using default '{}' widget", DEFAULT_LABEL);
        return Ok(vec![default_widget()],);
    };

    let entries: Vec<RawWidget,> = serde_json::from_str(text,).map_err(|error| {
        Error::config(format!("widget configuration must be a JSON array of widgets: {error}"),)
    },)?;

    normalize_widgets(entries,)
}

/// Loads widget configuration from a YAML or JSON file.
///
/// The file holds the same array accepted by [`validate_widgets`]; YAML is a
/// superset of JSON so either syntax is accepted.
///
/// # Errors
///
/// Returns [`Error::ConfigIo`](Error::ConfigIo) when the file cannot be read
/// and [`Error::Config`](Error::Config) for any validation failure.
pub fn load_widgets_file(path: &Path,) -> Result<Vec<WidgetSpec,>, Error,>
{
    let contents =
        fs::read_to_string(path,).map_err(|source| error::config_io_error(path, source,),)?;
    let entries: Vec<RawWidget,> = serde_yaml::from_str(&contents,).map_err(|error| {
        Error::config(format!("{} must contain a list of widgets: {error}", path.display()),)
    },)?;

    normalize_widgets(entries,)
}

fn default_widget() -> WidgetSpec
{
    WidgetSpec {
        label:      DEFAULT_LABEL.to_owned(),
        title:      DEFAULT_LABEL.to_owned(),
        thresholds: DEFAULT_THRESHOLDS,
    }
}

fn normalize_widgets(entries: Vec<RawWidget,>,) -> Result<Vec<WidgetSpec,>, Error,>
{
    if entries.is_empty() {
        return Err(Error::config(
            "at least one widget is required, for example [{\"label\":\"needs-triage\"}]",
        ),);
    }

    let mut widgets = Vec::with_capacity(entries.len(),);
    let mut seen_labels = HashSet::with_capacity(entries.len(),);

    for (index, entry,) in entries.into_iter().enumerate() {
        let widget = normalize_widget(entry, index,)?;

        // Duplicates are counted independently.
        if !seen_labels.insert(widget.label.to_uppercase(),) {
            warn!("Widget label '{}' is configured more than once", widget.label);
        }

        widgets.push(widget,);
    }

    debug!("Validated {} widget(s)", widgets.len());
    Ok(widgets,)
}

fn normalize_widget(entry: RawWidget, index: usize,) -> Result<WidgetSpec, Error,>
{
    let label = entry
        .label
        .as_deref()
        .map(str::trim,)
        .filter(|value| !value.is_empty(),)
        .ok_or_else(|| Error::config(format!("item {index} without label"),),)?
        .to_owned();

    let title = match entry.title.as_deref().map(str::trim,) {
        Some(title,) if !title.is_empty() => title.to_owned(),
        _ => label.clone(),
    };

    let thresholds = match entry.thresholds {
        None => DEFAULT_THRESHOLDS,
        Some(raw,) => parse_thresholds(raw, &label,)?,
    };

    Ok(WidgetSpec {
        label,
        title,
        thresholds,
    },)
}

fn parse_thresholds(raw: RawThresholds, label: &str,) -> Result<Thresholds, Error,>
{
    let values = match raw {
        RawThresholds::Text(text,) => text
            .split(',',)
            .map(|token| parse_threshold(token, label,),)
            .collect::<Result<Vec<f64,>, Error,>>()?,
        RawThresholds::List(values,) => values,
    };

    let values: [f64; 3] = values.try_into().map_err(|values: Vec<f64,>| {
        Error::config(format!(
            "widget '{label}' must have exactly 3 thresholds, found {}",
            values.len()
        ),)
    },)?;

    if values.iter().any(|value| !value.is_finite(),) {
        return Err(Error::config(format!("widget '{label}' thresholds must be finite numbers"),),);
    }

    Ok(Thresholds(values,),)
}

fn parse_threshold(token: &str, label: &str,) -> Result<f64, Error,>
{
    let trimmed = token.trim();
    trimmed.parse::<f64,>().map_err(|_| {
        Error::config(format!("widget '{label}' has non-numeric threshold '{trimmed}'"),)
    },)
}
