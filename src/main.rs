//! Command-line interface for the issue summary job.
//!
//! Every input can be passed as a flag or through the environment variables
//! a CI workflow sets. Configuration is validated before any network call;
//! the rendered report is echoed to stdout while logs go to stderr.

use std::{
    io::{self, Write},
    path::PathBuf,
    process,
    time::Duration,
};

use clap::{ArgAction, Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use issue_summary::{
    Committer, Error, GitHubClient, IssueQuery, IssueState, RepositoryId, RunSummary, Settings,
    load_widgets_file, normalize_output_path, output_error, run_summary, validate_widgets,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Summarize repository issues by label and assignee into a markdown file.
#[derive(Debug, Parser,)]
#[command(name = "issue-summary", version, about = "Render and commit an issue summary dashboard")]
struct Cli
{
    /// Token used for the issues and contents APIs.
    #[arg(long = "token", env = "PAT_FOR_ISSUES", hide_env_values = true)]
    token: String,

    /// Repository to summarize, in owner/name form.
    #[arg(long = "repository", env = "GITHUB_REPOSITORY", value_name = "OWNER/NAME")]
    repository: Option<String,>,

    /// Repository-relative path of the report.
    #[arg(long = "output", env = "OUTPUT_FILE_NAME", value_name = "PATH")]
    output: Option<String,>,

    /// Widget configuration as a JSON array.
    #[arg(
        long = "config-json",
        env = "CONFIG_JSON",
        value_name = "JSON",
        conflicts_with = "config_file"
    )]
    config_json: Option<String,>,

    /// YAML or JSON file holding the widget configuration.
    #[arg(long = "config-file", env = "CONFIG_FILE", value_name = "PATH")]
    config_file: Option<PathBuf,>,

    /// E-mail recorded as committer and author.
    #[arg(long = "committer-email", env = "COMMITTER_EMAIL")]
    committer_email: Option<String,>,

    /// Name recorded as committer and author.
    #[arg(long = "committer-name", env = "COMMITTER_NAME")]
    committer_name: Option<String,>,

    /// Branch receiving the commit; defaults to the repository default branch.
    #[arg(long = "branch", env = "SUMMARY_BRANCH")]
    branch: Option<String,>,

    /// Directory the local copy of the report is written under.
    #[arg(long = "workspace", env = "GITHUB_WORKSPACE", value_name = "DIR", default_value = ".")]
    workspace: PathBuf,

    /// Issue state to summarize: open, closed or all.
    #[arg(long = "state", env = "ISSUE_STATE", default_value = "open")]
    state: IssueState,

    /// Count pull requests as issues.
    #[arg(long = "include-pull-requests", env = "INCLUDE_PULL_REQUESTS", action = ArgAction::SetTrue)]
    include_pull_requests: bool,

    /// Format of the summary echoed to stdout.
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum,)]
enum OutputFormat
{
    /// The rendered markdown report.
    Markdown,
    /// Counts, thresholds and publish outcome as JSON.
    Json,
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main()
{
    init_tracing();

    if let Err(error,) = run().await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

fn init_tracing()
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info",),);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter,)
        .with_writer(io::stderr,)
        .with_target(false,)
        .try_init();
}

/// Executes a single summary run.
///
/// # Errors
///
/// Configuration and environment errors are returned before any network
/// call; fetch and publish errors are propagated unchanged.
async fn run() -> Result<(), Error,>
{
    let cli = Cli::parse();
    let settings = build_settings(&cli,)?;
    let client = GitHubClient::new(&cli.token,)?;

    let spinner = progress_spinner(&settings.repository,);
    let result = run_summary(&settings, &client, &client,).await;
    spinner.finish_and_clear();
    let summary = result?;

    info!(
        "Summary of {} written to {} ({:?})",
        settings.repository, settings.output_path, summary.publish
    );

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_summary(&mut handle, &summary, cli.format,)
}

/// Validates CLI inputs into run settings.
fn build_settings(cli: &Cli,) -> Result<Settings, Error,>
{
    let repository = non_blank(cli.repository.as_deref(),).ok_or_else(|| {
        Error::environment("you must specify a repository with --repository or GITHUB_REPOSITORY",)
    },)?;
    let repository = RepositoryId::parse(repository,)?;

    let widgets = match cli.config_file.as_deref() {
        Some(path,) => load_widgets_file(path,)?,
        None => validate_widgets(non_blank(cli.config_json.as_deref(),),)?,
    };

    let mut settings = Settings::new(repository, widgets,);
    settings.output_path = normalize_output_path(cli.output.as_deref(),)?;
    settings.local_root = cli.workspace.clone();
    settings.committer =
        Committer::from_parts(cli.committer_email.as_deref(), cli.committer_name.as_deref(),);
    settings.branch = non_blank(cli.branch.as_deref(),).map(str::to_owned,);
    settings.query = IssueQuery {
        state:                 cli.state,
        include_pull_requests: cli.include_pull_requests,
    };

    Ok(settings,)
}

fn non_blank(value: Option<&str,>,) -> Option<&str,>
{
    value.map(str::trim,).filter(|value| !value.is_empty(),)
}

fn progress_spinner(repository: &RepositoryId,) -> ProgressBar
{
    let spinner = ProgressBar::new_spinner();
    if let Ok(style,) =
        ProgressStyle::default_spinner().template("{spinner:.yellow} [{elapsed_precise}] {msg}",)
    {
        spinner.set_style(style,);
    }
    spinner.set_message(format!("Summarizing issues of {repository}..."),);
    spinner.enable_steady_tick(Duration::from_millis(120,),);
    spinner
}

fn write_summary<W: Write,>(
    writer: &mut W,
    summary: &RunSummary,
    format: OutputFormat,
) -> Result<(), Error,>
{
    match format {
        OutputFormat::Markdown => {
            writer.write_all(summary.report.as_bytes(),).map_err(output_error,)?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, summary,).map_err(|error| {
                if error.is_io() { output_error(io::Error::from(error,),) } else { Error::from(error,) }
            },)?;
            writer.write_all(b"\n",).map_err(output_error,)?;
        }
    }
    writer.flush().map_err(output_error,)
}

#[cfg(test)]
mod tests
{
    use std::{
        fs,
        io::{self, Cursor, Write},
    };

    use clap::Parser;
    use issue_summary::{
        IssueQuery, IssueRecord, IssueState, PublishOutcome, RepositoryId, RunSummary, aggregate,
        render, validate_widgets,
    };
    use tempfile::tempdir;

    use super::{Cli, OutputFormat, build_settings, write_summary};

    struct ClosedPipe;

    impl Write for ClosedPipe
    {
        fn write(&mut self, _buf: &[u8],) -> io::Result<usize,>
        {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed",),)
        }

        fn flush(&mut self,) -> io::Result<(),>
        {
            Ok((),)
        }
    }

    fn parse(args: &[&str],) -> Cli
    {
        let mut argv = vec![env!("CARGO_BIN_NAME"), "--token", "ghp_test"];
        argv.extend_from_slice(args,);
        Cli::try_parse_from(argv,).expect("failed to parse CLI",)
    }

    fn sample_summary() -> RunSummary
    {
        let repository = RepositoryId::parse("octocat/hello-world",).expect("valid repository",);
        let widgets = validate_widgets(Some(r#"[{"label":"bug","thresholds":"5,15,25"}]"#,),)
            .expect("valid widgets",);
        let aggregation = aggregate(
            &widgets,
            &[IssueRecord::new(1,).with_labels(["bug",],).with_assignees(["carol",],)],
        );
        let report = render(&aggregation, &repository, &IssueQuery::default(),);
        RunSummary {
            aggregation,
            report,
            publish: PublishOutcome::Skipped,
        }
    }

    #[test]
    fn flags_populate_settings()
    {
        let cli = parse(&[
            "--repository",
            "octocat/hello-world",
            "--output",
            "docs/issues.md",
            "--config-json",
            r#"[{"label":"bug"},{"label":"docs","title":"Docs"}]"#,
            "--committer-email",
            "dev@example.com",
            "--committer-name",
            "Dev",
            "--branch",
            "dashboards",
            "--state",
            "all",
            "--include-pull-requests",
        ],);

        let settings = build_settings(&cli,).expect("valid settings",);
        assert_eq!(settings.repository.to_string(), "octocat/hello-world");
        assert_eq!(settings.output_path, "docs/issues.md");
        assert_eq!(settings.widgets.len(), 2);
        assert_eq!(settings.widgets[1].title, "Docs");
        assert_eq!(settings.committer.as_ref().map(|c| c.name.as_str()), Some("Dev"));
        assert_eq!(settings.branch.as_deref(), Some("dashboards"));
        assert_eq!(settings.query.state, IssueState::All);
        assert!(settings.query.include_pull_requests);
    }

    #[test]
    fn blank_repository_is_an_environment_error()
    {
        let cli = parse(&["--repository", "  "],);
        let error = build_settings(&cli,).expect_err("expected environment error",);
        assert!(matches!(error, issue_summary::Error::Environment { .. }));
    }

    #[test]
    fn malformed_repository_is_an_environment_error()
    {
        let cli = parse(&["--repository", "octocat"],);
        let error = build_settings(&cli,).expect_err("expected environment error",);
        match error {
            issue_summary::Error::Environment {
                message,
            } => assert!(message.contains("owner/name")),
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn invalid_widget_json_is_a_config_error()
    {
        let cli = parse(&["--repository", "o/r", "--config-json", r#"[{"title":"no label"}]"#],);
        let error = build_settings(&cli,).expect_err("expected config error",);
        assert!(matches!(error, issue_summary::Error::Config { .. }));
    }

    #[test]
    fn config_file_is_loaded()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let path = temp.path().join("widgets.yaml",);
        fs::write(&path, "- label: bug\n  thresholds: [1, 2, 3]\n",).expect("failed to write",);

        let cli = parse(&["--repository", "o/r", "--config-file", path.to_str().expect("utf8",)],);
        let settings = build_settings(&cli,).expect("valid settings",);
        assert_eq!(settings.widgets[0].label, "bug");
    }

    #[test]
    fn config_json_conflicts_with_config_file()
    {
        let result = Cli::try_parse_from([
            env!("CARGO_BIN_NAME"),
            "--token",
            "t",
            "--config-json",
            "[]",
            "--config-file",
            "widgets.yaml",
        ],);
        assert!(result.is_err());
    }

    #[test]
    fn partial_committer_disables_publish()
    {
        let cli = parse(&["--repository", "o/r", "--committer-email", "dev@example.com"],);
        let settings = build_settings(&cli,).expect("valid settings",);
        assert!(settings.committer.is_none());
    }

    #[test]
    fn markdown_format_echoes_report()
    {
        let summary = sample_summary();
        let mut buffer = Cursor::new(Vec::new(),);
        write_summary(&mut buffer, &summary, OutputFormat::Markdown,).expect("write failed",);

        let output = String::from_utf8(buffer.into_inner(),).expect("invalid UTF-8",);
        assert_eq!(output, summary.report);
    }

    #[test]
    fn json_format_includes_thresholds_and_outcome()
    {
        let summary = sample_summary();
        let mut buffer = Cursor::new(Vec::new(),);
        write_summary(&mut buffer, &summary, OutputFormat::Json,).expect("write failed",);

        let output: serde_json::Value =
            serde_json::from_slice(&buffer.into_inner(),).expect("invalid JSON",);
        assert_eq!(output["aggregation"]["widgets"][0]["thresholds"], serde_json::json!([
            5.0, 15.0, 25.0
        ]));
        assert_eq!(output["aggregation"]["widgets"][1]["title"], "all issues");
        assert_eq!(output["aggregation"]["assignees"][0]["assignee"], "carol");
        assert_eq!(output["publish"]["action"], "skipped");
        assert!(output.get("report").is_none());
    }

    #[test]
    fn stdout_failures_are_output_errors()
    {
        let summary = sample_summary();
        for format in [OutputFormat::Markdown, OutputFormat::Json] {
            let error = write_summary(&mut ClosedPipe, &summary, format,)
                .expect_err("expected output error",);
            match error {
                issue_summary::Error::Output {
                    source,
                } => assert_eq!(source.kind(), io::ErrorKind::BrokenPipe),
                other => panic!("unexpected error variant for {format:?}: {other:?}"),
            }
        }
    }
}
