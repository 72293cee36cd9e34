// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use issue_summary::{
    IssueQuery, IssueRecord, RepositoryId, WidgetSpec, aggregate, render, validate_widgets,
};

const LABELS: [&str; 5] = ["bug", "docs", "enhancement", "good first issue", "security"];

fn widgets() -> Vec<WidgetSpec,>
{
    let raw = r#"[
        {"label":"bug","title":"Bugs","thresholds":"5,15,25"},
        {"label":"docs","thresholds":[1,2,3]},
        {"label":"enhancement"},
        {"label":"good first issue","title":"Starter tasks"},
        {"label":"security","thresholds":"0,1,2"}
    ]"#;
    validate_widgets(Some(raw,),).expect("valid widgets",)
}

fn snapshot(size: u64,) -> Vec<IssueRecord,>
{
    (0..size)
        .map(|number| {
            let label = LABELS[(number % LABELS.len() as u64) as usize];
            let issue = IssueRecord::new(number,).with_labels([label, "triaged",],);
            match number % 4 {
                0 => issue,
                1 => issue.with_assignees([format!("user{}", number % 17)],),
                _ => issue.with_assignees([
                    format!("user{}", number % 17),
                    format!("user{}", number % 5),
                ],),
            }
        },)
        .collect()
}

fn benchmark_validate_widgets(c: &mut Criterion,)
{
    let raw = r#"[
        {"label":"bug","title":"Bugs","thresholds":"5,15,25"},
        {"label":"docs","thresholds":[1,2,3]},
        {"label":"enhancement"}
    ]"#;

    c.bench_function("validate_widgets_small", |b| {
        b.iter(|| validate_widgets(black_box(Some(raw,),),).expect("parse failed",),)
    },);
}

fn benchmark_aggregate(c: &mut Criterion,)
{
    let widgets = widgets();
    let issues = snapshot(1_000,);

    c.bench_function("aggregate_1000_issues", |b| {
        b.iter(|| aggregate(black_box(&widgets,), black_box(&issues,),),)
    },);
}

fn benchmark_render(c: &mut Criterion,)
{
    let repository = RepositoryId::parse("octocat/hello-world",).expect("valid repository",);
    let aggregation = aggregate(&widgets(), &snapshot(1_000,),);
    let query = IssueQuery::default();

    c.bench_function("render_report", |b| {
        b.iter(|| render(black_box(&aggregation,), black_box(&repository,), black_box(&query,),),)
    },);
}

criterion_group!(benches, benchmark_validate_widgets, benchmark_aggregate, benchmark_render);
criterion_main!(benches);
