//! Implementation of the `lesson-assist index` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{colorize_status, create_spinner, list_table, output, truncate, CommandOutput};
use crate::domain::models::{Config, LessonId};
use crate::services::{IndexOptions, IndexReport, LessonIndexStatus};

#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Index a single lesson
    #[arg(long)]
    pub lesson_id: Option<LessonId>,

    /// Replace chunks of lessons that are already indexed
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct IndexOutput(pub IndexReport);

fn status_cells(status: &LessonIndexStatus) -> (&'static str, String) {
    match status {
        LessonIndexStatus::Indexed { chunks, replaced: true } => {
            ("indexed", format!("{chunks} chunks (replaced)"))
        }
        LessonIndexStatus::Indexed { chunks, replaced: false } => ("indexed", format!("{chunks} chunks")),
        LessonIndexStatus::Skipped { existing } => ("skipped", format!("{existing} chunks already stored")),
        LessonIndexStatus::Empty => ("empty", "no indexable text".to_string()),
        LessonIndexStatus::Failed { error } => ("failed", truncate(error, 60)),
    }
}

impl CommandOutput for IndexOutput {
    fn to_human(&self) -> String {
        let report = &self.0;
        if report.lessons.is_empty() {
            return "No published lessons found.".to_string();
        }

        let mut table = list_table(&["id", "lesson", "status", "detail"]);
        for lesson in &report.lessons {
            let (status, detail) = status_cells(&lesson.status);
            table.add_row(vec![
                lesson.lesson_id.to_string(),
                format!("{} - {}", lesson.unit_code, truncate(&lesson.title, 40)),
                colorize_status(status).to_string(),
                detail,
            ]);
        }

        format!(
            "{table}\n\nIndexed {} lesson(s), {} chunk(s) created, {} skipped, {} failed",
            report.lessons_indexed, report.chunks_created, report.lessons_skipped, report.lessons_failed
        )
    }
}

pub async fn execute(args: IndexArgs, config: Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::connect(config).await?;
    let indexer = ctx.indexer();

    let spinner = create_spinner("Indexing lessons...", json_mode);
    let result = indexer
        .run(IndexOptions {
            lesson_id: args.lesson_id,
            force: args.force,
        })
        .await;
    spinner.finish_and_clear();

    let report = result.context("Indexing failed")?;
    output(&IndexOutput(report), json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::LessonIndexResult;

    fn result(id: LessonId, status: LessonIndexStatus) -> LessonIndexResult {
        LessonIndexResult {
            lesson_id: id,
            unit_code: format!("CS10{id}"),
            title: "Intro".to_string(),
            status,
        }
    }

    #[test]
    fn test_human_output_lists_each_lesson() {
        let report = IndexReport {
            lessons: vec![
                result(1, LessonIndexStatus::Indexed { chunks: 3, replaced: false }),
                result(2, LessonIndexStatus::Failed { error: "model server down".into() }),
            ],
            lessons_indexed: 1,
            chunks_created: 3,
            lessons_skipped: 0,
            lessons_failed: 1,
        };

        let text = IndexOutput(report).to_human();
        assert!(text.contains("CS101 - Intro"));
        assert!(text.contains("model server down"));
        assert!(text.ends_with("Indexed 1 lesson(s), 3 chunk(s) created, 0 skipped, 1 failed"));
    }

    #[test]
    fn test_json_output_is_the_report() {
        let report = IndexReport {
            lessons: vec![result(1, LessonIndexStatus::Skipped { existing: 4 })],
            lessons_indexed: 0,
            chunks_created: 0,
            lessons_skipped: 1,
            lessons_failed: 0,
        };

        let json = IndexOutput(report).to_json();
        assert_eq!(json["lessons_skipped"], 1);
        assert_eq!(json["lessons"][0]["status"], "skipped");
        assert_eq!(json["lessons"][0]["existing"], 4);
    }

    #[test]
    fn test_empty_report() {
        assert_eq!(
            IndexOutput(IndexReport::default()).to_human(),
            "No published lessons found."
        );
    }
}
