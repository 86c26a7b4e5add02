//! Implementation of the `lesson-assist ask` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, LessonId, UserId};
use crate::services::{AskRequest, AskResponse};

#[derive(Args, Debug)]
pub struct AskArgs {
    /// User asking the question
    #[arg(long)]
    pub user: UserId,

    /// Lesson the student is currently viewing
    #[arg(long)]
    pub lesson_id: Option<LessonId>,

    /// The question
    #[arg(required = true, trailing_var_arg = true)]
    pub message: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct AskOutput {
    pub response: AskResponse,
    #[serde(skip)]
    pub daily_limit: u32,
}

impl CommandOutput for AskOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.response.reply.trim().to_string()];
        if !self.response.sources.is_empty() {
            lines.push("\nSources:".to_string());
            for source in &self.response.sources {
                lines.push(format!("  [{}] {}", source.lesson, source.excerpt));
            }
        }
        lines.push(format!(
            "\n{}/{} questions today",
            self.response.usage_today, self.daily_limit
        ));
        lines.join("\n")
    }
}

pub async fn execute(args: AskArgs, config: Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::connect(config).await?;
    let assistant = ctx.assistant();

    let mut request = AskRequest::new(args.message.join(" "));
    request.lesson_id = args.lesson_id;

    let response = assistant.ask(args.user, request).await?;
    output(
        &AskOutput {
            response,
            daily_limit: assistant.daily_limit(),
        },
        json_mode,
    );
    Ok(())
}
