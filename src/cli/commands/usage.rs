//! Implementation of the `lesson-assist usage` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, UserId};
use crate::services::UsageReport;

#[derive(Args, Debug)]
pub struct UsageArgs {
    /// User whose usage to show
    #[arg(long)]
    pub user: UserId,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct UsageOutput(pub UsageReport);

impl CommandOutput for UsageOutput {
    fn to_human(&self) -> String {
        let report = &self.0;
        let mut line = format!(
            "{}/{} questions asked today",
            report.questions_today, report.daily_limit
        );
        if let Some(message) = &report.message {
            line.push('\n');
            line.push_str(message);
        }
        line
    }
}

pub async fn execute(args: UsageArgs, config: Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::connect(config).await?;
    let report = ctx.assistant().usage(args.user).await?;
    output(&UsageOutput(report), json_mode);
    Ok(())
}
