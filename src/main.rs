//! Lesson Assist CLI entry point.

use clap::Parser;

use lesson_assist::cli::context::load_config;
use lesson_assist::cli::{commands, handle_error, Cli, Commands};
use lesson_assist::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args, config, cli.json).await,
        Commands::Index(args) => commands::index::execute(args, config, cli.json).await,
        Commands::Ask(args) => commands::ask::execute(args, config, cli.json).await,
        Commands::Usage(args) => commands::usage::execute(args, config, cli.json).await,
        Commands::Serve(args) => commands::serve::execute(args, config).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
