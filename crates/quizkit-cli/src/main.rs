//! quizkit CLI.

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::{ColorChoice, Parser};
use quizkit_cli::cli::{Cli, LogFormatArg, LogLevelArg};
use quizkit_cli::commands;
use quizkit_cli::logging::{LogConfig, LogFormat, init_logging};
use quizkit_cli::settings::Settings;
use quizkit_editor::EditorError;
use tracing::level_filters::LevelFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let exit_code = match run(cli).await {
        Ok(output) => {
            println!("{output}");
            0
        }
        Err(error) => {
            report_error(&error);
            1
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<String> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load(),
    };
    let workspace = settings.workspace_dir(cli.workspace.as_deref());
    commands::run(cli.command, &workspace, &settings).await
}

fn report_error(error: &anyhow::Error) {
    match error.downcast_ref::<EditorError>() {
        Some(editor_error) => {
            eprintln!("error: {}", editor_error.user_message());
            if let Some(suggestion) = editor_error.suggestion() {
                eprintln!("hint: {suggestion}");
            }
        }
        None => eprintln!("error: {error:#}"),
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
