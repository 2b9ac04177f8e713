//! Field inspection scheduling CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use fieldsched_cli::config::Config;
use fieldsched_cli::logging::{LogConfig, LogFormat, init_logging};
use fieldsched_cli::{EXIT_FAILED, EXIT_OK};
use fieldsched_services::ServiceError;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, ProfilesCommand, SubscriptionCommand};
use crate::commands::App;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(EXIT_FAILED);
    }
    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            report(&error);
            EXIT_FAILED
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let config = Config::load(cli.config.as_deref())?;
    let app = App::new(config)?;
    let done = |result: anyhow::Result<()>| result.map(|()| EXIT_OK);
    match &cli.command {
        Command::Detect(args) => commands::run_detect(&app, args),
        Command::Headers(args) => done(commands::run_headers(args)),
        Command::Profiles(ProfilesCommand::List(args)) => {
            done(commands::run_profiles_list(&app, args.remote))
        }
        Command::Profiles(ProfilesCommand::Upsert(args)) => {
            done(commands::run_profiles_upsert(&app, args))
        }
        Command::Ingest(args) => done(commands::run_ingest(&app, args)),
        Command::Route(args) => done(commands::run_route(&app, args)),
        Command::Login(args) => done(commands::run_login(&app, args)),
        Command::Logout => done(commands::run_logout(&app)),
        Command::Subscription(SubscriptionCommand::Status) => {
            done(commands::run_subscription_status(&app))
        }
        Command::Subscription(SubscriptionCommand::Portal(args)) => {
            done(commands::run_subscription_portal(&app, args))
        }
    }
}

/// Service failures get the short user-facing message; the full chain goes
/// to the log.
fn report(error: &anyhow::Error) {
    let service = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ServiceError>());
    match service {
        Some(service) => {
            tracing::error!("{error:#}");
            eprintln!("error: {}", service.user_message());
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
    config.log_headers = cli.log_headers;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
