//! Converts MISP threat-intelligence events into Sigma detection rules.

pub mod cli;
pub mod converter;
pub mod error;
pub mod fetcher;
pub mod modifier;
pub mod observability;
pub mod pipeline;
pub mod sink;

use std::time::Duration;

use sigmai_core::config::FetcherOptions;

use crate::cli::{Cli, Target};
use crate::error::{ExitCode, SinkError};
use crate::modifier::{parse_level, parse_status, Modifier, ModifierOptions};
use crate::sink::{DirectorySink, Sink, StdoutSink};

/// Runs the whole CLI from already-parsed arguments, returning the
/// process exit code the caller should use.
pub async fn run(cli: Cli) -> ExitCode {
    observability::init(cli.verbose, cli.json);

    let options: FetcherOptions = (&cli.misp).into();
    if let Err(err) = options.validate() {
        tracing::error!(error = %err, "invalid MISP source configuration");
        return ExitCode::SourceSetup;
    }

    let modifier = match build_modifier(&cli) {
        Ok(modifier) => modifier,
        Err(message) => {
            tracing::error!(error = %message, "invalid modifier configuration");
            return ExitCode::InvalidArgs;
        }
    };

    let mut sink: Box<dyn Sink> = match build_sink(&cli) {
        Ok(sink) => sink,
        Err(err) => {
            tracing::error!(error = %err, "an error occurred setting up the target");
            return ExitCode::TargetSetup;
        }
    };

    let outcome = match &cli.interval {
        None => pipeline::run_once(options, &modifier, sink.as_mut()).await,
        Some(raw) => match humantime::parse_duration(raw) {
            Ok(interval) if interval > Duration::ZERO => {
                let cli = &cli;
                pipeline::run_scheduled(interval, move || (&cli.misp).into(), &modifier, sink.as_mut()).await
            }
            Ok(_) => {
                tracing::error!(interval = %raw, "the interval must be a positive duration");
                return ExitCode::InvalidArgs;
            }
            Err(err) => {
                tracing::error!(interval = %raw, error = %err, "an error occurred parsing the interval");
                return ExitCode::InvalidArgs;
            }
        },
    };

    match outcome {
        Ok(()) => ExitCode::Ok,
        Err(err) => {
            tracing::error!(error = %err, "an error occurred during the run");
            ExitCode::Runtime
        }
    }
}

fn build_modifier(cli: &Cli) -> Result<Modifier, String> {
    let level_set = cli.modifier.level_set.as_deref().map(parse_level).transpose()?;
    let status_set = cli.modifier.status_set.as_deref().map(parse_status).transpose()?;
    Ok(Modifier::new(ModifierOptions {
        tags_add: cli.modifier.tags_add.clone(),
        tags_rm: cli.modifier.tags_rm.clone(),
        tags_set: cli.modifier.tags_set.clone(),
        tags_clear: cli.modifier.tags_clear,
        level_set,
        status_set,
    }))
}

fn build_sink(cli: &Cli) -> Result<Box<dyn Sink>, SinkError> {
    match cli.target {
        Target::Stdout => Ok(Box::new(StdoutSink::new())),
        Target::Directory => {
            let path = cli.directory.path.clone().ok_or(SinkError::MissingPath)?;
            Ok(Box::new(DirectorySink::new(path)?))
        }
    }
}
