//! Top-level error type tying configuration, network, and sink failures
//! into the exit codes the CLI reports.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid MISP client configuration: {0}")]
    Transport(reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to encode rule as YAML: {0}")]
    Encode(#[from] serde_yaml::Error),

    #[error("missing directory target path")]
    MissingPath,

    #[error("'{0}' is not a directory")]
    NotADirectory(std::path::PathBuf),

    #[error("failed to write rule file {path}: {source}")]
    Write {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level error surfaced by a single pipeline run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] sigmai_core::ConfigError),
    #[error("{0}")]
    Fetch(String),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error("invalid interval {raw:?}: {message}")]
    InvalidInterval { raw: String, message: String },
    #[error("invalid modifier option: {0}")]
    InvalidModifier(String),
}

/// Process exit codes, mirroring the CLI's error taxonomy: argument
/// errors, source setup errors, target setup errors, and runtime errors
/// each get a distinct code so scripts invoking `sigmai` can branch on
/// failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Ok = 0,
    InvalidArgs = 1,
    SourceSetup = 2,
    TargetSetup = 3,
    Runtime = 4,
}
