//! Command-line argument parsing (§6 external interfaces, ambient CLI).
//!
//! Mirrors the flag groups of `original_source/sigmai.go`'s flat flag
//! sets (general, MISP source, directory target, modifier) as one
//! `clap`-derived struct rather than hand-rolled `pflag` binding.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use sigmai_core::config::{FetchFilters, FetcherOptions};

/// Converts MISP threat-intelligence events into Sigma detection rules.
#[derive(Parser, Debug)]
#[command(name = "sigmai", author, version, about)]
pub struct Cli {
    /// Where rules are read from.
    #[arg(short, long, value_enum, default_value = "misp")]
    pub source: Source,

    /// Where rules are written to.
    #[arg(short, long, value_enum, default_value = "stdout")]
    pub target: Target,

    /// Show debug information.
    #[arg(short, long)]
    pub verbose: bool,

    /// Output structured JSON logs instead of a human-readable format.
    #[arg(long)]
    pub json: bool,

    /// Re-run the pipeline on this interval (e.g. `1h`, `30m`) instead of
    /// exiting after a single pass.
    #[arg(short, long)]
    pub interval: Option<String>,

    #[command(flatten)]
    pub misp: MispArgs,

    #[command(flatten)]
    pub directory: DirectoryArgs,

    #[command(flatten)]
    pub modifier: ModifierArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum Source {
    Misp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum Target {
    Stdout,
    Directory,
}

/// MISP source options (`misp-*` flags), bound directly onto
/// [`FetcherOptions`].
#[derive(Parser, Debug)]
pub struct MispArgs {
    /// MISP: Instance API base URL.
    #[arg(long = "misp-url", env = "SIGMAI_MISP_URL", default_value = "")]
    pub url: String,

    /// MISP: User API key.
    #[arg(long = "misp-key", env = "SIGMAI_MISP_KEY", default_value = "")]
    pub key: String,

    /// MISP: Allow insecure connections when using SSL.
    #[arg(long = "misp-insecure")]
    pub insecure: bool,

    /// MISP: Size of the per-page event/object/attribute buffer.
    #[arg(long = "misp-buffer", default_value_t = 500)]
    pub buffer: i64,

    /// MISP: Number of concurrent workers (minimum 2: one lister, one
    /// or more enrichers).
    #[arg(long = "misp-workers", default_value_t = 20)]
    pub workers: i64,

    /// MISP: Only events with matching IDs.
    #[arg(long = "misp-events", value_delimiter = ',')]
    pub events: Vec<i64>,

    /// MISP: Only events within this time-frame (`4d`, `3w`, ...).
    #[arg(long = "misp-period", value_delimiter = ',')]
    pub period: Vec<String>,

    /// MISP: Only events with matching tags.
    #[arg(long = "misp-tags", value_delimiter = ',')]
    pub tags: Vec<String>,

    /// MISP: Only events with matching threat levels (1-4).
    #[arg(long = "misp-levels", value_delimiter = ',')]
    pub threat_level: Vec<String>,

    /// MISP: Only published events.
    #[arg(long = "misp-published")]
    pub published: bool,

    /// MISP: Only unpublished events.
    #[arg(long = "misp-published-exclude")]
    pub published_exclude: bool,

    /// MISP: Only IDS-enabled attributes.
    #[arg(long = "misp-ids")]
    pub ids: bool,

    /// MISP: Only IDS-disabled attributes.
    #[arg(long = "misp-ids-exclude")]
    pub ids_exclude: bool,

    /// MISP: Only attributes without a matching warning-list entry.
    #[arg(long = "misp-warning-exclude")]
    pub warning_exclude: bool,
}

impl From<&MispArgs> for FetcherOptions {
    fn from(args: &MispArgs) -> Self {
        FetcherOptions {
            url: args.url.clone(),
            key: args.key.clone(),
            insecure: args.insecure,
            buffer: args.buffer,
            workers: args.workers,
            filters: FetchFilters {
                events: args.events.clone(),
                period: args.period.clone(),
                tags: args.tags.clone(),
                threat_level: args.threat_level.clone(),
                published_include: args.published,
                published_exclude: args.published_exclude,
                ids_include: args.ids,
                ids_exclude: args.ids_exclude,
                warning_exclude: args.warning_exclude,
            },
        }
    }
}

/// Directory target options.
#[derive(Parser, Debug, Default)]
pub struct DirectoryArgs {
    /// Directory: Path to save rules (required when `--target directory`).
    #[arg(long = "directory-path")]
    pub path: Option<PathBuf>,
}

/// Modifier options (tag set/add/remove/clear, level/status override).
#[derive(Parser, Debug, Default)]
pub struct ModifierArgs {
    /// Add tags on all rules.
    #[arg(long = "tags-add", value_delimiter = ',')]
    pub tags_add: Vec<String>,

    /// Remove tags from all rules.
    #[arg(long = "tags-rm", value_delimiter = ',')]
    pub tags_rm: Vec<String>,

    /// Set tags on all rules, replacing any existing tags.
    #[arg(long = "tags-set", value_delimiter = ',')]
    pub tags_set: Vec<String>,

    /// Clear tags from all rules.
    #[arg(long = "tags-clear")]
    pub tags_clear: bool,

    /// Override the level of all rules.
    #[arg(long = "level-set")]
    pub level_set: Option<String>,

    /// Override the status of all rules.
    #[arg(long = "status-set")]
    pub status_set: Option<String>,
}
