//! Logging setup, mirroring the teacher's `tracing`/`tracing-subscriber`
//! front end: a verbosity flag maps to a filter level, and a flag
//! chooses between a human-readable and a JSON formatter.

use tracing_subscriber::EnvFilter;

/// Initializes the global `tracing` subscriber.
///
/// `verbose` raises the default filter from `info` to `debug`; `json`
/// switches the formatter from the default human-readable one to
/// newline-delimited JSON. Both are overridden if `RUST_LOG` is set.
pub fn init(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
