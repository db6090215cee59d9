//! The pipeline driver (§4.4, §7): wires the fetcher, converter,
//! modifier, and sink together into one run, and optionally repeats
//! that run on a fixed interval.

use std::time::Duration;

use sigmai_core::config::FetcherOptions;

use crate::converter;
use crate::error::RunError;
use crate::fetcher;
use crate::modifier::Modifier;
use crate::sink::Sink;

/// Runs the fetcher-to-sink pipeline exactly once: every enriched event
/// is converted, modified, and handed to the sink as it arrives, so a
/// slow sink never stalls the fetcher's buffering.
pub async fn run_once(
    options: FetcherOptions,
    modifier: &Modifier,
    sink: &mut dyn Sink,
) -> Result<(), RunError> {
    let mut handle = fetcher::spawn(options);
    while let Some(event) = handle.events.recv().await {
        let mut rules = converter::convert(&event);
        if rules.is_empty() {
            continue;
        }
        modifier.process(&mut rules);
        sink.process(&rules)?;
    }
    handle.join().await;
    if let Some(message) = handle.error() {
        return Err(RunError::Fetch(message));
    }
    Ok(())
}

/// Runs the pipeline once, then again on every tick of `interval`,
/// forever. A tick that arrives while the previous run is still going
/// is dropped rather than queued, matching a synchronous ticker loop.
pub async fn run_scheduled(
    interval: Duration,
    options_factory: impl Fn() -> FetcherOptions,
    modifier: &Modifier,
    sink: &mut dyn Sink,
) -> Result<(), RunError> {
    run_once(options_factory(), modifier, sink).await?;

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        run_once(options_factory(), modifier, sink).await?;
    }
}
