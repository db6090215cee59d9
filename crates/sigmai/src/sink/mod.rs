//! Targets rules are written to (§6 "Sink interface").

mod directory;
mod stdout;

pub use directory::DirectorySink;
pub use stdout::StdoutSink;

use sigmai_core::sigma::Rule;

use crate::error::SinkError;

/// Consumes a fully converted and modified rule set for one event.
///
/// Mirrors the original `targets.Target` interface: one call per event,
/// given every rule the event produced (the global scoping rule first,
/// followed by its detections).
pub trait Sink {
    fn process(&mut self, rules: &[Rule]) -> Result<(), SinkError>;
}
