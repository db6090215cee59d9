//! Translates MISP events into Sigma rules.
//!
//! The dispatch tables (`attribute`, `object`) decide what a single
//! indicator means on each log source; `compose` assembles those
//! per-indicator fragments into the detections a [`sigmai_core::sigma::Rule`]
//! actually ships.

mod attribute;
mod compose;
mod object;

pub use compose::convert;

use indexmap::IndexMap;
use sigmai_core::sigma::{LogSource, Search, SearchMap};

/// What a single attribute contributes to one log source: an atomic
/// `Search` to be folded into the enclosing scope, a set of named
/// `Selections` to be kept as independent alternatives, or both.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    pub search: Search,
    pub selections: SearchMap,
}

impl Mapping {
    fn search_only(search: Search) -> Self {
        Mapping {
            search,
            selections: SearchMap::new(),
        }
    }

    fn selections_only(selections: SearchMap) -> Self {
        Mapping {
            search: Search::new(),
            selections,
        }
    }
}

/// The result of dispatching a single attribute: which log sources it
/// matters to, and what it contributes to each.
pub type LogSourceMapping = IndexMap<LogSource, Mapping>;

/// Splits a composite MISP value (`"a|b|...|z"`) at the last separator,
/// returning `(everything-but-last, last)`. Used by types where the
/// trailing part is a fixed-format value (a hash, a port) and the
/// leading parts may themselves legitimately contain `|`.
fn split_last(value: &str) -> (String, String) {
    let parts: Vec<&str> = value.split('|').collect();
    let (last, rest) = parts.split_last().expect("split always yields at least one part");
    (rest.join("|"), (*last).to_string())
}

/// Splits a composite MISP value at the first separator, returning
/// `(first, everything-after)`.
fn split_first(value: &str) -> (String, String) {
    match value.split_once('|') {
        Some((first, rest)) => (first.to_string(), rest.to_string()),
        None => (value.to_string(), String::new()),
    }
}
