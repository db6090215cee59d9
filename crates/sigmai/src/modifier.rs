//! Post-processes a converted rule set before it reaches a sink (§6
//! "Modifier interface"): tag set/add/remove/clear, plus a level/status
//! override supplementing the original tag-only modifier.
//!
//! Only the first rule (the event's global scoping rule, see
//! [`crate::converter::convert`]) is touched, mirroring the source's
//! `Modifier.Process` which indexes `rules[0]` directly — per-detection
//! rules inherit their tags/level/status from the scope they belong to,
//! not from the modifier.

use sigmai_core::sigma::{Level, Rule, Status};

#[derive(Debug, Clone, Default)]
pub struct ModifierOptions {
    pub tags_add: Vec<String>,
    pub tags_rm: Vec<String>,
    pub tags_set: Vec<String>,
    pub tags_clear: bool,
    pub level_set: Option<Level>,
    pub status_set: Option<Status>,
}

/// Parses a `--level-set` value, accepting Sigma's own lowercase names.
pub fn parse_level(raw: &str) -> Result<Level, String> {
    match raw.to_ascii_lowercase().as_str() {
        "low" => Ok(Level::Low),
        "medium" => Ok(Level::Medium),
        "high" => Ok(Level::High),
        "critical" => Ok(Level::Critical),
        other => Err(format!("unknown level {other:?}, expected low/medium/high/critical")),
    }
}

/// Parses a `--status-set` value, accepting Sigma's own lowercase names.
pub fn parse_status(raw: &str) -> Result<Status, String> {
    match raw.to_ascii_lowercase().as_str() {
        "experimental" => Ok(Status::Experimental),
        "testing" => Ok(Status::Testing),
        "stable" => Ok(Status::Stable),
        other => Err(format!("unknown status {other:?}, expected experimental/testing/stable")),
    }
}

pub struct Modifier {
    options: ModifierOptions,
}

impl Modifier {
    pub fn new(options: ModifierOptions) -> Self {
        Modifier { options }
    }

    /// Applies the configured overrides to `rules[0]` in place. A no-op
    /// on an empty slice.
    pub fn process(&self, rules: &mut [Rule]) {
        let Some(first) = rules.first_mut() else {
            return;
        };

        if !self.options.tags_set.is_empty() {
            first.tags = self.options.tags_set.clone();
        } else if !self.options.tags_add.is_empty() {
            first.tags.extend(self.options.tags_add.iter().cloned());
        }

        if self.options.tags_clear {
            first.tags.clear();
        } else if !self.options.tags_rm.is_empty() {
            first.tags.retain(|tag| !self.options.tags_rm.contains(tag));
        }

        if let Some(level) = self.options.level_set {
            first.level = Some(level);
        }
        if let Some(status) = self.options.status_set {
            first.status = Some(status);
        }
    }
}
