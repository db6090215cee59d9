use std::io::Write;

use sigmai_core::sigma::Rule;

use crate::error::SinkError;
use crate::sink::Sink;

/// Writes every rule to stdout as a multi-document YAML stream.
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        StdoutSink
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for StdoutSink {
    fn process(&mut self, rules: &[Rule]) -> Result<(), SinkError> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for rule in rules {
            let document = serde_yaml::to_string(rule)?;
            write!(out, "---\n{document}").map_err(|source| SinkError::Write {
                path: "<stdout>".into(),
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigmai_core::sigma::LogSource;

    #[test]
    fn process_accepts_empty_slice() {
        let mut sink = StdoutSink::new();
        assert!(sink.process(&[]).is_ok());
    }

    #[test]
    fn process_encodes_every_rule() {
        let mut sink = StdoutSink::new();
        let rules = vec![Rule::new(LogSource::default()), Rule::new(LogSource::default())];
        assert!(sink.process(&rules).is_ok());
    }
}
