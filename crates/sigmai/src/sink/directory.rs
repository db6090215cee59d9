use std::fs;
use std::io::Write;
use std::path::PathBuf;

use sigmai_core::sigma::Rule;

use crate::error::SinkError;
use crate::sink::Sink;

/// Saves each event's rules as a single `<id>.yml` file inside a
/// directory that must already exist.
pub struct DirectorySink {
    path: PathBuf,
}

impl DirectorySink {
    pub fn new(path: PathBuf) -> Result<Self, SinkError> {
        if path.as_os_str().is_empty() {
            return Err(SinkError::MissingPath);
        }
        let metadata = fs::metadata(&path).map_err(|source| SinkError::Write {
            path: path.clone(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(SinkError::NotADirectory(path));
        }
        Ok(DirectorySink { path })
    }
}

impl Sink for DirectorySink {
    fn process(&mut self, rules: &[Rule]) -> Result<(), SinkError> {
        let Some(first) = rules.first() else {
            return Ok(());
        };
        let id = first.id.clone().unwrap_or_else(|| "rule".to_string());
        let file_path = self.path.join(format!("{id}.yml"));
        let mut file = fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(&file_path)
            .map_err(|source| SinkError::Write {
                path: file_path.clone(),
                source,
            })?;
        for rule in rules {
            let document = serde_yaml::to_string(rule)?;
            write!(file, "---\n{document}").map_err(|source| SinkError::Write {
                path: file_path.clone(),
                source,
            })?;
        }
        tracing::info!(rule = %id, path = %file_path.display(), "saved Sigma rule");
        Ok(())
    }
}
