//! The MISP fetcher's configuration schema: connection details, worker
//! pool sizing, and the server-side filters applied to every listing
//! request.

use crate::error::{ConfigError, Severity, ValidationIssue};

/// Options controlling how the fetcher talks to a MISP instance and
/// which events/attributes it asks the server to return.
#[derive(Debug, Clone)]
pub struct FetcherOptions {
    pub url: String,
    pub key: String,
    pub insecure: bool,
    /// Page size requested from the MISP REST endpoints.
    pub buffer: i64,
    /// Total worker count, including the dedicated event-listing worker.
    pub workers: i64,
    pub filters: FetchFilters,
}

impl Default for FetcherOptions {
    fn default() -> Self {
        FetcherOptions {
            url: String::new(),
            key: String::new(),
            insecure: false,
            buffer: 500,
            workers: 20,
            filters: FetchFilters::default(),
        }
    }
}

/// Server-side filters narrowing which events and attributes a run
/// retrieves.
#[derive(Debug, Clone, Default)]
pub struct FetchFilters {
    pub events: Vec<i64>,
    pub period: Vec<String>,
    pub tags: Vec<String>,
    pub threat_level: Vec<String>,
    pub published_include: bool,
    pub published_exclude: bool,
    pub ids_include: bool,
    pub ids_exclude: bool,
    pub warning_exclude: bool,
}

impl FetcherOptions {
    /// Validates the options, collecting every problem found rather
    /// than stopping at the first one so the CLI can report them all
    /// together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = Vec::new();

        if self.url.is_empty() {
            issues.push(ValidationIssue {
                field: "misp-url".to_string(),
                message: "missing MISP URL".to_string(),
                severity: Severity::Error,
            });
        }
        if self.key.is_empty() {
            issues.push(ValidationIssue {
                field: "misp-key".to_string(),
                message: "missing MISP authorization key".to_string(),
                severity: Severity::Error,
            });
        }
        if self.buffer <= 0 {
            issues.push(ValidationIssue {
                field: "misp-buffer".to_string(),
                message: "buffer must be at least 1".to_string(),
                severity: Severity::Error,
            });
        }
        if self.workers < 2 {
            issues.push(ValidationIssue {
                field: "misp-workers".to_string(),
                message: "workers must be at least 2 (one lister, one enricher)".to_string(),
                severity: Severity::Error,
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid { issues })
        }
    }
}
