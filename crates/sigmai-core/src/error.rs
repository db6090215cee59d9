//! Configuration validation errors shared between the CLI and the
//! fetcher.

use thiserror::Error;

/// Errors produced while validating a [`crate::config::FetcherOptions`]
/// before the pipeline starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more fields failed validation; `issues` holds every
    /// problem found in a single pass rather than stopping at the
    /// first one.
    #[error("{} configuration issue(s) found", issues.len())]
    Invalid { issues: Vec<ValidationIssue> },
}

/// A single validation problem found while checking configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Name of the offending field, e.g. `"misp-workers"`.
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{prefix}: {} ({})", self.message, self.field)
    }
}

/// Severity of a [`ValidationIssue`]. Warnings are surfaced in logs but
/// never block a run; errors do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_issue_display_includes_severity_and_field() {
        let issue = ValidationIssue {
            field: "misp-buffer".to_string(),
            message: "must be at least 1".to_string(),
            severity: Severity::Error,
        };
        assert_eq!(issue.to_string(), "error: must be at least 1 (misp-buffer)");
    }

    #[test]
    fn config_error_messages_count_the_issues() {
        let err = ConfigError::Invalid {
            issues: vec![ValidationIssue {
                field: "misp-workers".to_string(),
                message: "must be at least 2".to_string(),
                severity: Severity::Error,
            }],
        };
        assert_eq!(err.to_string(), "1 configuration issue(s) found");
    }
}
