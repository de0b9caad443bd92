//! Run identifiers.
//!
//! Each invocation of the pipeline is independent; a run id ties a report to
//! the input and config snapshot that produced it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Run ID for tracking one batch analysis.
///
/// Format: `run-<date>-<time>-<random>`
/// Example: `run-20250104-143022-abc123`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    /// Generate a new run ID.
    pub fn new() -> Self {
        let now = chrono::Local::now();
        let suffix: String = uuid::Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(6)
            .collect();
        RunId(format!("run-{}-{}", now.format("%Y%m%d-%H%M%S"), suffix))
    }

    /// Parse an existing run ID string.
    pub fn parse(s: &str) -> Option<Self> {
        let rest = s.strip_prefix("run-")?;
        let parts: Vec<&str> = rest.split('-').collect();
        let well_formed = parts.len() == 3
            && parts[0].len() == 8
            && parts[1].len() == 6
            && parts[..2].iter().all(|p| p.bytes().all(|b| b.is_ascii_digit()))
            && !parts[2].is_empty();
        well_formed.then(|| RunId(s.to_string()))
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_format() {
        let id = RunId::new();
        assert!(id.0.starts_with("run-"));
        assert_eq!(id.0.len(), "run-20250104-143022-abc123".len());
    }

    #[test]
    fn test_generated_id_parses() {
        let id = RunId::new();
        assert_eq!(RunId::parse(&id.0), Some(id));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(RunId::parse("sess-20250104-143022-abc123").is_none());
        assert!(RunId::parse("run-2025-143022-abc123").is_none());
        assert!(RunId::parse("run-20250104-143022-").is_none());
    }
}
