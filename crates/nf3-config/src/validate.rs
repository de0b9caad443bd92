//! Semantic validation of an [`AnalysisConfig`].
//!
//! Validation collects every problem instead of stopping at the first, so an
//! operator can fix a config file in one pass.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisConfig, DimensionFilter};

/// Maximum number of hierarchy levels a breakdown may have.
pub const MAX_HIERARCHY_DEPTH: usize = 4;

/// One validation problem, anchored to a config field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Outcome of validating a config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when valid, otherwise the result itself as the error.
    pub fn into_result(self) -> Result<(), crate::ConfigError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(crate::ConfigError::Invalid(self))
        }
    }

    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationError::new(field, message));
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", parts.join("; "))
    }
}

fn positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Check every semantic constraint of `config`.
pub fn validate(config: &AnalysisConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    if config.rolling_windows.is_empty() {
        result.push("rolling_windows", "at least one window is required");
    }
    for (i, w) in config.rolling_windows.iter().enumerate() {
        if *w == 0 {
            result.push(format!("rolling_windows[{}]", i), "window must be >= 1");
        }
    }

    if !positive_finite(config.outliers.iqr_multiplier) {
        result.push("outliers.iqr_multiplier", "must be a positive finite number");
    }
    if config.abnormal.window == 0 {
        result.push("abnormal.window", "window must be >= 1");
    }
    if !positive_finite(config.abnormal.multiplier) {
        result.push("abnormal.multiplier", "must be a positive finite number");
    }

    if !(config.cost.price_per_kg.is_finite() && config.cost.price_per_kg >= 0.0) {
        result.push("cost.price_per_kg", "must be a finite number >= 0");
    }
    if !positive_finite(config.cost.gwp) {
        result.push("cost.gwp", "must be a positive finite number");
    }

    let depth = config.hierarchy.len();
    if depth == 0 || depth > MAX_HIERARCHY_DEPTH {
        result.push(
            "hierarchy",
            format!("needs 1 to {} levels, got {}", MAX_HIERARCHY_DEPTH, depth),
        );
    }
    let mut seen = HashSet::new();
    for dim in &config.hierarchy {
        if !seen.insert(*dim) {
            result.push("hierarchy", format!("dimension '{}' appears twice", dim));
        }
    }

    for (dim, filter) in &config.filters {
        if let DimensionFilter::OneOf(values) = filter {
            if values.is_empty() {
                result.push(
                    format!("filters.{}", dim),
                    "empty value set would exclude every record; use \"all\" instead",
                );
            }
        }
    }

    if config.recent_days == 0 {
        result.push("recent_days", "must be >= 1");
    }
    if config.top_n == 0 {
        result.push("top_n", "must be >= 1");
    }
    if config.correlation.step.trim().is_empty() {
        result.push("correlation.step", "must not be empty");
    }

    result
}
