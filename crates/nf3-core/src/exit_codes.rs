//! Exit codes for the nf3-core CLI.
//!
//! Exit codes communicate the outcome without requiring output parsing.
//! They are stable across releases.

use nf3_common::Error;

/// Exit codes for nf3-core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Report produced, nothing flagged
    Clean = 0,

    /// Report produced and outlier or abnormal buckets were flagged
    Findings = 1,

    /// Configuration error
    ConfigError = 10,

    /// Input table missing, malformed, or empty
    InputError = 11,

    /// Analysis could not be computed (e.g. no data for the requested date)
    AnalysisError = 12,

    /// I/O or serialization error
    IoError = 13,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates success.
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean | ExitCode::Findings)
    }

    /// Check if this exit code indicates an error requiring attention.
    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    /// `Findings` when anything was flagged, otherwise `Clean`.
    pub fn from_findings(count: usize) -> Self {
        if count > 0 {
            ExitCode::Findings
        } else {
            ExitCode::Clean
        }
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err.code() {
            10..=19 => ExitCode::ConfigError,
            20..=29 => ExitCode::InputError,
            30..=39 => ExitCode::AnalysisError,
            60..=69 => ExitCode::IoError,
            _ => ExitCode::InternalError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}
