//! Schema versioning and compatibility.

/// Current schema version for report and config documents.
///
/// Follows semver: MAJOR.MINOR.PATCH
/// - MAJOR: Breaking changes (field removals, type changes)
/// - MINOR: Additive changes (new optional fields)
/// - PATCH: Bug fixes, documentation
pub const SCHEMA_VERSION: &str = "1.0.0";

fn major(version: &str) -> Option<u32> {
    version.trim().split('.').next()?.parse().ok()
}

/// A document is readable when its major version matches ours.
pub fn is_compatible(version: &str) -> bool {
    match (major(SCHEMA_VERSION), major(version)) {
        (Some(ours), Some(theirs)) => ours == theirs,
        _ => false,
    }
}
