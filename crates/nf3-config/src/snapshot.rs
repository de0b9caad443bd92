//! Config snapshots embedded in reports.
//!
//! A snapshot records exactly which configuration produced a report: the
//! resolved config, where it came from, and a SHA-256 of its canonical JSON.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::analysis::AnalysisConfig;
use crate::resolve::{ConfigSource, ResolvedConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub schema_version: String,
    pub source: ConfigSource,
    pub config_hash: String,
    pub captured_at: DateTime<Local>,
    pub config: AnalysisConfig,
}

impl ConfigSnapshot {
    pub fn capture(resolved: &ResolvedConfig) -> Result<Self, serde_json::Error> {
        Ok(Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            source: resolved.source.clone(),
            config_hash: config_hash(&resolved.config)?,
            captured_at: Local::now(),
            config: resolved.config.clone(),
        })
    }

    /// True when the embedded config still hashes to the recorded value.
    pub fn verify(&self) -> bool {
        config_hash(&self.config)
            .map(|h| h == self.config_hash)
            .unwrap_or(false)
    }
}

/// SHA-256 hex digest of the config's JSON serialization.
///
/// Field order is fixed by the struct definition and maps are ordered, so the
/// serialization is canonical for a given config value.
pub fn config_hash(config: &AnalysisConfig) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(config)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf3_common::FlowUnit;

    fn resolved(config: AnalysisConfig) -> ResolvedConfig {
        ResolvedConfig {
            config,
            source: ConfigSource::Defaults,
        }
    }

    #[test]
    fn hash_is_stable_and_sensitive() {
        let a = config_hash(&AnalysisConfig::default()).unwrap();
        let b = config_hash(&AnalysisConfig::default()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        let mut changed = AnalysisConfig::default();
        changed.unit = FlowUnit::Sccm;
        assert_ne!(a, config_hash(&changed).unwrap());
    }

    #[test]
    fn tampered_snapshot_fails_verification() {
        let mut snap = ConfigSnapshot::capture(&resolved(AnalysisConfig::default())).unwrap();
        assert!(snap.verify());
        snap.config.top_n = 99;
        assert!(!snap.verify());
    }
}
