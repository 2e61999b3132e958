//! Tunables for the aggregator. Loaded by the binary; tests build them directly.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Default merge radius in meters.
pub const DEFAULT_MERGE_RADIUS_M: f64 = 50.0;

/// How two tag strings are compared when deciding a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagMatch {
    /// Byte-for-byte string equality.
    #[default]
    Exact,
    /// Trimmed and lowercased before comparing.
    CaseInsensitive,
}

impl TagMatch {
    pub fn matches(&self, a: &str, b: &str) -> bool {
        match self {
            TagMatch::Exact => a == b,
            TagMatch::CaseInsensitive => a.trim().to_lowercase() == b.trim().to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Submissions of the same category closer than this collapse into one report.
    pub merge_radius_m: f64,
    pub tag_match: TagMatch,
    /// Bounds (inclusive) of the impression bump applied per view event.
    pub impression_min: u64,
    pub impression_max: u64,
    /// Author recorded when a submission carries none.
    pub default_author: String,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            merge_radius_m: DEFAULT_MERGE_RADIUS_M,
            tag_match: TagMatch::Exact,
            impression_min: 1,
            impression_max: 20,
            default_author: "local".to_string(),
        }
    }
}

impl AggregatorConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.merge_radius_m.is_finite() || self.merge_radius_m < 0.0 {
            return Err(AppError::Config(format!(
                "merge_radius_m must be a non-negative number, got {}",
                self.merge_radius_m
            )));
        }
        if self.impression_min == 0 {
            return Err(AppError::Config("impression_min must be at least 1".into()));
        }
        if self.impression_min > self.impression_max {
            return Err(AppError::Config(format!(
                "impression_min ({}) exceeds impression_max ({})",
                self.impression_min, self.impression_max
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = AggregatorConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.merge_radius_m, 50.0);
        assert_eq!((cfg.impression_min, cfg.impression_max), (1, 20));
    }

    #[test]
    fn test_rejects_bad_bounds() {
        let cfg = AggregatorConfig { impression_min: 5, impression_max: 2, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(AppError::Config(_))));

        let cfg = AggregatorConfig { merge_radius_m: f64::NAN, ..Default::default() };
        assert!(cfg.validate().is_err());

        let cfg = AggregatorConfig { impression_min: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_tag_match_modes() {
        assert!(TagMatch::Exact.matches("potholes", "potholes"));
        assert!(!TagMatch::Exact.matches("potholes", "Potholes "));
        assert!(TagMatch::CaseInsensitive.matches("potholes", " Potholes"));
    }
}
