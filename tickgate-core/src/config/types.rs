use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::risk::RiskParams;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub risk: RiskSection,
    pub logging: LoggingConfig,
}

/// Data-path configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Decision ring capacity (nonzero power of two)
    #[serde(default = "default_ring_len")]
    pub ring_len: u32,

    /// Sequence checking in the splitter
    #[serde(default = "default_true")]
    pub seq_check_enabled: bool,

    /// Symbol table file (SYMBOL,INDEX per line)
    #[serde(default)]
    pub symbols_file: Option<PathBuf>,

    /// Reference price file (INDEX,PRICE per line)
    #[serde(default)]
    pub prices_file: Option<PathBuf>,
}

/// Named risk profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileName {
    Standard,
    Aggressive,
    Conservative,
}

impl ProfileName {
    pub fn params(self) -> RiskParams {
        match self {
            ProfileName::Standard => RiskParams::standard(),
            ProfileName::Aggressive => RiskParams::aggressive(),
            ProfileName::Conservative => RiskParams::conservative(),
        }
    }
}

/// Risk configuration: a named profile plus per-field overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskSection {
    /// Base profile the overrides apply on top of
    #[serde(default = "default_profile")]
    pub profile: ProfileName,

    #[serde(default)]
    pub price_band_bps: Option<u16>,

    #[serde(default)]
    pub token_rate_per_ms: Option<u16>,

    #[serde(default)]
    pub token_bucket_max: Option<u16>,

    #[serde(default)]
    pub position_limit: Option<i32>,

    #[serde(default)]
    pub stale_threshold_ns: Option<u32>,

    #[serde(default)]
    pub seq_gap_threshold: Option<u16>,

    /// Start with the kill switch asserted
    #[serde(default)]
    pub kill: bool,
}

impl RiskSection {
    /// Resolve the profile plus overrides into concrete parameters.
    pub fn resolve(&self) -> RiskParams {
        let mut params = self.profile.params();
        if let Some(v) = self.price_band_bps {
            params.price_band_bps = v;
        }
        if let Some(v) = self.token_rate_per_ms {
            params.token_rate_per_ms = v;
        }
        if let Some(v) = self.token_bucket_max {
            params.token_bucket_max = v;
        }
        if let Some(v) = self.position_limit {
            params.position_limit = v;
        }
        if let Some(v) = self.stale_threshold_ns {
            params.stale_threshold_ns = v;
        }
        if let Some(v) = self.seq_gap_threshold {
            params.seq_gap_threshold = v;
        }
        params.kill = self.kill;
        params
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON-structured logs
    #[serde(default)]
    pub json_logs: bool,
}

fn default_ring_len() -> u32 {
    4096
}

fn default_true() -> bool {
    true
}

fn default_profile() -> ProfileName {
    ProfileName::Standard
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_resolution() {
        let section = RiskSection {
            profile: ProfileName::Conservative,
            price_band_bps: None,
            token_rate_per_ms: None,
            token_bucket_max: None,
            position_limit: None,
            stale_threshold_ns: None,
            seq_gap_threshold: None,
            kill: false,
        };
        assert_eq!(section.resolve(), RiskParams::conservative());
    }

    #[test]
    fn test_overrides_apply_on_top_of_profile() {
        let section = RiskSection {
            profile: ProfileName::Standard,
            price_band_bps: Some(42),
            token_rate_per_ms: None,
            token_bucket_max: None,
            position_limit: Some(7),
            stale_threshold_ns: None,
            seq_gap_threshold: None,
            kill: true,
        };
        let params = section.resolve();
        assert_eq!(params.price_band_bps, 42);
        assert_eq!(params.position_limit, 7);
        assert!(params.kill);
        // Untouched fields keep the profile value.
        assert_eq!(
            params.token_rate_per_ms,
            RiskParams::standard().token_rate_per_ms
        );
    }
}
