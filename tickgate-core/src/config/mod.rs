pub mod files;
pub mod types;

pub use files::{read_price_file, read_symbol_file};
pub use types::{Config, LoggingConfig, PipelineConfig, ProfileName, RiskSection};

use anyhow::{Context, Result};
use config::{Config as ConfigLoader, Environment, File};
use std::path::Path;

impl Config {
    /// Load configuration from a TOML file with environment overrides
    /// (`TICKGATE_` prefix, `__` separator).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = ConfigLoader::builder()
            .set_default("pipeline.ring_len", 4096)?
            .set_default("pipeline.seq_check_enabled", true)?
            .set_default("risk.profile", "standard")?
            .set_default("risk.kill", false)?
            .set_default("logging.log_level", "info")?
            .set_default("logging.json_logs", false)?
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("TICKGATE").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let cfg: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.ring_len == 0 || !self.pipeline.ring_len.is_power_of_two() {
            anyhow::bail!(
                "pipeline.ring_len must be a nonzero power of two, got {}",
                self.pipeline.ring_len
            );
        }
        let params = self.risk.resolve();
        if params.token_bucket_max == 0 {
            anyhow::bail!("risk.token_bucket_max must be at least 1");
        }
        Ok(())
    }
}
