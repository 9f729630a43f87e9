//! Registry config loader (strict parsing).

pub mod schema;

use std::fs;

use tally_core::error::{MetricsError, Result};

pub use schema::{PrometheusSection, RegistryConfig, StaticLabel};

pub fn load_from_file(path: &str) -> Result<RegistryConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MetricsError::InvalidConfig(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<RegistryConfig> {
    let cfg: RegistryConfig = serde_yaml::from_str(s)
        .map_err(|e| MetricsError::InvalidConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
