use serde::Deserialize;
use tally_core::encode::PrometheusOptions;
use tally_core::error::{MetricsError, Result};
use tally_core::LabelSet;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    pub version: u32,

    /// Attached to every exported series, in this order.
    #[serde(default)]
    pub static_labels: Vec<StaticLabel>,

    #[serde(default)]
    pub prometheus: PrometheusSection,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            version: 1,
            static_labels: Vec::new(),
            prometheus: PrometheusSection::default(),
        }
    }
}

impl RegistryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MetricsError::InvalidConfig(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        let keys: Vec<&str> = self.static_labels.iter().map(|l| l.key.as_str()).collect();
        LabelSet::declare(&keys)
            .map_err(|e| MetricsError::InvalidConfig(format!("static_labels: {e}")))?;

        Ok(())
    }

    pub fn static_label_pairs(&self) -> Vec<(String, String)> {
        self.static_labels
            .iter()
            .map(|l| (l.key.clone(), l.value.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticLabel {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrometheusSection {
    #[serde(default = "default_timestamps")]
    pub timestamps: bool,
}

impl Default for PrometheusSection {
    fn default() -> Self {
        Self {
            timestamps: default_timestamps(),
        }
    }
}

impl From<&PrometheusSection> for PrometheusOptions {
    fn from(s: &PrometheusSection) -> Self {
        PrometheusOptions {
            timestamps: s.timestamps,
        }
    }
}

fn default_timestamps() -> bool {
    true
}
