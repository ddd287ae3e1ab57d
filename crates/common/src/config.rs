use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::CoordinateDomain;
use crate::error::CoreError;

/// Errors from loading a [`UniverseConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error(transparent)]
    Domain(#[from] CoreError),
}

/// Exploration search tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Ring radii at or below this are enumerated exactly; larger rings are sampled.
    pub sampling_radius_threshold: u32,
    /// Number of golden-angle spiral samples per sampled ring.
    pub sample_count: u32,
    /// Accepted `| |p| - r |` deviation for a lattice point to sit on ring `r`.
    pub ring_tolerance: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            sampling_radius_threshold: 24,
            sample_count: 256,
            ring_tolerance: 0.5,
        }
    }
}

/// Route costing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub cost_per_hop: u64,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self { cost_per_hop: 10 }
    }
}

/// Top-level configuration threaded explicitly through every engine call.
///
/// There is no process-wide seed: whoever owns a `UniverseConfig` passes
/// `seed` into the generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    pub seed: String,
    pub domain: CoordinateDomain,
    pub search: SearchConfig,
    pub routing: RouteConfig,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            seed: "warpspace".into(),
            domain: CoordinateDomain::default(),
            search: SearchConfig::default(),
            routing: RouteConfig::default(),
        }
    }
}

impl UniverseConfig {
    /// Parse and validate a YAML document. Missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&data)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.domain.validate()?;
        if self.search.sample_count == 0 {
            return Err(ConfigError::Invalid(
                "search.sample_count must be > 0".into(),
            ));
        }
        let tolerance = self.search.ring_tolerance;
        if tolerance.is_nan() || tolerance < 0.0 {
            return Err(ConfigError::Invalid(
                "search.ring_tolerance must be a non-negative number".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = UniverseConfig::default();
        config.validate().unwrap();
        assert_eq!(config.routing.cost_per_hop, 10);
        assert_eq!(config.search.sampling_radius_threshold, 24);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "seed: abc\ndomain:\n  min: 0\n  max: 9\n  step: 3\n";
        let config = UniverseConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.seed, "abc");
        assert_eq!(config.domain.total_points(), 64);
        assert_eq!(config.search, SearchConfig::default());
    }

    #[test]
    fn invalid_domain_is_rejected() {
        let result = UniverseConfig::from_yaml_str("domain:\n  min: 0\n  max: 9\n  step: 0\n");
        assert!(matches!(result, Err(ConfigError::Domain(_))));
    }

    #[test]
    fn zero_samples_rejected() {
        let result = UniverseConfig::from_yaml_str("search:\n  sample_count: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "seed: from-file\nrouting:\n  cost_per_hop: 3").unwrap();
        let config = UniverseConfig::load(tmp.path()).unwrap();
        assert_eq!(config.seed, "from-file");
        assert_eq!(config.routing.cost_per_hop, 3);
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let result = UniverseConfig::load(tmp.path().join("nope.yaml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
