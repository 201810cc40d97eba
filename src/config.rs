//! Configuration for the lineage engine.

use crate::error::{MeridianError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Traversal strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalStrategy {
    /// Walk the bipartite graph natively, edge by edge.
    #[default]
    Native,
    /// Delegate the pattern-match to the graph store's own traversal-script
    /// facility. Hide-process requests still run natively.
    Script,
}

/// Lineage engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineageConfig {
    /// Traversal strategy.
    #[serde(default)]
    pub strategy: TraversalStrategy,
    /// Attributes projected when a request names none.
    #[serde(default)]
    pub default_attributes: Vec<String>,
    /// Hard bound on traversal depth. When set, unbounded (0) or larger
    /// requested depths are clamped to it. Guards against unbounded work on
    /// untrusted graph sizes.
    #[serde(default)]
    pub max_depth: Option<u32>,
}

impl LineageConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MeridianError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| MeridianError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == Some(0) {
            return Err(MeridianError::InvalidConfig {
                field: "max_depth".to_string(),
                reason: "A depth clamp of 0 would reintroduce unbounded traversal".to_string(),
            });
        }

        Ok(())
    }

    /// Applies the depth clamp to a requested depth.
    pub(crate) fn clamp_depth(&self, depth: u32) -> u32 {
        match self.max_depth {
            Some(max) if depth == 0 || depth > max => max,
            _ => depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = LineageConfig::default();
        assert_eq!(config.strategy, TraversalStrategy::Native);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_max_depth_rejected() {
        let config = LineageConfig {
            max_depth: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(MeridianError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_clamp_depth() {
        let unclamped = LineageConfig::default();
        assert_eq!(unclamped.clamp_depth(0), 0);
        assert_eq!(unclamped.clamp_depth(7), 7);

        let clamped = LineageConfig {
            max_depth: Some(5),
            ..Default::default()
        };
        assert_eq!(clamped.clamp_depth(0), 5);
        assert_eq!(clamped.clamp_depth(3), 3);
        assert_eq!(clamped.clamp_depth(9), 5);
    }

    #[test]
    fn test_from_json() {
        let config: LineageConfig = serde_json::from_str(
            r#"{"strategy":"script","default_attributes":["owner"],"max_depth":10}"#,
        )
        .unwrap();
        assert_eq!(config.strategy, TraversalStrategy::Script);
        assert_eq!(config.default_attributes, vec!["owner".to_string()]);
        assert_eq!(config.max_depth, Some(10));
    }
}
