use crate::types::Config;
use anyhow::Result;
use std::fs;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "analytics:\n  calibration_factor: 1.5\nboundary:\n  offset_px: 40\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.analytics.calibration_factor, 1.5);
        assert_eq!(config.boundary.offset_px, 40);
        // Untouched sections keep their defaults
        assert_eq!(config.analytics.speed_window_length, 5);
        assert_eq!(config.batching.flush_interval_secs, 1.0);
        assert_eq!(config.logging.level, "info");
    }
}
