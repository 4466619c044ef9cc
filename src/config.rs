use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "tracker_config.json";

/// Tunables for a tracking session. Every field is optional in the JSON
/// form; missing ones take the default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Samples reporting a worse accuracy radius (meters) are dropped.
    pub accuracy_threshold_m: f32,
    /// Moves shorter than this from the last accepted point are GPS noise.
    pub jitter_threshold_km: f64,
    /// Below this distance the pace is shown as undefined.
    pub pace_epsilon_km: f64,
    pub tick_interval_ms: u64,
    pub raw_data_mode: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            accuracy_threshold_m: 200.0,
            jitter_threshold_km: 0.001,
            pace_epsilon_km: crate::pace::DEFAULT_PACE_EPSILON_KM,
            tick_interval_ms: 1000,
            raw_data_mode: false,
        }
    }
}

impl TrackerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: TrackerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `tracker_config.json` from `dir`, or the defaults if there is none.
    pub fn load_or_default(dir: &str) -> Result<Self> {
        let path = Path::new(dir).join(CONFIG_FILE_NAME);
        if !path.exists() {
            debug!("[config] no config at {:?}, using defaults", path);
            return Ok(TrackerConfig::default());
        }
        let config = Self::from_json_str(&fs::read_to_string(&path)?)?;
        info!("[config] loaded from {:?}", path);
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.accuracy_threshold_m > 0.) {
            bail!(
                "accuracy_threshold_m must be positive, got {}",
                self.accuracy_threshold_m
            );
        }
        if !(self.jitter_threshold_km >= 0. && self.jitter_threshold_km.is_finite()) {
            bail!(
                "jitter_threshold_km must be a non-negative number, got {}",
                self.jitter_threshold_km
            );
        }
        if !(self.pace_epsilon_km >= 0. && self.pace_epsilon_km.is_finite()) {
            bail!(
                "pace_epsilon_km must be a non-negative number, got {}",
                self.pace_epsilon_km
            );
        }
        if self.tick_interval_ms == 0 {
            bail!("tick_interval_ms must not be zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::TrackerConfig;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = TrackerConfig::from_json_str(r#"{"accuracy_threshold_m": 50.0}"#).unwrap();
        assert_eq!(config.accuracy_threshold_m, 50.0);
        assert_eq!(config.jitter_threshold_km, 0.001);
        assert_eq!(config.tick_interval_ms, 1000);
        assert!(!config.raw_data_mode);
    }

    #[test]
    fn rejects_nonsense() {
        assert!(TrackerConfig::from_json_str(r#"{"accuracy_threshold_m": 0.0}"#).is_err());
        assert!(TrackerConfig::from_json_str(r#"{"tick_interval_ms": 0}"#).is_err());
        assert!(TrackerConfig::from_json_str(r#"{"jitter_threshold_km": -1.0}"#).is_err());
        assert!(TrackerConfig::from_json_str("not json").is_err());
    }
}
