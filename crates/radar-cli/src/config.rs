use radar_engine::EngineConfig;
use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize, Default)]
pub struct RadarConfig {
    #[serde(default)]
    pub engine: EngineSection,
    pub data: Option<DataSection>,
    pub db: Option<DbSection>,
}

#[derive(Deserialize)]
pub struct EngineSection {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_wave_delays_ms")]
    pub wave_delays_ms: Vec<u64>,
    #[serde(default = "default_url_poll_interval_ms")]
    pub url_poll_interval_ms: u64,
}

#[derive(Deserialize)]
pub struct DataSection {
    pub path: String,
}

#[derive(Deserialize)]
pub struct DbSection {
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_debounce_ms() -> u64 {
    300
}
fn default_wave_delays_ms() -> Vec<u64> {
    vec![100, 500, 1500, 3000]
}
fn default_url_poll_interval_ms() -> u64 {
    1000
}
fn default_db_path() -> String {
    "./radar-data/radar.db".to_string()
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            wave_delays_ms: default_wave_delays_ms(),
            url_poll_interval_ms: default_url_poll_interval_ms(),
        }
    }
}

impl RadarConfig {
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        config.debounce = Duration::from_millis(self.engine.debounce_ms);
        config.wave_delays = self
            .engine
            .wave_delays_ms
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect();
        config.url_poll_interval = Duration::from_millis(self.engine.url_poll_interval_ms);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_sections() {
        let config: RadarConfig = toml::from_str("").unwrap();
        assert_eq!(config.engine.debounce_ms, 300);
        assert_eq!(config.engine.wave_delays_ms, vec![100, 500, 1500, 3000]);
        assert!(config.db.is_none());
    }

    #[test]
    fn engine_section_overrides_apply() {
        let config: RadarConfig = toml::from_str(
            "[engine]\ndebounce_ms = 800\nwave_delays_ms = [50, 250]\n",
        )
        .unwrap();
        let engine = config.engine_config();
        assert_eq!(engine.debounce, Duration::from_millis(800));
        assert_eq!(engine.wave_delays.len(), 2);
    }
}
