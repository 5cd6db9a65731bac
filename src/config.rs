use crate::timestamps::SETLIST_FALLBACK_DURATION;
use crate::{Result, ScrobbleError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// How timestamps are obtained for CSV rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScrobbleMode {
    /// Each row carries a literal timestamp
    #[default]
    Normal,
    /// Timestamps in the file are ignored; a synthetic sequence is generated
    ImportMode,
}

/// Settings for the setlist flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetlistConfig {
    /// Spacing used for songs whose length is unknown
    #[serde(with = "duration_secs")]
    pub fallback_duration: Duration,
}

impl Default for SetlistConfig {
    fn default() -> Self {
        Self {
            fallback_duration: SETLIST_FALLBACK_DURATION,
        }
    }
}

impl SetlistConfig {
    pub fn with_fallback_duration(mut self, fallback: Duration) -> Self {
        self.fallback_duration = fallback;
        self
    }
}

/// Column positions (0-indexed) of each field in a CSV row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvFieldMapping {
    pub artist: usize,
    pub album: usize,
    pub track: usize,
    pub timestamp: usize,
    pub album_artist: usize,
    pub duration: usize,
}

impl Default for CsvFieldMapping {
    fn default() -> Self {
        Self {
            artist: 0,
            album: 1,
            track: 2,
            timestamp: 3,
            album_artist: 4,
            duration: 5,
        }
    }
}

/// Settings for the CSV import flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvImportConfig {
    pub mode: ScrobbleMode,
    /// Spacing between generated timestamps in import mode
    #[serde(with = "duration_secs")]
    pub step: Duration,
    /// Field delimiter byte
    pub delimiter: u8,
    /// Whether the first row is a header to skip
    pub has_headers: bool,
    pub fields: CsvFieldMapping,
    /// Extra `chrono` formats tried before the built-in fallback
    pub timestamp_formats: Vec<String>,
    /// Rows played longer ago than this are disabled in normal mode
    #[serde(with = "option_duration_secs")]
    pub max_scrobble_age: Option<Duration>,
}

impl Default for CsvImportConfig {
    fn default() -> Self {
        Self {
            mode: ScrobbleMode::Normal,
            step: Duration::from_secs(1),
            delimiter: b',',
            has_headers: false,
            fields: CsvFieldMapping::default(),
            timestamp_formats: vec![
                "%Y-%m-%d %H:%M:%S".to_string(),
                "%Y-%m-%dT%H:%M:%S".to_string(),
                "%Y-%m-%d %H:%M".to_string(),
                "%m/%d/%Y %H:%M:%S".to_string(),
                "%d %b %Y %H:%M".to_string(),
            ],
            max_scrobble_age: Some(Duration::from_secs(14 * 24 * 60 * 60)),
        }
    }
}

impl CsvImportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: ScrobbleMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    pub fn with_fields(mut self, fields: CsvFieldMapping) -> Self {
        self.fields = fields;
        self
    }

    /// Disable the age limit so old rows stay selectable.
    pub fn without_age_limit(mut self) -> Self {
        self.max_scrobble_age = None;
        self
    }
}

/// Everything the CLI persists between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub setlist: SetlistConfig,
    pub csv: CsvImportConfig,
}

impl AppConfig {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Loads and stores [`AppConfig`] under the platform config directory,
/// e.g. `~/.config/scrobble-import/config.json`.
pub struct ConfigPersistence;

impl ConfigPersistence {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ScrobbleError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Cannot determine config directory",
            ))
        })?;
        Ok(config_dir.join("scrobble-import").join("config.json"))
    }

    /// Load the saved config, falling back to defaults when none exists.
    pub fn load() -> Result<AppConfig> {
        let path = Self::config_path()?;
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(AppConfig::default());
        }

        let json = fs::read_to_string(&path)?;
        let config = AppConfig::from_json(&json)?;
        log::debug!("Config loaded from: {}", path.display());
        Ok(config)
    }

    pub fn save(config: &AppConfig) -> Result<PathBuf> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, config.to_json()?)?;
        log::debug!("Config saved to: {}", path.display());
        Ok(path)
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}

mod option_duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        duration: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match duration {
            Some(duration) => serializer.serialize_some(&duration.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_per_flow_spacing_separate() {
        let config = AppConfig::default();

        assert_eq!(config.setlist.fallback_duration, Duration::from_secs(180));
        assert_eq!(config.csv.step, Duration::from_secs(1));
        assert_eq!(config.csv.mode, ScrobbleMode::Normal);
        assert_eq!(config.csv.fields.timestamp, 3);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            setlist: SetlistConfig::default().with_fallback_duration(Duration::from_secs(200)),
            csv: CsvImportConfig::new()
                .with_mode(ScrobbleMode::ImportMode)
                .with_step(Duration::from_secs(30))
                .with_delimiter(b';')
                .without_age_limit(),
        };

        let json = config.to_json().unwrap();
        assert!(json.contains("\"step\": 30"));

        let restored = AppConfig::from_json(&json).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let restored = AppConfig::from_json(r#"{"csv": {"step": 45}}"#).unwrap();

        assert_eq!(restored.csv.step, Duration::from_secs(45));
        assert_eq!(restored.csv.delimiter, b',');
        assert_eq!(restored.setlist, SetlistConfig::default());
    }
}
