use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::roster::DEFAULT_CATEGORIES;

pub const CONFIG_FILE: &str = "config.toml";

/// UTC+8.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 480;

/// Keys accepted by [`Config::set`].
pub const KEYS: &[&str] = &[
    "default_user",
    "chart.keep_master",
    "chart.utc_offset_minutes",
    "http.port",
    "roster.categories",
];

/// `config.toml` in the data directory. Every field has a default, so a
/// missing file is equivalent to an empty one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Account used when `--user` is not given.
    pub default_user: String,
    pub chart: ChartConfig,
    pub http: HttpConfig,
    pub roster: RosterConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Keep 11/22/33 unreduced in the diamond chart.
    pub keep_master: bool,
    /// Offset from UTC, in minutes, of the calendar "today" is read in.
    pub utc_offset_minutes: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Categories offered when adding a profile.
    pub categories: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_user: "me".to_string(),
            chart: ChartConfig::default(),
            http: HttpConfig::default(),
            roster: RosterConfig::default(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            keep_master: false,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { port: 8787 }
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::parse(&content)?;
                tracing::debug!("loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(StoreError::Config(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Set one dotted key from its command-line form. `roster.categories`
    /// takes a comma-separated list.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        let invalid =
            |what: &str| StoreError::Config(format!("{key}: expected {what}, got '{value}'"));
        match key {
            "default_user" => {
                if value.is_empty() {
                    return Err(invalid("a user name"));
                }
                self.default_user = value.to_string();
            }
            "chart.keep_master" => {
                self.chart.keep_master = value.parse().map_err(|_| invalid("true or false"))?;
            }
            "chart.utc_offset_minutes" => {
                let minutes: i32 = value.parse().map_err(|_| invalid("minutes"))?;
                if !(-14 * 60..=14 * 60).contains(&minutes) {
                    return Err(invalid("an offset between -840 and 840"));
                }
                self.chart.utc_offset_minutes = minutes;
            }
            "http.port" => {
                self.http.port = value.parse().map_err(|_| invalid("a port number"))?;
            }
            "roster.categories" => {
                self.roster.categories = value
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            _ => {
                return Err(StoreError::Config(format!(
                    "unknown key '{key}' (expected one of {})",
                    KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            default_user = "joe"

            [chart]
            keep_master = true
            "#,
        )
        .unwrap();
        assert_eq!(config.default_user, "joe");
        assert!(config.chart.keep_master);
        assert_eq!(config.http.port, 8787);
        assert!(config.roster.categories.contains(&"Family".to_string()));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Config::parse("default_user = ["),
            Err(StoreError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_utc_offset_defaults_to_utc_plus_8() {
        assert_eq!(Config::default().chart.utc_offset_minutes, 480);
        let config = Config::parse("[chart]\nutc_offset_minutes = -300\n").unwrap();
        assert_eq!(config.chart.utc_offset_minutes, -300);
        assert!(!config.chart.keep_master);
    }

    #[test]
    fn test_set_known_keys() {
        let mut config = Config::default();
        config.set("default_user", " joe ").unwrap();
        config.set("chart.keep_master", "true").unwrap();
        config.set("chart.utc_offset_minutes", "-300").unwrap();
        config.set("http.port", "9000").unwrap();
        config.set("roster.categories", "Family, Work,,").unwrap();

        assert_eq!(config.default_user, "joe");
        assert!(config.chart.keep_master);
        assert_eq!(config.chart.utc_offset_minutes, -300);
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.roster.categories, vec!["Family", "Work"]);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(matches!(config.set("nope", "1"), Err(StoreError::Config(_))));
        assert!(config.set("http.port", "99999").is_err());
        assert!(config.set("chart.keep_master", "yes").is_err());
        assert!(config.set("chart.utc_offset_minutes", "900").is_err());
        assert!(config.set("default_user", "  ").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = Config::default();
        config.http.port = 9000;
        let text = config.to_toml().unwrap();
        assert_eq!(Config::parse(&text).unwrap(), config);
    }
}
