//! INI file configuration adapter.
//!
//! ```ini
//! [runs]
//! dir = ./runs
//!
//! [timeline]
//! file = timeseries/chart_data.json
//!
//! [chart]
//! dedup_bars = true
//! top_drawdowns = 10
//!
//! [logging]
//! level = info
//! ```

use crate::domain::error::VizError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, VizError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| VizError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, VizError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| VizError::ConfigParse {
                file: "<string>".into(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }

    /// Non-blank raw value for `[section] key`.
    fn value(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn invalid(section: &str, key: &str, value: &str, expected: &str) -> VizError {
        VizError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("'{value}' is not {expected}"),
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, VizError> {
        match self.value(section, key) {
            None => Ok(default),
            Some(v) => v
                .parse::<i64>()
                .map_err(|_| Self::invalid(section, key, &v, "an integer")),
        }
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, VizError> {
        match self.value(section, key) {
            None => Ok(default),
            Some(v) => {
                Self::parse_bool(&v).ok_or_else(|| Self::invalid(section, key, &v, "a boolean"))
            }
        }
    }
}
