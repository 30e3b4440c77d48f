//! Configuration access port trait.

use crate::domain::error::VizError;

/// Typed access to `[section] key` settings. A missing or blank value
/// yields the default; a value that does not parse is `ConfigInvalid`.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, VizError>;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, VizError>;

    fn require_string(&self, section: &str, key: &str) -> Result<String, VizError> {
        self.get_string(section, key)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| VizError::ConfigMissing {
                section: section.to_string(),
                key: key.to_string(),
            })
    }
}
