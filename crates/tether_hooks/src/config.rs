//! Hook configuration
//!
//! Optional `[debounce]` table read from TOML:
//!
//! ```toml
//! [debounce]
//! wait_ms = 250
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level hooks configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct HooksConfig {
    #[serde(default)]
    pub debounce: DebounceConfig,
}

/// Defaults for `use_debounce`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DebounceConfig {
    /// Quiet period used when a hook passes no explicit wait
    #[serde(default = "default_wait_ms")]
    pub wait_ms: u64,
}

fn default_wait_ms() -> u64 {
    500
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            wait_ms: default_wait_ms(),
        }
    }
}

impl HooksConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Default debounce wait as a `Duration`
    pub fn debounce_wait(&self) -> Duration {
        Duration::from_millis(self.debounce.wait_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HooksError;

    #[test]
    fn test_defaults() {
        let config = HooksConfig::default();
        assert_eq!(config.debounce.wait_ms, 500);
        assert_eq!(config.debounce_wait(), Duration::from_millis(500));
    }

    #[test]
    fn test_empty_text_uses_defaults() {
        let config = HooksConfig::from_toml_str("").unwrap();
        assert_eq!(config, HooksConfig::default());

        let config = HooksConfig::from_toml_str("[debounce]\n").unwrap();
        assert_eq!(config.debounce.wait_ms, 500);
    }

    #[test]
    fn test_parse_wait() {
        let config = HooksConfig::from_toml_str("[debounce]\nwait_ms = 250\n").unwrap();
        assert_eq!(config.debounce_wait(), Duration::from_millis(250));
    }

    #[test]
    fn test_zero_wait_is_valid() {
        let config = HooksConfig::from_toml_str("[debounce]\nwait_ms = 0\n").unwrap();
        assert_eq!(config.debounce_wait(), Duration::ZERO);
    }

    #[test]
    fn test_invalid_text() {
        let err = HooksConfig::from_toml_str("[debounce]\nwait_ms = \"soon\"\n").unwrap_err();
        assert!(matches!(err, HooksError::Config(_)));
        assert!(err.to_string().starts_with("invalid hooks config"));
    }
}
