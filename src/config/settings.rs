//! User settings
//!
//! Engine policies (unassign behaviour, cross-month transfers) plus CLI
//! preferences, persisted as JSON next to the data directory.

use serde::{Deserialize, Serialize};

use super::paths::EnvelopePaths;
use crate::error::EnvelopeError;

/// What `unassign` does with the entry it is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnassignPolicy {
    /// Remove the entry row; the audit log keeps the history
    #[default]
    Delete,
    /// Append a reversal entry and keep the original
    Reversal,
}

/// User settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Default currency symbol
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Recorded as `created_by` on entries created from the CLI
    #[serde(default = "default_actor")]
    pub actor: String,

    /// Default tracing filter; `RUST_LOG` takes precedence
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Whether transfers may move money between different months
    #[serde(default = "default_allow_cross_month")]
    pub allow_cross_month_transfers: bool,

    #[serde(default)]
    pub unassign_policy: UnassignPolicy,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_actor() -> String {
    "envelope".to_string()
}

fn default_log_filter() -> String {
    "envelope_ledger=warn".to_string()
}

fn default_allow_cross_month() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            actor: default_actor(),
            log_filter: default_log_filter(),
            allow_cross_month_transfers: default_allow_cross_month(),
            unassign_policy: UnassignPolicy::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or defaults if the file doesn't exist
    pub fn load_or_create(paths: &EnvelopePaths) -> Result<Self, EnvelopeError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| EnvelopeError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| EnvelopeError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &EnvelopePaths) -> Result<(), EnvelopeError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| EnvelopeError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| EnvelopeError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.unassign_policy, UnassignPolicy::Delete);
        assert!(settings.allow_cross_month_transfers);
        assert_eq!(settings.currency_symbol, "$");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = EnvelopePaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.unassign_policy = UnassignPolicy::Reversal;
        settings.allow_cross_month_transfers = false;
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.unassign_policy, UnassignPolicy::Reversal);
        assert!(!loaded.allow_cross_month_transfers);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"actor":"sam"}"#).unwrap();
        assert_eq!(settings.actor, "sam");
        assert!(settings.allow_cross_month_transfers);
        assert_eq!(settings.log_filter, "envelope_ledger=warn");
    }
}
