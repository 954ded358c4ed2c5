//! Engine settings. Every field has a default, so `{}` is a valid settings file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::condition::UnrecognizedPolicy;

pub const CHART_JS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.0/dist/chart.umd.min.js";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    pub uri_scheme: String,
    pub app_base_url: String,
    pub chart_library_url: String,
    pub unrecognized_conditions: UnrecognizedPolicy,
    pub default_primary_color: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            uri_scheme: "ui".to_string(),
            app_base_url: "http://localhost:3000".to_string(),
            chart_library_url: CHART_JS_CDN.to_string(),
            unrecognized_conditions: UnrecognizedPolicy::Allow,
            default_primary_color: "#007bff".to_string(),
        }
    }
}

impl EngineSettings {
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"uriScheme": "app", "unrecognizedConditions": "deny"}}"#).unwrap();

        let settings = EngineSettings::load_from_file(file.path()).unwrap();
        assert_eq!(settings.uri_scheme, "app");
        assert_eq!(settings.unrecognized_conditions, UnrecognizedPolicy::Deny);
        assert_eq!(settings.app_base_url, "http://localhost:3000");
        assert_eq!(settings.chart_library_url, CHART_JS_CDN);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EngineSettings::load_from_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }

    #[test]
    fn test_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            EngineSettings::load_from_file(file.path()),
            Err(SettingsError::Parse(_))
        ));
    }
}
