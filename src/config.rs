use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::dashboard::DeriveSettings;
use crate::data::loader::RowPolicy;

/// Dashboard settings. Passed explicitly to the app and the sinks; nothing
/// reads it from a global.
///
/// Every field has a default so a config file only needs the keys it changes:
///
/// ```json
/// { "data_path": "Big_Black_Money_Dataset.csv", "histogram_bins": 30 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub title: String,
    /// Initial window size in points.
    pub window_size: [f32; 2],
    /// Dataset opened at start-up.
    pub data_path: Option<PathBuf>,
    /// Image shown above the sidebar filters.
    pub logo_path: Option<PathBuf>,
    pub histogram_bins: usize,
    /// Overlay a density curve on the amount histogram.
    pub show_density: bool,
    pub row_policy: RowPolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            title: "Black Money Transactions Analysis".to_string(),
            window_size: [1280.0, 900.0],
            data_path: None,
            logo_path: None,
            histogram_bins: 50,
            show_density: true,
            row_policy: RowPolicy::default(),
        }
    }
}

impl DashboardConfig {
    pub fn load_from_file(path: &Path) -> Result<DashboardConfig> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Reject settings that would make a populated view look empty.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.histogram_bins > 0, "histogram_bins must be at least 1");
        Ok(())
    }

    pub fn derive_settings(&self) -> DeriveSettings {
        DeriveSettings {
            histogram_bins: self.histogram_bins,
            density: self.show_density,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let json = r#"{ "histogram_bins": 20, "row_policy": "any_column" }"#;
        let config: DashboardConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.histogram_bins, 20);
        assert_eq!(config.row_policy, RowPolicy::AnyColumn);
        assert_eq!(config.title, DashboardConfig::default().title);
        assert!(config.show_density);
        assert!(config.data_path.is_none());
    }

    #[test]
    fn derive_settings_follow_config() {
        let config = DashboardConfig {
            histogram_bins: 12,
            show_density: false,
            ..Default::default()
        };
        assert_eq!(
            config.derive_settings(),
            DeriveSettings { histogram_bins: 12, density: false }
        );
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let path = Path::new("/nonexistent/dashboard.json");
        let err = DashboardConfig::load_from_file(path).unwrap_err();
        assert!(format!("{err:#}").contains("reading config file"));
    }

    #[test]
    fn zero_histogram_bins_are_rejected() {
        let path = std::env::temp_dir().join("dashboard_config_zero_bins.json");
        fs::write(&path, r#"{ "histogram_bins": 0 }"#).unwrap();
        let result = DashboardConfig::load_from_file(&path);
        let _ = fs::remove_file(&path);

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("histogram_bins must be at least 1"));
    }

    #[test]
    fn config_file_round_trips_through_load() {
        let path = std::env::temp_dir().join("dashboard_config_valid.json");
        fs::write(&path, r#"{ "title": "Audit", "histogram_bins": 8 }"#).unwrap();
        let result = DashboardConfig::load_from_file(&path);
        let _ = fs::remove_file(&path);

        let config = result.unwrap();
        assert_eq!(config.title, "Audit");
        assert_eq!(config.histogram_bins, 8);
    }
}
