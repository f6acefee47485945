use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::data::data_view::{PageSize, ViewOptions, DEFAULT_PAGE_SIZE};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub view: ViewConfig,
    pub reports: ReportsConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Rows per page after every load: a number, or "all"
    pub default_page_size: String,

    /// Reject filters and sorts on columns the loaded file does not have
    pub strict_columns: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    /// Directory report paths are resolved against (the mounted share)
    pub base_path: Option<PathBuf>,

    /// File extensions shown in a report's file list
    pub allowed_extensions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Where exports without an explicit path are written
    pub directory: Option<PathBuf>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE.to_string(),
            strict_columns: false,
        }
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            base_path: None,
            allowed_extensions: ["csv", "txt"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ViewConfig {
    pub fn view_options(&self) -> Result<ViewOptions> {
        let default_page_size: PageSize = self.default_page_size.parse()?;
        Ok(ViewOptions {
            default_page_size,
            strict_columns: self.strict_columns,
        })
    }
}

impl Config {
    /// Load config from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("report-viewer").join("config.toml"))
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# Report Viewer Configuration File
# Location: ~/.config/report-viewer/config.toml (Linux)
#           %APPDATA%\report-viewer\config.toml (Windows)

[view]
# Rows per page after opening a report or file: a number, or "all"
default_page_size = "50"

# Reject --filter/--sort on columns the file does not have
strict_columns = false

[reports]
# Directory that report paths are resolved against (leave commented to
# pass report directories directly)
# base_path = "/mnt/nas/reports"

# Extensions listed in a report's file view (files that can be opened)
allowed_extensions = ["csv", "txt"]

[export]
# Directory for exports written without an explicit path
# directory = "/home/me/exports"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        let options = config.view.view_options().unwrap();
        assert_eq!(options.default_page_size.limit(), Some(50));
        assert!(!options.strict_columns);
        assert_eq!(config.reports.allowed_extensions, vec!["csv", "txt"]);
    }

    #[test]
    fn test_commented_template_parses_to_defaults() {
        let parsed: Config = toml::from_str(&Config::create_default_with_comments()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str("[view]\ndefault_page_size = \"all\"\n").unwrap();
        assert_eq!(
            parsed.view.view_options().unwrap().default_page_size,
            PageSize::All
        );
        assert_eq!(parsed.reports, ReportsConfig::default());
    }

    #[test]
    fn test_invalid_page_size_is_rejected() {
        let mut config = Config::default();
        config.view.default_page_size = "0".to_string();
        assert!(config.view.view_options().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.view.strict_columns = true;
        config.reports.base_path = Some(PathBuf::from("/srv/reports"));

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }
}
