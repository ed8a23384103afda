//! Run configuration (`outlook.yaml`)
//!
//! Every field has a default, so the file is optional. CLI flags and
//! `OUTLOOK_*` environment variables (read by clap) override it.

use crate::error::{OutlookError, OutlookResult};
use crate::types::{PROJECTION_YEARS, TARGET_YEAR};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "outlook.yaml";

/// Source workbook name used by the explorer download
pub const DEFAULT_INPUT: &str = "CM_Data_Explorer May 2024 (2).xlsx";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlookConfig {
    /// Source workbook
    pub input: PathBuf,
    /// Directory for cleaned workbooks
    pub output_dir: PathBuf,
    /// Directory for chart files
    pub figures_dir: PathBuf,
    /// End year for growth and CAGR; the start is always the base year
    pub target_year: u16,
    /// Sheet-name overrides keyed by table id ("1", "3.2", "4.4")
    pub sheets: BTreeMap<String, String>,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

impl Default for OutlookConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from("output"),
            figures_dir: PathBuf::from("figures"),
            target_year: TARGET_YEAR,
            sheets: BTreeMap::new(),
            server: ServerConfig::default(),
        }
    }
}

impl OutlookConfig {
    /// Load an explicit config file (must exist), else `outlook.yaml` when
    /// present, else defaults
    pub fn load(path: Option<&Path>) -> OutlookResult<Self> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(OutlookError::NotFound(p.display().to_string()));
                }
                Self::from_file(p)
            }
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> OutlookResult<Self> {
        debug!(path = %path.display(), "loading config");
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> OutlookResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> OutlookResult<()> {
        if !PROJECTION_YEARS.contains(&self.target_year) {
            let years: Vec<String> = PROJECTION_YEARS.iter().map(u16::to_string).collect();
            return Err(OutlookError::Config(format!(
                "target_year ({}) must be a projection year: {}",
                self.target_year,
                years.join(", ")
            )));
        }
        Ok(())
    }

    /// Sheet to read for a table, honouring overrides
    pub fn sheet_for<'a>(&'a self, table_id: &str, default: &'a str) -> &'a str {
        self.sheets
            .get(table_id)
            .map(String::as_str)
            .unwrap_or(default)
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}
