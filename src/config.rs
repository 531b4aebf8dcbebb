//! Settings: defaults, then the optional TOML file, then CLI flags.
//!
//! The file lives at `<config dir>/cfgsheet/config.toml` unless `--config`
//! points elsewhere. A missing default file is fine; a missing explicit file
//! or a malformed one is an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::export::{DEFAULT_ENVIRONMENTS, ExportFormat};

/// Rows per page in the grid.
pub const DEFAULT_PAGE_SIZE: usize = 22;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub view: ViewSection,
    #[serde(default)]
    pub export: ExportSection,
    #[serde(default)]
    pub features: FeatureSection,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ViewSection {
    pub page_size: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ExportSection {
    pub out_dir: Option<PathBuf>,
    pub csv_file_name: Option<String>,
    pub yaml_file_name: Option<String>,
    pub environments: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FeatureSection {
    pub column_selection: Option<bool>,
    pub pagination: Option<bool>,
    pub flag_toggle: Option<bool>,
}

/// Optional parts of the grid, switched on and off without touching the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSet {
    pub column_selection: bool,
    pub pagination: bool,
    pub flag_toggle: bool,
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self {
            column_selection: true,
            pagination: true,
            flag_toggle: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub page_size: usize,
    pub out_dir: PathBuf,
    pub csv_file_name: String,
    pub yaml_file_name: String,
    pub environments: Vec<String>,
    pub features: FeatureSet,
}

impl Default for Config {
    fn default() -> Self {
        resolve(&FileConfig::default(), &CliOverrides::default())
    }
}

impl Config {
    pub fn export_path(&self, format: ExportFormat) -> PathBuf {
        let name = match format {
            ExportFormat::Csv => &self.csv_file_name,
            ExportFormat::Structured => &self.yaml_file_name,
        };
        self.out_dir.join(name)
    }
}

/// Values given on the command line; `None` means not specified.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub page_size: Option<usize>,
    pub out_dir: Option<PathBuf>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config I/O error ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("page size must be at least 1")]
    ZeroPageSize,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cfgsheet").join("config.toml"))
}

/// Read the config file. `explicit` comes from `--config` and must exist.
pub fn load_file(explicit: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => {
                debug!("no config file, using defaults");
                return Ok(FileConfig::default());
            }
        },
    };

    let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let config = parse_file(&contents)?;
    info!("loaded config from {}", path.display());
    Ok(config)
}

pub fn parse_file(contents: &str) -> Result<FileConfig, ConfigError> {
    let config: FileConfig = toml::from_str(contents)?;
    if config.view.page_size == Some(0) {
        return Err(ConfigError::ZeroPageSize);
    }
    Ok(config)
}

pub fn resolve(file: &FileConfig, cli: &CliOverrides) -> Config {
    let features = FeatureSet {
        column_selection: file.features.column_selection.unwrap_or(true),
        pagination: file.features.pagination.unwrap_or(true),
        flag_toggle: file.features.flag_toggle.unwrap_or(true),
    };

    Config {
        page_size: cli
            .page_size
            .or(file.view.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .max(1),
        out_dir: cli
            .out_dir
            .clone()
            .or_else(|| file.export.out_dir.clone())
            .unwrap_or_else(|| PathBuf::from(".")),
        csv_file_name: file
            .export
            .csv_file_name
            .clone()
            .unwrap_or_else(|| ExportFormat::Csv.default_file_name().to_string()),
        yaml_file_name: file
            .export
            .yaml_file_name
            .clone()
            .unwrap_or_else(|| ExportFormat::Structured.default_file_name().to_string()),
        environments: file
            .export
            .environments
            .clone()
            .filter(|envs| !envs.is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENTS.map(String::from).to_vec()),
        features,
    }
}
