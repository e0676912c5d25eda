use crate::detection_client::http_client::DEFAULT_ENDPOINT_URL;
use crate::image_utils::color::{BoxColor, BoxStyle};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to open config {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("line_thickness must be at least 1")]
    ZeroThickness,
    #[error("request_timeout_secs must be at least 1")]
    ZeroTimeout,
}

/// Settings read from the optional JSON config file. Anything missing takes its default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub endpoint_url: String,
    pub request_timeout_secs: u64,
    /// Color every box is drawn in. The overlay's built-in palette is used when unset.
    pub box_color: Option<BoxColor>,
    pub line_thickness: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            request_timeout_secs: 60,
            box_color: None,
            line_thickness: BoxStyle::default().line_thickness,
        }
    }
}

impl AppConfig {
    pub fn from_json_file(filepath: &Path) -> Result<Self, ConfigError> {
        let file = File::open(filepath).map_err(|source| ConfigError::Open {
            path: filepath.to_path_buf(),
            source,
        })?;
        let config: AppConfig =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
                path: filepath.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `filepath` when given, otherwise starts from the defaults.
    pub fn load(filepath: Option<&Path>) -> Result<Self, ConfigError> {
        match filepath {
            Some(path) => AppConfig::from_json_file(path),
            None => Ok(AppConfig::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.line_thickness == 0 {
            return Err(ConfigError::ZeroThickness);
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn box_style(&self) -> BoxStyle {
        let base = BoxStyle {
            line_thickness: self.line_thickness,
            ..BoxStyle::default()
        };
        match self.box_color {
            Some(color) => base.with_color(color),
            None => base,
        }
    }
}
