//! Serializable plot configuration, read from TOML.
//!
//! Every field has a default, so a partial (or missing) file is fine:
//!
//! ```toml
//! tail_rows = 10
//! weekly_start = 1
//!
//! [render]
//! width = 120
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Terminal drawing dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Columns used for text dumps.
    pub width: u16,
    /// Terminal rows per figure panel.
    pub panel_height: u16,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 100,
            panel_height: 16,
        }
    }
}

/// Knobs shared by every plot command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Rows of the forecast table echoed to stdout.
    pub tail_rows: usize,
    pub echo_tail: bool,
    /// Rolling-mean window of the residuals panel.
    pub residual_rolling: usize,
    pub weekly_start: i64,
    pub yearly_start: i64,
    pub render: RenderConfig,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            tail_rows: 5,
            echo_tail: true,
            residual_rolling: 7,
            weekly_start: 0,
            yearly_start: 0,
            render: RenderConfig::default(),
        }
    }
}

impl PlotConfig {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text, path)?;
        debug!(path = %path.display(), "loaded plot config");
        Ok(config)
    }

    /// `<config dir>/decomplab/config.toml`, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("decomplab").join("config.toml"))
    }

    /// Explicit path if given, else the default path when it exists, else
    /// built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = PlotConfig::from_toml("tail_rows = 10\n[render]\nwidth = 80\n", Path::new("x")).unwrap();
        assert_eq!(config.tail_rows, 10);
        assert_eq!(config.residual_rolling, 7);
        assert_eq!(config.render.width, 80);
        assert_eq!(config.render.panel_height, 16);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(PlotConfig::from_toml("", Path::new("x")).unwrap(), PlotConfig::default());
    }

    #[test]
    fn test_bad_type_is_parse_error() {
        let result = PlotConfig::from_toml("tail_rows = \"many\"", Path::new("bad.toml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = PlotConfig::load(&dir.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = PlotConfig {
            echo_tail: false,
            yearly_start: 3,
            ..PlotConfig::default()
        };
        let text = toml::to_string(&config).unwrap();
        assert_eq!(PlotConfig::from_toml(&text, Path::new("x")).unwrap(), config);
    }
}
