//! Startup configuration.
//!
//! [`AppConfig`] is read once at launch from a TOML file. Every field has a default, so a
//! partial file (or no file at all) is valid. Runtime tunables such as light colours or blur
//! strength are deliberately not part of this file; they always start from compiled-in
//! defaults.
//!
//! ```toml
//! title = "lakefire"
//! width = 1600
//! height = 900
//! shadow_map_size = 2048
//! asset_dir = "res"
//! vsync = true
//!
//! [camera]
//! distance = 60.0
//! height = 18.0
//! speed = 0.1
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File looked up in the working directory when no path is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "lakefire.toml";

/// Window, GPU and camera settings fixed for the lifetime of the process.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Edge length in texels of every shadow map layer.
    pub shadow_map_size: u32,
    /// Directory holding textures (`<name>.png`) and models (`<name>.stl`).
    pub asset_dir: PathBuf,
    pub vsync: bool,
    pub camera: CameraRigConfig,
}

/// Auto-rotating camera rig around the scene centre.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraRigConfig {
    pub distance: f32,
    pub height: f32,
    /// Radians per second.
    pub speed: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "lakefire".to_string(),
            width: 1280,
            height: 720,
            shadow_map_size: 1024,
            asset_dir: PathBuf::from("res"),
            vsync: true,
            camera: CameraRigConfig::default(),
        }
    }
}

impl Default for CameraRigConfig {
    fn default() -> Self {
        Self {
            distance: 60.0,
            height: 18.0,
            speed: 0.1,
        }
    }
}

impl AppConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&source)
    }

    /// Resolves the config for this run.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] is used when present
    /// and defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            log::info!("loading config from {}", path.display());
            return Self::from_file(path);
        }

        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.exists() {
            log::info!("loading config from {}", fallback.display());
            Self::from_file(fallback)
        } else {
            log::info!("no {DEFAULT_CONFIG_FILE} found, using defaults");
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.shadow_map_size == 0 || self.shadow_map_size > 8192 {
            return Err(ConfigError::Invalid(format!(
                "shadow_map_size must be in 1..=8192, got {}",
                self.shadow_map_size
            )));
        }
        Ok(())
    }

    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_document_overrides_only_named_fields() {
        let config = AppConfig::from_toml(
            r#"
            width = 1920
            shadow_map_size = 2048

            [camera]
            speed = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.width, 1920);
        assert_eq!(config.height, 720);
        assert_eq!(config.shadow_map_size, 2048);
        assert_eq!(config.camera.speed, 0.5);
        assert_eq!(config.camera.distance, 60.0);
    }

    #[test]
    fn zero_window_size_is_rejected() {
        let err = AppConfig::from_toml("width = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn oversized_shadow_map_is_rejected() {
        let err = AppConfig::from_toml("shadow_map_size = 16384").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = AppConfig::from_toml("width = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_explicit_file_is_an_io_error() {
        let err = AppConfig::load(Some(Path::new("does/not/exist.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
