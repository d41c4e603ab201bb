//! Configuration file loading.
//!
//! Search order: explicit `--config` path, then `scadadraw/config.toml` in the
//! working directory, then built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use scadadraw_core::{LayoutSpec, Style, TextContent};

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// One element to draw: a registry kind, its placement and style overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneItem {
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

impl SceneItem {
    pub fn new(kind: impl Into<String>, spec: LayoutSpec) -> Self {
        Self {
            kind: kind.into(),
            x: spec.x,
            y: spec.y,
            width: spec.width,
            height: spec.height,
            rotation: spec.rotation.unwrap_or_default(),
            style: None,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn layout_spec(&self) -> LayoutSpec {
        LayoutSpec::new(self.x, self.y, self.width, self.height).with_rotation(self.rotation)
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub canvas: CanvasConfig,
    /// Plugin manifest; the built-in manifest is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
    pub scene: Vec<SceneItem>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            manifest: None,
            scene: demo_scene(),
        }
    }
}

fn demo_scene() -> Vec<SceneItem> {
    vec![
        SceneItem::new("rect", LayoutSpec::new(40.0, 40.0, 220.0, 140.0)).with_style(Style {
            fill: Some("#dde7f0".to_string()),
            stroke: Some("#333".to_string()),
            ..Style::default()
        }),
        SceneItem::new("circle", LayoutSpec::new(300.0, 60.0, 100.0, 100.0)),
        SceneItem::new("line", LayoutSpec::new(260.0, 110.0, 40.0, 0.0)),
        SceneItem::new("text", LayoutSpec::new(50.0, 50.0, 200.0, 20.0)).with_style(Style {
            content: Some(TextContent {
                text: "Tank 1".to_string(),
            }),
            ..Style::default()
        }),
        SceneItem::new("input", LayoutSpec::new(50.0, 150.0, 120.0, 0.0)),
        SceneItem::new("echarts-bar-chart", LayoutSpec::new(40.0, 220.0, 360.0, 240.0)),
    ]
}

/// Find and load configuration.
///
/// # Errors
///
/// Returns error if an explicit path is given but missing, or if a found
/// file cannot be read or parsed.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, ConfigError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!("Loading configuration from {}", path.display());
        return load_config_file(path);
    }

    let local_config = Path::new("scadadraw/config.toml");
    if local_config.exists() {
        info!("Loading configuration from {}", local_config.display());
        return load_config_file(local_config);
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

fn load_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}
