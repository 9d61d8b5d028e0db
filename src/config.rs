// Configuration: defaults, then the TOML file, then command-line flags.

use crate::types::{MAX_STROKE_WIDTH, MIN_STROKE_WIDTH, Rgb, Tool, ToolState, parse_hex_color};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Invalid TOML in {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    /// Colors are `#RRGGBB`.
    #[error("Invalid color for `{key}`: {value:?}")]
    InvalidColor { key: &'static str, value: String },

    #[error("`{key}` must be a finite number, got {value}")]
    NonFinite { key: &'static str, value: String },
}

/// Draw, then press Enter to view the analysis layers.
#[derive(Parser, Debug, Default)]
#[command(name = "sketch-lens")]
#[command(version)]
#[command(about = "Sketch on a pixel canvas, then flip through analysis layers")]
pub struct Args {
    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Canvas width in pixels
    #[arg(long)]
    pub width: Option<usize>,

    /// Canvas height in pixels
    #[arg(long)]
    pub height: Option<usize>,

    /// Ink color as #RRGGBB
    #[arg(long)]
    pub color: Option<String>,

    /// Stroke width (1-20)
    #[arg(long)]
    pub stroke_width: Option<f32>,

    /// Base ("cleaned") layer image
    #[arg(long)]
    pub base: Option<PathBuf>,

    /// Middle ("heatmap") layer image
    #[arg(long)]
    pub mid: Option<PathBuf>,

    /// Top ("contours") layer image
    #[arg(long)]
    pub top: Option<PathBuf>,

    /// Opacity of the middle layer (0.0-1.0)
    #[arg(long)]
    pub mid_alpha: Option<f32>,

    /// Where `S` writes the PNG export
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// TOML file structure; every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub width: Option<usize>,
    #[serde(default)]
    pub height: Option<usize>,
    /// Baseline background, `#RRGGBB`.
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub stroke_width: Option<f32>,
    #[serde(default)]
    pub tool: Option<Tool>,
    #[serde(default)]
    pub export_path: Option<PathBuf>,
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
    #[serde(default)]
    pub layers: Option<LayersSection>,
}

/// `[layers]` table: files standing in for the analysis result.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LayersSection {
    #[serde(default)]
    pub base: Option<PathBuf>,
    #[serde(default)]
    pub mid: Option<PathBuf>,
    #[serde(default)]
    pub top: Option<PathBuf>,
    #[serde(default)]
    pub mid_alpha: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerPaths {
    pub base: Option<PathBuf>,
    pub mid: Option<PathBuf>,
    pub top: Option<PathBuf>,
    pub mid_alpha: f32,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub width: usize,
    pub height: usize,
    pub background: Rgb,
    pub tool: ToolState,
    pub layers: LayerPaths,
    pub export_path: PathBuf,
    pub log_file_path: PathBuf,
}

pub const DEFAULT_SIZE: usize = 640;
pub const DEFAULT_MID_ALPHA: f32 = 0.5;

impl Default for Config {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            background: 0x00_FF_FF_FF,
            tool: ToolState::default(),
            layers: LayerPaths { base: None, mid: None, top: None, mid_alpha: DEFAULT_MID_ALPHA },
            export_path: PathBuf::from("drawing.png"),
            log_file_path: crate::logging::default_log_path(),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sketch-lens").join("config.toml"))
}

/// Read a config file. An explicit path must exist; the default path may be absent.
pub fn load_config(explicit: Option<&Path>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(None),
        },
    };
    let text = std::fs::read_to_string(&path)
        .map_err(|e| ConfigError::ReadError { path: path.clone(), reason: e.to_string() })?;
    parse_config(&text, &path).map(Some)
}

pub fn parse_config(text: &str, path: &Path) -> Result<ConfigFile, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn color(key: &'static str, value: &str) -> Result<Rgb, ConfigError> {
    parse_hex_color(value).ok_or_else(|| ConfigError::InvalidColor { key, value: value.to_string() })
}

// clamp() lets NaN through, so reject it (and the infinities) up front
fn finite(key: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { key, value: value.to_string() })
    }
}

fn stroke_width(w: f32) -> Result<f32, ConfigError> {
    Ok(finite("stroke_width", w)?.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH))
}

fn mid_alpha(a: f32) -> Result<f32, ConfigError> {
    Ok(finite("mid_alpha", a)?.clamp(0.0, 1.0))
}

/// Layer the file over the defaults.
pub fn merge_config(file: Option<ConfigFile>) -> Result<Config, ConfigError> {
    let mut config = Config::default();
    let Some(file) = file else {
        return Ok(config);
    };
    config.width = file.width.unwrap_or(config.width).max(1);
    config.height = file.height.unwrap_or(config.height).max(1);
    if let Some(bg) = &file.background {
        config.background = color("background", bg)?;
    }
    if let Some(ink) = &file.color {
        config.tool.color = color("color", ink)?;
    }
    if let Some(w) = file.stroke_width {
        config.tool.stroke_width = stroke_width(w)?;
    }
    if let Some(tool) = file.tool {
        config.tool.tool = tool;
    }
    if let Some(path) = file.export_path {
        config.export_path = path;
    }
    if let Some(path) = file.log_file_path {
        config.log_file_path = path;
    }
    if let Some(layers) = file.layers {
        config.layers = LayerPaths {
            base: layers.base,
            mid: layers.mid,
            top: layers.top,
            mid_alpha: mid_alpha(layers.mid_alpha.unwrap_or(DEFAULT_MID_ALPHA))?,
        };
    }
    Ok(config)
}

/// Command-line flags win over everything else.
pub fn apply_cli_overrides(mut config: Config, args: &Args) -> Result<Config, ConfigError> {
    if let Some(w) = args.width {
        config.width = w.max(1);
    }
    if let Some(h) = args.height {
        config.height = h.max(1);
    }
    if let Some(ink) = &args.color {
        config.tool.color = color("color", ink)?;
    }
    if let Some(w) = args.stroke_width {
        config.tool.stroke_width = stroke_width(w)?;
    }
    if let Some(p) = &args.base {
        config.layers.base = Some(p.clone());
    }
    if let Some(p) = &args.mid {
        config.layers.mid = Some(p.clone());
    }
    if let Some(p) = &args.top {
        config.layers.top = Some(p.clone());
    }
    if let Some(a) = args.mid_alpha {
        config.layers.mid_alpha = mid_alpha(a)?;
    }
    if let Some(p) = &args.export {
        config.export_path = p.clone();
    }
    if let Some(p) = &args.log_file {
        config.log_file_path = p.clone();
    }
    Ok(config)
}

/// Defaults → config file → CLI.
pub fn resolve(args: &Args) -> Result<Config, ConfigError> {
    let file = load_config(args.config.as_deref())?;
    apply_cli_overrides(merge_config(file)?, args)
}
