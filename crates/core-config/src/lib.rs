//! Configuration loading and parsing.
//!
//! Parses `oxsurface.toml` (or an override path provided by the binary) into
//! the empirical tuning constants of the editing surface:
//!
//! ```toml
//! [timing]
//! idle_debounce_ms = 166      # quiescence before idle housekeeping
//!
//! [viewport]
//! selection_margin = 20       # pixel units from an edge that trigger a scroll
//! min_scroll_extent = 80      # viewports this small never scroll for endpoints
//! automatic_size_margin = 20  # horizontal slack for automatic page width
//!
//! [display]
//! shrink_factor = 5
//! base_pixel = 256            # document units per device pixel at factor 1
//!
//! [repaint]
//! extra_font_factor = 3       # repaint overscan in half font sizes
//! ```
//!
//! Every field is optional and defaults to the value above. A missing file
//! or a parse error yields the defaults; parse errors are logged. Unknown
//! fields are ignored so files can carry settings for newer versions.
//!
//! Values that would violate a surface precondition (non-positive shrink
//! factor or base pixel) are clamped to 1 when the tuning is derived, with an
//! `info` event under the `config` target.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const FILE_NAME: &str = "oxsurface.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TimingConfig {
    #[serde(default = "TimingConfig::default_idle_debounce_ms")]
    pub idle_debounce_ms: i64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            idle_debounce_ms: Self::default_idle_debounce_ms(),
        }
    }
}

impl TimingConfig {
    // 1000 / 6
    const fn default_idle_debounce_ms() -> i64 {
        166
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ViewportConfig {
    #[serde(default = "ViewportConfig::default_selection_margin")]
    pub selection_margin: i64,
    #[serde(default = "ViewportConfig::default_min_scroll_extent")]
    pub min_scroll_extent: i64,
    #[serde(default = "ViewportConfig::default_automatic_size_margin")]
    pub automatic_size_margin: i64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            selection_margin: Self::default_selection_margin(),
            min_scroll_extent: Self::default_min_scroll_extent(),
            automatic_size_margin: Self::default_automatic_size_margin(),
        }
    }
}

impl ViewportConfig {
    const fn default_selection_margin() -> i64 {
        20
    }
    const fn default_min_scroll_extent() -> i64 {
        80
    }
    const fn default_automatic_size_margin() -> i64 {
        20
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    #[serde(default = "DisplayConfig::default_shrink_factor")]
    pub shrink_factor: i64,
    #[serde(default = "DisplayConfig::default_base_pixel")]
    pub base_pixel: i64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            shrink_factor: Self::default_shrink_factor(),
            base_pixel: Self::default_base_pixel(),
        }
    }
}

impl DisplayConfig {
    const fn default_shrink_factor() -> i64 {
        5
    }
    const fn default_base_pixel() -> i64 {
        256
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RepaintConfig {
    #[serde(default = "RepaintConfig::default_extra_font_factor")]
    pub extra_font_factor: i64,
}

impl Default for RepaintConfig {
    fn default() -> Self {
        Self {
            extra_font_factor: Self::default_extra_font_factor(),
        }
    }
}

impl RepaintConfig {
    const fn default_extra_font_factor() -> i64 {
        3
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub repaint: RepaintConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub source: Option<PathBuf>,
    pub file: ConfigFile, // parsed (or default) data
}

/// Validated tuning constants consumed by the editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceTuning {
    pub idle_debounce_ms: i64,
    pub selection_margin: i64,
    pub min_scroll_extent: i64,
    pub automatic_size_margin: i64,
    pub shrink_factor: i64,
    pub base_pixel: i64,
    pub extra_font_factor: i64,
}

impl Default for SurfaceTuning {
    fn default() -> Self {
        Config::default().tuning()
    }
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("oxsurface").join(FILE_NAME);
    }
    PathBuf::from(FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                source: Some(path),
                file,
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

fn at_least_one(name: &'static str, raw: i64) -> i64 {
    if raw >= 1 {
        return raw;
    }
    info!(target: "config", field = name, raw, clamped = 1, "config_value_clamped");
    1
}

impl Config {
    /// Derive the surface tuning, clamping values that would violate a
    /// surface precondition.
    pub fn tuning(&self) -> SurfaceTuning {
        let f = &self.file;
        SurfaceTuning {
            idle_debounce_ms: f.timing.idle_debounce_ms.max(0),
            selection_margin: f.viewport.selection_margin.max(0),
            min_scroll_extent: f.viewport.min_scroll_extent.max(0),
            automatic_size_margin: f.viewport.automatic_size_margin.max(0),
            shrink_factor: at_least_one("display.shrink_factor", f.display.shrink_factor),
            base_pixel: at_least_one("display.base_pixel", f.display.base_pixel),
            extra_font_factor: f.repaint.extra_font_factor.max(0),
        }
    }
}
