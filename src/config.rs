//! Engine configuration read from a TOML file.
//!
//! Every field is optional; missing fields take their default value.
//!
//! ```toml
//! title = "spin"
//! width = 1280
//! height = 720
//! log_timing = true
//! clear_colour = [0.1, 0.2, 0.3, 1.0]
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Log delta and FPS of every frame at info level instead of trace.
    pub log_timing: bool,
    pub vsync: bool,
    pub znear: f32,
    pub zfar: f32,
    pub clear_colour: [f64; 4],
    /// Combined shader file relative to `assets_dir`. The built-in shader is
    /// used when unset.
    pub shader: Option<PathBuf>,
    pub assets_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "batch-ngin".to_string(),
            width: 800,
            height: 600,
            log_timing: false,
            vsync: true,
            znear: 0.1,
            zfar: 1000.0,
            clear_colour: [0.0, 0.0, 0.0, 1.0],
            shader: None,
            assets_dir: PathBuf::from("./assets"),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(source: &str) -> anyhow::Result<Self> {
        let config = toml::from_str(source).context("invalid engine configuration")?;
        Ok(config)
    }

    /// Read `path`, or return the defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("{} not found, using default configuration", path.display());
            return Ok(Self::default());
        }
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        Self::from_toml_str(&source).with_context(|| format!("in {}", path.display()))
    }

    pub fn clear_colour(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_colour;
        wgpu::Color { r, g, b, a }
    }
}
