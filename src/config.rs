//! Startup configuration.
//!
//! Everything has a built-in default, so the file is optional. A present
//! file only needs the keys it wants to override.

use std::path::{Path, PathBuf};

use glam::Vec4;
use log::LevelFilter;
use serde::Deserialize;

use crate::error::{Error, Result};

/// File the entry point looks for in the working directory.
pub const CONFIG_FILE: &str = "phobia.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "Phobia".to_string(),
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl Default for ShaderPaths {
    fn default() -> Self {
        Self {
            vertex: PathBuf::from("assets/shaders/basic.vert"),
            fragment: PathBuf::from("assets/shaders/basic.frag"),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub clear_color: [f32; 4],
    pub shaders: ShaderPaths,
    /// Optional texture bound every frame. Nothing is loaded when absent.
    pub texture: Option<PathBuf>,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            clear_color: [0.05, 0.05, 0.05, 1.0],
            shaders: ShaderPaths::default(),
            texture: None,
            log_level: LevelFilter::Info,
        }
    }
}

impl Config {
    /// Loads the configuration at `path`, falling back to the defaults if
    /// the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(Error::Config {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };
        Self::parse(&text).map_err(|reason| Error::Config {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn parse(s: &str) -> std::result::Result<Self, String> {
        serde_json::from_str(s).map_err(|e| e.to_string())
    }

    /// The clear color as a vector.
    pub fn clear_color(&self) -> Vec4 {
        Vec4::from_array(self.clear_color)
    }
}
