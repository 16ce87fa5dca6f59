//! Uploader configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/pixdrop/uploader.toml`
//! - Windows: `%APPDATA%/pixdrop/uploader.toml`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use pixdrop_protocol::CompressOptions;
use pixdrop_protocol::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_MAX_DIMENSION, DEFAULT_QUALITY, DEFAULT_UPLOAD_URL,
};

/// Uploader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Upload endpoint receiving the multipart POST.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Bounding box width for compressed images.
    #[serde(default = "default_dimension")]
    pub max_width: u32,

    /// Bounding box height for compressed images.
    #[serde(default = "default_dimension")]
    pub max_height: u32,

    /// JPEG quality, 1-100.
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Bytes per streamed body chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_endpoint() -> String {
    DEFAULT_UPLOAD_URL.into()
}

fn default_dimension() -> u32 {
    DEFAULT_MAX_DIMENSION
}

fn default_quality() -> u8 {
    DEFAULT_QUALITY
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            max_width: default_dimension(),
            max_height: default_dimension(),
            quality: default_quality(),
            chunk_size: default_chunk_size(),
        }
    }
}

impl Config {
    /// Loads configuration from `path` (or the platform default), creating
    /// a default file if none exists.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => config_path()?,
        };
        Self::load_from(&path)
    }

    /// Loads configuration from an explicit path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Saves the configuration to `path`.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Compression target derived from this configuration.
    pub fn compress_options(&self) -> CompressOptions {
        CompressOptions {
            max_width: self.max_width,
            max_height: self.max_height,
            quality: self.quality.clamp(1, 100),
        }
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("pixdrop")
            .join("uploader.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("pixdrop").join("uploader.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp/pixdrop/uploader.toml"))
    }
}
