//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// Compress and upload a batch of images.
#[derive(Debug, Parser)]
#[command(name = "pixdrop-uploader", version, about)]
pub struct Cli {
    /// Image files to upload.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Configuration file (defaults to the per-user location).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Upload endpoint URL.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Maximum width of compressed images, in pixels.
    #[arg(long)]
    pub max_width: Option<u32>,

    /// Maximum height of compressed images, in pixels.
    #[arg(long)]
    pub max_height: Option<u32>,

    /// JPEG quality (1-100).
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,
}

impl Cli {
    /// Overrides `config` with every flag given on the command line.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(w) = self.max_width {
            config.max_width = w;
        }
        if let Some(h) = self.max_height {
            config.max_height = h;
        }
        if let Some(q) = self.quality {
            config.quality = q;
        }
        config
    }
}
