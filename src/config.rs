//! Build configuration.
//!
//! Handles loading and validating an optional `imgset.toml` next to the
//! invocation. Every setting has a stock default, so the common case — run
//! `imgset build` from the site root with no config file at all — works
//! without any setup.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! source_dir = "assets/images"            # Where source rasters live
//! output_dir = "assets/images/optimized"  # Where variants + manifest land
//!
//! [images]
//! widths = [320, 480, 768, 1024, 1400]    # Breakpoint ladder
//! jpg_quality = 80
//! webp_quality = 80
//! avif_quality = 56   # AVIF's perceptual scale differs from JPEG/WebP
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! [images]
//! jpg_quality = 85
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::widths::BREAKPOINTS;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILENAME: &str = "imgset.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Pipeline configuration loaded from `imgset.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BuildConfig {
    /// Source image tree, relative to the working directory.
    pub source_dir: String,
    /// Output tree for variants and the manifest. Also the web-path prefix
    /// recorded in manifest `src` values, so it must stay site-relative.
    pub output_dir: String,
    pub images: ImageSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ImageSettings {
    /// Candidate output widths, ascending.
    pub widths: Vec<u32>,
    pub jpg_quality: u8,
    pub webp_quality: u8,
    pub avif_quality: u8,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_dir: "assets/images".to_string(),
            output_dir: "assets/images/optimized".to_string(),
            images: ImageSettings::default(),
        }
    }
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            widths: BREAKPOINTS.to_vec(),
            jpg_quality: 80,
            webp_quality: 80,
            avif_quality: 56,
        }
    }
}

impl BuildConfig {
    /// Load from `imgset.toml` under `dir`, falling back to stock defaults
    /// when the file does not exist. Parse and validation failures are loud:
    /// a typo must not silently build with defaults.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILENAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.source_dir.trim().is_empty() {
            return Err(ConfigError::Validation("source_dir is empty".to_string()));
        }
        if self.output_dir.trim().is_empty() {
            return Err(ConfigError::Validation("output_dir is empty".to_string()));
        }
        let widths = &self.images.widths;
        if widths.is_empty() {
            return Err(ConfigError::Validation(
                "images.widths must not be empty".to_string(),
            ));
        }
        if !widths.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(ConfigError::Validation(format!(
                "images.widths must be strictly ascending, got {widths:?}"
            )));
        }
        for (name, quality) in [
            ("jpg_quality", self.images.jpg_quality),
            ("webp_quality", self.images.webp_quality),
            ("avif_quality", self.images.avif_quality),
        ] {
            if !(1..=100).contains(&quality) {
                return Err(ConfigError::Validation(format!(
                    "images.{name} must be between 1 and 100, got {quality}"
                )));
            }
        }
        Ok(())
    }
}
