// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PackwerkError, Result};

/// Tunable limits and names used by the transforms and the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Image quality used when the caller does not supply one.
    pub default_quality: f32,
    /// Longest side, in pixels, an image may keep after re-encoding.
    pub max_image_dimension: u32,
    /// Longest side, in PDF units, a page may keep before it is scaled down.
    pub max_page_dimension: f64,
    /// DEFLATE level for the consolidated archive (0-9).
    pub zip_compression_level: i32,
    /// File name of the consolidated archive.
    pub archive_name: String,
    /// Prefix applied to download names.
    pub download_prefix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_quality: 0.8,
            max_image_dimension: 2048,
            max_page_dimension: 1200.0,
            zip_compression_level: 9,
            archive_name: "archive.zip".into(),
            download_prefix: "compressed_".into(),
        }
    }
}

impl PipelineConfig {
    /// Load a JSON configuration file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        info!(path = %path.as_ref().display(), "configuration loaded");
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            debug!(path = %path.as_ref().display(), "no configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.default_quality) {
            return Err(PackwerkError::Config(format!(
                "default_quality must be within 0.0..=1.0, got {}",
                self.default_quality
            )));
        }
        if self.max_image_dimension == 0 {
            return Err(PackwerkError::Config("max_image_dimension must be positive".into()));
        }
        if !(self.max_page_dimension > 0.0) {
            return Err(PackwerkError::Config(format!(
                "max_page_dimension must be positive, got {}",
                self.max_page_dimension
            )));
        }
        if !(0..=9).contains(&self.zip_compression_level) {
            return Err(PackwerkError::Config(format!(
                "zip_compression_level must be within 0..=9, got {}",
                self.zip_compression_level
            )));
        }
        if self.archive_name.trim().is_empty() {
            return Err(PackwerkError::Config("archive_name must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        config.validate().expect("defaults validate");
        assert_eq!(config.max_image_dimension, 2048);
        assert_eq!(config.max_page_dimension, 1200.0);
        assert_eq!(config.zip_compression_level, 9);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("packwerk.json");
        std::fs::write(&path, r#"{ "max_image_dimension": 1024 }"#).expect("write");

        let config = PipelineConfig::load(&path).expect("load");
        assert_eq!(config.max_image_dimension, 1024);
        assert_eq!(config.archive_name, "archive.zip");
    }

    #[test]
    fn save_then_load_is_lossless() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("packwerk.json");
        let config = PipelineConfig {
            download_prefix: "small_".into(),
            ..Default::default()
        };
        config.save(&path).expect("save");
        assert_eq!(PipelineConfig::load(&path).expect("load"), config);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = PipelineConfig::load_or_default(dir.path().join("absent.json")).expect("load");
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let bad_level = PipelineConfig {
            zip_compression_level: 12,
            ..Default::default()
        };
        assert!(matches!(bad_level.validate(), Err(PackwerkError::Config(_))));

        let bad_quality = PipelineConfig {
            default_quality: 1.5,
            ..Default::default()
        };
        assert!(bad_quality.validate().is_err());
    }
}
