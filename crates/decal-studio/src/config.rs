use anyhow::Context;
use decal_canvas::CanvasConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings of a [`crate::DecalStudio`] session.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Engine tunables.
    pub canvas: CanvasConfig,
    /// Prefix of suggested export file names. Default: "decal".
    pub export_prefix: String,
    /// Directory the default export sink writes to. Default: "exports".
    pub export_dir: PathBuf,
    /// Largest accepted decal upload in bytes. Default: 5 MiB.
    pub max_decal_bytes: usize,
    /// Longest side of the composite handed to the fusion service. Default: 1024.
    pub fusion_max_dimension: u32,
    /// JPEG quality of the composite handed to the fusion service. Default: 85.
    pub fusion_jpeg_quality: u8,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            export_prefix: "decal".to_string(),
            export_dir: PathBuf::from("exports"),
            max_decal_bytes: 5 * 1024 * 1024,
            fusion_max_dimension: 1024,
            fusion_jpeg_quality: 85,
        }
    }
}

impl StudioConfig {
    /// Loads `.env` if present, then reads `DECAL_STUDIO_*` overrides from the environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    ///
    /// `DECAL_STUDIO_CANVAS_CONFIG` names a JSON file holding a (partial) `CanvasConfig`.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(path) = lookup("DECAL_STUDIO_CANVAS_CONFIG") {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read canvas config '{}'", path))?;
            config.canvas = serde_json::from_str(&json)
                .with_context(|| format!("Invalid canvas config in '{}'", path))?;
        }
        if let Some(prefix) = lookup("DECAL_STUDIO_EXPORT_PREFIX") {
            config.export_prefix = prefix;
        }
        if let Some(dir) = lookup("DECAL_STUDIO_EXPORT_DIR") {
            config.export_dir = PathBuf::from(dir);
        }
        if let Some(bytes) = lookup("DECAL_STUDIO_MAX_DECAL_BYTES") {
            config.max_decal_bytes = bytes
                .parse()
                .context("DECAL_STUDIO_MAX_DECAL_BYTES must be a byte count")?;
        }
        if let Some(dim) = lookup("DECAL_STUDIO_FUSION_MAX_DIMENSION") {
            config.fusion_max_dimension = dim
                .parse()
                .context("DECAL_STUDIO_FUSION_MAX_DIMENSION must be a pixel count")?;
        }
        if let Some(quality) = lookup("DECAL_STUDIO_FUSION_JPEG_QUALITY") {
            config.fusion_jpeg_quality = quality
                .parse::<u8>()
                .context("DECAL_STUDIO_FUSION_JPEG_QUALITY must be 1-100")?
                .clamp(1, 100);
        }

        tracing::debug!(?config, "Studio configuration loaded");
        Ok(config)
    }
}
