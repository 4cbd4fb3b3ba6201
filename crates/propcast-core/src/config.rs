use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use propcast_tools::gemini::{DEFAULT_MODEL, GEMINI_API_BASE};

/// Process-level settings read from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub gemini_model: String,

    /// Optional JSON processor configuration file
    pub config_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            gemini_api_base: std::env::var("GEMINI_API_BASE")
                .map(|s| s.trim().trim_end_matches('/').to_string())
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| GEMINI_API_BASE.to_string()),
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),

            config_path: std::env::var("PROPCAST_CONFIG").ok().map(PathBuf::from),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Output encoding for the standard-size variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutputFormat {
    #[serde(alias = "JPG", alias = "jpeg", alias = "jpg")]
    Jpeg,
    #[serde(alias = "png")]
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    pub target_width: u32,
    pub target_height: u32,
    pub quality: u8,
    pub format: OutputFormat,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            target_width: 1200,
            target_height: 800,
            quality: 85,
            format: OutputFormat::Jpeg,
        }
    }
}

/// Target size for one platform. Without a height the aspect ratio is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDimensions {
    pub width: u32,
    #[serde(default)]
    pub height: Option<u32>,
}

impl PlatformDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height: Some(height),
        }
    }
}

/// Processor configuration, loaded once per run.
///
/// Fields missing from the file keep their defaults; a `platforms` table in
/// the file replaces the default platform set (order is preserved).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    pub image_settings: ImageSettings,
    pub platforms: IndexMap<String, PlatformDimensions>,
    pub output_dir: PathBuf,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        let mut platforms = IndexMap::new();
        platforms.insert("instagram".to_string(), PlatformDimensions::new(1080, 1350));
        platforms.insert("facebook".to_string(), PlatformDimensions::new(1200, 628));
        platforms.insert("linkedin".to_string(), PlatformDimensions::new(1200, 627));

        Self {
            image_settings: ImageSettings::default(),
            platforms,
            output_dir: PathBuf::from("./processed_properties"),
        }
    }
}

impl ProcessorConfig {
    /// Load from `path` if given and present, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path.filter(|p| p.exists()) else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let settings = &self.image_settings;
        if settings.target_width == 0 || settings.target_height == 0 {
            return Err(ConfigError::Invalid(
                "image_settings target size must be non-zero".to_string(),
            ));
        }
        if !(1..=100).contains(&settings.quality) {
            return Err(ConfigError::Invalid(format!(
                "image_settings.quality must be 1-100, got {}",
                settings.quality
            )));
        }

        for (name, dims) in &self.platforms {
            if dims.width == 0 || dims.height == Some(0) {
                return Err(ConfigError::Invalid(format!(
                    "platform '{}' has a zero dimension",
                    name
                )));
            }
        }

        Ok(())
    }

    pub fn platform(&self, name: &str) -> Option<PlatformDimensions> {
        self.platforms.get(name).copied()
    }

    pub fn raw_dir(&self, property_id: &str) -> PathBuf {
        self.output_dir.join(property_id).join("raw")
    }

    pub fn platform_dir(&self, platform: &str) -> PathBuf {
        self.output_dir.join("platform_optimized").join(platform)
    }

    pub fn standard_dir(&self) -> PathBuf {
        self.output_dir.join("standard")
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join("listings_export.csv")
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join("workflow_report.txt")
    }
}
