//! AI description generation
//!
//! One model call per image: read the file, send the fixed instruction plus
//! the inline bytes, keep the first text part. The model client is injected
//! so the run coordinator owns its lifecycle and tests can stub it.

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use propcast_tools::GeminiClient;

use crate::activity::ActivityLog;

pub const DESCRIPTION_PROMPT: &str =
    "Describe the property in this image as a compelling social post (max 100 words).";

/// Used by the pipeline when no description could be generated
pub const FALLBACK_DESCRIPTION: &str = "Fallback: Beautiful property with modern features.";

/// Anything that can turn image bytes into text
#[async_trait]
pub trait ImageDescriber: Send + Sync {
    async fn describe(&self, prompt: &str, image_data: &[u8], mime_type: &str) -> Result<String>;
}

#[async_trait]
impl ImageDescriber for GeminiClient {
    async fn describe(&self, prompt: &str, image_data: &[u8], mime_type: &str) -> Result<String> {
        Ok(self.generate_from_image(prompt, image_data, mime_type).await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DescribeError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0:#}")]
    Model(anyhow::Error),
}

/// MIME type sniffed from the bytes, `image/jpeg` when unknown
pub fn image_mime_type(data: &[u8]) -> &'static str {
    image::guess_format(data)
        .map(|format| format.to_mime_type())
        .unwrap_or("image/jpeg")
}

pub struct DescriptionGenerator {
    describer: Arc<dyn ImageDescriber>,
    log: ActivityLog,
}

impl DescriptionGenerator {
    pub fn new(describer: Arc<dyn ImageDescriber>, log: ActivityLog) -> Self {
        Self { describer, log }
    }

    pub async fn generate(&self, image_path: &Path) -> Result<String, DescribeError> {
        match self.request(image_path).await {
            Ok(description) => {
                let preview: String = description.chars().take(50).collect();
                self.log
                    .record(format!("Generated description: {}...", preview));
                Ok(description)
            }
            Err(e) => {
                self.log.error(format!("generating description: {}", e));
                Err(e)
            }
        }
    }

    async fn request(&self, image_path: &Path) -> Result<String, DescribeError> {
        let data = tokio::fs::read(image_path)
            .await
            .map_err(|source| DescribeError::Read {
                path: image_path.to_path_buf(),
                source,
            })?;

        self.describer
            .describe(DESCRIPTION_PROMPT, &data, image_mime_type(&data))
            .await
            .map_err(DescribeError::Model)
    }

    /// Generated description, or the fallback text when generation failed
    pub async fn generate_or_fallback(&self, image_path: &Path) -> String {
        self.generate(image_path)
            .await
            .unwrap_or_else(|_| FALLBACK_DESCRIPTION.to_string())
    }
}
