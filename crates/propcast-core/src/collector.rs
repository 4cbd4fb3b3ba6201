//! Image collection
//!
//! Downloads listing photos into `<output_dir>/<property_id>/raw/image_<n>.jpg`.
//! File numbers come from a per-property counter owned by the collector. On
//! first use it is seeded past the highest existing index, so repeated runs
//! accumulate files and never overwrite earlier downloads.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use propcast_tools::{FetchError, ImageFetcher};

use crate::activity::ActivityLog;
use crate::config::ProcessorConfig;
use crate::model::{DownloadedImage, PropertyRecord};

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub struct Collector {
    fetcher: ImageFetcher,
    output_dir: PathBuf,
    next_index: HashMap<String, usize>,
    log: ActivityLog,
}

impl Collector {
    pub fn new(fetcher: ImageFetcher, config: &ProcessorConfig, log: ActivityLog) -> Self {
        Self {
            fetcher,
            output_dir: config.output_dir.clone(),
            next_index: HashMap::new(),
            log,
        }
    }

    /// Download one image for a property.
    ///
    /// Failures are logged once and returned; nothing is written on failure.
    pub async fn download(
        &mut self,
        url: &str,
        property_id: &str,
    ) -> Result<DownloadedImage, CollectError> {
        match self.try_download(url, property_id).await {
            Ok(image) => {
                self.log
                    .record(format!("Downloaded image: {}", image.file_path.display()));
                Ok(image)
            }
            Err(e) => {
                self.log.error(format!("downloading {}: {}", url, e));
                Err(e)
            }
        }
    }

    async fn try_download(
        &mut self,
        url: &str,
        property_id: &str,
    ) -> Result<DownloadedImage, CollectError> {
        let bytes = self.fetcher.fetch(url).await?;

        let dir = self.output_dir.join(property_id).join("raw");
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| CollectError::Io {
                path: dir.clone(),
                source,
            })?;

        let index = self.claim_index(property_id, &dir).await;
        let file_path = dir.join(format!("image_{}.jpg", index));
        tokio::fs::write(&file_path, &bytes)
            .await
            .map_err(|source| CollectError::Io {
                path: file_path.clone(),
                source,
            })?;

        debug!("Wrote {} bytes to {}", bytes.len(), file_path.display());

        Ok(DownloadedImage {
            property_id: property_id.to_string(),
            file_path,
            source_url: url.to_string(),
        })
    }

    async fn claim_index(&mut self, property_id: &str, dir: &Path) -> usize {
        let index = match self.next_index.get(property_id) {
            Some(&next) => next,
            None => first_free_index(dir).await,
        };
        self.next_index.insert(property_id.to_string(), index + 1);
        index
    }

    /// Download every URL of every property, in order, skipping failures
    pub async fn collect(&mut self, properties: &[PropertyRecord]) -> Vec<DownloadedImage> {
        let mut downloaded = Vec::new();
        for property in properties {
            for url in &property.image_urls {
                if let Ok(image) = self.download(url, &property.id).await {
                    downloaded.push(image);
                }
            }
        }
        downloaded
    }
}

/// One past the highest `image_<n>.jpg` index already in `dir` (0 when none)
async fn first_free_index(dir: &Path) -> usize {
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return 0;
    };

    let mut next = 0;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name();
        let index = name
            .to_str()
            .and_then(|n| n.strip_prefix("image_"))
            .and_then(|n| n.strip_suffix(".jpg"))
            .and_then(|n| n.parse::<usize>().ok());
        if let Some(index) = index {
            next = next.max(index + 1);
        }
    }
    next
}
