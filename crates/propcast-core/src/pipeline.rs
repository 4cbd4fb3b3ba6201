//! Run coordinator
//!
//! Drives collection, image processing, description, composition and export
//! strictly in sequence. Per-image failures are logged by the stage and
//! skipped here; only export failures end the run.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use propcast_tools::ImageFetcher;

use crate::activity::ActivityLog;
use crate::collector::Collector;
use crate::compose::{compose_posts, truncate_chars, PostSet, SocialPlatform};
use crate::config::ProcessorConfig;
use crate::describe::{DescriptionGenerator, ImageDescriber};
use crate::export::{write_csv, write_report, ListingRow};
use crate::model::{DownloadedImage, PropertyRecord};
use crate::transform::ImageTransformer;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Also write the standard-size master for each downloaded image
    pub standard_variants: bool,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub downloaded: Vec<DownloadedImage>,
    pub platform_outputs: IndexMap<String, Vec<PathBuf>>,
    pub standard_outputs: Vec<PathBuf>,
    pub listings: Vec<ListingRow>,
    pub csv_path: PathBuf,
    pub report_path: PathBuf,
}

pub struct ListingPipeline {
    config: ProcessorConfig,
    log: ActivityLog,
    collector: Collector,
    transformer: ImageTransformer,
    describer: DescriptionGenerator,
}

impl ListingPipeline {
    pub fn new(
        config: ProcessorConfig,
        fetcher: ImageFetcher,
        describer: Arc<dyn ImageDescriber>,
    ) -> Self {
        let log = ActivityLog::new();
        Self {
            collector: Collector::new(fetcher, &config, log.clone()),
            transformer: ImageTransformer::new(config.clone(), log.clone()),
            describer: DescriptionGenerator::new(describer, log.clone()),
            config,
            log,
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn collector(&mut self) -> &mut Collector {
        &mut self.collector
    }

    pub fn transformer(&self) -> &ImageTransformer {
        &self.transformer
    }

    pub fn describer(&self) -> &DescriptionGenerator {
        &self.describer
    }

    /// Write the CSV to `path`, or `<output_dir>/listings_export.csv`
    pub fn export_csv(&self, rows: &[ListingRow], path: Option<PathBuf>) -> Result<PathBuf> {
        let path = path.unwrap_or_else(|| self.config.csv_path());
        write_csv(rows, &path).context("CSV export failed")?;
        self.log
            .record(format!("Exported CSV: {}", path.display()));
        Ok(path)
    }

    /// Write the report to `path`, or `<output_dir>/workflow_report.txt`
    pub fn save_report(&self, path: Option<PathBuf>) -> Result<PathBuf> {
        let path = path.unwrap_or_else(|| self.config.report_path());
        write_report(&self.log, &path).context("Workflow report failed")?;
        self.log
            .record(format!("Report saved: {}", path.display()));
        Ok(path)
    }

    /// Run every stage once over `properties`
    pub async fn run(
        &mut self,
        properties: &[PropertyRecord],
        options: &RunOptions,
    ) -> Result<RunSummary> {
        info!("[LAYER 1] DATA COLLECTION");
        self.log.record("Starting image collection...");
        // Each image stays paired with the record it came from; ids may repeat
        let mut sources: Vec<&PropertyRecord> = Vec::new();
        let mut downloaded = Vec::new();
        for property in properties {
            let images = self.collector.collect(std::slice::from_ref(property)).await;
            sources.extend(std::iter::repeat(property).take(images.len()));
            downloaded.extend(images);
        }
        let image_paths: Vec<PathBuf> = downloaded.iter().map(|d| d.file_path.clone()).collect();

        info!("[LAYER 2] IMAGE PROCESSING");
        let platform_outputs = self.transformer.batch_process(&image_paths);
        let standard_outputs = if options.standard_variants {
            self.transformer.batch_standard(&image_paths)
        } else {
            Vec::new()
        };

        info!("[LAYER 3] AI DESCRIPTION GENERATION");
        let mut descriptions = Vec::with_capacity(downloaded.len());
        for image in &downloaded {
            descriptions.push(self.describer.generate_or_fallback(&image.file_path).await);
        }

        info!("[LAYER 4] CONTENT PREPARATION");
        let mut composed: Vec<(&PropertyRecord, &str, PostSet)> = Vec::new();
        for (property, description) in sources.iter().copied().zip(&descriptions) {
            let posts = compose_posts(description, property);
            info!(
                "Sample Instagram post:\n{}...",
                truncate_chars(posts.get(SocialPlatform::Instagram), 200)
            );
            composed.push((property, description.as_str(), posts));
        }

        info!("[LAYER 5] AUTOMATION & OUTPUT");
        let listings: Vec<ListingRow> = composed
            .iter()
            .map(|(property, description, posts)| ListingRow::new(property, description, posts))
            .collect();

        let csv_path = self.export_csv(&listings, None)?;
        let report_path = self.save_report(None)?;

        Ok(RunSummary {
            downloaded,
            platform_outputs,
            standard_outputs,
            listings,
            csv_path,
            report_path,
        })
    }
}
