//! Property image automation
//!
//! Usage:
//!   propcast                                   (built-in sample property)
//!   propcast --properties listings.json        (JSON array of properties)
//!   propcast --config propcast.json --standard

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use propcast_core::{
    sample_property, Config, ListingPipeline, ProcessorConfig, PropertyRecord, RunOptions,
};
use propcast_tools::{GeminiClient, ImageFetcher};

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    properties: Option<PathBuf>,
    standard: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let value = iter.next().context("--config requires a path")?;
                args.config = Some(PathBuf::from(value));
            }
            "--properties" => {
                let value = iter.next().context("--properties requires a path")?;
                args.properties = Some(PathBuf::from(value));
            }
            "--standard" => args.standard = true,
            other => anyhow::bail!("Unknown argument: {}", other),
        }
    }

    Ok(args)
}

fn load_properties(path: Option<&PathBuf>) -> Result<Vec<PropertyRecord>> {
    let Some(path) = path else {
        return Ok(vec![sample_property()]);
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read properties file: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid properties file: {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "propcast=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Property Image Automation Workflow starting...");

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    let args = parse_args()?;

    let config_path = args.config.clone().or(config.config_path.clone());
    let processor_config = ProcessorConfig::load(config_path.as_deref())?;
    if config_path.is_none() {
        info!("No config file given, using defaults");
    }

    info!("Configuration loaded");
    info!("  Output dir: {}", processor_config.output_dir.display());
    info!(
        "  Platforms: {}",
        processor_config
            .platforms
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    );
    info!("  Model: {}", config.gemini_model);

    let api_key = config
        .gemini_api_key
        .clone()
        .ok_or_else(|| anyhow::anyhow!("GEMINI_API_KEY not set"))?;
    let gemini =
        GeminiClient::with_endpoint(&config.gemini_api_base, api_key, &config.gemini_model)?;

    let properties = load_properties(args.properties.as_ref())?;
    if properties.iter().all(|p| p.image_urls.is_empty()) {
        warn!("No image URLs to process");
    }

    let mut pipeline =
        ListingPipeline::new(processor_config, ImageFetcher::new()?, Arc::new(gemini));
    let options = RunOptions {
        standard_variants: args.standard,
    };
    let summary = pipeline.run(&properties, &options).await?;

    info!("✅ Workflow completed successfully!");
    info!("  Images downloaded: {}", summary.downloaded.len());
    for (platform, outputs) in &summary.platform_outputs {
        info!("  {}: {} images", platform, outputs.len());
    }
    if options.standard_variants {
        info!("  Standard variants: {}", summary.standard_outputs.len());
    }
    info!("  Listings exported: {}", summary.listings.len());
    info!("📊 Report saved: {}", summary.report_path.display());
    info!("📑 CSV saved: {}", summary.csv_path.display());

    Ok(())
}
