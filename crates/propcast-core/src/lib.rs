//! Propcast Core Library
//!
//! Turns listing photos into platform-sized images, AI descriptions and
//! ready-to-post social copy, plus a CSV export and a run report.

pub mod activity;
pub mod collector;
pub mod compose;
pub mod config;
pub mod describe;
pub mod export;
pub mod model;
pub mod pipeline;
pub mod transform;

#[cfg(test)]
mod test_support;

// Re-export key types for convenience
pub use activity::{ActivityLog, LogEntry};
pub use compose::{compose_posts, PostSet, SocialPlatform};
pub use config::{Config, ProcessorConfig};
pub use describe::{DescriptionGenerator, ImageDescriber, FALLBACK_DESCRIPTION};
pub use model::{sample_property, DownloadedImage, ProcessedImage, PropertyRecord};
pub use pipeline::{ListingPipeline, RunOptions, RunSummary};
