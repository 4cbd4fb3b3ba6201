//! Image transformation
//!
//! resize -> enhance -> compress -> save, per platform. Enhancement applies
//! brightness, contrast and sharpness in that order; each step blends the
//! image with a degenerate version of itself (black, mean grey, smoothed).
//! A factor above 1.0 pushes pixels away from the degenerate image.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::activity::ActivityLog;
use crate::config::{OutputFormat, ProcessorConfig};
use crate::model::ProcessedImage;

/// JPEG quality for platform variants
pub const PLATFORM_JPEG_QUALITY: u8 = 85;

pub const BRIGHTNESS_FACTOR: f32 = 1.05;
pub const CONTRAST_FACTOR: f32 = 1.10;
pub const SHARPNESS_FACTOR: f32 = 1.20;

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("unknown platform: {0}")]
    UnknownPlatform(String),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ============================================================================
// Pixel operations
// ============================================================================

/// Output size for a resize. Width only keeps the aspect ratio (height rounds down, min 1).
pub fn target_size(
    src_width: u32,
    src_height: u32,
    width: u32,
    height: Option<u32>,
) -> (u32, u32) {
    match height {
        Some(h) => (width, h),
        None => {
            let ratio = width as f64 / src_width.max(1) as f64;
            let h = (src_height as f64 * ratio) as u32;
            (width, h.max(1))
        }
    }
}

pub fn resize_to_target(img: &DynamicImage, width: u32, height: Option<u32>) -> DynamicImage {
    let (src_w, src_h) = img.dimensions();
    let (w, h) = target_size(src_w, src_h, width, height);
    img.resize_exact(w, h, FilterType::Lanczos3)
}

fn blend(degenerate: &RgbImage, img: &RgbImage, factor: f32) -> RgbImage {
    let mut out = img.clone();
    for (px, (d, s)) in out.pixels_mut().zip(degenerate.pixels().zip(img.pixels())) {
        for c in 0..3 {
            let (d, s) = (d[c] as f32, s[c] as f32);
            px[c] = (d + factor * (s - d)).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

pub fn adjust_brightness(img: &RgbImage, factor: f32) -> RgbImage {
    let black = RgbImage::new(img.width(), img.height());
    blend(&black, img, factor)
}

pub fn adjust_contrast(img: &RgbImage, factor: f32) -> RgbImage {
    let pixels = (img.width() as u64 * img.height() as u64).max(1);
    let luma_sum: f64 = img
        .pixels()
        .map(|p| (299.0 * p[0] as f64 + 587.0 * p[1] as f64 + 114.0 * p[2] as f64) / 1000.0)
        .sum();
    let mean = (luma_sum / pixels as f64 + 0.5).floor().clamp(0.0, 255.0) as u8;

    let grey = RgbImage::from_pixel(img.width(), img.height(), Rgb([mean, mean, mean]));
    blend(&grey, img, factor)
}

pub fn adjust_sharpness(img: &RgbImage, factor: f32) -> RgbImage {
    blend(&smooth(img), img, factor)
}

/// 3x3 smoothing kernel (centre weight 5, neighbours 1). Border pixels are copied.
fn smooth(img: &RgbImage) -> RgbImage {
    let (w, h) = img.dimensions();
    let mut out = img.clone();
    if w < 3 || h < 3 {
        return out;
    }

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut sums = [0u32; 3];
            for dy in 0..3 {
                for dx in 0..3 {
                    let weight = if dx == 1 && dy == 1 { 5 } else { 1 };
                    let p = img.get_pixel(x + dx - 1, y + dy - 1);
                    for c in 0..3 {
                        sums[c] += weight * p[c] as u32;
                    }
                }
            }
            let px = out.get_pixel_mut(x, y);
            for c in 0..3 {
                px[c] = (sums[c] as f32 / 13.0).round() as u8;
            }
        }
    }
    out
}

/// Brightness, then contrast, then sharpness
pub fn enhance(img: &RgbImage) -> RgbImage {
    let img = adjust_brightness(img, BRIGHTNESS_FACTOR);
    let img = adjust_contrast(&img, CONTRAST_FACTOR);
    adjust_sharpness(&img, SHARPNESS_FACTOR)
}

fn create_file(path: &Path) -> Result<BufWriter<File>, TransformError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| TransformError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = File::create(path).map_err(|source| TransformError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufWriter::new(file))
}

fn save_jpeg(img: RgbImage, path: &Path, quality: u8) -> Result<(), TransformError> {
    let mut writer = create_file(path)?;
    DynamicImage::ImageRgb8(img)
        .write_with_encoder(JpegEncoder::new_with_quality(&mut writer, quality))?;
    flush(writer, path)
}

fn save_png(img: RgbImage, path: &Path) -> Result<(), TransformError> {
    let mut writer = create_file(path)?;
    DynamicImage::ImageRgb8(img).write_with_encoder(PngEncoder::new(&mut writer))?;
    flush(writer, path)
}

fn flush(mut writer: BufWriter<File>, path: &Path) -> Result<(), TransformError> {
    writer.flush().map_err(|source| TransformError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

// ============================================================================
// Transformer
// ============================================================================

pub struct ImageTransformer {
    config: ProcessorConfig,
    log: ActivityLog,
}

impl ImageTransformer {
    pub fn new(config: ProcessorConfig, log: ActivityLog) -> Self {
        Self { config, log }
    }

    pub fn resize_image(
        &self,
        path: &Path,
        width: u32,
        height: Option<u32>,
    ) -> Result<DynamicImage, TransformError> {
        let img = image::open(path)?;
        let resized = resize_to_target(&img, width, height);
        self.log.record(format!(
            "Resized image: {} to {}x{}",
            path.display(),
            resized.width(),
            resized.height()
        ));
        Ok(resized)
    }

    pub fn enhance_image(&self, img: DynamicImage) -> RgbImage {
        let enhanced = enhance(&img.into_rgb8());
        self.log
            .record("Enhanced image: brightness, contrast, sharpness");
        enhanced
    }

    /// Quality is applied when the image is encoded; this step only records it.
    pub fn compress_image(&self, img: RgbImage, quality: u8) -> RgbImage {
        self.log
            .record(format!("Compressed image with quality: {}", quality));
        img
    }

    /// Resize, enhance and save `path` for one configured platform
    pub fn process_for_platform(
        &self,
        path: &Path,
        platform: &str,
    ) -> Result<ProcessedImage, TransformError> {
        let Some(dims) = self.config.platform(platform) else {
            self.log.record(format!("Unknown platform: {}", platform));
            return Err(TransformError::UnknownPlatform(platform.to_string()));
        };

        let output_path = self.platform_output_path(path, platform);

        let result = self.resize_image(path, dims.width, dims.height).and_then(|img| {
            let img = self.enhance_image(img);
            let img = self.compress_image(img, PLATFORM_JPEG_QUALITY);
            save_jpeg(img, &output_path, PLATFORM_JPEG_QUALITY)
        });

        match result {
            Ok(()) => {
                self.log.record(format!(
                    "Processed for {}: {}",
                    platform,
                    output_path.display()
                ));
                Ok(ProcessedImage {
                    original_path: path.to_path_buf(),
                    platform: platform.to_string(),
                    output_path,
                })
            }
            Err(e) => {
                self.log.error(format!("processing for {}: {}", platform, e));
                Err(e)
            }
        }
    }

    /// `<output_dir>/platform_optimized/<platform>/<stem>_<platform>.jpg`
    pub fn platform_output_path(&self, path: &Path, platform: &str) -> PathBuf {
        self.config
            .platform_dir(platform)
            .join(format!("{}_{}.jpg", file_stem(path), platform))
    }

    /// `<output_dir>/standard/<stem>.<ext>`
    pub fn standard_output_path(&self, path: &Path) -> PathBuf {
        self.config.standard_dir().join(format!(
            "{}.{}",
            file_stem(path),
            self.config.image_settings.format.extension()
        ))
    }

    /// Every image for every configured platform. Each configured platform
    /// gets an entry, in configuration order; failures are left out.
    ///
    /// Output names only carry the file stem, so two sources with the same
    /// stem (`image_0.jpg` of two properties) map to one output. The first
    /// one wins; later ones are logged as errors and skipped.
    pub fn batch_process(&self, paths: &[PathBuf]) -> IndexMap<String, Vec<PathBuf>> {
        let mut results: IndexMap<String, Vec<PathBuf>> = self
            .config
            .platforms
            .keys()
            .map(|name| (name.clone(), Vec::new()))
            .collect();
        let mut written = HashSet::new();

        for path in paths {
            for (platform, outputs) in results.iter_mut() {
                let output_path = self.platform_output_path(path, platform);
                if written.contains(&output_path) {
                    self.log_collision(path, &output_path, platform);
                    continue;
                }
                if let Ok(processed) = self.process_for_platform(path, platform) {
                    written.insert(processed.output_path.clone());
                    outputs.push(processed.output_path);
                }
            }
        }
        results
    }

    /// Standard-size master for each image, with the same collision rule as
    /// [`ImageTransformer::batch_process`]
    pub fn batch_standard(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut outputs = Vec::new();
        for path in paths {
            let output_path = self.standard_output_path(path);
            if outputs.contains(&output_path) {
                self.log_collision(path, &output_path, "standard variant");
                continue;
            }
            if let Ok(output_path) = self.process_standard(path) {
                outputs.push(output_path);
            }
        }
        outputs
    }

    fn log_collision(&self, path: &Path, output_path: &Path, target: &str) {
        self.log.error(format!(
            "processing for {}: {} would overwrite {} from this run",
            target,
            path.display(),
            output_path.display()
        ));
    }

    /// Standard-size master in the configured format under `<output_dir>/standard/`
    pub fn process_standard(&self, path: &Path) -> Result<PathBuf, TransformError> {
        let settings = &self.config.image_settings;
        let output_path = self.standard_output_path(path);

        let result = self
            .resize_image(path, settings.target_width, Some(settings.target_height))
            .and_then(|img| {
                let img = self.enhance_image(img);
                match settings.format {
                    OutputFormat::Jpeg => {
                        let img = self.compress_image(img, settings.quality);
                        save_jpeg(img, &output_path, settings.quality)
                    }
                    OutputFormat::Png => save_png(img, &output_path),
                }
            });

        match result {
            Ok(()) => {
                self.log
                    .record(format!("Processed standard variant: {}", output_path.display()));
                Ok(output_path)
            }
            Err(e) => {
                self.log.error(format!("processing standard variant: {}", e));
                Err(e)
            }
        }
    }
}
