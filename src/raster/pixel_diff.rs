//! Whole-frame pixel comparison between a design export and a page screenshot.
//!
//! This is the coarse path: it says how far two renders are apart, not
//! which element is wrong. Both images are padded onto a white canvas of
//! the larger dimensions (anchored top-left, never scaled) and compared
//! pixel by pixel.

use std::path::PathBuf;

use image::{DynamicImage, Rgba, RgbaImage, imageops};
use serde::Serialize;

use crate::error::{QaError, Result};

pub const DEFAULT_PIXEL_THRESHOLD: f64 = 0.1;

/// Pixels sampled for the colour/structure analysis, at most.
const MAX_ANALYSIS_SAMPLES: u64 = 1000;
const COLOR_DISTANCE_LIMIT: f64 = 50.0;
const LUMINANCE_DELTA_LIMIT: f64 = 30.0;

/// Largest possible RGB distance, `255 * sqrt(3)`.
const MAX_RGB_DISTANCE: f64 = 441.672_955_930_063_7;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Debug, Clone)]
pub struct RasterOptions {
    /// Normalised RGB distance (0..1) above which a pixel counts as different.
    pub threshold: f64,
    pub diff_output: Option<PathBuf>,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_PIXEL_THRESHOLD,
            diff_output: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RasterAnalysis {
    pub layout_match: f64,
    pub color_similarity: f64,
    pub structural_similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RasterComparison {
    pub width: u32,
    pub height: u32,
    pub pixel_difference: u64,
    pub total_pixels: u64,
    pub diff_percentage: f64,
    /// `max(0, 100 - diff_percentage)`.
    pub overall_score: f64,
    pub analysis: RasterAnalysis,
    pub feedback: Vec<String>,
}

fn decode(bytes: &[u8], context: &str) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|source| QaError::Image {
        context: context.to_string(),
        source,
    })
}

fn pad_to(img: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, WHITE);
    imageops::overlay(&mut canvas, &img.to_rgba8(), 0, 0);
    canvas
}

fn rgb_distance(a: &Rgba<u8>, b: &Rgba<u8>) -> f64 {
    let dr = a[0] as f64 - b[0] as f64;
    let dg = a[1] as f64 - b[1] as f64;
    let db = a[2] as f64 - b[2] as f64;
    (dr * dr + dg * dg + db * db).sqrt()
}

fn luminance(p: &Rgba<u8>) -> f64 {
    0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64
}

/// Compare two encoded images (any format the `image` crate decodes).
pub fn compare_images(
    design: &[u8],
    live: &[u8],
    options: &RasterOptions,
) -> Result<RasterComparison> {
    let design = decode(design, "design image")?;
    let live = decode(live, "live screenshot")?;

    let width = design.width().max(live.width());
    let height = design.height().max(live.height());
    let total_pixels = width as u64 * height as u64;
    if total_pixels == 0 {
        return Err(QaError::malformed("raster", "both images are empty"));
    }

    tracing::info!(
        design = ?(design.width(), design.height()),
        live = ?(live.width(), live.height()),
        canvas = ?(width, height),
        "comparing rasters"
    );

    let design = pad_to(&design, width, height);
    let live = pad_to(&live, width, height);

    let mut diff_image = options
        .diff_output
        .as_ref()
        .map(|_| RgbaImage::new(width, height));
    let mut pixel_difference = 0u64;

    for (x, y, a) in design.enumerate_pixels() {
        let b = live.get_pixel(x, y);
        let differs = rgb_distance(a, b) / MAX_RGB_DISTANCE > options.threshold;
        if differs {
            pixel_difference += 1;
        }
        if let Some(diff) = diff_image.as_mut() {
            let marked = if differs {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([a[0] / 2, a[1] / 2, a[2] / 2, 128])
            };
            diff.put_pixel(x, y, marked);
        }
    }

    if let (Some(diff), Some(path)) = (diff_image, options.diff_output.as_ref()) {
        diff.save(path).map_err(|source| QaError::Image {
            context: format!("writing {}", path.display()),
            source,
        })?;
        tracing::info!(path = %path.display(), "diff image written");
    }

    let diff_percentage = pixel_difference as f64 / total_pixels as f64 * 100.0;
    let overall_score = (100.0 - diff_percentage).max(0.0);
    let analysis = analyze(&design, &live);
    let feedback = feedback(overall_score, diff_percentage, &analysis);

    Ok(RasterComparison {
        width,
        height,
        pixel_difference,
        total_pixels,
        diff_percentage,
        overall_score,
        analysis,
        feedback,
    })
}

/// Sample up to 1% of the canvas (capped at 1000 pixels) on a fixed stride
/// so repeated runs agree.
fn analyze(design: &RgbaImage, live: &RgbaImage) -> RasterAnalysis {
    let width = design.width() as u64;
    let total = width * design.height() as u64;
    let samples = (total / 100).clamp(1, MAX_ANALYSIS_SAMPLES);

    let mut color_differences = 0u64;
    let mut structural_differences = 0u64;

    for i in 0..samples {
        let index = i * total / samples;
        let (x, y) = ((index % width) as u32, (index / width) as u32);
        let a = design.get_pixel(x, y);
        let b = live.get_pixel(x, y);

        if rgb_distance(a, b) > COLOR_DISTANCE_LIMIT {
            color_differences += 1;
        }
        if (luminance(a) - luminance(b)).abs() > LUMINANCE_DELTA_LIMIT {
            structural_differences += 1;
        }
    }

    let similarity = |misses: u64| (100.0 - misses as f64 / samples as f64 * 100.0).max(0.0);
    RasterAnalysis {
        layout_match: similarity(structural_differences),
        color_similarity: similarity(color_differences),
        structural_similarity: similarity(structural_differences),
    }
}

fn feedback(score: f64, diff_percentage: f64, analysis: &RasterAnalysis) -> Vec<String> {
    let mut out = Vec::new();

    out.push(
        if score >= 90.0 {
            "Excellent match: the page closely follows the design."
        } else if score >= 80.0 {
            "Good match with minor differences."
        } else if score >= 60.0 {
            "Moderate differences found; review layout and styling."
        } else {
            "Significant differences detected; major revisions may be needed."
        }
        .to_string(),
    );

    if analysis.color_similarity < 70.0 {
        out.push("Color differences detected in backgrounds, text or brand colors.".to_string());
    }
    if analysis.layout_match < 70.0 {
        out.push("Layout differences found in spacing, positioning or element sizes.".to_string());
    }
    if analysis.structural_similarity < 70.0 {
        out.push("Structural differences detected; elements may be missing or moved.".to_string());
    }

    if diff_percentage < 5.0 {
        out.push("Pixel-perfect implementation.".to_string());
    } else if diff_percentage < 15.0 {
        out.push("Very close implementation with minor pixel differences.".to_string());
    }

    out
}
