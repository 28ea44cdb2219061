//! Single-image reconstruction: load → normalize → extract → fit → expand
//! canvas → render → compose.
//!
//! Every stage failure short-circuits into a [`ReconstructError`] tagged
//! with its [`Stage`]; nothing panics on bad input.
//!
//! Growing the canvas for a circle that leaves the image is normal policy.
//! The only render-stage failure is [`ReconstructError::CanvasTooLarge`], a
//! resource bound (`max_canvas_side`) on the allocation: the fit itself
//! succeeded and the fitted circle is carried in the error.

use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::canvas::{compose_side_by_side, expand_canvas, CanvasPadding};
use crate::circle::Circle;
use crate::extract::{extract_boundary, ExtractConfig, NotFound};
use crate::fit::{fit_circle_report, FitConfig, FitError, FitReport};
use crate::normalize::normalize;
use crate::render::{render_overlay, RenderStyle};
use crate::source::SourceImage;

/// Top-level configuration for one reconstruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructConfig {
    pub extract: ExtractConfig,
    pub fit: FitConfig,
    pub render: RenderStyle,
    /// Largest allowed side of the expanded drawing canvas, in pixels.
    pub max_canvas_side: u32,
}

impl Default for ReconstructConfig {
    fn default() -> Self {
        Self {
            extract: ExtractConfig::default(),
            fit: FitConfig::default(),
            render: RenderStyle::default(),
            max_canvas_side: 16_384,
        }
    }
}

impl ReconstructConfig {
    /// Load a configuration from a JSON file. Missing fields keep defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

/// Pipeline stage that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Extract,
    Fit,
    Render,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::Extract => "extract",
            Self::Fit => "fit",
            Self::Render => "render",
        };
        f.write_str(name)
    }
}

/// Why a single image could not be reconstructed.
#[derive(Debug)]
pub enum ReconstructError {
    /// File missing, unreadable, or not a decodable image.
    Load {
        path: PathBuf,
        source: image::ImageError,
    },
    /// No usable arc in the normalized image.
    Extraction(NotFound),
    /// Circle fit rejected the extracted points.
    Fit(FitError),
    /// The expanded drawing canvas would exceed `max_canvas_side`.
    CanvasTooLarge {
        width: u64,
        height: u64,
        limit: u32,
        circle: Circle,
    },
}

impl ReconstructError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Load { .. } => Stage::Load,
            Self::Extraction(_) => Stage::Extract,
            Self::Fit(_) => Stage::Fit,
            Self::CanvasTooLarge { .. } => Stage::Render,
        }
    }
}

impl std::fmt::Display for ReconstructError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load { path, source } => {
                write!(f, "could not load image {}: {}", path.display(), source)
            }
            Self::Extraction(e) => write!(f, "could not extract arc points: {}", e),
            Self::Fit(e) => write!(f, "{}", e),
            Self::CanvasTooLarge {
                width,
                height,
                limit,
                circle,
            } => write!(
                f,
                "circle ({:.1}, {:.1}) r={:.1} needs a {}x{} canvas, above max_canvas_side = {} px",
                circle.cx, circle.cy, circle.r, width, height, limit
            ),
        }
    }
}

impl std::error::Error for ReconstructError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load { source, .. } => Some(source),
            Self::Extraction(e) => Some(e),
            Self::Fit(e) => Some(e),
            Self::CanvasTooLarge { .. } => None,
        }
    }
}

impl From<NotFound> for ReconstructError {
    fn from(e: NotFound) -> Self {
        Self::Extraction(e)
    }
}

impl From<FitError> for ReconstructError {
    fn from(e: FitError) -> Self {
        Self::Fit(e)
    }
}

/// Output of one successful reconstruction.
#[derive(Debug, Clone)]
pub struct ReconstructionResult {
    /// Composite: annotated reconstruction on the left, inverted input on
    /// the right.
    pub image: RgbImage,
    /// Fitted circle in the coordinates of the (possibly expanded) canvas.
    pub circle: Circle,
    /// Padding applied to the drawing canvas.
    pub padding: CanvasPadding,
    /// Number of extracted boundary points.
    pub n_points: usize,
    /// Fit diagnostics in original image coordinates.
    pub fit: FitReport,
}

impl ReconstructionResult {
    pub fn center(&self) -> [f64; 2] {
        self.circle.center()
    }

    pub fn radius(&self) -> f64 {
        self.circle.r
    }
}

/// Reconstruct the circle behind the arc in the image at `path`.
pub fn reconstruct(
    path: &Path,
    config: &ReconstructConfig,
) -> Result<ReconstructionResult, ReconstructError> {
    let src = SourceImage::open(path).map_err(|source| ReconstructError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    reconstruct_image(&src, config)
}

/// Reconstruct from an already decoded image.
pub fn reconstruct_image(
    src: &SourceImage,
    config: &ReconstructConfig,
) -> Result<ReconstructionResult, ReconstructError> {
    let (w, h) = src.dimensions();
    tracing::debug!("image size: {}x{} (alpha: {})", w, h, src.has_alpha());

    let normalized = normalize(src);
    tracing::debug!("binarized at otsu level {}", normalized.threshold);

    let mut points = extract_boundary(&normalized.processing, &config.extract)?;
    tracing::debug!("{} arc points extracted", points.len());

    let fit = fit_circle_report(&points, &config.fit)?;

    let padding = CanvasPadding::for_circle(&fit.circle, w, h);
    let (new_w, new_h) = padding.padded_size(w, h);
    let limit = u64::from(config.max_canvas_side);
    if new_w > limit || new_h > limit {
        return Err(ReconstructError::CanvasTooLarge {
            width: new_w,
            height: new_h,
            limit: config.max_canvas_side,
            circle: fit.circle,
        });
    }

    let base = DynamicImage::ImageLuma8(normalized.processing).into_rgb8();
    let mut canvas = if padding.is_empty() {
        base
    } else {
        tracing::info!(
            "circle extends beyond the image; expanding canvas to {}x{}",
            new_w,
            new_h
        );
        expand_canvas(&base, &padding, config.render.background)
    };

    let [dx, dy] = padding.offset();
    let circle = fit.circle.translated(dx, dy);
    for p in &mut points {
        *p = padding.apply(*p);
    }

    render_overlay(&mut canvas, &circle, &points, &config.render);

    let comparison = DynamicImage::ImageLuma8(normalized.comparison).into_rgb8();
    let image = compose_side_by_side(&canvas, &comparison, config.render.background);

    Ok(ReconstructionResult {
        image,
        circle,
        padding,
        n_points: points.len(),
        fit,
    })
}
