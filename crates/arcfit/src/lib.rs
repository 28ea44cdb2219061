//! arcfit: recover the full circle behind a partial arc in a raster image.
//!
//! The pipeline stages are:
//!
//! 1. **Normalize**: alpha compositing onto white, grayscale, Otsu binarization.
//! 2. **Extract**: Gaussian smoothing, Canny edges, border following; the
//!    largest external contour is taken as the arc.
//! 3. **Fit**: radial-variance circle fit solved with Levenberg–Marquardt.
//! 4. **Render**: dashed circle, center marker and boundary samples on a
//!    canvas that grows when the circle leaves the image.
//! 5. **Compose**: reconstruction and inverted input side by side.
//!
//! # Public API
//! - [`reconstruct`] / [`reconstruct_image`] for one image
//! - [`process_folder`] for the batch driver used by the CLI
//! - [`fit_circle`], [`extract_boundary`] and [`draw_dashed_circle`] as the
//!   individual building blocks

mod batch;
mod canvas;
mod circle;
mod extract;
mod fit;
mod normalize;
mod reconstruct;
mod render;
mod source;

#[cfg(test)]
pub(crate) mod test_utils;

pub use batch::{
    output_path_for, process_folder, BatchError, BatchSummary, FileOutcome, FileRecord,
    OUTPUT_DIR_NAME,
};
pub use canvas::{compose_side_by_side, expand_canvas, CanvasPadding};
pub use circle::Circle;
pub use extract::{extract_boundary, polygon_area, ExtractConfig, NotFound};
pub use fit::{fit_circle, fit_circle_report, ConvergenceReason, FitConfig, FitError, FitReport};
pub use normalize::{binarize_otsu, normalize, NormalizedImages};
pub use reconstruct::{
    reconstruct, reconstruct_image, ReconstructConfig, ReconstructError, ReconstructionResult,
    Stage,
};
pub use render::{dash_chords, draw_dashed_circle, render_overlay, DashStyle, RenderStyle};
pub use source::SourceImage;
