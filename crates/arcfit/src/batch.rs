//! Folder batch driver.
//!
//! Reconstructs every eligible image in a folder and writes composites to
//! `<folder>/reconstructed/`. Per-image failures are logged and recorded;
//! only setup problems (missing folder, nothing to process, unwritable
//! output folder) abort the batch.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::canvas::CanvasPadding;
use crate::reconstruct::{reconstruct, ReconstructConfig, Stage};

/// Name of the output subfolder created inside the input folder.
pub const OUTPUT_DIR_NAME: &str = "reconstructed";

const OUTPUT_PREFIX: &str = "reconstructed_";
const SYNTHETIC_PREFIX: &str = "synthetic_";
const SUMMARY_FILE: &str = "summary.json";
const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Setup failures that stop a batch before any image is processed.
#[derive(Debug)]
pub enum BatchError {
    /// Input folder does not exist or is not a directory.
    FolderMissing(PathBuf),
    /// Input folder could not be listed.
    ReadFolder {
        path: PathBuf,
        source: std::io::Error,
    },
    /// No PNG/JPEG files to process.
    NoImages(PathBuf),
    /// Output folder could not be created.
    CreateOutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FolderMissing(p) => write!(f, "folder '{}' does not exist", p.display()),
            Self::ReadFolder { path, source } => {
                write!(f, "cannot list folder '{}': {}", path.display(), source)
            }
            Self::NoImages(p) => write!(f, "no PNG or JPEG files found in '{}'", p.display()),
            Self::CreateOutputDir { path, source } => write!(
                f,
                "cannot create output folder '{}': {}",
                path.display(),
                source
            ),
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFolder { source, .. } | Self::CreateOutputDir { source, .. } => Some(source),
            Self::FolderMissing(_) | Self::NoImages(_) => None,
        }
    }
}

/// What happened to one input file.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Composite written.
    Reconstructed {
        /// Circle center in output-canvas coordinates.
        center: [f64; 2],
        radius: f64,
        padding: CanvasPadding,
        output: PathBuf,
    },
    /// Reconstruction failed; the file was skipped.
    Skipped { stage: Stage, reason: String },
    /// Reconstruction succeeded but the composite could not be written.
    SaveFailed { output: PathBuf, reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub input: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Result of a whole batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub folder: PathBuf,
    pub output_dir: PathBuf,
    pub config: ReconstructConfig,
    pub files: Vec<FileRecord>,
}

impl BatchSummary {
    pub fn n_reconstructed(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Reconstructed { .. }))
            .count()
    }

    pub fn n_failed(&self) -> usize {
        self.files.len() - self.n_reconstructed()
    }
}

/// Output path for `input`: `<output_dir>/reconstructed_<stem>.png`.
pub fn output_path_for(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{}{}.png", OUTPUT_PREFIX, stem))
}

fn is_eligible(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    let ext_ok = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
    let synthetic = path
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.starts_with(SYNTHETIC_PREFIX));
    ext_ok && !synthetic
}

/// Eligible images directly inside `folder`, sorted by path.
pub(crate) fn list_images(folder: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if !folder.is_dir() {
        return Err(BatchError::FolderMissing(folder.to_path_buf()));
    }
    let read_err = |source| BatchError::ReadFolder {
        path: folder.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if is_eligible(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Reconstruct every eligible image in `folder`.
pub fn process_folder(
    folder: &Path,
    config: &ReconstructConfig,
) -> Result<BatchSummary, BatchError> {
    let files = list_images(folder)?;
    if files.is_empty() {
        return Err(BatchError::NoImages(folder.to_path_buf()));
    }

    let output_dir = folder.join(OUTPUT_DIR_NAME);
    std::fs::create_dir_all(&output_dir).map_err(|source| BatchError::CreateOutputDir {
        path: output_dir.clone(),
        source,
    })?;

    tracing::info!(
        "Found {} image files to process in '{}'",
        files.len(),
        folder.display()
    );

    let mut records = Vec::with_capacity(files.len());
    for (i, input) in files.iter().enumerate() {
        let name = input.file_name().unwrap_or_default().to_string_lossy();
        tracing::info!("Processing {}/{}: {}", i + 1, files.len(), name);

        let outcome = process_file(input, &output_dir, config);
        match &outcome {
            FileOutcome::Reconstructed {
                center,
                radius,
                output,
                ..
            } => {
                tracing::info!(
                    "  Circle center: ({:.1}, {:.1}), radius: {:.1}",
                    center[0],
                    center[1],
                    radius
                );
                tracing::info!("  Saved result to: {}", output.display());
            }
            FileOutcome::Skipped { stage, reason } => {
                tracing::warn!("  Failed to process {} at {} stage: {}", name, stage, reason);
            }
            FileOutcome::SaveFailed { output, reason } => {
                tracing::error!("  Could not write {}: {}", output.display(), reason);
            }
        }
        records.push(FileRecord {
            input: input.clone(),
            outcome,
        });
    }

    let summary = BatchSummary {
        folder: folder.to_path_buf(),
        output_dir: output_dir.clone(),
        config: config.clone(),
        files: records,
    };

    let summary_path = output_dir.join(SUMMARY_FILE);
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&summary_path, json) {
                tracing::warn!("Could not write {}: {}", summary_path.display(), e);
            }
        }
        Err(e) => tracing::warn!("Could not serialize batch summary: {}", e),
    }

    tracing::info!(
        "{}/{} images reconstructed; results saved in '{}'",
        summary.n_reconstructed(),
        summary.files.len(),
        output_dir.display()
    );

    Ok(summary)
}

fn process_file(input: &Path, output_dir: &Path, config: &ReconstructConfig) -> FileOutcome {
    let result = match reconstruct(input, config) {
        Ok(r) => r,
        Err(e) => {
            return FileOutcome::Skipped {
                stage: e.stage(),
                reason: e.to_string(),
            }
        }
    };

    let output = output_path_for(output_dir, input);
    match result.image.save(&output) {
        Ok(()) => FileOutcome::Reconstructed {
            center: result.center(),
            radius: result.radius(),
            padding: result.padding,
            output,
        },
        Err(e) => FileOutcome::SaveFailed {
            output,
            reason: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::draw_arc_image;
    use image::GrayImage;

    fn write_arc(path: &Path) {
        draw_arc_image(200, 200, [50.0, 50.0], 30.0, 1.5, [-0.4, 2.4], 0, 255)
            .save(path)
            .unwrap();
    }

    #[test]
    fn output_name_uses_input_stem() {
        let out = output_path_for(Path::new("/data/reconstructed"), Path::new("/data/arc 1.jpeg"));
        assert_eq!(out, Path::new("/data/reconstructed/reconstructed_arc 1.png"));
    }

    #[test]
    fn missing_folder_halts_batch() {
        let err = process_folder(Path::new("/nonexistent/arcs"), &ReconstructConfig::default())
            .unwrap_err();
        assert!(matches!(err, BatchError::FolderMissing(_)));
    }

    #[test]
    fn folder_without_images_halts_batch() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "no images here").unwrap();
        let err = process_folder(dir.path(), &ReconstructConfig::default()).unwrap_err();
        assert!(matches!(err, BatchError::NoImages(_)));
        assert!(!dir.path().join(OUTPUT_DIR_NAME).exists());
    }

    #[test]
    fn listing_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.PNG", "a.jpg", "c.jpeg", "synthetic_d.png", "e.txt", "f.bmp"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.png")).unwrap();

        let names: Vec<String> = list_images(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.jpg", "b.PNG", "c.jpeg"]);
    }

    #[test]
    fn batch_processes_good_and_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        write_arc(&dir.path().join("arc.png"));
        GrayImage::from_pixel(50, 50, image::Luma([255]))
            .save(dir.path().join("blank.png"))
            .unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();
        write_arc(&dir.path().join("synthetic_arc.png"));

        let summary = process_folder(dir.path(), &ReconstructConfig::default()).unwrap();
        assert_eq!(summary.files.len(), 3);
        assert_eq!(summary.n_reconstructed(), 1);
        assert_eq!(summary.n_failed(), 2);

        let out_dir = dir.path().join(OUTPUT_DIR_NAME);
        assert!(out_dir.join("reconstructed_arc.png").is_file());
        assert!(!out_dir.join("reconstructed_blank.png").exists());
        assert!(!out_dir.join("reconstructed_synthetic_arc.png").exists());
        assert!(out_dir.join(SUMMARY_FILE).is_file());

        let by_name = |n: &str| {
            summary
                .files
                .iter()
                .find(|f| f.input.file_name().unwrap() == n)
                .unwrap()
                .outcome
                .clone()
        };
        match by_name("arc.png") {
            FileOutcome::Reconstructed { center, radius, .. } => {
                assert!((center[0] - 50.0).abs() < 1.0);
                assert!((center[1] - 50.0).abs() < 1.0);
                assert!((radius - 30.0).abs() < 1.0);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(matches!(
            by_name("blank.png"),
            FileOutcome::Skipped { stage: Stage::Extract, .. }
        ));
        assert!(matches!(
            by_name("broken.png"),
            FileOutcome::Skipped { stage: Stage::Load, .. }
        ));

        let written = image::open(out_dir.join("reconstructed_arc.png")).unwrap();
        assert_eq!((written.width(), written.height()), (400, 200));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out_dir.join(SUMMARY_FILE)).unwrap())
                .unwrap();
        assert_eq!(json["files"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn rerun_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_arc(&dir.path().join("arc.png"));
        let cfg = ReconstructConfig::default();

        process_folder(dir.path(), &cfg).unwrap();
        let out = dir.path().join(OUTPUT_DIR_NAME).join("reconstructed_arc.png");
        let first = std::fs::read(&out).unwrap();
        process_folder(dir.path(), &cfg).unwrap();
        let second = std::fs::read(&out).unwrap();
        assert_eq!(first, second);
    }
}
