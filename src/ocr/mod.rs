pub mod engine;
pub mod preprocess;
pub mod setup;

pub use engine::{OcrOutput, recognize};
pub use preprocess::preprocess_image;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::progress::ProgressSink;

/// Result of running the image side of the pipeline on one file.
#[derive(Debug, Clone)]
pub struct OcrRun {
    /// Image that was fed to Tesseract. Equals the input when preprocessing
    /// fell back to the original.
    pub recognized_path: PathBuf,
    pub output: OcrOutput,
}

/// High-level function: image file → preprocessed copy at `processed` → OCR.
pub fn ocr_image(
    image: &Path,
    processed: &Path,
    config: &AppConfig,
    progress: &dyn ProgressSink,
) -> Result<OcrRun> {
    tracing::info!("Preprocessing {}", image.display());
    let recognized_path = preprocess_image(image, processed, &config.preprocess);

    tracing::info!("Running OCR on {}", recognized_path.display());
    let output = recognize(&recognized_path, &config.ocr, progress)?;

    Ok(OcrRun {
        recognized_path,
        output,
    })
}
