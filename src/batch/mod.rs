//! Batch mode: OCR every discovered image, one at a time.
//!
//! A failure on one image is recorded and the run moves on to the next.

pub mod discovery;
pub mod report;

pub use discovery::find_images;
pub use report::{SlipReport, load_report};

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::ocr::{OcrRun, ocr_image};
use crate::paths::base_name;
use crate::progress::LogProgress;
use crate::slip::analyze;
use report::{format_display, save_results};

/// Outcome of one image.
#[derive(Debug, Clone)]
pub struct ImageResult {
    pub image_name: String,
    /// JSON report path on success, error message on failure
    pub outcome: Result<PathBuf, String>,
}

/// Outcome of a whole run, in processing order.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub results: Vec<ImageResult>,
}

impl BatchSummary {
    pub fn successful(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.results.iter().filter_map(|r| match &r.outcome {
            Err(e) => Some((r.image_name.as_str(), e.as_str())),
            Ok(_) => None,
        })
    }

    /// Console summary printed at the end of a run.
    pub fn render(&self, output_dir: &Path) -> String {
        let total = self.results.len();
        let failed: Vec<(&str, &str)> = self.failures().collect();
        let mut out = vec![
            "=".repeat(60),
            "📊 PROCESSING SUMMARY".to_string(),
            "=".repeat(60),
            format!("✅ Successfully processed: {}/{}", self.successful(), total),
        ];

        if !failed.is_empty() {
            out.push(format!("❌ Failed: {}/{}", failed.len(), total));
            for (name, error) in failed {
                out.push(format!("   - {}: {}", name, error));
            }
        }

        out.push(String::new());
        out.push(format!("📂 All results saved to: {}", output_dir.display()));
        out.join("\n")
    }
}

/// Discovers images and processes them with Tesseract.
pub fn run_batch(config: &AppConfig) -> Result<BatchSummary> {
    let images = find_images(config);

    if images.is_empty() {
        println!("\n⚠️  No images found!");
        println!("Place images in one of these locations:");
        println!("  - {}", config.image_root.join("image.png").display());
        println!(
            "  - {} ({})",
            config.images_dir.display(),
            config.image_extensions.join(", ")
        );
        return Ok(BatchSummary::default());
    }

    println!("\n📁 Found {} image(s) to process\n", images.len());

    let summary = process_images(&images, config, |image, processed| {
        ocr_image(image, processed, config, &LogProgress)
    });

    println!("\n{}", summary.render(&config.output_dir));
    Ok(summary)
}

/// Runs `ocr` on each image in order and writes the reports.
pub fn process_images<F>(images: &[PathBuf], config: &AppConfig, mut ocr: F) -> BatchSummary
where
    F: FnMut(&Path, &Path) -> Result<OcrRun>,
{
    let mut summary = BatchSummary::default();

    for image in images {
        let image_name = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| image.display().to_string());

        println!("{}", "=".repeat(60));
        println!("📸 Processing: {}", image_name);

        let outcome = process_image(image, &image_name, config, &mut ocr).map_err(|e| {
            tracing::error!("Error processing {}: {:#}", image_name, e);
            format!("{:#}", e)
        });

        summary.results.push(ImageResult {
            image_name,
            outcome,
        });
    }

    summary
}

fn process_image<F>(
    image: &Path,
    image_name: &str,
    config: &AppConfig,
    ocr: &mut F,
) -> Result<PathBuf>
where
    F: FnMut(&Path, &Path) -> Result<OcrRun>,
{
    let base = base_name(image);
    let processed = config.temp_dir.join(format!("{}_processed.png", base));
    if let Err(e) = std::fs::create_dir_all(&config.temp_dir) {
        tracing::warn!("Failed to create {}: {}", config.temp_dir.display(), e);
    }

    let run = ocr(image, &processed);

    // The processed copy is only needed for recognition.
    if processed.exists() && processed != image {
        if let Err(e) = std::fs::remove_file(&processed) {
            tracing::warn!("Failed to remove {}: {}", processed.display(), e);
        }
    }

    let run = run?;
    tracing::debug!("Recognized {}", run.recognized_path.display());
    let analysis = analyze(&run.output);
    let structured_text = analysis.structured().render();
    let report = SlipReport::new(image_name, analysis);

    let saved = save_results(&config.output_dir, &base, &report, &structured_text)?;
    println!(
        "{}",
        format_display(
            &report,
            &structured_text,
            &saved.text_path,
            config.inline_reply_limit
        )
    );
    println!("💾 Complete data saved to: {}", saved.json_path.display());
    println!("📝 Structured text saved to: {}", saved.text_path.display());

    Ok(saved.json_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::OcrOutput;
    use anyhow::anyhow;
    use tempfile::tempdir;

    fn test_config(root: &Path) -> AppConfig {
        AppConfig {
            temp_dir: root.join("temp"),
            output_dir: root.join("output"),
            ..AppConfig::default()
        }
    }

    fn fake_run(image: &Path, text: &str) -> OcrRun {
        OcrRun {
            recognized_path: image.to_path_buf(),
            output: OcrOutput {
                text: text.to_string(),
                words: text.split_whitespace().map(str::to_string).collect(),
                lines: text.lines().map(str::to_string).collect(),
                confidence: 88.0,
            },
        }
    }

    #[test]
    fn test_failure_does_not_stop_the_run() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let images = vec![
            PathBuf::from("images/broken.png"),
            PathBuf::from("images/good.png"),
        ];

        let summary = process_images(&images, &config, |image, _| {
            if image.ends_with("broken.png") {
                Err(anyhow!("Tesseract failed: bad image"))
            } else {
                Ok(fake_run(image, "TOTAL WAGER $10.00\nTOTAL PAYOUT $45.00"))
            }
        });

        assert_eq!(summary.results.len(), 2);
        assert_eq!(summary.successful(), 1);
        let failures: Vec<_> = summary.failures().collect();
        assert_eq!(failures, vec![("broken.png", "Tesseract failed: bad image")]);

        let json = config.output_dir.join("good_ocr.json");
        assert!(json.exists());
        let report = load_report(&json).unwrap();
        assert_eq!(report.image_name, "good.png");
        assert_eq!(report.betting_info.payout.as_deref(), Some("45.00"));

        let text = std::fs::read_to_string(config.output_dir.join("good_ocr.txt")).unwrap();
        assert_eq!(text, "Total Wager: $10.00 | Total Payout: $45.00");
    }

    #[test]
    fn test_processed_image_removed() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let images = vec![dir.path().join("slip.png")];

        let summary = process_images(&images, &config, |image, processed| {
            std::fs::write(processed, b"png").unwrap();
            Ok(fake_run(image, "Parlay"))
        });

        assert_eq!(summary.successful(), 1);
        assert!(!config.temp_dir.join("slip_processed.png").exists());
    }

    #[test]
    fn test_summary_render() {
        let summary = BatchSummary {
            results: vec![
                ImageResult {
                    image_name: "a.png".to_string(),
                    outcome: Ok(PathBuf::from("output/a_ocr.json")),
                },
                ImageResult {
                    image_name: "b.png".to_string(),
                    outcome: Err("download failed".to_string()),
                },
            ],
        };

        let text = summary.render(Path::new("output"));
        assert!(text.contains("✅ Successfully processed: 1/2"));
        assert!(text.contains("❌ Failed: 1/2"));
        assert!(text.contains("   - b.png: download failed"));
    }

    #[test]
    fn test_run_batch_without_images() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            image_root: dir.path().to_path_buf(),
            images_dir: dir.path().join("images"),
            ..test_config(dir.path())
        };

        let summary = run_batch(&config).unwrap();
        assert!(summary.results.is_empty());
    }
}
