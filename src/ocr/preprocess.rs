use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageReader, Luma};
use std::path::{Path, PathBuf};

use crate::config::PreprocessConfig;
use crate::error::SlipError;

/// Enhances an image for OCR and writes it to `output`.
///
/// Best effort: on any failure the original `input` path is returned and the
/// caller runs OCR on the unmodified image.
pub fn preprocess_image(input: &Path, output: &Path, config: &PreprocessConfig) -> PathBuf {
    match try_preprocess(input, output, config) {
        Ok(()) => output.to_path_buf(),
        Err(e) => {
            tracing::warn!(
                "Preprocessing failed for {}, using original: {}",
                input.display(),
                e
            );
            input.to_path_buf()
        }
    }
}

fn try_preprocess(
    input: &Path,
    output: &Path,
    config: &PreprocessConfig,
) -> Result<(), SlipError> {
    // Downloads are saved as .png whatever they contain.
    let img = ImageReader::open(input)?.with_guessed_format()?.decode()?;
    let enhanced = enhance(&img, config);
    enhanced.save(output)?;
    Ok(())
}

/// Resize, greyscale, histogram stretch, linear contrast, unsharp mask.
pub fn enhance(img: &DynamicImage, config: &PreprocessConfig) -> GrayImage {
    let (width, height) = scaled_dimensions(img.width(), img.height(), config.target_width);
    let resized = img.resize_exact(width, height, FilterType::Lanczos3);

    let mut gray = resized.to_luma8();
    stretch_histogram(&mut gray);
    apply_contrast(&mut gray, config.contrast);

    if config.sharpen_sigma > 0.0 {
        imageops::unsharpen(&gray, config.sharpen_sigma, 0)
    } else {
        gray
    }
}

/// Dimensions for a resize to `target_width`, keeping the aspect ratio.
/// Small images are scaled up.
fn scaled_dimensions(width: u32, height: u32, target_width: u32) -> (u32, u32) {
    if width == 0 || target_width == 0 {
        return (width.max(1), height.max(1));
    }
    let scaled = (height as u64 * target_width as u64 + width as u64 / 2) / width as u64;
    (target_width, (scaled as u32).max(1))
}

/// Spreads the used grey range over 0..=255.
fn stretch_histogram(img: &mut GrayImage) {
    let (min, max) = img
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));

    if max <= min {
        return;
    }

    let range = (max - min) as f32;
    for pixel in img.pixels_mut() {
        let v = (pixel[0] - min) as f32 * 255.0 / range;
        *pixel = Luma([v.round() as u8]);
    }
}

/// `v * factor + 128 * (1 - factor)`, clamped. Mid grey stays put.
fn apply_contrast(img: &mut GrayImage, factor: f32) {
    let offset = 128.0 * (1.0 - factor);
    for pixel in img.pixels_mut() {
        let v = pixel[0] as f32 * factor + offset;
        *pixel = Luma([v.round().clamp(0.0, 255.0) as u8]);
    }
}
