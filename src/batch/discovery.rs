//! Finds the images a batch run processes.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;

/// Name of the single image picked up from the image root.
const ROOT_IMAGE: &str = "image.png";

/// Returns `<image_root>/image.png` if present, then every file in
/// `images_dir` matching the configured extensions, one extension at a time
/// in configured order, each group sorted by name. Duplicates are dropped.
pub fn find_images(config: &AppConfig) -> Vec<PathBuf> {
    let mut images = Vec::new();

    let root_image = config.image_root.join(ROOT_IMAGE);
    if root_image.is_file() {
        images.push(root_image);
    }

    let entries = list_files(&config.images_dir);
    for ext in &config.image_extensions {
        let mut matching: Vec<PathBuf> = entries
            .iter()
            .filter(|path| has_extension(path, ext))
            .cloned()
            .collect();
        matching.sort();
        images.extend(matching);
    }

    let mut seen = HashSet::new();
    images.retain(|path| seen.insert(canonical_key(path)));
    images
}

fn list_files(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect(),
        Err(e) => {
            tracing::debug!("Skipping {}: {}", dir.display(), e);
            Vec::new()
        }
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case(ext.trim_start_matches('.')))
        .unwrap_or(false)
}

/// `image_root` and `images_dir` may point at the same directory.
fn canonical_key(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
