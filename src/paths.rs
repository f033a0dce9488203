use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::AppConfig;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the local tessdata cache: `<data_local_dir>/betslip-ocr/tessdata/`
pub fn get_tessdata_cache_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| get_exe_dir().clone())
        .join("betslip-ocr")
        .join("tessdata")
}

/// Ensures the temp and output directories exist. Call at startup.
pub fn ensure_directories(config: &AppConfig) -> std::io::Result<()> {
    std::fs::create_dir_all(&config.temp_dir)?;
    std::fs::create_dir_all(&config.output_dir)?;
    Ok(())
}

/// File name without directories and extension: `images/slip 1.png` -> `slip 1`
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}
