use anyhow::{Context, Result, anyhow};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::OcrConfig;
use crate::error::SlipError;
use crate::paths::get_tessdata_cache_dir;

const TESSDATA_REPO: &str = "https://github.com/tesseract-ocr/tessdata/raw/main";

/// Install locations checked when tesseract is not on PATH.
const COMMON_EXECUTABLES: &[&str] = &[
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
];

const COMMON_TESSDATA_DIRS: &[&str] = &[
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4.00/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    "/opt/homebrew/share/tessdata",
    r"C:\Program Files\Tesseract-OCR\tessdata",
    r"C:\Program Files (x86)\Tesseract-OCR\tessdata",
];

/// Resolved locations for a tesseract run.
#[derive(Debug, Clone)]
pub struct TesseractPaths {
    pub executable: PathBuf,
    pub tessdata: PathBuf,
}

/// Locates tesseract and the traineddata for `config.language`, downloading
/// the traineddata into the local cache when none is installed.
pub fn ensure_tesseract(config: &OcrConfig) -> Result<TesseractPaths> {
    let executable = find_tesseract_executable(config)?;

    let tessdata = match find_tessdata_dir(config) {
        Some(dir) => dir,
        None => {
            let cache = get_tessdata_cache_dir();
            download_tessdata(&cache, &config.language)?;
            cache
        }
    };

    tracing::debug!(
        "Using tesseract {} with tessdata {}",
        executable.display(),
        tessdata.display()
    );

    Ok(TesseractPaths {
        executable,
        tessdata,
    })
}

/// Finds the tesseract executable: config override, `TESSERACT_PATH`, PATH,
/// then common install locations.
pub fn find_tesseract_executable(config: &OcrConfig) -> Result<PathBuf, SlipError> {
    if let Some(path) = &config.tesseract_path {
        if path.exists() {
            return Ok(path.clone());
        }
        return Err(SlipError::TesseractNotFound(format!(
            "configured path {} does not exist",
            path.display()
        )));
    }

    if let Ok(path) = std::env::var("TESSERACT_PATH") {
        let p = PathBuf::from(path);
        if p.exists() {
            return Ok(p);
        }
    }

    if let Ok(output) = Command::new("tesseract").arg("--version").output() {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    COMMON_EXECUTABLES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .ok_or_else(|| {
            SlipError::TesseractNotFound(
                "install tesseract-ocr, add it to PATH or set TESSERACT_PATH".to_string(),
            )
        })
}

/// Finds a tessdata directory holding `<language>.traineddata`.
pub fn find_tessdata_dir(config: &OcrConfig) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    if let Some(dir) = &config.tessdata_dir {
        candidates.push(dir.clone());
    }
    candidates.push(get_tessdata_cache_dir());

    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let prefix = PathBuf::from(prefix);
        candidates.push(prefix.join("tessdata"));
        candidates.push(prefix);
    }

    candidates.extend(COMMON_TESSDATA_DIRS.iter().map(PathBuf::from));

    candidates
        .into_iter()
        .find(|dir| has_traineddata(dir, &config.language))
}

fn has_traineddata(dir: &Path, language: &str) -> bool {
    dir.join(format!("{}.traineddata", language)).is_file()
}

/// Downloads `<language>.traineddata` into `tessdata_dir`.
fn download_tessdata(tessdata_dir: &Path, language: &str) -> Result<()> {
    let file_name = format!("{}.traineddata", language);
    let url = format!("{}/{}", TESSDATA_REPO, file_name);
    let target = tessdata_dir.join(&file_name);

    tracing::info!("Downloading {} to {}", file_name, tessdata_dir.display());
    fs::create_dir_all(tessdata_dir)
        .with_context(|| format!("Failed to create {}", tessdata_dir.display()))?;

    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(300))
        .build()?;

    let response = client
        .get(&url)
        .header("User-Agent", "betslip-ocr")
        .send()?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Failed to download {}: HTTP {}",
            file_name,
            response.status()
        ));
    }

    let bytes = response.bytes()?;

    // Partial downloads never carry the .traineddata name.
    let partial = target.with_extension("part");
    let mut file = fs::File::create(&partial)?;
    file.write_all(&bytes)?;
    drop(file);
    fs::rename(&partial, &target)?;

    tracing::info!("Downloaded {} ({} bytes)", file_name, bytes.len());

    Ok(())
}
