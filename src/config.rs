//! Application configuration.
//!
//! Settings come from config.json (working directory first, then next to the
//! executable, or an explicit `--config` path). Missing or invalid files fall
//! back to defaults. Discord credentials come from the environment, which
//! `main` fills from `.env`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SlipError;
use crate::paths::get_exe_dir;

const CONFIG_FILE: &str = "config.json";

/// Characters Tesseract may emit. Slips are English text, odds and money.
pub const DEFAULT_CHAR_WHITELIST: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789$.,+-:@/()% ";

/// Tesseract settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Traineddata language code
    pub language: String,
    /// Page segmentation mode (3 = fully automatic)
    pub page_seg_mode: u8,
    pub char_whitelist: String,
    /// Explicit tesseract executable, skips the search
    pub tesseract_path: Option<PathBuf>,
    /// Explicit tessdata directory, skips the search
    pub tessdata_dir: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            page_seg_mode: 3,
            char_whitelist: DEFAULT_CHAR_WHITELIST.to_string(),
            tesseract_path: None,
            tessdata_dir: None,
        }
    }
}

/// Image enhancement applied before OCR.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Output width in pixels; height follows the aspect ratio
    pub target_width: u32,
    /// Linear contrast factor around mid grey
    pub contrast: f32,
    /// Unsharp mask sigma
    pub sharpen_sigma: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            target_width: 2000,
            contrast: 1.2,
            sharpen_sigma: 1.5,
        }
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Downloads, processed images and oversized replies
    pub temp_dir: PathBuf,
    /// Batch reports
    pub output_dir: PathBuf,
    /// Directory holding the single `image.png` picked up by the batch
    pub image_root: PathBuf,
    /// Directory scanned by the batch
    pub images_dir: PathBuf,
    /// Extensions (without dot) the batch scan accepts
    pub image_extensions: Vec<String>,
    /// Replies with at least this many characters are sent as a file
    pub inline_reply_limit: usize,
    /// Minimum progress advance between two progress edits
    pub progress_step: u8,
    /// Delay before temporary files are removed
    pub cleanup_delay_secs: u64,
    pub ocr: OcrConfig,
    pub preprocess: PreprocessConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            temp_dir: PathBuf::from("temp"),
            output_dir: PathBuf::from("output"),
            image_root: PathBuf::from("."),
            images_dir: PathBuf::from("images"),
            image_extensions: vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
            inline_reply_limit: 1900,
            progress_step: 25,
            cleanup_delay_secs: 5,
            ocr: OcrConfig::default(),
            preprocess: PreprocessConfig::default(),
        }
    }
}

/// Loads the configuration, or defaults when no usable file exists.
pub fn load_config(explicit: Option<&Path>) -> AppConfig {
    let config_path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(),
    };

    let Some(config_path) = config_path else {
        tracing::info!("{} not found. Using default config.", CONFIG_FILE);
        return AppConfig::default();
    };

    tracing::info!("Loading config from: {}", config_path.display());
    load_config_from(&config_path)
}

fn find_config_file() -> Option<PathBuf> {
    let candidates = [
        std::env::current_dir().ok().map(|dir| dir.join(CONFIG_FILE)),
        Some(get_exe_dir().join(CONFIG_FILE)),
    ];
    candidates.into_iter().flatten().find(|path| path.exists())
}

/// Reads one config file, falling back to defaults on any failure.
pub fn load_config_from(path: &Path) -> AppConfig {
    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                AppConfig::default()
            }
        },
        Err(e) => {
            tracing::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
            AppConfig::default()
        }
    }
}

/// An environment value the Discord tools need.
#[derive(Debug, Clone, Copy)]
pub struct RequiredVar {
    pub name: &'static str,
    /// Value shipped in the sample `.env`; counts as unset.
    pub placeholder: &'static str,
    pub hints: &'static [&'static str],
}

pub const DISCORD_TOKEN: RequiredVar = RequiredVar {
    name: "DISCORD_TOKEN",
    placeholder: "your_bot_token_here",
    hints: &[
        "Get it from: https://discord.com/developers/applications",
        "Go to Bot section and reset token",
    ],
};

pub const CLIENT_ID: RequiredVar = RequiredVar {
    name: "CLIENT_ID",
    placeholder: "your_client_id_here",
    hints: &[
        "Get it from: https://discord.com/developers/applications",
        "Go to OAuth2 section and copy Client ID",
    ],
};

pub const GUILD_ID: RequiredVar = RequiredVar {
    name: "GUILD_ID",
    placeholder: "your_guild_id_here",
    hints: &[
        "Enable Developer Mode in Discord",
        "Right-click your server and Copy Server ID",
    ],
};

pub const REQUIRED_VARS: [RequiredVar; 3] = [DISCORD_TOKEN, CLIENT_ID, GUILD_ID];

impl RequiredVar {
    /// Reads the value through `lookup`. Empty and placeholder values are
    /// treated as unset.
    pub fn read<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(self.name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty() && v != self.placeholder)
    }

    pub fn from_env(&self) -> Option<String> {
        self.read(|name| std::env::var(name).ok())
    }
}

/// Discord credentials for command registration.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub token: String,
    pub client_id: u64,
    pub guild_id: u64,
}

impl Credentials {
    pub fn from_env() -> Result<Self, SlipError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SlipError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |var: &RequiredVar| {
            var.read(&lookup)
                .ok_or_else(|| SlipError::MissingConfig(var.name.to_string()))
        };
        let parse_id = |var: &RequiredVar| -> Result<u64, SlipError> {
            require(var)?
                .parse::<u64>()
                .ok()
                .filter(|id| *id != 0)
                .ok_or_else(|| {
                    SlipError::MissingConfig(format!("{} is not a numeric id", var.name))
                })
        };

        Ok(Self {
            token: require(&DISCORD_TOKEN)?,
            client_id: parse_id(&CLIENT_ID)?,
            guild_id: parse_id(&GUILD_ID)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.inline_reply_limit, 1900);
        assert_eq!(config.progress_step, 25);
        assert_eq!(config.cleanup_delay_secs, 5);
        assert_eq!(config.ocr.page_seg_mode, 3);
        assert_eq!(config.preprocess.target_width, 2000);
        assert_eq!(config.image_extensions, vec!["png", "jpg", "jpeg"]);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "output_dir": "reports", "ocr": { "language": "deu" } }"#,
        )
        .unwrap();

        let config = load_config_from(&path);
        assert_eq!(config.output_dir, PathBuf::from("reports"));
        assert_eq!(config.ocr.language, "deu");
        assert_eq!(config.ocr.page_seg_mode, 3);
        assert_eq!(config.inline_reply_limit, 1900);
    }

    #[test]
    fn test_invalid_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(load_config_from(&path), AppConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("absent.json")));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_placeholder_counts_as_missing() {
        let vars = env(&[("DISCORD_TOKEN", "your_bot_token_here"), ("CLIENT_ID", " ")]);
        let lookup = |name: &str| vars.get(name).cloned();

        assert_eq!(DISCORD_TOKEN.read(lookup), None);
        assert_eq!(CLIENT_ID.read(lookup), None);
        assert_eq!(GUILD_ID.read(lookup), None);
    }

    #[test]
    fn test_credentials_from_lookup() {
        let vars = env(&[
            ("DISCORD_TOKEN", "abc.def"),
            ("CLIENT_ID", "1234"),
            ("GUILD_ID", "5678"),
        ]);
        let creds = Credentials::from_lookup(|name| vars.get(name).cloned()).unwrap();

        assert_eq!(creds.token, "abc.def");
        assert_eq!(creds.client_id, 1234);
        assert_eq!(creds.guild_id, 5678);
    }

    #[test]
    fn test_credentials_reject_bad_ids() {
        let vars = env(&[
            ("DISCORD_TOKEN", "abc.def"),
            ("CLIENT_ID", "not-a-number"),
            ("GUILD_ID", "5678"),
        ]);
        let err = Credentials::from_lookup(|name| vars.get(name).cloned()).unwrap_err();
        assert!(err.to_string().contains("CLIENT_ID"));
    }

    #[test]
    fn test_credentials_missing_guild() {
        let vars = env(&[("DISCORD_TOKEN", "abc.def"), ("CLIENT_ID", "1234")]);
        let err = Credentials::from_lookup(|name| vars.get(name).cloned()).unwrap_err();
        assert!(matches!(err, SlipError::MissingConfig(name) if name == "GUILD_ID"));
    }
}
