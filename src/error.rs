//! Error types for the slip pipeline

use thiserror::Error;

/// Failures that end the processing of one image or one interaction.
#[derive(Error, Debug)]
pub enum SlipError {
    #[error("Download failed: HTTP {status} for {url}")]
    Download { status: u16, url: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Tesseract not found: {0}")]
    TesseractNotFound(String),

    #[error("Tesseract failed: {0}")]
    Tesseract(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing configuration: {0}")]
    MissingConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = SlipError::Download {
            status: 404,
            url: "https://cdn.example/slip.png".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Download failed: HTTP 404 for https://cdn.example/slip.png"
        );
        assert_eq!(
            SlipError::UnknownCommand("ping".to_string()).to_string(),
            "Unknown command: ping"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SlipError = io.into();
        assert!(matches!(err, SlipError::Io(_)));
    }
}
