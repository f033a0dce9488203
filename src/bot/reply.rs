//! User-facing reply texts.

pub const INVALID_IMAGE: &str = "❌ Please provide a valid image file!";
pub const DOWNLOADING: &str = "📥 Downloading image...";
pub const PREPROCESSING: &str = "📷 Preprocessing image...";
pub const PROCESSING: &str = "✨ Processing results...";
pub const COMMAND_FAILED: &str = "❌ There was an error executing this command!";

pub fn ocr_progress(percent: u8) -> String {
    format!("🔍 Performing OCR... {}%", percent)
}

pub fn ocr_failed(error: &anyhow::Error) -> String {
    format!("❌ An error occurred during OCR: {}", error)
}

/// Final reply for one OCR run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrReply {
    /// Whole report in the message body.
    Inline(String),
    /// Short message plus the report as a text attachment.
    Attachment { content: String, report: String },
}

fn header(confidence: f32, word_count: usize) -> String {
    format!(
        "✅ **OCR Complete!**\n\n📊 **Statistics:**\n• Confidence: {:.2}%\n• Words detected: {}\n\n",
        confidence, word_count
    )
}

/// Picks inline or attachment delivery. A message of `inline_limit`
/// characters or more always goes out as a file.
pub fn build_reply(
    confidence: f32,
    word_count: usize,
    report: &str,
    inline_limit: usize,
) -> OcrReply {
    let message = format!(
        "{}📝 **Extracted Text:**\n```\n{}\n```",
        header(confidence, word_count),
        report
    );

    if message.chars().count() < inline_limit {
        OcrReply::Inline(message)
    } else {
        OcrReply::Attachment {
            content: format!(
                "{}📝 Text was too long, see attached file.",
                header(confidence, word_count)
            ),
            report: report.to_string(),
        }
    }
}
