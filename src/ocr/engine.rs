use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;
use tempfile::NamedTempFile;

use super::setup::ensure_tesseract;
use crate::config::OcrConfig;
use crate::error::SlipError;
use crate::progress::ProgressSink;

/// Words of one recognized line, in reading order
#[derive(Debug, Clone)]
pub struct OcrLine {
    pub text: String,
    pub words: Vec<OcrWord>,
}

/// Represents a single word from OCR with confidence score
#[derive(Debug, Clone)]
pub struct OcrWord {
    pub text: String,
    pub confidence: f32,
}

/// Everything recognized on one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrOutput {
    /// Full page text, one line per recognized line, blank line between blocks
    pub text: String,
    pub words: Vec<String>,
    pub lines: Vec<String>,
    /// Mean word confidence, 0 to 100
    pub confidence: f32,
}

/// Runs Tesseract on an image file.
///
/// Reports 0 before the engine starts and 100 once its output is parsed.
pub fn recognize(
    image: &Path,
    config: &OcrConfig,
    progress: &dyn ProgressSink,
) -> Result<OcrOutput> {
    let paths = ensure_tesseract(config)?;
    progress.report(0);

    // Tesseract appends .tsv to the output base
    let temp_output = NamedTempFile::new()?;
    let output_base = temp_output.path().to_string_lossy().to_string();

    let output = Command::new(&paths.executable)
        .arg(image)
        .arg(&output_base)
        .arg("--tessdata-dir")
        .arg(&paths.tessdata)
        .arg("-l")
        .arg(&config.language)
        .arg("--psm")
        .arg(config.page_seg_mode.to_string())
        .arg("-c")
        .arg(format!("tessedit_char_whitelist={}", config.char_whitelist))
        .arg("tsv")
        .output()
        .map_err(|e| SlipError::Tesseract(format!("failed to start tesseract: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SlipError::Tesseract(stderr.trim().to_string()).into());
    }

    let tsv_path = format!("{}.tsv", output_base);
    let tsv_content = std::fs::read_to_string(&tsv_path)
        .with_context(|| format!("Failed to read Tesseract output {}", tsv_path))?;
    let _ = std::fs::remove_file(&tsv_path);

    let result = OcrOutput::from_blocks(&parse_tsv_output(&tsv_content));
    progress.report(100);

    tracing::debug!(
        "Recognized {} lines, {} words, confidence {:.2}%",
        result.lines.len(),
        result.words.len(),
        result.confidence
    );

    Ok(result)
}

/// Parses Tesseract TSV output into lines grouped by text block.
///
/// Lines are keyed on (block, paragraph, line) since line numbers restart in
/// every paragraph.
fn parse_tsv_output(tsv: &str) -> Vec<Vec<OcrLine>> {
    let mut blocks: Vec<Vec<OcrLine>> = Vec::new();
    let mut current_key: Option<(i32, i32, i32)> = None;
    let mut current_block: Option<i32> = None;
    let mut current_words: Vec<OcrWord> = Vec::new();

    for line in tsv.lines().skip(1) {
        // level, page_num, block_num, par_num, line_num, word_num,
        // left, top, width, height, conf, text
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        let level: i32 = fields[0].parse().unwrap_or(-1);
        let block: i32 = fields[2].parse().unwrap_or(-1);
        let par: i32 = fields[3].parse().unwrap_or(-1);
        let line_num: i32 = fields[4].parse().unwrap_or(-1);
        let conf: f32 = fields[10].trim().parse().unwrap_or(-1.0);
        let text = fields[11].trim();

        // Level 5 = word
        if level != 5 || text.is_empty() || conf < 0.0 {
            continue;
        }

        let key = (block, par, line_num);
        if current_key != Some(key) {
            flush_line(&mut blocks, current_block, &mut current_words);
            if current_block != Some(block) {
                blocks.push(Vec::new());
                current_block = Some(block);
            }
            current_key = Some(key);
        }

        current_words.push(OcrWord {
            text: text.to_string(),
            confidence: conf,
        });
    }

    flush_line(&mut blocks, current_block, &mut current_words);
    blocks
}

fn flush_line(blocks: &mut [Vec<OcrLine>], block: Option<i32>, words: &mut Vec<OcrWord>) {
    if words.is_empty() || block.is_none() {
        return;
    }
    let Some(target) = blocks.last_mut() else {
        return;
    };

    let words = std::mem::take(words);
    let text = words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    target.push(OcrLine { text, words });
}

impl OcrOutput {
    fn from_blocks(blocks: &[Vec<OcrLine>]) -> Self {
        let text = blocks
            .iter()
            .filter(|block| !block.is_empty())
            .map(|block| {
                block
                    .iter()
                    .map(|l| l.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let all_lines = blocks.iter().flatten();
        let lines: Vec<String> = all_lines.clone().map(|l| l.text.clone()).collect();
        let words: Vec<&OcrWord> = all_lines.flat_map(|l| l.words.iter()).collect();

        let confidence = if words.is_empty() {
            0.0
        } else {
            words.iter().map(|w| w.confidence).sum::<f32>() / words.len() as f32
        };

        Self {
            text,
            words: words.iter().map(|w| w.text.clone()).collect(),
            lines,
            confidence,
        }
    }
}
