//! Batch report files and console display.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::slip::{BettingInfo, SlipAnalysis};

/// Complete record written to `<name>_ocr.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlipReport {
    pub image_name: String,
    /// RFC 3339, UTC
    pub extracted_at: String,
    pub structured_data: SlipAnalysis,
    pub betting_info: BettingInfo,
}

impl SlipReport {
    pub fn new(image_name: &str, structured_data: SlipAnalysis) -> Self {
        let betting_info = structured_data.betting_info();
        Self {
            image_name: image_name.to_string(),
            extracted_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            structured_data,
            betting_info,
        }
    }
}

/// Paths of the two files written for one image.
#[derive(Debug, Clone)]
pub struct SavedReport {
    pub json_path: PathBuf,
    pub text_path: PathBuf,
}

/// Writes `<base>_ocr.json` (full record) and `<base>_ocr.txt` (structured
/// report) into `output_dir`.
pub fn save_results(
    output_dir: &Path,
    base_name: &str,
    report: &SlipReport,
    structured_text: &str,
) -> Result<SavedReport> {
    std::fs::create_dir_all(output_dir)
        .context(format!("Failed to create output directory: {}", output_dir.display()))?;

    let json_path = output_dir.join(format!("{}_ocr.json", base_name));
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")?;
    let mut file = File::create(&json_path)
        .context(format!("Failed to create JSON file: {}", json_path.display()))?;
    file.write_all(json.as_bytes())
        .context("Failed to write JSON data")?;

    let text_path = output_dir.join(format!("{}_ocr.txt", base_name));
    std::fs::write(&text_path, structured_text)
        .context(format!("Failed to write text file: {}", text_path.display()))?;

    Ok(SavedReport {
        json_path,
        text_path,
    })
}

/// Reads a report written by [`save_results`].
pub fn load_report(path: &Path) -> Result<SlipReport> {
    let contents = std::fs::read_to_string(path)
        .context(format!("Failed to read report: {}", path.display()))?;
    serde_json::from_str(&contents).context(format!("Failed to parse report: {}", path.display()))
}

/// Console view of one processed image.
///
/// A structured report of at least `inline_limit` characters is not printed;
/// the display points at `text_path` instead.
pub fn format_display(
    report: &SlipReport,
    structured_text: &str,
    text_path: &Path,
    inline_limit: usize,
) -> String {
    let rule = "=".repeat(60);
    let thin = "─".repeat(60);
    let info = &report.betting_info;
    let data = &report.structured_data;
    let mut out: Vec<String> = Vec::new();

    out.push(rule.clone());
    out.push(format!("📊 OCR RESULTS - {}", report.image_name));
    out.push(rule.clone());

    out.push(String::new());
    out.push("📝 STRUCTURED OUTPUT:".to_string());
    if structured_text.chars().count() >= inline_limit {
        out.push(format!(
            "(report too long to display, see {})",
            text_path.display()
        ));
    } else {
        out.push(structured_text.to_string());
    }

    out.push(String::new());
    out.push(rule.clone());
    out.push("🎯 BETTING INFORMATION:".to_string());
    if let Some(odds) = &info.parlay_odds {
        out.push(format!("   Parlay Odds: {}", odds));
    }
    if let Some(token) = &info.token {
        out.push(format!("   🎟️  Token: {}", token));
    }
    if let Some(game) = &info.game_info {
        out.push(format!("   🏈 Game: {} @ {}", game.away_team, game.home_team));
    }
    if let Some(time) = &info.timestamp {
        out.push(format!("   🕐 Time: {}", time));
    }
    if !info.bets.is_empty() {
        out.push(String::new());
        out.push("   📋 Bets:".to_string());
        for (i, bet) in info.bets.iter().enumerate() {
            out.push(format!("   {}. {} - {} {}", i + 1, bet.player, bet.bet_type, bet.value));
            if !bet.stat.is_empty() {
                out.push(format!("      📊 {}", bet.stat));
            }
        }
    }
    if let Some(wager) = &info.wager {
        out.push(String::new());
        out.push(format!("   💰 Total Wager: ${}", wager));
    }
    if let Some(payout) = &info.payout {
        out.push(format!("   💵 Total Payout: ${}", payout));
    }

    out.push(String::new());
    out.push("📝 RAW TEXT EXTRACTED:".to_string());
    out.push(thin.clone());
    out.push(data.raw_text.clone());
    out.push(thin);

    out.push(String::new());
    out.push(format!("✨ OCR Confidence: {:.2}%", data.confidence));
    out.push(format!("📊 Total Lines: {}", data.lines.len()));
    out.push(format!("📝 Total Words: {}", data.words.len()));

    let patterns = &data.detected_patterns;
    if !patterns.players.is_empty() {
        out.push(format!("👥 Detected Players: {}", patterns.players.join(", ")));
    }
    if !patterns.monetary.is_empty() {
        out.push(format!("💵 Monetary Values: {}", patterns.monetary.join(", ")));
    }

    out.join("\n")
}
