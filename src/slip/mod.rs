//! Slip text pipeline: normalize the OCR page, then structure it into a
//! report and extract the betting details.

pub mod extract;
pub mod normalize;
pub mod structure;

pub use extract::{Bet, BettingInfo, GameInfo, extract_betting_info};
pub use normalize::{normalize_lines, normalize_text};
pub use structure::{StructuredSlip, structure_slip};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ocr::OcrOutput;

static PLAYER_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z][a-z]+ [A-Z][a-z]+").expect("player pattern"));
static MONEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$[\d,]+\.?\d*").expect("money pattern"));
static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.\d+").expect("decimal pattern"));
static MATCHUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z\s]+)@([A-Za-z\s]+)").expect("matchup pattern"));

/// Loose pattern hits over the normalized text, kept for the JSON report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectedPatterns {
    /// Two capitalized words in a row, deduplicated in order of appearance.
    pub players: Vec<String>,
    pub teams: Vec<String>,
    pub numbers: Vec<String>,
    pub monetary: Vec<String>,
}

/// Normalized view of one OCR result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlipAnalysis {
    /// Normalized page text.
    pub raw_text: String,
    /// Page text exactly as the OCR engine returned it.
    pub original_raw_text: String,
    pub confidence: f32,
    pub lines: Vec<String>,
    pub words: Vec<String>,
    pub detected_patterns: DetectedPatterns,
}

/// Normalizes an OCR result and collects the pattern hits.
pub fn analyze(ocr: &OcrOutput) -> SlipAnalysis {
    let raw_text = normalize_text(&ocr.text);
    let lines = normalize_lines(&ocr.lines);
    let words = ocr
        .words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();
    let detected_patterns = detect_patterns(&raw_text);

    SlipAnalysis {
        raw_text,
        original_raw_text: ocr.text.clone(),
        confidence: ocr.confidence,
        lines,
        words,
        detected_patterns,
    }
}

fn detect_patterns(text: &str) -> DetectedPatterns {
    let all = |re: &Regex| -> Vec<String> {
        re.find_iter(text).map(|m| m.as_str().to_string()).collect()
    };

    let mut players = all(&PLAYER_NAME);
    let mut seen = std::collections::HashSet::new();
    players.retain(|p| seen.insert(p.clone()));

    DetectedPatterns {
        players,
        teams: all(&MATCHUP),
        numbers: all(&DECIMAL),
        monetary: all(&MONEY),
    }
}

impl SlipAnalysis {
    /// Section report built from the normalized text.
    pub fn structured(&self) -> StructuredSlip {
        structure_slip(&self.raw_text)
    }

    pub fn betting_info(&self) -> BettingInfo {
        extract_betting_info(&self.raw_text, &self.lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ocr(text: &str) -> OcrOutput {
        OcrOutput {
            text: text.to_string(),
            words: text.split_whitespace().map(str::to_string).collect(),
            lines: text.lines().map(str::to_string).collect(),
            confidence: 87.5,
        }
    }

    #[test]
    fn test_analyze_keeps_original_text() {
        let raw = "TOTAL 2a¥0UT $45.00";
        let analysis = analyze(&ocr(raw));

        assert_eq!(analysis.original_raw_text, raw);
        assert!(analysis.raw_text.contains("PAYOUT"));
        assert_eq!(analysis.confidence, 87.5);
    }

    #[test]
    fn test_analyze_drops_noise_lines_and_blank_words() {
        let mut output = ocr("Tee Higgins Over 55.5\n•••\nRECEIVING YDS");
        output.words.push("  ".to_string());
        let analysis = analyze(&output);

        assert_eq!(analysis.lines, vec!["Tee Higgins Over 55.5", "RECEIVING YDS"]);
        assert!(analysis.words.iter().all(|w| !w.is_empty()));
    }

    #[test]
    fn test_detected_patterns() {
        let patterns =
            detect_patterns("Tee Higgins Over 55.5\nTee Higgins Under 4.5\nTOTAL WAGER $10.00");

        assert_eq!(patterns.players, vec!["Tee Higgins"]);
        assert_eq!(patterns.numbers, vec!["55.5", "4.5", "10.00"]);
        assert_eq!(patterns.monetary, vec!["$10.00"]);
        assert!(patterns.teams.is_empty());
    }

    #[test]
    fn test_detected_teams() {
        let patterns = detect_patterns("Bengals @ Steelers");
        assert_eq!(patterns.teams, vec!["Bengals @ Steelers"]);
    }

    #[test]
    fn test_end_to_end_report() {
        let raw = "Ja'Marr Chase\nOver 75.5\nRECEIVING YDS\nTOTAL WAGER $10.00\nTOTAL PAYOUT $45.00";
        let analysis = analyze(&ocr(raw));

        let report = analysis.structured().render();
        assert!(report.starts_with("Individual Legs\n1. Over 75.5 - RECEIVING YDS"));
        assert!(report.contains("Total Wager: $10.00 | Total Payout: $45.00"));

        let info = analysis.betting_info();
        assert_eq!(info.wager.as_deref(), Some("10.00"));
        assert_eq!(info.payout.as_deref(), Some("45.00"));
        assert!(info.game_info.is_none());
    }

    #[test]
    fn test_analysis_json_is_camel_case() {
        let analysis = analyze(&ocr("TOTAL WAGER $10.00"));
        let json = serde_json::to_value(&analysis).unwrap();

        assert!(json.get("rawText").is_some());
        assert!(json.get("originalRawText").is_some());
        assert_eq!(json["detectedPatterns"]["monetary"][0], "$10.00");
    }
}
