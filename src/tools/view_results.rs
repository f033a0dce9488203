//! `view-results`: summary of every saved batch report.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::batch::{SlipReport, load_report};

const PREVIEW_CHARS: usize = 200;

/// Report files (`*_ocr.json`) in `output_dir`, sorted by name.
pub fn report_files(output_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(output_dir)
        .context(format!("Failed to read output directory: {}", output_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .map(|n| n.to_string_lossy().ends_with("_ocr.json"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}

/// Console block for one report.
pub fn format_report(report: &SlipReport) -> String {
    let info = &report.betting_info;
    let mut out = vec![
        format!("📄 {}", report.image_name),
        "-".repeat(70),
        format!("✨ Confidence: {:.1}%", report.structured_data.confidence),
    ];

    if let Some(odds) = &info.parlay_odds {
        out.push(format!("🎲 Parlay: {}", odds));
    }
    if let Some(wager) = &info.wager {
        out.push(format!(
            "💰 Wager: ${} → Payout: ${}",
            wager,
            info.payout.as_deref().unwrap_or("?")
        ));
    }
    if !info.bets.is_empty() {
        out.push(format!("📋 Bets: {}", info.bets.len()));
        for (i, bet) in info.bets.iter().enumerate() {
            out.push(format!("   {}. {} {} {}", i + 1, bet.player, bet.bet_type, bet.value));
        }
    }

    out.push(String::new());
    out.push("📝 Full Text Preview:".to_string());
    out.push(preview(&report.structured_data.raw_text));
    out.join("\n")
}

/// Summary of every report in `output_dir`. Unreadable reports are listed
/// with their error and do not stop the summary.
pub fn summarize_results(output_dir: &Path) -> Result<String> {
    let files = report_files(output_dir)?;
    let mut out = vec!["📊 OCR RESULTS SUMMARY".to_string(), "=".repeat(70)];

    for file in &files {
        out.push(String::new());
        match load_report(file) {
            Ok(report) => out.push(format_report(&report)),
            Err(e) => {
                tracing::warn!("Skipping {}: {:#}", file.display(), e);
                out.push(format!("⚠️  {}: {:#}", file.display(), e));
            }
        }
    }

    out.push(String::new());
    out.push("=".repeat(70));
    out.push(format!("📂 All files in: {}", output_dir.display()));
    out.push(format!("Total images processed: {}", files.len()));
    Ok(out.join("\n"))
}

pub fn run_view_results(output_dir: &Path) -> Result<()> {
    println!("{}", summarize_results(output_dir)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::report::save_results;
    use crate::slip::{Bet, SlipAnalysis};
    use tempfile::tempdir;

    fn report(name: &str, raw_text: &str) -> SlipReport {
        let analysis = SlipAnalysis {
            raw_text: raw_text.to_string(),
            confidence: 76.54,
            ..SlipAnalysis::default()
        };
        SlipReport::new(name, analysis)
    }

    #[test]
    fn test_format_report() {
        let mut r = report("slip.png", "Same Game Parlay +350\nTOTAL WAGER $10.00");
        r.betting_info.payout = Some("45.00".to_string());
        r.betting_info.bets.push(Bet {
            player: "Tee Higgins".to_string(),
            bet_type: "Over".to_string(),
            value: "55.5".to_string(),
            stat: String::new(),
        });

        let text = format_report(&r);
        assert!(text.contains("📄 slip.png"));
        assert!(text.contains("✨ Confidence: 76.5%"));
        assert!(text.contains("🎲 Parlay: +350"));
        assert!(text.contains("💰 Wager: $10.00 → Payout: $45.00"));
        assert!(text.contains("   1. Tee Higgins Over 55.5"));
    }

    #[test]
    fn test_preview_truncates() {
        let long = "a".repeat(250);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_summarize_results() {
        let dir = tempdir().unwrap();
        save_results(dir.path(), "b", &report("b.png", "B"), "B").unwrap();
        save_results(dir.path(), "a", &report("a.png", "A"), "A").unwrap();
        std::fs::write(dir.path().join("broken_ocr.json"), "{").unwrap();
        std::fs::write(dir.path().join("notes.json"), "{}").unwrap();

        let summary = summarize_results(dir.path()).unwrap();

        let a = summary.find("📄 a.png").unwrap();
        let b = summary.find("📄 b.png").unwrap();
        assert!(a < b);
        assert!(summary.contains("broken_ocr.json"));
        assert!(!summary.contains("notes.json"));
        assert!(summary.contains("Total images processed: 3"));
    }

    #[test]
    fn test_missing_output_dir() {
        let dir = tempdir().unwrap();
        assert!(summarize_results(&dir.path().join("absent")).is_err());
    }
}
