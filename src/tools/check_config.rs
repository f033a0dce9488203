//! `check-config`: reports which Discord settings are present.

use crate::config::{REQUIRED_VARS, RequiredVar};

/// Builds the console report. Never fails; the report is the whole result.
pub fn config_report<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = vec!["🔍 Checking Discord Bot Configuration...".to_string(), String::new()];
    let mut missing: Vec<&RequiredVar> = Vec::new();

    for var in &REQUIRED_VARS {
        if var.read(&lookup).is_some() {
            out.push(format!("✅ {} is set", var.name));
        } else {
            out.push(format!("❌ {} is missing or not set", var.name));
            out.extend(var.hints.iter().map(|hint| format!("   → {}", hint)));
            out.push(String::new());
            missing.push(var);
        }
    }

    out.push(String::new());
    out.push("=".repeat(50));
    out.push(String::new());

    if missing.is_empty() {
        out.push("✅ All configuration values are set!".to_string());
        out.push(String::new());
        out.push("Next steps:".to_string());
        out.push("1. Run: betslip-ocr deploy-commands".to_string());
        out.push("2. Run: betslip-ocr bot".to_string());
        out.push("3. Use /ocr-test in Discord!".to_string());
    } else {
        out.push("⚠️  Configuration incomplete!".to_string());
        out.push("Please update the .env file with your Discord credentials.".to_string());
    }

    out.join("\n")
}

pub fn run_check_config() {
    println!("{}", config_report(|name| std::env::var(name).ok()));
}
