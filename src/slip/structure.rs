//! Slip structurer.
//!
//! Walks the normalized lines once, top to bottom, and sorts each line into a
//! section of the slip. Plain dollar lines are ambiguous on their own, so the
//! most recently entered section decides whether they are the wager or the
//! payout.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static ODDS_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]\d{3,5}$").expect("odds pattern"));
static TIME_OF_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,2}:\d{2}[AP]M").expect("time pattern"));
static SLIP_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Same Game Parlay|Parlay|Straight Bet").expect("slip type pattern")
});
static TOKEN_PROMO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)NO SWEAT TOKEN").expect("token pattern"));
static TOTAL_WAGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)TOTAL WAGER").expect("wager pattern"));
static PAYOUT_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)TOTAL.*PAYOUT").expect("payout header pattern"));
static DOLLAR_AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$[\d,]+\.?\d*").expect("dollar pattern"));
static DOLLAR_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$[\d,]+\.?\d*$").expect("dollar line pattern"));
static LEG_MARKET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)Over|Under|\+|-\d+|MONEYLINE|SPREAD|TOUCHDOWN|RECEPTIONS|PASSING|RUSHING|RECEIVING",
    )
    .expect("leg market pattern")
});
static STAT_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Z\s]+(YDS|TDS|RECEPTIONS|TOUCHDOWNS|POINTS|ASSISTS)$")
        .expect("stat label pattern")
});

/// Section the scan is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    /// Before any slip-type line.
    Unknown,
    /// After the slip-type line, collecting legs.
    Legs,
    /// Wager seen, waiting for the payout.
    Payout,
    /// Everything after the payout.
    Extra,
}

impl Section {
    fn collects_legs(self) -> bool {
        matches!(self, Section::Unknown | Section::Legs)
    }
}

/// A slip split into its sections. Empty strings and vectors mean the section
/// was not found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredSlip {
    pub game_info: String,
    pub odds: String,
    pub slip_info: String,
    pub legs: Vec<String>,
    pub wager: String,
    pub payout: String,
    pub extra: Vec<String>,
}

/// Classifies every non-empty line of `text` into a slip section.
pub fn structure_slip(text: &str) -> StructuredSlip {
    let lines: Vec<&str> = text
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut slip = StructuredSlip::default();
    let mut section = Section::Unknown;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let next = lines.get(i + 1).copied();
        i += 1;

        if ODDS_LINE.is_match(line) {
            slip.odds = line.to_string();
            continue;
        }

        if line.contains('@') && TIME_OF_DAY.is_match(line) {
            slip.game_info = line.to_string();
            continue;
        }

        if SLIP_TYPE.is_match(line) {
            let mut parts = vec![line];
            if let Some(token) = next.filter(|n| TOKEN_PROMO.is_match(n)) {
                parts.push(token);
                i += 1;
            }
            slip.slip_info = parts.join(" | ");
            section = Section::Legs;
            continue;
        }

        let bare_dollar = DOLLAR_LINE.is_match(line);

        if TOTAL_WAGER.is_match(line) || (bare_dollar && section == Section::Legs) {
            if TOTAL_WAGER.is_match(line) {
                if let Some(amount) = take_amount(line, next, &mut i) {
                    slip.wager = amount;
                }
            } else {
                slip.wager = line.to_string();
            }
            section = Section::Payout;
            continue;
        }

        if PAYOUT_HEADER.is_match(line) || (bare_dollar && section == Section::Payout) {
            if PAYOUT_HEADER.is_match(line) {
                if let Some(amount) = take_amount(line, next, &mut i) {
                    slip.payout = amount;
                }
            } else {
                slip.payout = line.to_string();
            }
            section = Section::Extra;
            continue;
        }

        if section.collects_legs() && LEG_MARKET.is_match(line) {
            let mut leg = line.to_string();
            if let Some(label) = next.filter(|n| STAT_LABEL.is_match(n)) {
                leg.push_str(" - ");
                leg.push_str(label);
                i += 1;
            }
            slip.legs.push(format!("{}. {}", slip.legs.len() + 1, leg));
            continue;
        }

        slip.extra.push(line.to_string());
    }

    slip
}

/// Dollar amount from the header line itself, else from the next line when
/// that line is a bare amount (which is then consumed).
fn take_amount(line: &str, next: Option<&str>, index: &mut usize) -> Option<String> {
    if let Some(m) = DOLLAR_AMOUNT.find(line) {
        return Some(m.as_str().to_string());
    }
    let next = next.filter(|n| DOLLAR_LINE.is_match(n))?;
    *index += 1;
    Some(next.to_string())
}

impl StructuredSlip {
    /// Renders the sections as a blank-line separated report.
    pub fn render(&self) -> String {
        let mut output: Vec<String> = Vec::new();

        if !self.game_info.is_empty() {
            output.push("Game Info".to_string());
            output.push(self.game_info.clone());
            output.push(String::new());
        }

        if !self.odds.is_empty() {
            output.push("Odds".to_string());
            output.push(self.odds.clone());
            output.push(String::new());
        }

        if !self.slip_info.is_empty() {
            output.push("Slip Info".to_string());
            output.push(self.slip_info.clone());
            output.push(String::new());
        }

        if !self.legs.is_empty() {
            output.push("Individual Legs".to_string());
            for leg in &self.legs {
                output.push(leg.clone());
                output.push(String::new());
            }
        }

        if !self.wager.is_empty() || !self.payout.is_empty() {
            let mut totals = Vec::new();
            if !self.wager.is_empty() {
                totals.push(format!("Total Wager: {}", self.wager));
            }
            if !self.payout.is_empty() {
                totals.push(format!("Total Payout: {}", self.payout));
            }
            output.push(totals.join(" | "));
            output.push(String::new());
        }

        if !self.extra.is_empty() {
            output.push("Additional Info".to_string());
            output.extend(self.extra.iter().cloned());
        }

        output.join("\n").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slip::normalize::normalize_text;

    #[test]
    fn test_bare_odds_line() {
        let slip = structure_slip("+350");
        assert_eq!(slip.odds, "+350");
        assert!(slip.legs.is_empty());
        assert!(slip.extra.is_empty());
        assert_eq!(slip.render(), "Odds\n+350");
    }

    #[test]
    fn test_game_info_needs_time() {
        let slip = structure_slip("Bengals @ Steelers 1:00PM ET\nBengals @ Steelers");
        assert_eq!(slip.game_info, "Bengals @ Steelers 1:00PM ET");
        assert_eq!(slip.extra, vec!["Bengals @ Steelers"]);
    }

    #[test]
    fn test_wager_from_next_line_is_consumed_once() {
        let slip = structure_slip("Same Game Parlay\nTOTAL WAGER\n$25.00\n$112.50");
        assert_eq!(slip.wager, "$25.00");
        // The line after the consumed amount is read as the payout.
        assert_eq!(slip.payout, "$112.50");
        assert!(slip.extra.is_empty());
        assert!(slip.legs.is_empty());
    }

    #[test]
    fn test_wager_header_without_amount() {
        let slip = structure_slip("TOTAL WAGER\nsomething else");
        assert_eq!(slip.wager, "");
        assert_eq!(slip.extra, vec!["something else"]);
    }

    #[test]
    fn test_bare_dollar_lines_follow_section() {
        let slip = structure_slip("Parlay\nOver 10.5\n$5.00\n$20.00\n$1.00");
        assert_eq!(slip.wager, "$5.00");
        assert_eq!(slip.payout, "$20.00");
        assert_eq!(slip.extra, vec!["$1.00"]);
    }

    #[test]
    fn test_bare_dollar_before_slip_type_is_extra() {
        let slip = structure_slip("$5.00");
        assert_eq!(slip.wager, "");
        assert_eq!(slip.extra, vec!["$5.00"]);
    }

    #[test]
    fn test_slip_type_consumes_token_line() {
        let slip = structure_slip("Same Game Parlay\nNO SWEAT TOKEN\nBengals MONEYLINE");
        assert_eq!(slip.slip_info, "Same Game Parlay | NO SWEAT TOKEN");
        assert_eq!(slip.legs, vec!["1. Bengals MONEYLINE"]);
    }

    #[test]
    fn test_legs_are_numbered_and_stat_label_appended() {
        let slip = structure_slip(
            "Parlay\nJoe Burrow Over 250.5\nPASSING YDS\nBengals MONEYLINE\nTee Higgins Under 4.5\nRECEPTIONS",
        );
        assert_eq!(
            slip.legs,
            vec![
                "1. Joe Burrow Over 250.5 - PASSING YDS",
                "2. Bengals MONEYLINE",
                "3. Tee Higgins Under 4.5 - RECEPTIONS",
            ]
        );
    }

    #[test]
    fn test_garbled_payout_header_keeps_amount() {
        let slip = structure_slip(&normalize_text("Parlay\nOver 10.5\nTOTAL XPAYOUT $9.00"));
        assert_eq!(slip.payout, "$9.00");
        assert!(slip.extra.is_empty());

        let slip = structure_slip("Parlay\nTOTAL WAGER $2.00\nTOTAL XPAYOUT\n$9.00");
        assert_eq!(slip.payout, "$9.00");
        assert!(slip.extra.is_empty());
    }

    #[test]
    fn test_legs_stop_after_payout() {
        let slip = structure_slip("Parlay\nTOTAL WAGER $5.00\nTOTAL PAYOUT $20.00\nOver 10.5");
        assert!(slip.legs.is_empty());
        assert_eq!(slip.extra, vec!["Over 10.5"]);
    }

    #[test]
    fn test_no_matches_only_extra() {
        let slip = structure_slip("hello\nworld");
        assert_eq!(slip.render(), "Additional Info\nhello\nworld");
    }

    #[test]
    fn test_empty_input() {
        let slip = structure_slip("");
        assert_eq!(slip, StructuredSlip::default());
        assert_eq!(slip.render(), "");
    }

    #[test]
    fn test_full_slip_render_order() {
        let text = "+350\nBengals @ Steelers 1:00PM ET\nSame Game Parlay\nNO SWEAT TOKEN\nJa'Marr Chase Over 75.5\nRECEIVING YDS\nTOTAL WAGER\n$25.00\nTOTAL PAYOUT\n$112.50\nPlaced: 10/12/2025";
        let expected = "Game Info\nBengals @ Steelers 1:00PM ET\n\nOdds\n+350\n\nSlip Info\nSame Game Parlay | NO SWEAT TOKEN\n\nIndividual Legs\n1. Ja'Marr Chase Over 75.5 - RECEIVING YDS\n\nTotal Wager: $25.00 | Total Payout: $112.50\n\nAdditional Info\nPlaced: 10/12/2025";
        assert_eq!(structure_slip(text).render(), expected);
    }

    #[test]
    fn test_end_to_end_from_raw_ocr() {
        let raw = "Ja'Marr Chase\nOver 75.5\nRECEIVING YDS\nTOTAL WAGER $10.00\nTOTAL PAYOUT $45.00";
        let slip = structure_slip(&normalize_text(raw));

        assert_eq!(slip.game_info, "");
        assert_eq!(slip.odds, "");
        assert_eq!(slip.legs, vec!["1. Over 75.5 - RECEIVING YDS"]);

        let report = slip.render();
        assert!(!report.contains("Game Info"));
        assert!(!report.contains("Odds"));
        assert!(report.contains("Individual Legs\n1. Over 75.5 - RECEIVING YDS"));
        assert!(report.contains("Total Wager: $10.00 | Total Payout: $45.00"));
    }
}
