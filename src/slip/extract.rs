//! Betting-info extractor.
//!
//! Re-scans the normalized text with its own patterns. It never looks at the
//! structurer's output, so the two can disagree about the same slip.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

static PARLAY_ODDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Parlay\s*\+(\d+)").expect("parlay pattern"));
static TOKEN_PROMO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)NO SWEAT TOKEN").expect("token pattern"));
static GAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([\w \t]+)@([\w \t]+?)(?:\s+\d{1,2}:\d{2}[AP]M)").expect("game pattern")
});
static BET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([A-Za-z\s]+?)\s+(Over|Under)\s*([\d.]+)").expect("bet pattern")
});
static WAGER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)TOTAL\s*WAGER[:\s]*\$?([\d,]+\.?\d*)").expect("wager pattern")
});
static PAYOUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)TOTAL\s*PAYOUT[:\s]*\$?([\d,]+\.?\d*)").expect("payout pattern")
});
static TIMESTAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}:\d{2}[AP]M\s*[A-Z]{2,3})").expect("timestamp pattern"));

static NAME_GLYPH_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^['"]?[®@©•o◉●○◯▪▫■□◆◇★☆►▶▸‣⁃∙∘⚬⦿⦾⊙⊚⊛⊜⊝⚫⚪]*\s*"#)
        .expect("name glyph pattern")
});
/// Short tokens OCR leaves in front of player names.
static NAME_TEXT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(Ca|SEN|Ces|BE\.|Co|Ce|So|C|S|B|J|e|a|o|OO|IN|Pe|A|2\.)\s+")
        .expect("name prefix pattern")
});

const PROMO_TOKEN: &str = "NO SWEAT TOKEN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    pub away_team: String,
    pub home_team: String,
}

/// One over/under prop found on the slip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    pub player: String,
    #[serde(rename = "type")]
    pub bet_type: String,
    pub value: String,
    pub stat: String,
}

/// Flat record of the betting details found on a slip.
///
/// Wager and payout hold the bare amount, without the dollar sign.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BettingInfo {
    pub parlay_odds: Option<String>,
    pub game_info: Option<GameInfo>,
    pub bets: Vec<Bet>,
    pub wager: Option<String>,
    pub payout: Option<String>,
    pub timestamp: Option<String>,
    pub token: Option<String>,
}

/// Extracts betting details from the normalized page text and its normalized
/// lines. Bets are read line by line; everything else searches the whole text.
pub fn extract_betting_info<S: AsRef<str>>(text: &str, lines: &[S]) -> BettingInfo {
    let mut info = BettingInfo {
        parlay_odds: PARLAY_ODDS.captures(text).map(|c| format!("+{}", &c[1])),
        token: TOKEN_PROMO.is_match(text).then(|| PROMO_TOKEN.to_string()),
        game_info: GAME.captures(text).map(|c| GameInfo {
            away_team: c[1].trim().to_string(),
            home_team: c[2].trim().to_string(),
        }),
        ..Default::default()
    };

    let mut seen = HashSet::new();
    for (index, line) in lines.iter().enumerate() {
        let Some(caps) = BET.captures(line.as_ref()) else {
            continue;
        };

        let player = clean_player_name(&caps[1]);
        let bet_type = caps[2].to_string();
        let value = caps[3].to_string();

        if !seen.insert(format!("{player}-{bet_type}-{value}")) {
            continue;
        }

        let next = lines.get(index + 1).map(|l| l.as_ref()).unwrap_or("");
        info.bets.push(Bet {
            player,
            bet_type,
            value,
            stat: stat_label(next),
        });
    }

    info.wager = WAGER.captures(text).map(|c| c[1].to_string());
    info.payout = PAYOUT.captures(text).map(|c| c[1].to_string());
    info.timestamp = TIMESTAMP.captures(text).map(|c| c[1].to_string());

    info
}

/// Stat for a bet, taken from the line after it. An all-caps line with a dash
/// keeps only the part after the first dash.
fn stat_label(next: &str) -> String {
    if next == next.to_uppercase() {
        if let Some((_, label)) = next.split_once('-') {
            let label = label.trim();
            if !label.is_empty() {
                return label.to_string();
            }
        }
    }
    next.to_string()
}

/// Strips icon glyphs and known garbage tokens from the front of a name.
pub fn clean_player_name(name: &str) -> String {
    let name = name.trim();
    let name = NAME_GLYPH_PREFIX.replace(name, "");
    let name = NAME_TEXT_PREFIX.replace(&name, "");
    name.replace("JaMarr", "Ja'Marr")
        .replace("JAMARR", "JA'MARR")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIP: &str = "Bengals @ Steelers 1:00PM ET\nSame Game Parlay +350\nNO SWEAT TOKEN\nTee Higgins Over 55.5\nRECEIVING YDS\nTOTAL WAGER\n$25.00\nTOTAL PAYOUT $112.50";

    fn lines_of(text: &str) -> Vec<&str> {
        text.lines().collect()
    }

    #[test]
    fn test_full_slip() {
        let info = extract_betting_info(SLIP, &lines_of(SLIP));

        assert_eq!(info.parlay_odds.as_deref(), Some("+350"));
        assert_eq!(info.token.as_deref(), Some("NO SWEAT TOKEN"));
        assert_eq!(
            info.game_info,
            Some(GameInfo {
                away_team: "Bengals".to_string(),
                home_team: "Steelers".to_string(),
            })
        );
        assert_eq!(info.wager.as_deref(), Some("25.00"));
        assert_eq!(info.payout.as_deref(), Some("112.50"));
        assert_eq!(info.timestamp.as_deref(), Some("1:00PM ET"));

        assert_eq!(info.bets.len(), 1);
        let bet = &info.bets[0];
        assert_eq!(bet.player, "Tee Higgins");
        assert_eq!(bet.bet_type, "Over");
        assert_eq!(bet.value, "55.5");
        assert_eq!(bet.stat, "RECEIVING YDS");
    }

    #[test]
    fn test_duplicate_bets_suppressed() {
        let lines = [
            "Tee Higgins Over 55.5",
            "RECEIVING YDS",
            "Tee Higgins Over 55.5",
            "RECEIVING YDS",
            "Tee Higgins Under 55.5",
        ];
        let info = extract_betting_info("", &lines);

        assert_eq!(info.bets.len(), 2);
        assert_eq!(info.bets[0].bet_type, "Over");
        assert_eq!(info.bets[1].bet_type, "Under");
        assert_eq!(info.bets[1].stat, "");
    }

    #[test]
    fn test_stat_after_dash() {
        let lines = ["Joe Burrow Over 250.5", "JOE BURROW - PASSING YDS"];
        let info = extract_betting_info("", &lines);
        assert_eq!(info.bets[0].stat, "PASSING YDS");
    }

    #[test]
    fn test_stat_falls_back_to_next_line() {
        let lines = ["Joe Burrow Over 250.5", "Passing Yards"];
        let info = extract_betting_info("", &lines);
        assert_eq!(info.bets[0].stat, "Passing Yards");
    }

    #[test]
    fn test_clean_player_name() {
        assert_eq!(clean_player_name("• Tee Higgins"), "Tee Higgins");
        assert_eq!(clean_player_name("SEN Joe Burrow"), "Joe Burrow");
        assert_eq!(clean_player_name("Co Tee Higgins"), "Tee Higgins");
        assert_eq!(clean_player_name("JaMarr Chase"), "Ja'Marr Chase");
        assert_eq!(clean_player_name("Joe Burrow"), "Joe Burrow");
    }

    #[test]
    fn test_wager_and_payout_without_dollar() {
        let text = "TOTAL WAGER: 10.00\nTOTAL PAYOUT 1,045.00";
        let info = extract_betting_info(text, &lines_of(text));
        assert_eq!(info.wager.as_deref(), Some("10.00"));
        assert_eq!(info.payout.as_deref(), Some("1,045.00"));
    }

    #[test]
    fn test_empty_text() {
        let info = extract_betting_info::<&str>("", &[]);
        assert_eq!(info, BettingInfo::default());
    }

    #[test]
    fn test_serializes_camel_case() {
        let info = extract_betting_info(SLIP, &lines_of(SLIP));
        let json = serde_json::to_value(&info).unwrap();

        assert_eq!(json["parlayOdds"], "+350");
        assert_eq!(json["gameInfo"]["awayTeam"], "Bengals");
        assert_eq!(json["bets"][0]["type"], "Over");
        assert!(json.get("timestamp").is_some());
    }
}
