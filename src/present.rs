//! Text shown to the player: odds labels, share posts, leaderboard row details

use crate::distribution::ScoreDistribution;
use crate::leaderboard::{Rank, RankingEntry};
use crate::sync::RoundResult;

/// Odds label for `x`: a percentage while beating it is likelier than not,
/// otherwise "1 in N"
pub fn rarity_label(dist: &ScoreDistribution, x: i64) -> String {
    let rarity = dist.rarity_of(x);
    if rarity <= 1 {
        format!("{}%", dist.percent_of(x))
    } else {
        format!("1 in {}", format_thousands(rarity))
    }
}

/// Group digits with commas: 1234567 -> "1,234,567"
pub fn format_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// What goes into a share post
#[derive(Debug, Clone, PartialEq)]
pub struct ShareCard {
    pub score: i64,
    pub is_best: bool,
    pub rank: Rank,
    /// Comment of the achievement unlocked with this score
    pub achievement_comment: Option<String>,
}

impl ShareCard {
    /// Card for a finished round
    pub fn from_round(result: &RoundResult, rank: Rank) -> Self {
        Self {
            score: result.score,
            is_best: result.is_best,
            rank,
            achievement_comment: result.achievement.as_ref().map(|a| a.comment.clone()),
        }
    }
}

/// Render a share post
pub fn share_text(dist: &ScoreDistribution, card: &ShareCard) -> String {
    let mut text = format!("🏆 Score: {}\n", card.score);
    if card.is_best {
        text.push_str(&format!(
            "📉 Odds of rolling higher: {}\n",
            rarity_label(dist, card.score)
        ));
        text.push_str(&format!("🌍 Current rank: {}\n", card.rank));
    }
    if let Some(comment) = &card.achievement_comment {
        text.push_str("🌟 Achievement unlocked!\n");
        text.push_str(comment);
        text.push('\n');
    }
    text.push_str("\nOne click is all it takes!\n");
    text.push_str("Can you beat these odds? Try your luck now!\n");
    text
}

/// Detail lines for a leaderboard row: odds, when it was set, which attempt
pub fn entry_details(dist: &ScoreDistribution, entry: &RankingEntry) -> String {
    format!(
        "{}\n{}\nattempt #{}",
        rarity_label(dist, entry.score),
        entry.created_at.format("%Y/%m/%d %H:00 UTC"),
        format_thousands(entry.attempt_count)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::PcgSource;
    use chrono::TimeZone;

    fn dist() -> ScoreDistribution {
        ScoreDistribution::new(50, Box::new(PcgSource::seeded(7))).unwrap()
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
        assert_eq!(format_thousands(-45_000), "-45,000");
        assert_eq!(format_thousands(i64::MAX), "9,223,372,036,854,775,807");
    }

    #[test]
    fn test_rarity_label_switches_to_one_in_n() {
        let d = dist();
        assert_eq!(rarity_label(&d, 1), "98%");
        assert_eq!(rarity_label(&d, 34), "51%");
        assert_eq!(rarity_label(&d, 35), "1 in 2");
        assert_eq!(rarity_label(&d, 100), "1 in 7");
        // e^10 = 22026.47
        assert_eq!(rarity_label(&d, 500), "1 in 22,026");
    }

    #[test]
    fn test_share_text_for_plain_roll() {
        let card = ShareCard {
            score: 12,
            is_best: false,
            rank: Rank::Unranked,
            achievement_comment: None,
        };
        let text = share_text(&dist(), &card);
        assert!(text.starts_with("🏆 Score: 12\n"));
        assert!(!text.contains("Current rank"));
        assert!(!text.contains("Achievement"));
        assert!(text.ends_with("Try your luck now!\n"));
    }

    #[test]
    fn test_share_text_for_best_with_achievement() {
        let card = ShareCard {
            score: 100,
            is_best: true,
            rank: Rank::Ranked(3),
            achievement_comment: Some("Three digits!".to_string()),
        };
        let text = share_text(&dist(), &card);
        assert!(text.contains("📉 Odds of rolling higher: 1 in 7\n"));
        assert!(text.contains("🌍 Current rank: #3\n"));
        assert!(text.contains("🌟 Achievement unlocked!\nThree digits!\n"));
    }

    #[test]
    fn test_entry_details() {
        let entry = RankingEntry {
            id: "1".to_string(),
            client_token: "tok".to_string(),
            username: "Ada".to_string(),
            score: 100,
            created_at: chrono::Utc.with_ymd_and_hms(2024, 3, 9, 17, 42, 5).unwrap(),
            attempt_count: 1_204,
        };
        assert_eq!(
            entry_details(&dist(), &entry),
            "1 in 7\n2024/03/09 17:00 UTC\nattempt #1,204"
        );
    }
}
