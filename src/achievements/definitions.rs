//! Achievement definitions
//!
//! The built-in table is tuned for the default mean of 50: the cheap ranges
//! unlock within a few rolls, the top ones are once-in-a-lifetime.

use serde::{Deserialize, Serialize};

/// Unique identifier for each achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    BeginnersLuck,
    RockBottom,
    LuckySeven,
    RightOnAverage,
    Jackpot,
    TripleDigits,
    OneFifty,
    DoubleCentury,
    QuarterMillennium,
    ThreeHundred,
    ThreeFifty,
    FourHundred,
    FourFifty,
    FiveHundred,
    SevenFifty,
    Millennium,
}

impl AchievementId {
    /// Stable string ID used for persistence keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeginnersLuck => "beginners_luck",
            Self::RockBottom => "rock_bottom",
            Self::LuckySeven => "lucky_seven",
            Self::RightOnAverage => "right_on_average",
            Self::Jackpot => "jackpot",
            Self::TripleDigits => "triple_digits",
            Self::OneFifty => "one_fifty",
            Self::DoubleCentury => "double_century",
            Self::QuarterMillennium => "quarter_millennium",
            Self::ThreeHundred => "three_hundred",
            Self::ThreeFifty => "three_fifty",
            Self::FourHundred => "four_hundred",
            Self::FourFifty => "four_fifty",
            Self::FiveHundred => "five_hundred",
            Self::SevenFifty => "seven_fifty",
            Self::Millennium => "millennium",
        }
    }

    /// Parse from a stored string ID
    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|id| id.as_str() == s)
    }

    /// Get all achievement IDs
    pub fn all() -> &'static [AchievementId] {
        &[
            Self::BeginnersLuck,
            Self::RockBottom,
            Self::LuckySeven,
            Self::RightOnAverage,
            Self::Jackpot,
            Self::TripleDigits,
            Self::OneFifty,
            Self::DoubleCentury,
            Self::QuarterMillennium,
            Self::ThreeHundred,
            Self::ThreeFifty,
            Self::FourHundred,
            Self::FourFifty,
            Self::FiveHundred,
            Self::SevenFifty,
            Self::Millennium,
        ]
    }
}

impl std::fmt::Display for AchievementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one achievement: an inclusive score range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementDefinition {
    pub id: AchievementId,
    pub min_score: i64,
    pub max_score: i64,
    pub display_name: String,
    pub comment: String,
}

impl AchievementDefinition {
    pub fn new(
        id: AchievementId,
        min_score: i64,
        max_score: i64,
        display_name: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            id,
            min_score,
            max_score,
            display_name: display_name.into(),
            comment: comment.into(),
        }
    }

    /// Inclusive on both ends
    pub fn covers(&self, score: i64) -> bool {
        self.min_score <= score && score <= self.max_score
    }
}

/// Built-in achievement table, in evaluation order.
///
/// Exact-value achievements sit ahead of the broad bands so they are not
/// shadowed, except for Beginner's Luck which always claims the first roll.
pub fn default_definitions() -> Vec<AchievementDefinition> {
    use AchievementId::*;

    vec![
        AchievementDefinition::new(BeginnersLuck, 1, 100, "Beginner's Luck", "Your first achievement. Congratulations!"),
        AchievementDefinition::new(RockBottom, 1, 1, "Rock Bottom", "The lowest possible roll. Oddly, that is rare too."),
        AchievementDefinition::new(LuckySeven, 7, 7, "Lucky Seven", "Seven on the nose."),
        AchievementDefinition::new(RightOnAverage, 50, 50, "Right on Average", "Exactly the mean. Perfectly balanced."),
        AchievementDefinition::new(Jackpot, 777, 777, "Jackpot", "Triple sevens. Go buy a lottery ticket."),
        AchievementDefinition::new(TripleDigits, 100, 149, "Triple Digits", "Welcome to three digits."),
        AchievementDefinition::new(OneFifty, 150, 199, "One-Fifty Club", "Only about 1 in 20 rolls get this far."),
        AchievementDefinition::new(DoubleCentury, 200, 249, "Double Century", "Two hundred! The crowd goes wild."),
        AchievementDefinition::new(QuarterMillennium, 250, 299, "Quarter Millennium", "A quarter of the way to a thousand."),
        AchievementDefinition::new(ThreeHundred, 300, 349, "Three Hundred", "Rarer than 1 in 400."),
        AchievementDefinition::new(ThreeFifty, 350, 399, "Three-Fifty", "Past 1 in 1,000 territory."),
        AchievementDefinition::new(FourHundred, 400, 449, "Four Hundred", "Luck like this does not come twice."),
        AchievementDefinition::new(FourFifty, 450, 499, "Four-Fifty", "Knocking on the door of five hundred."),
        AchievementDefinition::new(FiveHundred, 500, 749, "Five Hundred", "Roughly 1 in 22,000. Unreal."),
        AchievementDefinition::new(SevenFifty, 750, 999, "Seven-Fifty", "Statistically, you should not be here."),
        AchievementDefinition::new(Millennium, 1000, i64::MAX, "Millennium", "A thousand. Nobody will believe you."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_string_roundtrip() {
        for id in AchievementId::all() {
            assert_eq!(AchievementId::from_str(id.as_str()), Some(*id));
        }
        assert_eq!(AchievementId::from_str("nope"), None);
    }

    #[test]
    fn test_default_table_covers_every_id_once() {
        let defs = default_definitions();
        assert_eq!(defs.len(), AchievementId::all().len());
        for (def, id) in defs.iter().zip(AchievementId::all()) {
            assert_eq!(def.id, *id);
            assert!(def.min_score <= def.max_score);
        }
    }

    #[test]
    fn test_serde_id_matches_as_str() {
        let json = serde_json::to_string(&AchievementId::QuarterMillennium).unwrap();
        assert_eq!(json, "\"quarter_millennium\"");
    }

    #[test]
    fn test_covers_is_inclusive() {
        let def = AchievementDefinition::new(AchievementId::TripleDigits, 100, 149, "x", "y");
        assert!(def.covers(100));
        assert!(def.covers(149));
        assert!(!def.covers(99));
        assert!(!def.covers(150));
    }
}
