use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scores saturate at this ceiling and never go below zero.
pub const MAX_SCORE: f64 = 10.0;

/// One tracked skill. Keyed in the twin's map by its normalized name;
/// never deleted individually, only wholesale cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub score: f64,
    pub velocity: f64,
    pub source: String,
    pub last_update: DateTime<Utc>,
}

/// Normalizes a raw skill name into its storage/lookup key.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub(crate) fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

impl SkillEntry {
    /// First observation of a skill.
    pub fn new(impact: f64, source: &str, now: DateTime<Utc>) -> Self {
        Self {
            score: round2(impact.clamp(0.0, MAX_SCORE)),
            velocity: round3(impact * 0.1),
            source: source.to_string(),
            last_update: now,
        }
    }

    /// Applies a repeat observation in place.
    ///
    /// Velocity is the realized score delta over `max(1, impact)`: the
    /// denominator floor keeps sub-unit impacts from inflating the rate.
    /// Source and timestamp are overwritten; no history is kept.
    pub fn apply(&mut self, impact: f64, source: &str, now: DateTime<Utc>) {
        let old = self.score;
        let new = (old + impact).clamp(0.0, MAX_SCORE);
        self.velocity = round3((new - old) / impact.max(1.0));
        self.score = round2(new);
        self.source = source.to_string();
        self.last_update = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_impact_four() {
        let entry = SkillEntry::new(4.0, "resume", Utc::now());
        assert_eq!(entry.score, 4.0);
        assert_eq!(entry.velocity, 0.4);
        assert_eq!(entry.source, "resume");
    }

    #[test]
    fn test_new_entry_clamps_to_ceiling() {
        let entry = SkillEntry::new(25.0, "resume", Utc::now());
        assert_eq!(entry.score, 10.0);
    }

    #[test]
    fn test_update_clamps_at_ten() {
        let mut entry = SkillEntry::new(8.0, "resume", Utc::now());
        entry.apply(5.0, "github", Utc::now());
        // 8 + 5 saturates at 10; velocity = (10 - 8) / max(1, 5)
        assert_eq!(entry.score, 10.0);
        assert_eq!(entry.velocity, 0.4);
        assert_eq!(entry.source, "github");
    }

    #[test]
    fn test_velocity_denominator_floors_at_one() {
        let mut entry = SkillEntry::new(3.0, "resume", Utc::now());
        entry.apply(0.5, "resume", Utc::now());
        // (3.5 - 3.0) / max(1, 0.5) = 0.5
        assert_eq!(entry.score, 3.5);
        assert_eq!(entry.velocity, 0.5);
    }

    #[test]
    fn test_negative_impact_lowers_score_and_velocity() {
        let mut entry = SkillEntry::new(4.0, "resume", Utc::now());
        entry.apply(-2.0, "resume", Utc::now());
        assert_eq!(entry.score, 2.0);
        assert_eq!(entry.velocity, -2.0);
    }

    #[test]
    fn test_score_never_leaves_range() {
        let mut entry = SkillEntry::new(4.0, "resume", Utc::now());
        for impact in [7.0, -30.0, 2.5, 100.0, -0.1] {
            entry.apply(impact, "resume", Utc::now());
            assert!(
                (0.0..=10.0).contains(&entry.score),
                "score {} out of range after impact {impact}",
                entry.score
            );
        }
    }

    #[test]
    fn test_normalize_name_folds_case_and_whitespace() {
        assert_eq!(normalize_name("  Python "), "python");
        assert_eq!(normalize_name("C++"), "c++");
    }
}
