use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entry::{round2, round3, SkillEntry};

/// Global aggregates derived from the full skill set. Recomputed after every
/// mutation; only the GitHub metric merge may move them independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    pub velocity: f64,
    pub consistency: f64,
    pub total_skills: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_score: Option<f64>,
}

impl Attributes {
    /// Recomputes every aggregate from scratch; deterministic in the skill set.
    ///
    /// Consistency collapses to 0 at a score standard deviation of 5+ points
    /// and is 1.0 by definition for a single skill.
    pub fn recalculate(skills: &BTreeMap<String, SkillEntry>) -> Self {
        if skills.is_empty() {
            return Self::default();
        }

        let n = skills.len() as f64;
        let avg_score = skills.values().map(|s| s.score).sum::<f64>() / n;
        let avg_velocity = skills.values().map(|s| s.velocity).sum::<f64>() / n;

        let consistency = if skills.len() == 1 {
            1.0
        } else {
            let variance = skills
                .values()
                .map(|s| (s.score - avg_score).powi(2))
                .sum::<f64>()
                / n;
            (1.0 - variance.sqrt() / 5.0).max(0.0)
        };

        Self {
            velocity: round3(avg_velocity),
            consistency: round3(consistency),
            total_skills: skills.len(),
            avg_score: Some(round2(avg_score)),
        }
    }

    /// One-way ratchet used by the GitHub connector: externally observed
    /// velocity and consistency can raise the aggregates, never lower them.
    pub fn merge_external(&mut self, velocity: f64, consistency: f64) {
        self.velocity = self.velocity.max(velocity);
        self.consistency = self.consistency.max(consistency);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn skills_with_scores(scores: &[f64]) -> BTreeMap<String, SkillEntry> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &score)| {
                (
                    format!("skill-{i}"),
                    SkillEntry {
                        score,
                        velocity: 0.2,
                        source: "test".to_string(),
                        last_update: Utc::now(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_set_zeroes_everything() {
        let attrs = Attributes::recalculate(&BTreeMap::new());
        assert_eq!(attrs.velocity, 0.0);
        assert_eq!(attrs.consistency, 0.0);
        assert_eq!(attrs.total_skills, 0);
        assert!(attrs.avg_score.is_none());
    }

    #[test]
    fn test_empty_set_omits_avg_score_in_json() {
        let json = serde_json::to_value(Attributes::recalculate(&BTreeMap::new())).unwrap();
        assert!(json.get("avg_score").is_none());
    }

    #[test]
    fn test_single_skill_consistency_is_one() {
        for score in [0.0, 3.7, 10.0] {
            let attrs = Attributes::recalculate(&skills_with_scores(&[score]));
            assert_eq!(attrs.consistency, 1.0, "score {score}");
            assert_eq!(attrs.total_skills, 1);
        }
    }

    #[test]
    fn test_identical_scores_give_full_consistency() {
        let attrs = Attributes::recalculate(&skills_with_scores(&[6.0, 6.0]));
        assert_eq!(attrs.consistency, 1.0);
        assert_eq!(attrs.avg_score, Some(6.0));
    }

    #[test]
    fn test_wide_dispersion_collapses_consistency() {
        // stddev of {0, 10} is 5 exactly, so 1 - 5/5 = 0
        let attrs = Attributes::recalculate(&skills_with_scores(&[0.0, 10.0]));
        assert_eq!(attrs.consistency, 0.0);
    }

    #[test]
    fn test_moderate_dispersion() {
        // scores {4, 6}: mean 5, population stddev 1, consistency 0.8
        let attrs = Attributes::recalculate(&skills_with_scores(&[4.0, 6.0]));
        assert_eq!(attrs.consistency, 0.8);
        assert_eq!(attrs.avg_score, Some(5.0));
    }

    #[test]
    fn test_velocity_is_mean_of_skill_velocities() {
        let mut skills = skills_with_scores(&[5.0, 5.0]);
        skills.get_mut("skill-0").unwrap().velocity = 0.4;
        skills.get_mut("skill-1").unwrap().velocity = 0.2;
        let attrs = Attributes::recalculate(&skills);
        assert_eq!(attrs.velocity, 0.3);
    }

    #[test]
    fn test_merge_external_only_raises() {
        let mut attrs = Attributes {
            velocity: 0.5,
            consistency: 0.7,
            total_skills: 3,
            avg_score: Some(4.0),
        };
        attrs.merge_external(0.3, 0.9);
        assert_eq!(attrs.velocity, 0.5);
        assert_eq!(attrs.consistency, 0.9);
        attrs.merge_external(0.8, 0.1);
        assert_eq!(attrs.velocity, 0.8);
        assert_eq!(attrs.consistency, 0.9);
    }
}
