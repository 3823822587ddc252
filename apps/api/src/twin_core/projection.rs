use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entry::{round2, round3, SkillEntry, MAX_SCORE};
use super::SkillTwin;

/// Amplification applied on top of the blended velocity. Deliberate
/// heuristic constant, not derived from data.
const GROWTH_FACTOR: f64 = 2.0;

/// Projected trajectory for a single skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillProjection {
    pub current_score: f64,
    pub future_score: f64,
    pub growth: f64,
    pub velocity_used: f64,
}

/// Full output of a future simulation, built from a twin snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projection {
    pub months_simulated: i64,
    pub current_skills: BTreeMap<String, SkillEntry>,
    pub future_skills: BTreeMap<String, SkillProjection>,
    pub prediction_confidence: f64,
}

/// Projects every skill `months` ahead of now. Read-only over the twin.
///
/// The range check on `months` lives at the HTTP boundary; out-of-range
/// values degrade to zero or negative growth rather than failing here.
pub fn simulate(twin: &SkillTwin, months: i64) -> Projection {
    let horizon = months as f64 / 12.0;
    let global_velocity = twin.attributes.velocity;

    let future_skills = twin
        .skills
        .iter()
        .map(|(name, entry)| {
            let combined = (global_velocity + entry.velocity) / 2.0;
            let raw_growth = combined * horizon * GROWTH_FACTOR;
            let future = (entry.score + raw_growth).min(MAX_SCORE);
            let projection = SkillProjection {
                current_score: round2(entry.score),
                future_score: round2(future),
                // Post-clamp delta: reads lower than raw growth at the ceiling.
                growth: round2(future - entry.score),
                velocity_used: round3(combined),
            };
            (name.clone(), projection)
        })
        .collect();

    let confidence = (0.5 + twin.skills.len() as f64 * 0.05).min(0.95);

    Projection {
        months_simulated: months,
        current_skills: twin.skills.clone(),
        future_skills,
        prediction_confidence: round3(confidence),
    }
}
