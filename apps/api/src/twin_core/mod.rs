//! In-memory skill twin: per-skill score/velocity entries, derived global
//! aggregates, and a deterministic future projection.
//!
//! The core is synchronous, pure computation over in-memory structures. It
//! accepts any name and any numeric impact; validation of what the data
//! means belongs to the ingestion boundary.

mod attributes;
mod entry;
mod projection;

pub use attributes::Attributes;
pub use entry::{normalize_name, SkillEntry};
pub(crate) use entry::{round2, round3};
pub use projection::{Projection, SkillProjection};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_NAME: &str = "Guest";

/// The aggregate root: one per process, owned by the HTTP state and mutated
/// only through these methods. Every mutation recomputes the aggregates and
/// touches `last_updated`; a freshly constructed twin has no timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillTwin {
    pub name: String,
    pub skills: BTreeMap<String, SkillEntry>,
    pub attributes: Attributes,
    pub last_updated: Option<DateTime<Utc>>,
    pub resume_uploaded: bool,
    pub github_connected: bool,
}

impl Default for SkillTwin {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            skills: BTreeMap::new(),
            attributes: Attributes::default(),
            last_updated: None,
            resume_uploaded: false,
            github_connected: false,
        }
    }
}

impl SkillTwin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one (name, impact, source) signal and returns a snapshot of
    /// the resulting entry. Negative impact lowers the score and can drive
    /// velocity negative; repeated names merge into one entry.
    pub fn update_skill(&mut self, name: &str, impact: f64, source: &str) -> SkillEntry {
        let key = normalize_name(name);
        let now = Utc::now();
        let snapshot = match self.skills.get_mut(&key) {
            Some(entry) => {
                entry.apply(impact, source, now);
                entry.clone()
            }
            None => {
                let entry = SkillEntry::new(impact, source, now);
                self.skills.insert(key, entry.clone());
                entry
            }
        };
        self.recalculate();
        self.touch();
        snapshot
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
        self.touch();
    }

    /// Empties the skill map ahead of re-ingesting a resume. Name and the
    /// GitHub flag survive; `resume_uploaded` is cleared.
    pub fn clear_skills(&mut self) {
        self.skills.clear();
        self.resume_uploaded = false;
        self.recalculate();
        self.touch();
    }

    /// Wholesale replacement with construction defaults. The reset itself
    /// counts as an update, so `last_updated` is set rather than cleared.
    pub fn reset(&mut self) {
        *self = Self::default();
        self.touch();
    }

    pub fn set_resume_uploaded(&mut self, uploaded: bool) {
        self.resume_uploaded = uploaded;
        self.touch();
    }

    pub fn set_github_connected(&mut self, connected: bool) {
        self.github_connected = connected;
        self.touch();
    }

    /// Max-merges externally observed velocity/consistency into the
    /// aggregates. One-way: values can only go up.
    pub fn merge_external_metrics(&mut self, velocity: f64, consistency: f64) {
        self.attributes.merge_external(velocity, consistency);
        self.touch();
    }

    /// Read-only future projection over the current skill set.
    pub fn simulate_future(&self, months: i64) -> Projection {
        projection::simulate(self, months)
    }

    fn recalculate(&mut self) {
        self.attributes = Attributes::recalculate(&self.skills);
    }

    fn touch(&mut self) {
        self.last_updated = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_twin_defaults() {
        let twin = SkillTwin::new();
        assert_eq!(twin.name, "Guest");
        assert!(twin.skills.is_empty());
        assert_eq!(twin.attributes, Attributes::default());
        assert!(twin.last_updated.is_none());
        assert!(!twin.resume_uploaded);
        assert!(!twin.github_connected);
    }

    #[test]
    fn test_key_is_case_and_whitespace_insensitive() {
        let mut a = SkillTwin::new();
        let mut b = SkillTwin::new();
        a.update_skill("Python", 4.0, "resume");
        b.update_skill(" python ", 4.0, "resume");
        assert_eq!(a.skills, b.skills);

        a.update_skill("PYTHON", 2.0, "github");
        assert_eq!(a.skills.len(), 1);
        assert_eq!(a.skills["python"].score, 6.0);
    }

    #[test]
    fn test_update_recomputes_aggregates() {
        let mut twin = SkillTwin::new();
        twin.update_skill("python", 4.0, "resume");
        twin.update_skill("rust", 6.0, "resume");
        assert_eq!(twin.attributes.total_skills, 2);
        assert_eq!(twin.attributes.avg_score, Some(5.0));
        assert!(twin.last_updated.is_some());
    }

    #[test]
    fn test_update_returns_entry_snapshot() {
        let mut twin = SkillTwin::new();
        let entry = twin.update_skill("python", 4.0, "resume");
        assert_eq!(entry.score, 4.0);
        assert_eq!(entry.velocity, 0.4);
        assert_eq!(entry, twin.skills["python"]);
    }

    #[test]
    fn test_scores_stay_in_range_over_sequences() {
        let mut twin = SkillTwin::new();
        let impacts = [3.0, -8.0, 0.0, 15.0, 0.25, -0.5, 9.9];
        for (i, impact) in impacts.iter().enumerate() {
            twin.update_skill(if i % 2 == 0 { "a" } else { "b" }, *impact, "test");
        }
        for (name, entry) in &twin.skills {
            assert!(
                (0.0..=10.0).contains(&entry.score),
                "{name} score {} out of range",
                entry.score
            );
        }
    }

    #[test]
    fn test_reset_restores_exact_defaults() {
        let mut twin = SkillTwin::new();
        twin.set_name("Ada");
        twin.update_skill("python", 4.0, "resume");
        twin.set_resume_uploaded(true);
        twin.set_github_connected(true);
        twin.reset();

        assert_eq!(twin.name, "Guest");
        assert!(twin.skills.is_empty());
        assert_eq!(twin.attributes.velocity, 0.0);
        assert_eq!(twin.attributes.consistency, 0.0);
        assert_eq!(twin.attributes.total_skills, 0);
        assert!(twin.attributes.avg_score.is_none());
        assert!(!twin.resume_uploaded);
        assert!(!twin.github_connected);
        // Unlike construction, a reset records when it happened.
        assert!(twin.last_updated.is_some());
    }

    #[test]
    fn test_clear_skills_preserves_name_and_github_flag() {
        let mut twin = SkillTwin::new();
        twin.set_name("Ada");
        twin.update_skill("python", 4.0, "resume");
        twin.set_resume_uploaded(true);
        twin.set_github_connected(true);
        twin.clear_skills();

        assert_eq!(twin.name, "Ada");
        assert!(twin.github_connected);
        assert!(twin.skills.is_empty());
        assert!(!twin.resume_uploaded);
        assert_eq!(twin.attributes.total_skills, 0);
        assert!(twin.attributes.avg_score.is_none());
    }

    #[test]
    fn test_merge_external_metrics_ratchet() {
        let mut twin = SkillTwin::new();
        twin.merge_external_metrics(0.7, 0.4);
        assert_eq!(twin.attributes.velocity, 0.7);
        assert_eq!(twin.attributes.consistency, 0.4);
        twin.merge_external_metrics(0.2, 0.9);
        assert_eq!(twin.attributes.velocity, 0.7);
        assert_eq!(twin.attributes.consistency, 0.9);
    }

    #[test]
    fn test_state_serializes_without_avg_score_when_empty() {
        let json = serde_json::to_value(SkillTwin::new()).unwrap();
        assert_eq!(json["name"], "Guest");
        assert!(json["attributes"].get("avg_score").is_none());
        assert_eq!(json["last_updated"], serde_json::Value::Null);
    }
}
