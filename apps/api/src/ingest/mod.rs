//! Ingestion sources. Every source is flattened into `SkillSignal` triples
//! before the core sees it, so upstream payload quirks stay out here.

pub mod github;
pub mod mainapp;
pub mod resume;

/// Canonical (name, impact, source) triple fed to the twin.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillSignal {
    pub name: String,
    pub impact: f64,
    pub source: String,
}

impl SkillSignal {
    pub fn new(name: impl Into<String>, impact: f64, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            impact,
            source: source.into(),
        }
    }
}
