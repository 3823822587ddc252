//! Resume scanner: extracts text from an uploaded PDF and matches it
//! against a fixed skill table, producing weighted hit-count signals.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::errors::AppError;
use crate::ingest::SkillSignal;
use crate::twin_core::round2;

/// Skill keyword table: (name, category, weight). The weight scales the
/// mention-count score; niche or low-signal terms carry less.
const SKILL_TABLE: &[(&str, &str, f64)] = &[
    // Programming languages
    ("python", "language", 1.0),
    ("javascript", "language", 1.0),
    ("typescript", "language", 1.0),
    ("java", "language", 1.0),
    ("c++", "language", 0.9),
    ("c#", "language", 0.9),
    ("go", "language", 0.9),
    ("rust", "language", 0.9),
    ("ruby", "language", 0.8),
    ("php", "language", 0.7),
    ("swift", "language", 0.9),
    ("kotlin", "language", 0.9),
    ("scala", "language", 0.8),
    ("r", "language", 0.8),
    // Frontend
    ("react", "frontend", 1.0),
    ("angular", "frontend", 0.9),
    ("vue", "frontend", 0.9),
    ("nextjs", "frontend", 1.0),
    ("next.js", "frontend", 1.0),
    ("html", "frontend", 0.5),
    ("css", "frontend", 0.5),
    ("tailwind", "frontend", 0.8),
    ("sass", "frontend", 0.6),
    // Backend
    ("node", "backend", 1.0),
    ("nodejs", "backend", 1.0),
    ("express", "backend", 0.9),
    ("fastapi", "backend", 0.9),
    ("django", "backend", 0.9),
    ("flask", "backend", 0.8),
    ("spring", "backend", 0.9),
    ("graphql", "backend", 0.8),
    ("rest", "backend", 0.7),
    // Cloud & DevOps
    ("aws", "cloud", 1.0),
    ("azure", "cloud", 1.0),
    ("gcp", "cloud", 1.0),
    ("docker", "devops", 1.0),
    ("kubernetes", "devops", 1.0),
    ("k8s", "devops", 1.0),
    ("terraform", "devops", 0.9),
    ("jenkins", "devops", 0.8),
    ("github actions", "devops", 0.8),
    ("ci/cd", "devops", 0.8),
    // Databases
    ("postgresql", "database", 0.9),
    ("mysql", "database", 0.8),
    ("mongodb", "database", 0.9),
    ("redis", "database", 0.8),
    ("elasticsearch", "database", 0.8),
    ("sql", "database", 0.7),
    ("nosql", "database", 0.7),
    // AI/ML
    ("machine learning", "ai", 1.0),
    ("deep learning", "ai", 1.0),
    ("tensorflow", "ai", 1.0),
    ("pytorch", "ai", 1.0),
    ("keras", "ai", 0.9),
    ("scikit-learn", "ai", 0.9),
    ("nlp", "ai", 0.9),
    ("computer vision", "ai", 0.9),
    ("neural network", "ai", 0.9),
    ("llm", "ai", 1.0),
    ("gpt", "ai", 0.9),
    ("openai", "ai", 0.9),
    ("langchain", "ai", 0.9),
    // Data
    ("pandas", "data", 0.8),
    ("numpy", "data", 0.8),
    ("spark", "data", 0.9),
    ("hadoop", "data", 0.8),
    ("data analysis", "data", 0.8),
    ("data science", "data", 1.0),
    // Tools
    ("git", "tool", 0.6),
    ("linux", "tool", 0.7),
    ("agile", "tool", 0.6),
    ("scrum", "tool", 0.6),
];

/// One matched skill in a scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillHit {
    pub score: f64,
    pub category: &'static str,
    pub mentions: u32,
}

/// Result of scanning one resume's text.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub skills: BTreeMap<String, SkillHit>,
    pub total_found: usize,
    pub text_length: usize,
}

impl ScanReport {
    /// Flattens the matched skills into canonical signals for the twin.
    pub fn signals(&self) -> Vec<SkillSignal> {
        self.skills
            .iter()
            .map(|(name, hit)| SkillSignal::new(name.clone(), hit.score, "resume"))
            .collect()
    }
}

/// Extracts text from PDF bytes and scans it for known skills.
pub fn scan_pdf(data: &[u8]) -> Result<ScanReport, AppError> {
    let text = pdf_extract::extract_text_from_mem(data)
        .map_err(|e| AppError::UnprocessableEntity(format!("Failed to parse resume PDF: {e}")))?;
    Ok(scan_text(&text))
}

/// Scans free text against the skill table. Matching is case-insensitive
/// and whole-word: a hit's neighbors must be non-alphanumeric, so "java"
/// does not fire inside "javascript" while "c++" and "c#" still match.
pub fn scan_text(text: &str) -> ScanReport {
    let haystack = text.to_lowercase();
    let mut skills = BTreeMap::new();

    for &(name, category, weight) in SKILL_TABLE {
        let mentions = count_word_mentions(&haystack, name);
        if mentions == 0 {
            continue;
        }
        // Base 0.5 plus a bonus for repeated mentions, capped at +1.5.
        let base = 0.5 + (mentions as f64 * 0.25).min(1.5);
        let score = round2(base * weight);
        skills.insert(
            name.to_string(),
            SkillHit {
                score,
                category,
                mentions,
            },
        );
    }

    debug!(
        "Resume scan matched {} skills over {} chars",
        skills.len(),
        haystack.len()
    );

    ScanReport {
        total_found: skills.len(),
        text_length: text.len(),
        skills,
    }
}

fn count_word_mentions(haystack: &str, needle: &str) -> u32 {
    let mut count = 0;
    for (pos, _) in haystack.match_indices(needle) {
        let before_ok = haystack[..pos]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[pos + needle.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            count += 1;
        }
    }
    count
}
