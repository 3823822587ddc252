//! Main-backend profile sync. The upstream payload is loosely typed
//! (camelCase keys, optional everything, `languages` as either a map or a
//! list), so it is decoded defensively here and flattened into canonical
//! signals before the core ever sees it.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::errors::AppError;
use crate::ingest::SkillSignal;

/// Impact attached to every certificate, regardless of platform.
const CERTIFICATE_IMPACT: f64 = 3.0;
/// Impact per language found on a profile-linked repo.
const LANGUAGE_IMPACT: f64 = 1.0;

#[derive(Debug, Deserialize)]
pub struct ProfileEnvelope {
    #[serde(default)]
    pub success: bool,
    pub data: Option<Profile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub user: Option<ProfileUser>,
    pub derived_skills: Vec<DerivedSkill>,
    pub certificates: Vec<Certificate>,
    pub github_repos: Vec<ProfileRepo>,
    pub resume: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUser {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DerivedSkill {
    pub name: String,
    pub confidence: f64,
    pub source: String,
}

impl Default for DerivedSkill {
    fn default() -> Self {
        Self {
            name: "unknown".to_string(),
            confidence: 0.5,
            source: "main-app".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Certificate {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileRepo {
    pub languages: Languages,
}

/// Repo languages arrive as a map (legacy payloads) or a plain list.
/// List elements may be arbitrary JSON; non-strings are skipped.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Languages {
    Map(BTreeMap<String, Value>),
    List(Vec<Value>),
}

impl Default for Languages {
    fn default() -> Self {
        Languages::List(Vec::new())
    }
}

impl Languages {
    pub fn names(&self) -> Vec<String> {
        match self {
            Languages::Map(map) => map.keys().cloned().collect(),
            Languages::List(list) => list
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
        }
    }
}

impl Profile {
    /// Display name for the twin; falls back when the profile has none.
    pub fn display_name(&self) -> String {
        self.user
            .as_ref()
            .and_then(|u| u.name.clone())
            .unwrap_or_else(|| "Applicant".to_string())
    }

    /// Flattens the profile into canonical signals: derived skills scaled
    /// from 0-1 confidence to 0-10 impact, certificates at a flat impact
    /// under their first two words, and one unit per repo language.
    pub fn signals(&self) -> Vec<SkillSignal> {
        let mut signals = Vec::new();

        for skill in &self.derived_skills {
            signals.push(SkillSignal::new(
                skill.name.clone(),
                skill.confidence * 10.0,
                skill.source.clone(),
            ));
        }

        for certificate in &self.certificates {
            if certificate.name.is_empty() {
                continue;
            }
            let short_name = certificate
                .name
                .split_whitespace()
                .take(2)
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();
            signals.push(SkillSignal::new(
                short_name,
                CERTIFICATE_IMPACT,
                "certificate",
            ));
        }

        for repo in &self.github_repos {
            for language in repo.languages.names() {
                signals.push(SkillSignal::new(
                    language.to_lowercase(),
                    LANGUAGE_IMPACT,
                    "github",
                ));
            }
        }

        signals
    }
}

/// Fetches the applicant profile from the main backend. Trait seam so route
/// tests can stub the network out.
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    async fn fetch(&self, token: &str) -> Result<Profile, AppError>;
}

/// Real connector against the main Node.js backend.
pub struct MainAppClient {
    http: reqwest::Client,
    base_url: String,
}

impl MainAppClient {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }
}

#[async_trait]
impl ProfileFetcher for MainAppClient {
    async fn fetch(&self, token: &str) -> Result<Profile, AppError> {
        let response = self
            .http
            .get(format!("{}/api/applicant/profile", self.base_url))
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Unauthorized(
                "Failed to fetch profile. Check auth token.".to_string(),
            ));
        }

        let envelope: ProfileEnvelope = response.json().await?;
        if !envelope.success {
            return Err(AppError::Validation(
                "Profile not found. Create profile first.".to_string(),
            ));
        }

        let profile = envelope.data.unwrap_or_default();
        debug!(
            "Fetched profile: {} derived skills, {} certificates, {} repos",
            profile.derived_skills.len(),
            profile.certificates.len(),
            profile.github_repos.len()
        );
        Ok(profile)
    }
}
