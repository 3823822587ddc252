//! GitHub connector: fetches a public profile and its repositories, then
//! distills them into verified skill signals plus velocity/consistency
//! metrics for the twin's max-merge ratchet.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::ingest::SkillSignal;
use crate::twin_core::{round2, round3};

const USER_AGENT: &str = "SkillTwin-App";
/// Languages whose skill name differs from the language name itself.
const LANGUAGE_SKILL_ALIASES: &[(&str, &str)] = &[
    ("shell", "linux"),
    ("dockerfile", "docker"),
    ("hcl", "terraform"),
];

#[derive(Debug, Clone, Deserialize)]
pub struct GithubUser {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
    #[serde(default)]
    pub public_repos: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubRepo {
    pub name: String,
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub forks_count: u32,
    pub pushed_at: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GithubProfile {
    pub name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub followers: u32,
    pub following: u32,
    pub public_repos: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GithubMetrics {
    pub velocity_score: f64,
    pub consistency_score: f64,
    pub total_stars: u32,
    pub total_forks: u32,
}

/// A skill backed by actual repository usage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifiedSkill {
    pub score: f64,
    pub repo_count: u32,
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RepoSummary {
    pub name: String,
    pub language: Option<String>,
    pub stars: u32,
    pub url: Option<String>,
}

/// Everything the handler needs from one GitHub fetch.
#[derive(Debug, Clone, Serialize)]
pub struct GithubReport {
    pub username: String,
    pub profile: GithubProfile,
    pub metrics: GithubMetrics,
    pub languages: BTreeMap<String, u32>,
    pub verified_skills: BTreeMap<String, VerifiedSkill>,
    pub recent_repos: Vec<RepoSummary>,
}

impl GithubReport {
    /// Flattens verified skills into canonical signals for the twin.
    pub fn signals(&self) -> Vec<SkillSignal> {
        self.verified_skills
            .iter()
            .map(|(name, skill)| SkillSignal::new(name.clone(), skill.score, "github"))
            .collect()
    }
}

/// Fetches GitHub data for a username. Trait seam so route tests can stub
/// the network out.
#[async_trait]
pub trait GithubFetcher: Send + Sync {
    async fn fetch(&self, username: &str, token: Option<&str>) -> Result<GithubReport, AppError>;
}

/// Real connector against the GitHub REST API (v3). Base URL is
/// configurable so integration setups can point it at a mock.
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
}

impl GithubClient {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    fn get(&self, path: &str, token: Option<&str>) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .get(format!("{}{path}", self.base_url))
            .header(header::ACCEPT, "application/vnd.github.v3+json")
            .header(header::USER_AGENT, USER_AGENT);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("token {token}"));
        }
        request
    }
}

#[async_trait]
impl GithubFetcher for GithubClient {
    async fn fetch(&self, username: &str, token: Option<&str>) -> Result<GithubReport, AppError> {
        let response = self.get(&format!("/users/{username}"), token).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!(
                "GitHub user '{username}' not found"
            )));
        }
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "GitHub API returned {status} for user '{username}'"
            )));
        }
        let user: GithubUser = response.json().await?;

        // Repo listing failures degrade to an empty list rather than aborting
        // the connect; the profile alone still carries signal.
        let response = self
            .get(
                &format!("/users/{username}/repos?per_page=100&sort=updated"),
                token,
            )
            .send()
            .await?;
        let repos: Vec<GithubRepo> = if response.status().is_success() {
            response.json().await?
        } else {
            debug!(
                "GitHub repo listing for '{username}' returned {}",
                response.status()
            );
            Vec::new()
        };

        Ok(build_report(username, user, repos))
    }
}

/// Pure assembly of the report from already-fetched payloads.
pub fn build_report(username: &str, user: GithubUser, repos: Vec<GithubRepo>) -> GithubReport {
    let metrics = compute_metrics(user.public_repos, &repos);
    let languages = language_histogram(&repos);
    let verified_skills = verify_skills(&languages);

    let recent_repos = repos
        .iter()
        .filter(|r| r.pushed_at.is_some())
        .take(10)
        .map(|r| RepoSummary {
            name: r.name.clone(),
            language: r.language.clone(),
            stars: r.stargazers_count,
            url: r.html_url.clone(),
        })
        .collect();

    GithubReport {
        username: username.to_string(),
        profile: GithubProfile {
            name: user.name.unwrap_or_else(|| username.to_string()),
            avatar: user.avatar_url,
            bio: user.bio,
            followers: user.followers,
            following: user.following,
            public_repos: user.public_repos,
        },
        metrics,
        languages,
        verified_skills,
        recent_repos,
    }
}

/// Velocity measures output volume (repo count); consistency measures
/// impact (stars and forks). Both land in [0, 1].
pub fn compute_metrics(public_repos: u32, repos: &[GithubRepo]) -> GithubMetrics {
    let total_stars: u32 = repos.iter().map(|r| r.stargazers_count).sum();
    let total_forks: u32 = repos.iter().map(|r| r.forks_count).sum();

    let velocity_score = (public_repos as f64 / 10.0).min(1.0);
    let star_factor = (total_stars as f64 / 5.0).min(1.0);
    let fork_factor = (total_forks as f64 / 3.0).min(1.0);
    let consistency_score = (star_factor + fork_factor) / 2.0;

    GithubMetrics {
        velocity_score: round3(velocity_score),
        consistency_score: round3(consistency_score),
        total_stars,
        total_forks,
    }
}

/// Counts repos per primary language, case-folded.
pub fn language_histogram(repos: &[GithubRepo]) -> BTreeMap<String, u32> {
    let mut histogram = BTreeMap::new();
    for repo in repos {
        if let Some(language) = &repo.language {
            *histogram.entry(language.to_lowercase()).or_insert(0) += 1;
        }
    }
    histogram
}

/// Maps the language histogram to verified skills: base 0.5 plus 0.3 per
/// repo, capped at 3.0.
pub fn verify_skills(languages: &BTreeMap<String, u32>) -> BTreeMap<String, VerifiedSkill> {
    languages
        .iter()
        .map(|(language, &count)| {
            let name = LANGUAGE_SKILL_ALIASES
                .iter()
                .find(|&&(lang, _)| lang == language.as_str())
                .map(|&(_, skill)| skill.to_string())
                .unwrap_or_else(|| language.clone());
            let score = round2((0.5 + count as f64 * 0.3).min(3.0));
            (
                name,
                VerifiedSkill {
                    score,
                    repo_count: count,
                    verified: true,
                },
            )
        })
        .collect()
}
