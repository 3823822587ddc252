//! Twin API handlers. Each mutating handler takes the write lock once,
//! around its whole batch of core mutations, and responds with the
//! original-style `{"success": true, ...}` envelope plus a state snapshot.

use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::ingest::resume;
use crate::state::AppState;
use crate::twin_core::SkillTwin;

#[derive(Debug, Deserialize)]
pub struct GithubRequest {
    pub username: String,
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    #[serde(default = "default_months")]
    pub months: i64,
}

fn default_months() -> i64 {
    12
}

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub token: String,
}

/// GET /api/state
pub async fn handle_get_state(State(state): State<AppState>) -> Json<SkillTwin> {
    Json(state.twin.read().await.clone())
}

/// POST /api/upload_resume
/// Multipart PDF upload. Clears the existing skill set before re-ingesting.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart upload: {e}")))?
        .ok_or_else(|| AppError::Validation("No file in upload".to_string()))?;

    let filename = field.file_name().unwrap_or_default().to_string();
    if !filename.to_lowercase().ends_with(".pdf") {
        return Err(AppError::Validation(
            "Only PDF files are allowed".to_string(),
        ));
    }

    let data: Bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

    let report = resume::scan_pdf(&data)?;
    info!(
        "Resume '{filename}' scanned: {} skills matched",
        report.total_found
    );

    let snapshot = {
        let mut twin = state.twin.write().await;
        twin.clear_skills();
        for signal in report.signals() {
            twin.update_skill(&signal.name, signal.impact, &signal.source);
        }
        twin.set_resume_uploaded(true);
        twin.clone()
    };

    Ok(Json(json!({
        "success": true,
        "message": format!("Extracted {} skills from resume", report.total_found),
        "skills_found": report.skills,
        "twin_state": snapshot,
    })))
}

/// POST /api/connect_github
pub async fn handle_connect_github(
    State(state): State<AppState>,
    Json(request): Json<GithubRequest>,
) -> Result<Json<Value>, AppError> {
    let report = state
        .github
        .fetch(&request.username, request.token.as_deref())
        .await?;
    info!(
        "GitHub connect for '{}': {} verified skills",
        request.username,
        report.verified_skills.len()
    );

    let snapshot = {
        let mut twin = state.twin.write().await;
        twin.set_name(&report.profile.name);
        for signal in report.signals() {
            twin.update_skill(&signal.name, signal.impact, &signal.source);
        }
        twin.merge_external_metrics(
            report.metrics.velocity_score,
            report.metrics.consistency_score,
        );
        twin.set_github_connected(true);
        twin.clone()
    };

    Ok(Json(json!({
        "success": true,
        "message": format!("Connected as {}", report.profile.name),
        "github_data": report,
        "twin_state": snapshot,
    })))
}

/// POST /api/sync_from_main_app
/// Replaces the whole twin with data fetched from the main backend.
pub async fn handle_sync_from_main_app(
    State(state): State<AppState>,
    Json(request): Json<SyncRequest>,
) -> Result<Json<Value>, AppError> {
    if request.token.is_empty() {
        return Err(AppError::Validation("Auth token required".to_string()));
    }

    let profile = state.main_app.fetch(&request.token).await?;
    let name = profile.display_name();
    let signals = profile.signals();
    info!("Main-app sync for '{name}': {} signals", signals.len());

    let snapshot = {
        let mut twin = state.twin.write().await;
        twin.reset();
        twin.set_name(&name);
        for signal in &signals {
            twin.update_skill(&signal.name, signal.impact, &signal.source);
        }
        twin.set_resume_uploaded(profile.resume.is_some());
        twin.set_github_connected(!profile.github_repos.is_empty());
        twin.clone()
    };

    Ok(Json(json!({
        "success": true,
        "message": format!("Synced data for {name}"),
        "synced": {
            "skills": profile.derived_skills.len(),
            "certificates": profile.certificates.len(),
            "github_repos": profile.github_repos.len(),
        },
        "twin_state": snapshot,
    })))
}

/// POST /api/simulate
/// The [1, 120] month range is enforced here; the engine itself accepts
/// anything and just degrades.
pub async fn handle_simulate(
    State(state): State<AppState>,
    Json(request): Json<SimulateRequest>,
) -> Result<Json<Value>, AppError> {
    if !(1..=120).contains(&request.months) {
        return Err(AppError::Validation(
            "Months must be between 1 and 120".to_string(),
        ));
    }

    let twin = state.twin.read().await;
    let simulation = twin.simulate_future(request.months);

    Ok(Json(json!({
        "success": true,
        "simulation": simulation,
        "current_state": twin.clone(),
    })))
}

/// POST /api/reset
pub async fn handle_reset(State(state): State<AppState>) -> Json<Value> {
    let snapshot = {
        let mut twin = state.twin.write().await;
        twin.reset();
        twin.clone()
    };

    Json(json!({
        "success": true,
        "message": "Twin reset to initial state",
        "twin_state": snapshot,
    }))
}

/// POST /api/set_name
pub async fn handle_set_name(
    State(state): State<AppState>,
    Json(request): Json<NameRequest>,
) -> Json<Value> {
    let snapshot = {
        let mut twin = state.twin.write().await;
        twin.set_name(&request.name);
        twin.clone()
    };

    Json(json!({
        "success": true,
        "message": format!("Name set to {}", request.name),
        "twin_state": snapshot,
    }))
}
