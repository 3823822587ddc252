use std::sync::Arc;

use tokio::sync::RwLock;

use crate::ingest::github::GithubFetcher;
use crate::ingest::mainapp::ProfileFetcher;
use crate::twin_core::SkillTwin;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// The twin is a single process-wide instance behind an RwLock: mutating
/// handlers take the write lock around their whole read-modify-write batch,
/// which keeps skill updates sequential across concurrent requests. The
/// connectors are trait objects so tests can swap in stubs.
#[derive(Clone)]
pub struct AppState {
    pub twin: Arc<RwLock<SkillTwin>>,
    pub github: Arc<dyn GithubFetcher>,
    pub main_app: Arc<dyn ProfileFetcher>,
}
