use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default, so a missing .env is fine.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub main_backend_url: String,
    pub github_api_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8005".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            main_backend_url: env_or("MAIN_BACKEND_URL", "http://localhost:3000"),
            github_api_url: env_or("GITHUB_API_URL", "https://api.github.com"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
