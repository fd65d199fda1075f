//! Application configuration
//! Mission: Read server settings from the environment (and `.env`)

use anyhow::{Context, Result};
use chrono::Duration;
use std::env;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_REVIEWS_FILE: &str = "reviews.json";
pub const DEFAULT_BESTIARY_FILE: &str = "bestiary.json";
const DEV_SESSION_SECRET: &str = "dev-secret-change-in-production-minimum-32-characters";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub reviews_path: PathBuf,
    pub bestiary_path: PathBuf,
    pub session_secret: String,
    pub session_ttl: Duration,
    pub session_prune_interval_secs: u64,
    pub identity_table_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("Invalid PORT")?;

        let data_dir = env::var("DATA_DIR").ok();
        let reviews_path = resolve_data_path(
            data_dir.as_deref(),
            env::var("REVIEWS_PATH").ok(),
            DEFAULT_REVIEWS_FILE,
        );
        let bestiary_path = resolve_data_path(
            data_dir.as_deref(),
            env::var("BESTIARY_PATH").ok(),
            DEFAULT_BESTIARY_FILE,
        );

        let session_secret = match env::var("SESSION_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ => {
                warn!("⚠️  SESSION_SECRET not set, using the development secret");
                DEV_SESSION_SECRET.to_string()
            }
        };

        let session_ttl_hours = env::var("SESSION_TTL_HOURS")
            .ok()
            .map(|v| v.parse::<i64>())
            .transpose()
            .context("Invalid SESSION_TTL_HOURS")?
            .filter(|&h| h > 0)
            .unwrap_or(24);

        let session_prune_interval_secs = env::var("SESSION_PRUNE_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(300);

        let identity_table_path = env::var("IDENTITY_TABLE_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            bind_addr,
            port,
            reviews_path,
            bestiary_path,
            session_secret,
            session_ttl: Duration::hours(session_ttl_hours),
            session_prune_interval_secs,
            identity_table_path,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// Pick a collection file path: an explicit value wins, relative paths sit
/// under `data_dir` when one is configured.
pub fn resolve_data_path(
    data_dir: Option<&str>,
    env_value: Option<String>,
    default_filename: &str,
) -> PathBuf {
    let raw = env_value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default_filename.to_string());

    let p = PathBuf::from(raw);
    match data_dir.filter(|d| !d.trim().is_empty()) {
        Some(dir) if p.is_relative() => Path::new(dir).join(p),
        _ => p,
    }
}

/// Load `.env` from the working directory or its parents, then the crate directory.
pub fn load_env() {
    let _ = dotenv::dotenv();

    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}
