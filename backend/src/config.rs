//! Recognized environment configuration. Read once at startup; nothing here
//! is re-read per request.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Presence enables worker-only mode. Absence means the gateway refuses
    /// every move request with `NO_WORKER_BINDING` rather than silently
    /// falling back to something weaker.
    pub worker_binding: bool,
    /// Emergency-only escape hatch; any use is logged as `emergency-fallback`.
    pub allow_fallback_main_thread: bool,
    pub internal_auth_token: Option<String>,
    pub database_url: Option<String>,
    pub stockfish_game_analysis_enabled: bool,
    pub canary_percentage: u8,
    pub admin_password: Option<String>,
    /// `host:port` the gateway binds to. Not named in spec.md §6's
    /// Configuration list, but every axum service in this corpus reads its
    /// bind address from the environment rather than hardcoding it.
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            worker_binding: env::var("WORKER_BINDING").is_ok(),
            allow_fallback_main_thread: env_flag("ALLOW_FALLBACK_MAIN_THREAD"),
            internal_auth_token: env::var("INTERNAL_AUTH_TOKEN").ok(),
            database_url: env::var("DATABASE_URL").ok(),
            stockfish_game_analysis_enabled: env_flag_default("STOCKFISH_GAME_ANALYSIS_ENABLED", true),
            canary_percentage: env::var("CANARY_PERCENTAGE")
                .ok()
                .and_then(|v| v.parse::<u8>().ok())
                .map(|v| v.min(100))
                .unwrap_or(0),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|v| v == "true").unwrap_or(false)
}

fn env_flag_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => v == "true",
        Err(_) => default,
    }
}
