//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change the default audit store, only edit this file.

/// Default audit store URL
///
/// This is the fallback URL when no environment variable is set.
/// The API itself is mounted under `/api/v1` on this origin.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default HTTP request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default dashboard refresh interval (seconds)
pub const DEFAULT_REFRESH_INTERVAL: u64 = 30;

/// Number of high-risk decisions shown on the dashboard
pub const DEFAULT_HIGH_RISK_LIMIT: u32 = 5;

/// Versioned API prefix on the audit store
pub const API_PREFIX: &str = "/api/v1";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Decision Audit Console";

// ============================================
// Environment variable names
// ============================================

pub const ENV_API_URL: &str = "AUDIT_API_URL";
pub const ENV_TIMEOUT: &str = "AUDIT_API_TIMEOUT_SECS";
pub const ENV_REFRESH_INTERVAL: &str = "DASHBOARD_REFRESH_SECS";
pub const ENV_HIGH_RISK_LIMIT: &str = "DASHBOARD_HIGH_RISK_LIMIT";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get audit store URL from environment or use default
pub fn get_api_url() -> String {
    std::env::var(ENV_API_URL)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Get request timeout from environment or use default
pub fn get_timeout_secs() -> u64 {
    parse_env_or(ENV_TIMEOUT, DEFAULT_TIMEOUT_SECS)
}

/// Get dashboard refresh interval from environment or use default
pub fn get_refresh_interval() -> u64 {
    parse_env_or(ENV_REFRESH_INTERVAL, DEFAULT_REFRESH_INTERVAL)
}

/// Get dashboard high-risk list size from environment or use default
pub fn get_high_risk_limit() -> u32 {
    parse_env_or(ENV_HIGH_RISK_LIMIT, DEFAULT_HIGH_RISK_LIMIT)
}

fn parse_env_or<T: std::str::FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("Ignoring invalid {}={:?}, using {}", name, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}
