use std::env;

/// User agent sent to every upstream service.
pub const USER_AGENT: &str = "HQ-Dashboard";

/// Process configuration, read once at startup and owned by the application
/// state rather than living in a global.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret gating the location endpoints.
    pub location_token: String,
    pub nominatim_url: String,
    pub github_api_url: String,
    pub github_user: String,
    pub gateway_url: String,
    pub gateway_token: String,
}

impl Config {
    pub fn from_env() -> Config {
        Config {
            location_token: env::var("LOCATION_TOKEN")
                .unwrap_or_else(|_| "molt-location-2026".to_string()),
            nominatim_url: env::var("NOMINATIM_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            github_api_url: env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
            github_user: env::var("GITHUB_USER")
                .unwrap_or_else(|_| "e-salvador13".to_string()),
            gateway_url: env::var("CLAWDBOT_GATEWAY_URL")
                .unwrap_or_else(|_| "http://localhost:18789".to_string()),
            gateway_token: env::var("CLAWDBOT_TOKEN").unwrap_or_default(),
        }
    }
}
