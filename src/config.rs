use std::env;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
const DEFAULT_SITE_URL: &str = "http://localhost:5173";

/// Runtime configuration loaded from environment, with local-development
/// fallbacks.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base: String,
    pub site_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let api_base = env::var("VOTEHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let site_url = env::var("VOTEHUB_SITE_URL").unwrap_or_else(|_| DEFAULT_SITE_URL.into());
        Self {
            api_base: normalize_base(api_base),
            site_url,
        }
    }
}

fn normalize_base(raw: String) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
