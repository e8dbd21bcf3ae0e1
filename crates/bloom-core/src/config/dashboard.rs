//! Dashboard link configuration.

use serde::{Deserialize, Serialize};

/// Where issued tokens are sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Dashboard base URL, without the `/dashboard` path.
    #[serde(default = "default_url")]
    pub url: String,

    /// Environment variable overriding `url`.
    #[serde(default = "default_url_env")]
    pub url_env: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            url_env: default_url_env(),
        }
    }
}

impl DashboardConfig {
    /// Resolve the base URL, preferring the environment override.
    pub fn resolve_url(&self) -> String {
        let url = self
            .url_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.url.clone());
        url.trim_end_matches('/').to_string()
    }
}

fn default_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_url_env() -> Option<String> {
    Some("DASHBOARD_URL".to_string())
}
