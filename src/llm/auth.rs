//! Copilot token exchange.
//!
//! A plain GitHub token (env var or config) is exchanged for a
//! short-lived Copilot bearer token, which is cached on disk and reused
//! until shortly before expiry. The interactive device flow is out of
//! scope; supplying the GitHub token is the user's job.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

const COPILOT_TOKEN_URL: &str = "https://api.github.com/copilot_internal/v2/token";
const EDITOR_VERSION: &str = "vscode/1.95.0";
const EDITOR_PLUGIN_VERSION: &str = "copilot-chat/0.26.7";
const USER_AGENT: &str = "GitHubCopilotChat/0.26.7";

/// Refresh this long before the advertised expiry.
const EXPIRY_MARGIN_SECS: u64 = 300;

#[derive(Debug, Serialize, Deserialize)]
struct ApiKey {
    token: String,
    #[serde(default)]
    expires_at: u64,
}

impl ApiKey {
    fn is_expired(&self, now_secs: u64) -> bool {
        now_secs + EXPIRY_MARGIN_SECS >= self.expires_at
    }
}

/// Return `~/.config/prbot/api-key.json`
fn cache_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("prbot").join("api-key.json"))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn load_cached() -> Option<ApiKey> {
    let path = cache_path()?;
    let data = fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}

fn save_cached(key: &ApiKey) {
    let Some(path) = cache_path() else { return };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    if let Ok(data) = serde_json::to_string(key) {
        if let Err(e) = fs::write(&path, data) {
            log::warn!("could not cache Copilot token at {:?}: {e}", path);
        }
    }
}

/// Get a valid Copilot bearer token, exchanging the GitHub token when
/// the cached one is missing or stale.
pub fn copilot_api_key(github_token: &str, timeout_secs: u64) -> Result<String> {
    if let Some(cached) = load_cached() {
        if !cached.is_expired(unix_now()) {
            log::debug!("using cached Copilot token");
            return Ok(cached.token);
        }
    }

    let key = exchange_token(github_token, timeout_secs)?;
    save_cached(&key);
    Ok(key.token)
}

fn exchange_token(github_token: &str, timeout_secs: u64) -> Result<ApiKey> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("failed to build HTTP client")?;

    let resp = client
        .get(COPILOT_TOKEN_URL)
        .header("authorization", format!("token {github_token}"))
        .header("editor-version", EDITOR_VERSION)
        .header("editor-plugin-version", EDITOR_PLUGIN_VERSION)
        .header("user-agent", USER_AGENT)
        .header("accept", "application/json")
        .send()
        .context("Copilot token exchange request failed")?;

    match resp.status().as_u16() {
        401 => return Err(anyhow!("GitHub token is invalid or expired. Please re-authenticate.")),
        403 => {
            return Err(anyhow!(
                "Access denied. Ensure you have an active GitHub Copilot subscription."
            ));
        }
        _ => {}
    }

    if !resp.status().is_success() {
        return Err(anyhow!(
            "Copilot token exchange failed: HTTP {}",
            resp.status().as_u16()
        ));
    }

    let key: ApiKey = resp
        .json()
        .context("failed to parse Copilot token response")?;

    if key.token.is_empty() {
        return Err(anyhow!("Copilot token response missing 'token' field"));
    }

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_expiry_honors_margin() {
        let key = ApiKey {
            token: "t".into(),
            expires_at: 1_000,
        };
        assert!(key.is_expired(1_000));
        assert!(key.is_expired(800));
        assert!(!key.is_expired(600));
    }

    #[test]
    fn cached_key_round_trips_through_json() {
        let key = ApiKey {
            token: "tid=abc123".into(),
            expires_at: 1_900_000_000,
        };
        let json = serde_json::to_string(&key).unwrap();
        let back: ApiKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back.token, key.token);
        assert_eq!(back.expires_at, key.expires_at);
    }
}
