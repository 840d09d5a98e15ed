use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cli_args::Cli;
use crate::ticket::DEFAULT_TICKET_PATTERN;

pub const DEFAULT_MODEL: &str = "claude-haiku-4.5";
pub const DEFAULT_API_BASE: &str = "https://api.githubcopilot.com";
const DEFAULT_BASE_BRANCH: &str = "main";
const DEFAULT_MAX_DIFF_CHARS: usize = 8000;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Final resolved configuration for prbot.
#[derive(Debug, Clone)]
pub struct Config {
    pub model: String,
    pub api_base: String,
    pub github_token: Option<String>,
    pub base_branch: String,
    pub ticket_pattern: String,
    pub max_diff_chars: usize,
    pub timeout_secs: u64,
    pub draft_pr: bool,
    pub open_in_browser: bool,
}

impl Config {
    /// Build the final config from CLI flags, environment, TOML file,
    /// and defaults.
    ///
    /// Precedence:
    ///   1. CLI flags
    ///   2. Env vars (`PRBOT_*`, `GITHUB_TOKEN`)
    ///   3. TOML `~/.config/prbot.toml`
    ///   4. Hardcoded defaults
    pub fn from_sources(cli: &Cli) -> Self {
        let file_cfg = load_file_config().unwrap_or_default();

        let model = cli
            .model
            .clone()
            .or_else(|| env::var("PRBOT_MODEL").ok())
            .or(file_cfg.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let api_base = env::var("PRBOT_API_BASE")
            .ok()
            .or(file_cfg.api_base)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        // GITHUB_TOKEN comes through clap's env fallback already.
        let github_token = cli.github_token.clone().or(file_cfg.github_token);

        let base_branch = cli
            .base_branch
            .clone()
            .or_else(|| env::var("PRBOT_BASE_BRANCH").ok())
            .or(file_cfg.base_branch)
            .unwrap_or_else(|| DEFAULT_BASE_BRANCH.to_string());

        let ticket_pattern = env::var("PRBOT_TICKET_PATTERN")
            .ok()
            .or(file_cfg.ticket_pattern)
            .unwrap_or_else(|| DEFAULT_TICKET_PATTERN.to_string());

        let max_diff_chars = env::var("PRBOT_MAX_DIFF_CHARS")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(file_cfg.max_diff_chars)
            .unwrap_or(DEFAULT_MAX_DIFF_CHARS);

        let timeout_secs = file_cfg.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);

        Config {
            model,
            api_base,
            github_token,
            base_branch,
            ticket_pattern,
            max_diff_chars,
            timeout_secs,
            draft_pr: cli.draft,
            open_in_browser: cli.web,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    model: Option<String>,
    api_base: Option<String>,
    github_token: Option<String>,
    base_branch: Option<String>,
    ticket_pattern: Option<String>,
    max_diff_chars: Option<usize>,
    timeout_secs: Option<u64>,
}

/// Return `~/.config/prbot.toml`
fn config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("prbot.toml"))
}

fn load_file_config() -> Option<FileConfig> {
    let path = config_path()?;
    if !path.exists() {
        return None;
    }

    let data = fs::read_to_string(&path).ok()?;
    match toml::from_str::<FileConfig>(&data) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            log::warn!("ignoring invalid config file {:?}: {e}", path);
            None
        }
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# prbot configuration

# Copilot model used for generation.
model = "claude-haiku-4.5"

# Base branch PRs are compared against.
base_branch = "main"

# Regex used to pull the ticket identifier out of the branch name.
ticket_pattern = "STAR-(\\d+)"

# Maximum characters of raw diff fed into section prompts.
max_diff_chars = 8000
"#;

/// Write a commented default config file; refuses to clobber one that
/// already exists.
pub fn write_default_config() -> Result<PathBuf> {
    let path = config_path().context("could not determine home directory")?;

    if path.exists() {
        anyhow::bail!("config file already exists at {:?}", path);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {:?}", parent))?;
    }
    fs::write(&path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("failed to write config file {:?}", path))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_config_parses_partial_toml() {
        let cfg: FileConfig = toml::from_str(
            r#"
            model = "gpt-4o-mini"
            max_diff_chars = 4000
            "#,
        )
        .unwrap();
        assert_eq!(cfg.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(cfg.max_diff_chars, Some(4000));
        assert!(cfg.base_branch.is_none());
    }

    #[test]
    fn default_template_is_valid_toml() {
        let cfg: FileConfig = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(cfg.model.as_deref(), Some("claude-haiku-4.5"));
        assert_eq!(cfg.ticket_pattern.as_deref(), Some(r"STAR-(\d+)"));
        assert_eq!(cfg.max_diff_chars, Some(8000));
    }

    #[test]
    fn unknown_keys_are_tolerated() {
        let cfg: FileConfig = toml::from_str("someday_flag = true\nmodel = \"m\"\n").unwrap();
        assert_eq!(cfg.model.as_deref(), Some("m"));
    }
}
