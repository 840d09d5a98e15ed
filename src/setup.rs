use anyhow::{Context, Result};
use log::debug;

use crate::config::Config;
use crate::llm::auth;
use crate::llm::copilot::CopilotClient;
use crate::llm::{GenerationClient, NoopClient};

/// Build the generation client based on CLI + config.
pub fn build_generation_client(cfg: &Config, no_model: bool) -> Result<Box<dyn GenerationClient>> {
    if no_model || cfg.model.eq_ignore_ascii_case("none") {
        debug!("Using NoopClient (no model calls).");
        return Ok(Box::new(NoopClient));
    }

    let github_token = cfg
        .github_token
        .as_deref()
        .context("GITHUB_TOKEN (or --github-token) is required unless --no-model is used")?;

    let api_key = auth::copilot_api_key(github_token, cfg.timeout_secs)?;

    debug!("Using CopilotClient with model: {}", cfg.model);

    Ok(Box::new(CopilotClient::new(
        &cfg.api_base,
        api_key,
        cfg.model.clone(),
        cfg.timeout_secs,
    )))
}
