pub mod auth;
pub mod copilot;
pub mod prompt_builder;
mod prompts;

pub use prompts::SYSTEM_PROMPT;

use thiserror::Error;

/// What went wrong when talking to the generation backend. Callers need
/// to tell "re-authenticate" apart from "try again later" apart from
/// "the backend broke its contract".
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Copilot authentication failed: {0}. Ensure your GitHub token has Copilot access.")]
    Auth(String),

    #[error("request to generation backend failed: {0}")]
    Unavailable(String),

    #[error("malformed generation response: {0}")]
    Malformed(String),
}

/// One generation call. Stateless; the backend keeps no conversation.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        GenerationRequest {
            prompt: prompt.into(),
            system: None,
            temperature: 0.7,
            max_tokens: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Trait for talking to a text-generation backend (real or dummy).
pub trait GenerationClient {
    /// Send a prompt and return the normalized plain-text reply.
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// No-op client for development with --no-model or model=none.
pub struct NoopClient;

impl GenerationClient for NoopClient {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        log::debug!("NoopClient swallowing prompt ({} chars)", request.prompt.len());
        Ok("Dummy response (LLM disabled)".to_string())
    }
}
