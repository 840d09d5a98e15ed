use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{GenerationClient, GenerationError, GenerationRequest};

const COPILOT_VERSION: &str = "0.26.7";
const EDITOR_VERSION: &str = "vscode/1.95.0";
const API_VERSION: &str = "2025-04-01";

/// Minimal request/response structs for the Copilot chat completions API.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    temperature: f32,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<ReplyContent>,
}

/// Copilot returns content either as one string or as a list of typed
/// fragments. Neither shape leaks past this module.
#[derive(Deserialize)]
#[serde(untagged)]
enum ReplyContent {
    Text(String),
    Fragments(Vec<ContentFragment>),
}

#[derive(Deserialize)]
struct ContentFragment {
    #[serde(default)]
    text: Option<String>,
}

/// Blocking client for the GitHub Copilot chat completions endpoint.
pub struct CopilotClient {
    client: Client,
    api_key: String,
    model: String,
    chat_url: String,
}

impl CopilotClient {
    pub fn new(api_base: &str, api_key: String, model: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        CopilotClient {
            client,
            api_key,
            model,
            chat_url: format!("{}/chat/completions", api_base.trim_end_matches('/')),
        }
    }
}

impl GenerationClient for CopilotClient {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system".into(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".into(),
            content: request.prompt.clone(),
        });

        let body = ChatRequest {
            model: self.model.clone(),
            temperature: request.temperature,
            messages,
            max_tokens: request.max_tokens,
        };

        log::info!("Calling Copilot model {:?}", self.model);

        let resp = self
            .client
            .post(&self.chat_url)
            .bearer_auth(&self.api_key)
            .header("copilot-integration-id", "vscode-chat")
            .header("editor-version", EDITOR_VERSION)
            .header("editor-plugin-version", format!("copilot-chat/{COPILOT_VERSION}"))
            .header("user-agent", format!("GitHubCopilotChat/{COPILOT_VERSION}"))
            .header("openai-intent", "conversation-panel")
            .header("x-github-api-version", API_VERSION)
            .json(&body)
            .send()
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            return Err(classify_status(status, &text));
        }

        let chat_resp: ChatResponse = resp
            .json()
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;

        normalize_reply(chat_resp)
    }
}

/// Map a non-success HTTP status to an error kind. Unauthorized is the
/// one status the user can act on directly.
fn classify_status(status: StatusCode, body: &str) -> GenerationError {
    if status == StatusCode::UNAUTHORIZED {
        GenerationError::Auth(format!("HTTP 401: {body}"))
    } else {
        GenerationError::Unavailable(format!("HTTP {}: {body}", status.as_u16()))
    }
}

/// Flatten the first choice into plain text. Fragment lists are joined
/// with newlines; a reply with no usable text is a contract violation.
fn normalize_reply(resp: ChatResponse) -> Result<String, GenerationError> {
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::Malformed("Copilot returned no choices".into()))?;

    let content = choice
        .message
        .content
        .ok_or_else(|| GenerationError::Malformed("Copilot response missing text content".into()))?;

    let text = match content {
        ReplyContent::Text(s) => s,
        ReplyContent::Fragments(fragments) => fragments
            .into_iter()
            .filter_map(|f| f.text.filter(|t| !t.is_empty()))
            .collect::<Vec<_>>()
            .join("\n"),
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(GenerationError::Malformed(
            "Copilot response missing text content".into(),
        ));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ChatResponse {
        serde_json::from_str(json).expect("test JSON should parse")
    }

    #[test]
    fn normalizes_plain_string_content() {
        let resp = parse(r#"{"choices":[{"message":{"content":"  hello world  "}}]}"#);
        assert_eq!(normalize_reply(resp).unwrap(), "hello world");
    }

    #[test]
    fn normalizes_fragment_list_content() {
        let resp = parse(
            r#"{"choices":[{"message":{"content":[
                {"type":"text","text":"first"},
                {"type":"image"},
                {"type":"text","text":"second"}
            ]}}]}"#,
        );
        assert_eq!(normalize_reply(resp).unwrap(), "first\nsecond");
    }

    #[test]
    fn missing_content_is_malformed() {
        let resp = parse(r#"{"choices":[{"message":{}}]}"#);
        assert!(matches!(
            normalize_reply(resp),
            Err(GenerationError::Malformed(_))
        ));
    }

    #[test]
    fn empty_choices_is_malformed() {
        let resp = parse(r#"{"choices":[]}"#);
        assert!(matches!(
            normalize_reply(resp),
            Err(GenerationError::Malformed(_))
        ));
    }

    #[test]
    fn textless_fragments_are_malformed() {
        let resp = parse(r#"{"choices":[{"message":{"content":[{"type":"image"}]}}]}"#);
        assert!(matches!(
            normalize_reply(resp),
            Err(GenerationError::Malformed(_))
        ));
    }

    #[test]
    fn unauthorized_maps_to_auth_error() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "bad token"),
            GenerationError::Auth(_)
        ));
    }

    #[test]
    fn server_error_maps_to_unavailable() {
        assert!(matches!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            GenerationError::Unavailable(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, ""),
            GenerationError::Unavailable(_)
        ));
    }

    #[test]
    fn connection_refused_maps_to_unavailable() {
        let client = CopilotClient::new(
            "http://127.0.0.1:9",
            "key".into(),
            "claude-haiku-4.5".into(),
            2,
        );
        let err = client
            .generate(&GenerationRequest::new("ping"))
            .unwrap_err();
        assert!(matches!(err, GenerationError::Unavailable(_)));
    }
}
