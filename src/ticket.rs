//! Ticket identifier extraction.
//!
//! Resolution is an ordered chain of fallible strategies: regex match
//! against the branch name, then a generative fallback for the creative
//! separator variations people actually use, then a manual prompt (the
//! prompt itself lives in main). First success wins; a backend error in
//! the middle stage falls through instead of aborting.

use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::llm::{GenerationClient, GenerationRequest};
use crate::llm::prompt_builder;

pub const DEFAULT_TICKET_PATTERN: &str = r"STAR-(\d+)";

const EXTRACTION_TEMPERATURE: f32 = 0.1;

/// A resolved ticket identifier, canonical uppercase `PREFIX-digits`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketId(String);

impl TicketId {
    /// Canonicalize arbitrary user input (manual-entry stage).
    pub fn new(value: impl AsRef<str>) -> Self {
        TicketId(value.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stage 1: case-insensitive regex search; the full matched substring,
/// uppercased, is the ticket. A malformed pattern is logged and treated
/// as a miss so the later stages still get their turn.
pub fn extract_with_pattern(branch: &str, pattern: &str) -> Option<TicketId> {
    let re = match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(re) => re,
        Err(e) => {
            log::warn!("invalid ticket pattern {pattern:?}: {e}");
            return None;
        }
    };

    re.find(branch)
        .map(|m| TicketId(m.as_str().to_uppercase()))
}

/// Derive the expected prefix letters from the configured pattern, e.g.
/// `STAR-(\d+)` -> "STAR". Falls back to "STAR" when the pattern does
/// not start with `LETTERS-`.
pub fn prefix_from_pattern(pattern: &str) -> String {
    let letters: String = pattern
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();

    if !letters.is_empty() && pattern[letters.len()..].starts_with('-') {
        letters.to_uppercase()
    } else {
        "STAR".to_string()
    }
}

/// Stage 2: ask the generation backend. Backends add commentary, so the
/// reply is never trusted verbatim; it is searched for `PREFIX-digits`.
pub fn extract_with_backend(
    branch: &str,
    prefix: &str,
    client: &dyn GenerationClient,
) -> Option<TicketId> {
    let request = GenerationRequest::new(prompt_builder::ticket_extraction_prompt(branch, prefix))
        .with_temperature(EXTRACTION_TEMPERATURE);

    match client.generate(&request) {
        Ok(reply) => parse_backend_reply(&reply, prefix),
        Err(e) => {
            log::debug!("generative ticket extraction failed: {e}");
            None
        }
    }
}

fn parse_backend_reply(reply: &str, prefix: &str) -> Option<TicketId> {
    let reply = reply.trim().to_uppercase();
    if reply.is_empty() || reply == "NONE" {
        return None;
    }

    let needle = format!("{}-\\d+", regex::escape(&prefix.to_uppercase()));
    let re = Regex::new(&needle).ok()?;
    re.find(&reply).map(|m| TicketId(m.as_str().to_string()))
}

/// Run the automatic stages in order. `None` means the caller should
/// fall back to manual entry.
pub fn resolve(
    branch: &str,
    pattern: &str,
    client: Option<&dyn GenerationClient>,
) -> Option<TicketId> {
    if let Some(ticket) = extract_with_pattern(branch, pattern) {
        log::info!("detected ticket number (regex): {ticket}");
        return Some(ticket);
    }

    let client = client?;
    let prefix = prefix_from_pattern(pattern);
    let ticket = extract_with_backend(branch, &prefix, client);
    if let Some(ticket) = &ticket {
        log::info!("detected ticket number (generative): {ticket}");
    }
    ticket
}
