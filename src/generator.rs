//! PR content assembly.
//!
//! Orchestrates template sections, prompt construction, and generation
//! calls into a title and a multi-section description. Section order in
//! the final document is always the template order.

use anyhow::Result;

use crate::diff_summary::summarize_diff;
use crate::git::RepositoryFacts;
use crate::llm::{GenerationClient, GenerationRequest, SYSTEM_PROMPT, prompt_builder};
use crate::ticket::TicketId;

/// Fallback body for the trailing section.
pub const NO_NOTES_SENTINEL: &str = "No additional notes.";

// Temperature settings for conciseness.
const TITLE_TEMPERATURE: f32 = 0.5;
const WHY_TEMPERATURE: f32 = 0.4;
const IMPACT_TEMPERATURE: f32 = 0.3;
const NOTES_TEMPERATURE: f32 = 0.3;
const COMMIT_TEMPERATURE: f32 = 0.3;

// Output caps per section (~75 / ~35-40 / ~45 words).
const WHY_MAX_TOKENS: u32 = 100;
const IMPACT_MAX_TOKENS: u32 = 50;
const NOTES_MAX_TOKENS: u32 = 60;

// Per-section diff summary budgets, smaller than the overall diff cap.
const WHY_DIFF_LIMIT: usize = 800;
const IMPACT_DIFF_LIMIT: usize = 500;
const NOTES_DIFF_LIMIT: usize = 500;

/// The three generation strategies a template section can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Rationale,
    Impact,
    Notes,
}

impl SectionKind {
    /// Map a template section to a generator by keyword or position.
    /// Keyword and position are checked together, rationale first, so
    /// the section at index 0 always lands on Rationale whatever its
    /// heading says.
    pub fn classify(index: usize, title: &str) -> SectionKind {
        let lower = title.to_lowercase();
        if lower.contains("why") || index == 0 {
            SectionKind::Rationale
        } else if lower.contains("impact") || index == 1 {
            SectionKind::Impact
        } else {
            SectionKind::Notes
        }
    }
}

/// Cap the raw diff at `max_chars`, marking the cut.
fn truncate_diff(diff: &str, max_chars: usize) -> String {
    if diff.len() > max_chars {
        let cut: String = diff.chars().take(max_chars).collect();
        format!("{cut}\n\n... (diff truncated)")
    } else {
        diff.to_string()
    }
}

/// Guarantee the title starts with the ticket identifier regardless of
/// backend compliance: re-derive the description and prefix the ticket.
fn ensure_ticket_prefix(ticket: &TicketId, raw_title: &str) -> String {
    let raw_title = raw_title.trim();
    if raw_title.starts_with(ticket.as_str()) {
        return raw_title.to_string();
    }

    let description = match raw_title.split_once(':') {
        Some((_, rest)) => rest.trim(),
        None => raw_title,
    };
    format!("{}: {}", ticket, description)
}

/// Render the final document: one `##` heading per template section in
/// original order, blank line, body. The last section falls back to the
/// sentinel when empty or when the backend parroted it back.
fn format_pr_body(section_titles: &[String], bodies: &[String]) -> String {
    let mut parts: Vec<String> = Vec::new();

    for (i, title) in section_titles.iter().enumerate() {
        parts.push(format!("## {title}"));
        parts.push(String::new());

        let content = bodies.get(i).map(String::as_str).unwrap_or_default();

        if i == section_titles.len() - 1 {
            if content.is_empty() || content.eq_ignore_ascii_case(NO_NOTES_SENTINEL) {
                parts.push(NO_NOTES_SENTINEL.to_string());
            } else {
                parts.push(content.to_string());
            }
        } else {
            parts.push(content.to_string());
        }

        parts.push(String::new());
    }

    parts.join("\n").trim().to_string()
}

/// Generates PR titles and descriptions through a generation backend.
pub struct PrGenerator<'a> {
    client: &'a dyn GenerationClient,
    max_diff_chars: usize,
}

impl<'a> PrGenerator<'a> {
    pub fn new(client: &'a dyn GenerationClient, max_diff_chars: usize) -> Self {
        PrGenerator {
            client,
            max_diff_chars,
        }
    }

    /// Generate the PR title, post-processed so it always carries the
    /// ticket prefix.
    pub fn generate_title(
        &self,
        ticket: &TicketId,
        branch: &str,
        user_intent: &str,
    ) -> Result<String> {
        let request = GenerationRequest::new(prompt_builder::title_prompt(
            ticket.as_str(),
            branch,
            user_intent,
        ))
        .with_system(SYSTEM_PROMPT)
        .with_temperature(TITLE_TEMPERATURE);

        let raw = self.client.generate(&request)?;
        Ok(ensure_ticket_prefix(ticket, &raw))
    }

    /// Generate the full description for the given template sections.
    /// Any backend failure propagates; a half-generated document is not
    /// an acceptable output.
    pub fn generate_description(
        &self,
        facts: &RepositoryFacts,
        user_intent: &str,
        section_titles: &[String],
        feedback: &[String],
    ) -> Result<String> {
        let diff = truncate_diff(&facts.diff, self.max_diff_chars);

        let mut bodies: Vec<String> = Vec::with_capacity(section_titles.len());
        for (i, title) in section_titles.iter().enumerate() {
            let kind = SectionKind::classify(i, title);
            log::debug!("section {i} ({title:?}) -> {kind:?}");
            bodies.push(self.generate_section(kind, facts, user_intent, &diff, feedback)?);
        }

        Ok(format_pr_body(section_titles, &bodies))
    }

    fn generate_section(
        &self,
        kind: SectionKind,
        facts: &RepositoryFacts,
        user_intent: &str,
        diff: &str,
        feedback: &[String],
    ) -> Result<String> {
        let request = match kind {
            SectionKind::Rationale => {
                let mut prompt =
                    prompt_builder::why_prompt(user_intent, &facts.changed_files, feedback);
                if !diff.is_empty() && diff.len() < self.max_diff_chars {
                    let summary = summarize_diff(diff, WHY_DIFF_LIMIT);
                    prompt.push_str(&format!("\n\nCode changes (summary):\n{summary}"));
                }
                GenerationRequest::new(prompt)
                    .with_temperature(WHY_TEMPERATURE)
                    .with_max_tokens(WHY_MAX_TOKENS)
            }
            SectionKind::Impact => {
                let mut prompt = prompt_builder::impact_prompt(
                    &facts.changed_files,
                    &facts.commit_subjects,
                    feedback,
                );
                if !diff.is_empty() {
                    let summary = summarize_diff(diff, IMPACT_DIFF_LIMIT);
                    prompt.push_str(&format!("\n\nCode changes (summary):\n{summary}"));
                }
                GenerationRequest::new(prompt)
                    .with_temperature(IMPACT_TEMPERATURE)
                    .with_max_tokens(IMPACT_MAX_TOKENS)
            }
            SectionKind::Notes => {
                let summary = if diff.is_empty() {
                    String::new()
                } else {
                    summarize_diff(diff, NOTES_DIFF_LIMIT)
                };
                let prompt =
                    prompt_builder::notes_prompt(&facts.changed_files, &summary, feedback);
                GenerationRequest::new(prompt)
                    .with_temperature(NOTES_TEMPERATURE)
                    .with_max_tokens(NOTES_MAX_TOKENS)
            }
        };

        let request = request.with_system(SYSTEM_PROMPT);
        let body = self.client.generate(&request)?;
        Ok(body.trim().to_string())
    }

    /// Commit message for the auto-commit flow: same shape contract as
    /// the title, grounded in the uncommitted diff.
    pub fn generate_commit_message(
        &self,
        ticket: &TicketId,
        changed_files: &[String],
        diff: &str,
    ) -> Result<String> {
        let summary = summarize_diff(diff, 2000);
        let request = GenerationRequest::new(prompt_builder::commit_message_prompt(
            ticket.as_str(),
            changed_files,
            &summary,
        ))
        .with_temperature(COMMIT_TEMPERATURE);

        let message = self.client.generate(&request)?;
        Ok(message.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerationError;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct ScriptedClient {
        replies: RefCell<VecDeque<&'static str>>,
    }

    impl ScriptedClient {
        fn new(replies: &[&'static str]) -> Self {
            ScriptedClient {
                replies: RefCell::new(replies.iter().copied().collect()),
            }
        }
    }

    impl GenerationClient for ScriptedClient {
        fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            self.replies
                .borrow_mut()
                .pop_front()
                .map(str::to_string)
                .ok_or_else(|| GenerationError::Unavailable("script exhausted".into()))
        }
    }

    fn facts() -> RepositoryFacts {
        RepositoryFacts {
            branch: "feature/STAR-5-parser".into(),
            changed_files: vec!["src/parser.rs".into(), "src/lexer.rs".into()],
            commit_subjects: vec!["STAR-5: Fix parser".into()],
            diff: "diff --git a/src/parser.rs b/src/parser.rs\n@@ -1 +1 @@\n+fixed\n".into(),
        }
    }

    #[test]
    fn classifies_by_position_and_keyword() {
        assert_eq!(SectionKind::classify(0, "Summary"), SectionKind::Rationale);
        assert_eq!(
            SectionKind::classify(4, "Why does this matter?"),
            SectionKind::Rationale
        );
        assert_eq!(SectionKind::classify(1, "Changes"), SectionKind::Impact);
        assert_eq!(
            SectionKind::classify(3, "Impact analysis"),
            SectionKind::Impact
        );
        assert_eq!(SectionKind::classify(2, "Checklist"), SectionKind::Notes);
    }

    #[test]
    fn body_forces_sentinel_for_empty_last_section() {
        let titles = vec!["First".to_string(), "Second".to_string()];
        let bodies = vec!["x".to_string(), String::new()];
        let body = format_pr_body(&titles, &bodies);

        assert!(body.contains("## First\n\nx"));
        assert!(body.ends_with(&format!("## Second\n\n{NO_NOTES_SENTINEL}")));
    }

    #[test]
    fn body_forces_sentinel_when_backend_parrots_it() {
        let titles = vec!["Only".to_string()];
        let bodies = vec!["no additional notes.".to_string()];
        let body = format_pr_body(&titles, &bodies);
        assert!(body.ends_with(NO_NOTES_SENTINEL));
    }

    #[test]
    fn body_keeps_every_heading_in_template_order() {
        let titles: Vec<String> = (1..=4).map(|i| format!("Custom Section {i}")).collect();
        let bodies: Vec<String> = (1..=4).map(|i| format!("content {i}")).collect();
        let body = format_pr_body(&titles, &bodies);

        let mut last = 0;
        for title in &titles {
            let pos = body.find(&format!("## {title}")).expect("heading present");
            assert!(pos >= last, "headings out of order");
            last = pos;
        }
        assert!(body.contains("content 3"));
    }

    #[test]
    fn title_without_ticket_gets_prefixed() {
        let ticket = TicketId::new("STAR-5");
        assert_eq!(
            ensure_ticket_prefix(&ticket, "Fix bug in parser"),
            "STAR-5: Fix bug in parser"
        );
    }

    #[test]
    fn title_with_wrong_ticket_is_rewritten() {
        let ticket = TicketId::new("STAR-5");
        assert_eq!(
            ensure_ticket_prefix(&ticket, "OTHER-9: Improve logging"),
            "STAR-5: Improve logging"
        );
    }

    #[test]
    fn compliant_title_passes_through() {
        let ticket = TicketId::new("STAR-5");
        assert_eq!(
            ensure_ticket_prefix(&ticket, "  STAR-5: Fix bug in parser \n"),
            "STAR-5: Fix bug in parser"
        );
    }

    #[test]
    fn generate_title_post_processes_reply() {
        let client = ScriptedClient::new(&["Fix bug in parser"]);
        let generator = PrGenerator::new(&client, 8000);
        let title = generator
            .generate_title(&TicketId::new("STAR-5"), "star-5-fix", "fix the parser")
            .unwrap();
        assert_eq!(title, "STAR-5: Fix bug in parser");
    }

    #[test]
    fn description_walks_sections_in_order() {
        let client = ScriptedClient::new(&["rationale body", "impact body", "notes body"]);
        let generator = PrGenerator::new(&client, 8000);
        let titles = crate::template::default_sections();

        let body = generator
            .generate_description(&facts(), "fix the parser", &titles, &[])
            .unwrap();

        let r = body.find("rationale body").unwrap();
        let i = body.find("impact body").unwrap();
        let n = body.find("notes body").unwrap();
        assert!(r < i && i < n);
        for title in &titles {
            assert!(body.contains(&format!("## {title}")));
        }
    }

    #[test]
    fn backend_failure_propagates_out_of_description() {
        let client = ScriptedClient::new(&["only one reply"]);
        let generator = PrGenerator::new(&client, 8000);
        let titles = crate::template::default_sections();

        let err = generator
            .generate_description(&facts(), "intent", &titles, &[])
            .unwrap_err();
        assert!(err.to_string().contains("generation backend"));
    }

    #[test]
    fn oversized_diff_is_truncated_with_marker() {
        let big = "x".repeat(100);
        let capped = truncate_diff(&big, 40);
        assert!(capped.starts_with(&"x".repeat(40)));
        assert!(capped.ends_with("... (diff truncated)"));

        let small = truncate_diff("tiny", 40);
        assert_eq!(small, "tiny");
    }
}
