//! PR template discovery and section extraction.

use std::fs;
use std::path::Path;

use regex::Regex;

/// Candidate template locations, checked in order.
const TEMPLATE_CANDIDATES: [&str; 3] = [
    ".github/pull_request_template.md",
    ".github/PULL_REQUEST_TEMPLATE.md",
    "docs/pull_request_template.md",
];

/// Sections used when the repository has no usable template. Returns a
/// fresh Vec on every call; callers may mutate their copy freely.
pub fn default_sections() -> Vec<String> {
    vec![
        "Why are you making this change?".to_string(),
        "What are the possible impacts of your change to production?".to_string(),
        "Is there anything else PR reviewers should know about?".to_string(),
    ]
}

/// Read the first template candidate that exists under `repo_root`. An
/// unreadable candidate is skipped, not fatal.
fn read_template(repo_root: &Path) -> Option<String> {
    for candidate in TEMPLATE_CANDIDATES {
        let path = repo_root.join(candidate);
        if path.is_file() {
            match fs::read_to_string(&path) {
                Ok(content) => {
                    log::debug!("loaded PR template from {:?}", path);
                    return Some(content);
                }
                Err(e) => {
                    log::debug!("skipping unreadable template {:?}: {e}", path);
                    continue;
                }
            }
        }
    }
    None
}

/// Extract section headings from markdown: trimmed lines with 2 or 3
/// leading `#`s followed by whitespace and text. Single-`#` document
/// titles and deeper levels are ignored. Order preserved, no dedup.
pub fn parse_sections(template_content: &str) -> Vec<String> {
    let heading = Regex::new(r"^#{2,3}\s+(.+)$").expect("heading pattern is valid");

    template_content
        .lines()
        .filter_map(|line| {
            heading
                .captures(line.trim())
                .map(|caps| caps[1].trim().to_string())
        })
        .filter(|text| !text.is_empty())
        .collect()
}

/// Resolve the section list for a repository: parsed template headings,
/// or the fixed defaults when no file or no headings are found.
pub fn resolve_sections(repo_root: &Path) -> Vec<String> {
    if let Some(content) = read_template(repo_root) {
        let sections = parse_sections(&content);
        if !sections.is_empty() {
            return sections;
        }
    }
    default_sections()
}
