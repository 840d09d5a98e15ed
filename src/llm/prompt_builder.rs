//! Per-section instruction prompts.
//!
//! Generation backends default to verbose, hedge-everything prose; the
//! tight word ceilings and negative instructions here counteract that.

/// Render a capped bullet list of changed file paths, with a trailing
/// "... and N more files" once the cap is exceeded.
fn capped_file_list(files: &[String], cap: usize) -> String {
    let mut out = files
        .iter()
        .take(cap)
        .map(|f| format!("- {f}"))
        .collect::<Vec<_>>()
        .join("\n");
    if files.len() > cap {
        out.push_str(&format!("\n... and {} more files", files.len() - cap));
    }
    out
}

/// Append prior reviewer/user corrections, oldest first, verbatim.
fn append_feedback(prompt: &mut String, feedback: &[String]) {
    if feedback.is_empty() {
        return;
    }
    prompt.push_str("\n\nFeedback from previous attempts (address all of it, oldest first):\n");
    for (i, item) in feedback.iter().enumerate() {
        prompt.push_str(&format!("{}. {item}\n", i + 1));
    }
}

pub fn title_prompt(ticket: &str, branch: &str, user_intent: &str) -> String {
    format!(
        "Generate a concise PR title following this format: \"{ticket}: <description>\"\n\
         \n\
         Branch name: {branch}\n\
         Change purpose: {user_intent}\n\
         \n\
         Requirements:\n\
         - Start with the ticket number: {ticket}\n\
         - Follow with a colon and space\n\
         - Write a clear, actionable description (3-8 words)\n\
         - Use imperative mood (e.g., \"Add\", \"Fix\", \"Update\", not \"Added\", \"Fixed\", \"Updated\")\n\
         - Be specific but concise\n\
         \n\
         Examples:\n\
         - STAR-123: Add user authentication flow\n\
         - STAR-456: Fix memory leak in data processor\n\
         - STAR-789: Update API error handling\n\
         \n\
         Generate only the title, nothing else."
    )
}

pub fn why_prompt(user_intent: &str, changed_files: &[String], feedback: &[String]) -> String {
    let files_str = capped_file_list(changed_files, 10);

    let mut prompt = format!(
        "Explain why this change is being made in 1-2 concise sentences (max 50 words total).\n\
         \n\
         User's purpose: {user_intent}\n\
         Files modified:\n{files_str}\n\
         \n\
         Focus on: What problem this solves and why it's needed.\n\
         Be direct and concise. No headers, bullet points, or extra formatting."
    );
    append_feedback(&mut prompt, feedback);
    prompt
}

pub fn impact_prompt(
    changed_files: &[String],
    commit_subjects: &[String],
    feedback: &[String],
) -> String {
    let files_str = capped_file_list(changed_files, 15);

    let commits_str = if commit_subjects.is_empty() {
        String::new()
    } else {
        let lines = commit_subjects
            .iter()
            .take(5)
            .map(|msg| format!("- {msg}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!("Commits:\n{lines}\n\n")
    };

    let mut prompt = format!(
        "List the potential production impacts of this change.\n\
         \n\
         Files modified:\n{files_str}\n\
         \n\
         {commits_str}\
         Requirements:\n\
         - Keep total response under 25 words\n\
         - Use 1-2 bullet points maximum, or a single concise statement\n\
         - Every word must add value - remove adjectives and filler phrases\n\
         - Only list REAL, concrete production impacts (performance degradation, breaking changes, data loss risk, etc.)\n\
         - Do NOT mention risks that are \"minimal\", \"unlikely\", or \"low\" - if a risk is minimal, skip it entirely\n\
         - Do NOT include generic \"testing needed\" points - assume all changes need testing\n\
         - Do NOT list theoretical risks that apply to any code change\n\
         - If truly low-risk: say \"Low-risk change\" or \"No significant production impact expected\"\n\
         - Be specific and actionable, not vague\n\
         \n\
         Examples of GOOD impact statements:\n\
         - Breaking change: Removes deprecated API endpoint used by mobile app\n\
         - Performance: Database migration will lock table for ~5 minutes\n\
         \n\
         Examples of BAD impact statements (DO NOT write these):\n\
         - Testing needed: Verify that changes don't break workflows\n\
         - Security risk: Could introduce vulnerabilities, though likely minimal\n\
         - Compatibility concern: Might affect existing configurations\n\
         \n\
         NO headers, numbered lists, or summary sections - just simple bullet points or a single statement."
    );
    append_feedback(&mut prompt, feedback);
    prompt
}

pub fn notes_prompt(changed_files: &[String], diff_summary: &str, feedback: &[String]) -> String {
    let files_str = capped_file_list(changed_files, 10);

    let mut prompt = format!(
        "List anything important for reviewers that was NOT already mentioned in the Impact section above.\n\
         \n\
         Focus on: dependencies, config changes, migrations, tricky review areas.\n\
         \n\
         Requirements:\n\
         - Do NOT repeat information from the Impact section\n\
         - Only mention NEW information not covered above\n\
         - If nothing new to add: \"No additional notes.\"\n\
         - Maximum 2 bullet points, 40 words total\n\
         \n\
         Files modified:\n{files_str}\n\
         \n\
         Change summary:\n{diff_summary}\n\
         \n\
         No headers or extra formatting."
    );
    append_feedback(&mut prompt, feedback);
    prompt
}

/// Prompt asking the backend to recover a ticket identifier that the
/// regex pass missed. The reply contract is `PREFIX-<digits>` or the
/// literal token NONE.
pub fn ticket_extraction_prompt(branch: &str, prefix: &str) -> String {
    let upper = prefix.to_uppercase();
    let lower = prefix.to_lowercase();

    format!(
        "Extract the ticket number from this git branch name: \"{branch}\"\n\
         \n\
         The ticket number typically starts with \"{upper}\" followed by a dash and numbers.\n\
         Common formats include:\n\
         - {upper}-12345\n\
         - {lower}-12345\n\
         \n\
         Branch name variations:\n\
         - feature/{upper}-123-description\n\
         - {upper}-123-some-feature\n\
         - bugfix-{lower}-456-fix\n\
         - {lower}_789_something\n\
         - and many other creative formats\n\
         \n\
         Instructions:\n\
         1. Look for the ticket identifier in the branch name\n\
         2. Return ONLY the ticket number in the format: {upper}-[number]\n\
         3. If you find the ticket, return just the ticket like: {upper}-12345\n\
         4. If no ticket number is found, return exactly: NONE\n\
         \n\
         Examples:\n\
         - \"{lower}-422270-test\" -> {upper}-422270\n\
         - \"feature/{upper}-12345-add-auth\" -> {upper}-12345\n\
         - \"bugfix_{lower}_999_memory_leak\" -> {upper}-999\n\
         - \"some-branch-without-ticket\" -> NONE\n\
         \n\
         Now extract from: \"{branch}\"\n\
         \n\
         Return ONLY the ticket number or NONE, nothing else."
    )
}

/// Commit-message prompt for the auto-commit flow.
pub fn commit_message_prompt(ticket: &str, changed_files: &[String], diff_summary: &str) -> String {
    let files_str = capped_file_list(changed_files, 10);
    let summary: String = diff_summary.chars().take(1000).collect();

    format!(
        "Generate a concise git commit message following this format: \"{ticket}: <description>\"\n\
         \n\
         Files changed:\n{files_str}\n\
         \n\
         Changes summary:\n{summary}\n\
         \n\
         Requirements:\n\
         - Start with the ticket number: {ticket}\n\
         - Follow with a colon and space\n\
         - Write a clear, actionable description (3-8 words)\n\
         - Use imperative mood (e.g., \"Add\", \"Fix\", \"Update\", not \"Added\", \"Fixed\", \"Updated\")\n\
         - Be specific but concise\n\
         - Focus on WHAT changed, not WHY\n\
         \n\
         Examples:\n\
         - STAR-123: Add user authentication middleware\n\
         - STAR-456: Fix memory leak in data processor\n\
         - STAR-789: Update error handling in API routes\n\
         \n\
         Generate only the commit message, nothing else."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("src/file_{i}.rs")).collect()
    }

    #[test]
    fn file_list_is_capped_with_suffix() {
        let list = capped_file_list(&files(14), 10);
        assert!(list.contains("- src/file_9.rs"));
        assert!(!list.contains("src/file_10.rs"));
        assert!(list.ends_with("... and 4 more files"));
    }

    #[test]
    fn file_list_under_cap_has_no_suffix() {
        let list = capped_file_list(&files(3), 10);
        assert!(!list.contains("more files"));
    }

    #[test]
    fn title_prompt_carries_grounding() {
        let prompt = title_prompt("STAR-42", "feature/STAR-42-login", "add login flow");
        assert!(prompt.contains("STAR-42: <description>"));
        assert!(prompt.contains("feature/STAR-42-login"));
        assert!(prompt.contains("add login flow"));
        assert!(prompt.contains("imperative mood"));
    }

    #[test]
    fn feedback_is_appended_in_order() {
        let fb = vec!["shorter".to_string(), "mention the migration".to_string()];
        let prompt = why_prompt("fix races", &files(2), &fb);
        let first = prompt.find("1. shorter").unwrap();
        let second = prompt.find("2. mention the migration").unwrap();
        assert!(first < second);
    }

    #[test]
    fn impact_prompt_caps_commits_at_five() {
        let commits: Vec<String> = (0..8).map(|i| format!("commit {i}")).collect();
        let prompt = impact_prompt(&files(2), &commits, &[]);
        assert!(prompt.contains("- commit 4"));
        assert!(!prompt.contains("- commit 5"));
    }

    #[test]
    fn impact_prompt_omits_commit_block_when_empty() {
        let prompt = impact_prompt(&files(2), &[], &[]);
        assert!(!prompt.contains("Commits:"));
    }

    #[test]
    fn notes_prompt_names_the_sentinel() {
        let prompt = notes_prompt(&files(1), "@@ -1 +1 @@", &[]);
        assert!(prompt.contains("\"No additional notes.\""));
        assert!(prompt.contains("@@ -1 +1 @@"));
    }

    #[test]
    fn extraction_prompt_describes_variations() {
        let prompt = ticket_extraction_prompt("eng_77_cleanup", "ENG");
        assert!(prompt.contains("eng_77_cleanup"));
        assert!(prompt.contains("ENG-12345"));
        assert!(prompt.contains("eng_789_something"));
        assert!(prompt.contains("return exactly: NONE"));
    }
}
