use std::collections::HashSet;
use std::path::PathBuf;
use std::process::Command as GitCommand;

use anyhow::{Context, Result, anyhow};

/// Read-only snapshot of the repository state a PR is drafted from.
/// Built once per run against the base branch and never mutated.
#[derive(Debug, Clone)]
pub struct RepositoryFacts {
    pub branch: String,
    pub changed_files: Vec<String>,
    pub commit_subjects: Vec<String>,
    pub diff: String,
}

impl RepositoryFacts {
    /// Gather branch, file list, commit subjects, and the raw diff. A
    /// diff failure degrades to an empty diff rather than aborting; the
    /// prompts simply lose that context.
    pub fn gather(base_branch: &str) -> Result<Self> {
        let branch = current_branch()?;
        let changed_files = changed_files(base_branch)?;
        let commit_subjects = commit_subjects(base_branch)?;
        let diff = diff(base_branch, true).unwrap_or_else(|e| {
            log::warn!("could not read diff against {base_branch}: {e}");
            String::new()
        });

        Ok(RepositoryFacts {
            branch,
            changed_files,
            commit_subjects,
            diff,
        })
    }
}

/// Run a git command and capture stdout as String.
pub fn git_output(args: &[&str]) -> Result<String> {
    let output = GitCommand::new("git")
        .args(args)
        .output()
        .with_context(|| format!("failed to run git {:?}", args))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "git {:?} exited with status {:?}: {}",
            args,
            output.status.code(),
            stderr.trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Error out early when not inside a working tree.
pub fn ensure_repo() -> Result<()> {
    git_output(&["rev-parse", "--is-inside-work-tree"])
        .map(|_| ())
        .map_err(|_| anyhow!("Not in a git repository. Run prbot from within a git repository."))
}

/// Get the root directory of the repository.
pub fn repo_root() -> Result<PathBuf> {
    let root = git_output(&["rev-parse", "--show-toplevel"])?;
    Ok(PathBuf::from(root.trim()))
}

/// Get the current branch name; detached HEAD is an error.
pub fn current_branch() -> Result<String> {
    let name = git_output(&["rev-parse", "--abbrev-ref", "HEAD"])?
        .trim()
        .to_string();

    if name == "HEAD" {
        return Err(anyhow!("Detached HEAD state. Please checkout a branch."));
    }
    Ok(name)
}

pub fn branch_exists(name: &str) -> bool {
    git_output(&["rev-parse", "--verify", "--quiet", name]).is_ok()
}

/// Pick a usable base branch: the configured one if it exists, else the
/// first conventional default that does.
pub fn detect_base_branch(configured: &str) -> Result<String> {
    if branch_exists(configured) {
        return Ok(configured.to_string());
    }

    for candidate in ["main", "master"] {
        if branch_exists(candidate) {
            log::info!("base branch {configured:?} not found, using {candidate:?}");
            return Ok(candidate.to_string());
        }
    }

    Err(anyhow!(
        "Base branch '{configured}' not found. Please specify a valid base branch."
    ))
}

/// Changed file paths relative to the base branch, insertion order,
/// deduplicated.
pub fn changed_files(base_branch: &str) -> Result<Vec<String>> {
    let range = format!("{base_branch}...HEAD");
    let output = git_output(&["diff", &range, "--name-only"])?;

    let mut seen = HashSet::new();
    let files = output
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .filter(|l| seen.insert(l.clone()))
        .collect();
    Ok(files)
}

/// Commit subject lines on this branch, most recent first.
pub fn commit_subjects(base_branch: &str) -> Result<Vec<String>> {
    let range = format!("{base_branch}..HEAD");
    let output = git_output(&["log", &range, "--pretty=format:%s"])?;

    Ok(output
        .lines()
        .map(|l| l.to_string())
        .filter(|l| !l.is_empty())
        .collect())
}

/// Unified diff against the base branch. With `allow_empty`, commits
/// without diff content yield an empty string instead of an error.
pub fn diff(base_branch: &str, allow_empty: bool) -> Result<String> {
    let range = format!("{base_branch}...HEAD");
    let diff = git_output(&["diff", &range]).map_err(|e| {
        if e.to_string().to_lowercase().contains("unknown revision") {
            anyhow!("Base branch '{base_branch}' not found. Please specify a valid base branch.")
        } else {
            e
        }
    })?;

    if diff.trim().is_empty() && !allow_empty {
        return Err(anyhow!(
            "No changes detected. Please commit your changes before creating a PR."
        ));
    }

    Ok(diff)
}

/// Number of commits this branch is ahead of the base.
pub fn commit_count(base_branch: &str) -> Result<usize> {
    let range = format!("{base_branch}..HEAD");
    let output = git_output(&["rev-list", "--count", &range])?;
    output
        .trim()
        .parse()
        .with_context(|| format!("unexpected rev-list output: {output:?}"))
}

pub fn has_uncommitted_changes() -> Result<bool> {
    let status = git_output(&["status", "--porcelain"])?;
    Ok(!status.trim().is_empty())
}

/// Diff of the working tree against HEAD (staged and unstaged).
pub fn uncommitted_diff() -> Result<String> {
    git_output(&["diff", "HEAD"])
}

pub fn uncommitted_files() -> Result<Vec<String>> {
    let output = git_output(&["diff", "HEAD", "--name-only"])?;
    Ok(output
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect())
}

/// Stage all new, modified, and deleted files.
pub fn stage_all() -> Result<()> {
    log::warn!("Staging all changes");
    git_output(&["add", "-A"])?;
    Ok(())
}

pub fn create_commit(message: &str) -> Result<()> {
    git_output(&["commit", "-m", message])?;
    Ok(())
}
