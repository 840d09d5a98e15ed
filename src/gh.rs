//! Thin wrapper around the GitHub CLI for auth checks and PR submission.

use std::process::Command;

use anyhow::{Context, Result, anyhow};

fn gh_output(args: &[&str]) -> Result<std::process::Output> {
    Command::new("gh").args(args).output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow!("GitHub CLI (gh) not found. Please install it from: https://cli.github.com/")
        } else {
            anyhow!("failed to run gh {:?}: {e}", args)
        }
    })
}

/// Fail unless `gh` is installed and logged in.
pub fn check_auth() -> Result<()> {
    let output = gh_output(&["auth", "status"])?;
    if !output.status.success() {
        return Err(anyhow!(
            "GitHub CLI not authenticated. Please run: gh auth login"
        ));
    }
    Ok(())
}

/// Does the branch already exist on the origin remote?
pub fn remote_branch_exists(branch: &str) -> bool {
    let refspec = format!("refs/heads/{branch}");
    Command::new("git")
        .args(["ls-remote", "--exit-code", "--heads", "origin", &refspec])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Push the current branch, setting the upstream.
pub fn push_current_branch() -> Result<()> {
    let output = Command::new("git")
        .args(["push", "-u", "origin", "HEAD"])
        .output()
        .context("failed to run git push")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("git push failed: {}", stderr.trim()));
    }
    Ok(())
}

/// Create the PR via `gh pr create` and return its URL.
pub fn create_pull_request(
    title: &str,
    body: &str,
    base: &str,
    draft: bool,
    web: bool,
) -> Result<String> {
    let mut args = vec!["pr", "create", "--title", title, "--body", body, "--base", base];
    if draft {
        args.push("--draft");
    }
    if web {
        args.push("--web");
    }

    let output = gh_output(&args)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("gh pr create failed: {}", stderr.trim()));
    }

    // gh prints the PR URL on the last stdout line.
    let stdout = String::from_utf8_lossy(&output.stdout);
    let url = stdout
        .lines()
        .rev()
        .find(|l| l.trim().starts_with("http"))
        .unwrap_or_default()
        .trim()
        .to_string();

    Ok(url)
}
