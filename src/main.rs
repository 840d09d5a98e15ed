use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;

mod cli_args;
mod config;
mod diff_summary;
mod generator;
mod gh;
mod git;
mod llm;
mod logging;
mod setup;
mod template;
mod ticket;

use cli_args::{Cli, Command};
use config::Config;
use generator::PrGenerator;
use git::RepositoryFacts;
use ticket::TicketId;

/// Ask the user a question and return a trimmed input line.
fn prompt_input(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut buf = String::new();
    io::stdin().read_line(&mut buf)?;
    Ok(buf.trim().to_string())
}

/// Yes/no question with a default for plain Enter.
fn prompt_confirm(prompt: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "[Y/n]" } else { "[y/N]" };
    let answer = prompt_input(&format!("{prompt} {hint}: "))?;
    Ok(match answer.to_lowercase().as_str() {
        "" => default_yes,
        "y" | "yes" => true,
        _ => false,
    })
}

/// Ticket resolution: regex, then generative fallback, then manual entry.
fn resolve_ticket(branch: &str, pattern: &str, client: &dyn llm::GenerationClient) -> Result<TicketId> {
    if let Some(ticket) = ticket::resolve(branch, pattern, Some(client)) {
        println!("Ticket number: {ticket}");
        return Ok(ticket);
    }

    println!("Could not extract a ticket number from branch '{branch}'.");
    let input = prompt_input("Please enter ticket number (e.g. STAR-12345) [STAR-0000]: ")?;
    let value = if input.is_empty() { "STAR-0000".to_string() } else { input };
    Ok(TicketId::new(value))
}

/// Keep asking until the user describes what the change is for.
fn prompt_user_intent() -> Result<String> {
    println!();
    println!("What is the purpose of this change?");
    println!("(this grounds the generated title and description)");

    loop {
        let intent = prompt_input("Purpose: ")?;
        if !intent.is_empty() {
            return Ok(intent);
        }
        println!("Please provide a description of your changes.");
    }
}

/// Offer to commit a dirty working tree with a generated message before
/// drafting the PR.
fn maybe_commit_changes(generator: &PrGenerator<'_>, ticket: &TicketId) -> Result<()> {
    if !git::has_uncommitted_changes()? {
        return Ok(());
    }

    println!("You have uncommitted changes.");
    if !prompt_confirm("Would you like me to commit these changes?", true)? {
        if !prompt_confirm("Continue without committing?", false)? {
            anyhow::bail!("aborted");
        }
        return Ok(());
    }

    let files = git::uncommitted_files()?;
    if files.is_empty() {
        println!("No files to commit.");
        return Ok(());
    }

    let diff = git::uncommitted_diff()?;
    let message = generator.generate_commit_message(ticket, &files, &diff)?;

    println!();
    println!("Suggested commit message:");
    println!("  {message}");

    if prompt_confirm("Use this commit message?", true)? {
        git::stage_all()?;
        git::create_commit(&message)?;
        println!("Changes committed.");
    } else if !prompt_confirm("Continue without committing?", false)? {
        anyhow::bail!("aborted");
    }

    Ok(())
}

fn print_preview(title: &str, description: &str, base_branch: &str) {
    println!();
    println!("----- PR Preview -----");
    println!("Title: {title}");
    println!("Base branch: {base_branch}");
    println!();
    println!("{description}");
    println!("----------------------");
}

fn run_create(cli: &Cli) -> Result<()> {
    let cfg = Config::from_sources(cli);

    git::ensure_repo()?;
    if !cli.dry_run {
        gh::check_auth()?;
    }

    let base_branch = git::detect_base_branch(&cfg.base_branch)?;
    let branch = git::current_branch()?;
    println!("Current branch: {branch}");

    let client = setup::build_generation_client(&cfg, cli.no_model)?;
    let generator = PrGenerator::new(client.as_ref(), cfg.max_diff_chars);

    let ticket = resolve_ticket(&branch, &cfg.ticket_pattern, client.as_ref())?;

    maybe_commit_changes(&generator, &ticket)?;

    let commit_count = git::commit_count(&base_branch)?;
    if commit_count == 0 {
        anyhow::bail!(
            "No commits found on '{branch}' compared to '{base_branch}'. \
             Commit your changes and make sure you are not on the base branch."
        );
    }
    println!("Found {commit_count} commit(s) to include in the PR.");

    let user_intent = prompt_user_intent()?;

    let repo_root = git::repo_root()?;
    let sections = template::resolve_sections(&repo_root);
    let facts = RepositoryFacts::gather(&base_branch)?;

    println!();
    println!("Generating PR content...");
    let title = generator.generate_title(&ticket, &branch, &user_intent)?;
    let mut description = generator.generate_description(&facts, &user_intent, &sections, &[])?;

    // Preview loop: accept, abort, or regenerate with feedback.
    let mut feedback: Vec<String> = Vec::new();
    loop {
        print_preview(&title, &description, &base_branch);

        if cli.dry_run {
            println!("Dry run mode - PR not created");
            return Ok(());
        }

        let answer =
            prompt_input("Create this pull request? [Y]es / [n]o / [r]egenerate with feedback: ")?;
        match answer.to_lowercase().as_str() {
            "" | "y" | "yes" => break,
            "n" | "no" => {
                println!("PR creation cancelled.");
                return Ok(());
            }
            "r" | "regenerate" => {
                let note = prompt_input("Feedback: ")?;
                if !note.is_empty() {
                    feedback.push(note);
                }
                println!();
                println!("Regenerating with {} feedback item(s)...", feedback.len());
                description =
                    generator.generate_description(&facts, &user_intent, &sections, &feedback)?;
            }
            _ => println!("Please answer y, n, or r."),
        }
    }

    if !gh::remote_branch_exists(&branch) {
        println!("Branch not pushed to remote yet.");
        if prompt_confirm("Push branch now?", true)? {
            gh::push_current_branch()?;
            println!("Branch pushed.");
        } else {
            anyhow::bail!("cannot create a PR without pushing the branch first");
        }
    }

    let url = gh::create_pull_request(
        &title,
        &description,
        &base_branch,
        cfg.draft_pr,
        cfg.open_in_browser,
    )?;

    println!();
    println!("Pull request created successfully!");
    if !url.is_empty() {
        println!("URL: {url}");
    }
    Ok(())
}

fn run_init_config() -> Result<()> {
    let path = config::write_default_config()?;
    println!("Created default config file at: {}", path.display());
    println!("Edit this file to customize prbot settings.");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    match &cli.command {
        Some(Command::InitConfig) => run_init_config(),
        Some(Command::Create) | None => run_create(&cli),
    }
}
