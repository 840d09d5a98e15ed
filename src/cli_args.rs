use clap::{ArgAction, ArgGroup, Parser, Subcommand};

/// CLI options
#[derive(Parser, Debug)]
#[command(
    name = "prbot",
    version,
    about = "LLM-assisted pull request title and description generator"
)]
#[command(group(
    ArgGroup::new("model_group")
        .args(["model", "no_model"])
        .multiple(false)
))]
pub struct Cli {
    /// Base branch for the PR (default: from config or 'main')
    #[arg(long, short = 'b', global = true)]
    pub base_branch: Option<String>,

    /// Model name to use (e.g. claude-haiku-4.5). If 'none', acts like --no-model.
    #[arg(long, short = 'm', global = true)]
    pub model: Option<String>,

    /// Disable model calls; return dummy responses instead
    #[arg(long, global = true)]
    pub no_model: bool,

    /// GitHub token with Copilot access (otherwise uses GITHUB_TOKEN env var)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub github_token: Option<String>,

    /// Create as draft PR
    #[arg(long, short = 'd', global = true)]
    pub draft: bool,

    /// Open PR in browser after creation
    #[arg(long, short = 'w', global = true)]
    pub web: bool,

    /// Preview the PR without creating it
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand; omitting it runs `create`
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands, e.g. `prbot create -b develop`
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a pull request with a generated title and description
    Create,

    /// Write a default configuration file to ~/.config/prbot.toml
    InitConfig,
}
