use std::path::PathBuf;

use clap::{Args, Subcommand};

use shipwright::config::Config;
use shipwright::options::Options;
use shipwright::repos::REPOSITORIES;
use shipwright::vcs::{SystemGit, Vcs};
use shipwright::{log_status, log_warning, Result};

#[derive(Args, Debug)]
pub struct ReposArgs {
    #[command(subcommand)]
    pub command: ReposCommand,

    /// Directory containing the repository checkouts
    #[arg(long, value_name = "DIR", global = true)]
    pub top_dir: Option<PathBuf>,
}

/// Bulk git operations across every repository of the set.
#[derive(Subcommand, Debug)]
pub enum ReposCommand {
    /// Pull the current branch in all repositories
    Pull,
    /// Push the current branch in all repositories
    Push,
    /// Discard uncommitted changes in all repositories
    Reset,
    /// Create an annotated tag in all repositories
    Tag {
        /// Tag name, also used as the tag message
        name: String,
    },
}

pub fn run(args: ReposArgs) -> Result<()> {
    let cfg = Config::new(&Options::default(), args.top_dir, None)?;
    let git = SystemGit;

    for repo in REPOSITORIES {
        let dir = cfg.repo_dir(repo.name);
        if !dir.is_dir() {
            log_warning!("Repository '{}' is not checked out, skipping.", repo.name);
            continue;
        }
        log_status!("--- {} ---", repo.name);
        match &args.command {
            ReposCommand::Pull => git.pull(&dir)?,
            ReposCommand::Push => git.push(&dir)?,
            ReposCommand::Reset => git.reset_hard(&dir)?,
            ReposCommand::Tag { name } => git.tag(&dir, name)?,
        }
    }
    Ok(())
}
