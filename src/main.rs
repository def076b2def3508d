use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

use commands::{clean, info, repos, run};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "shipwright")]
#[command(version = VERSION)]
#[command(about = "Multi-repository release pipeline for the shipwright suite")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the release pipeline stages
    Run(run::RunArgs),
    /// Remove the work directory
    Clean(clean::CleanArgs),
    /// Print platform-dependent names and directories
    Info(info::InfoArgs),
    /// Bulk git operations across all repositories
    Repos(repos::ReposArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => run::run(args),
        Commands::Clean(args) => clean::run(args),
        Commands::Info(args) => info::run(args),
        Commands::Repos(args) => repos::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("* Error: {} [{}]", err, err.code());
            ExitCode::FAILURE
        }
    }
}
