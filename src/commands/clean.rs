use std::fs;
use std::path::PathBuf;

use clap::Args;

use shipwright::config::Config;
use shipwright::log_status;
use shipwright::options::Options;
use shipwright::Result;

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Directory containing the repository checkouts
    #[arg(long, value_name = "DIR")]
    pub top_dir: Option<PathBuf>,
}

/// Remove the work directory with all build, bundle and extraction output.
pub fn run(args: CleanArgs) -> Result<()> {
    let cfg = Config::new(&Options::default(), args.top_dir, None)?;
    if !cfg.work_dir.exists() {
        log_status!("Nothing to clean in '{}'", cfg.work_dir.display());
        return Ok(());
    }
    fs::remove_dir_all(&cfg.work_dir)?;
    log_status!("Removed '{}'", cfg.work_dir.display());
    Ok(())
}
