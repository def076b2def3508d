use std::path::PathBuf;

use clap::Args;

use shipwright::config::Config;
use shipwright::options::Options;
use shipwright::Result;

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Directory containing the repository checkouts
    #[arg(long, value_name = "DIR")]
    pub top_dir: Option<PathBuf>,
}

/// Print the platform-dependent names and directories as JSON.
pub fn run(args: InfoArgs) -> Result<()> {
    let cfg = Config::new(&Options::default(), args.top_dir, None)?;
    println!("{}", serde_json::to_string_pretty(&cfg.platform_info())?);
    Ok(())
}
