use std::path::PathBuf;

use clap::Args;

use shipwright::config::Config;
use shipwright::options::Options;
use shipwright::pipeline;
use shipwright::vcs::SystemGit;
use shipwright::Result;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Branch to check out in base repositories
    #[arg(short, long, default_value = shipwright::repos::DEFAULT_BRANCH)]
    pub branch: String,

    /// Pull the latest commits after checkout
    #[arg(short, long)]
    pub update: bool,

    /// Tolerate uncommitted changes in every repository
    #[arg(long)]
    pub ignore_dirty: bool,

    /// Build debug variants of the components
    #[arg(short, long)]
    pub debug: bool,

    /// Clone over SSH instead of HTTPS
    #[arg(long)]
    pub ssh: bool,

    /// Use the private repository mirrors (implies SSH)
    #[arg(long)]
    pub private_repos: bool,

    /// Release version label; omit for an internal build
    #[arg(short, long, value_name = "VERSION")]
    pub release: Option<String>,

    /// Copy the finished archive into the release-data tree
    #[arg(long)]
    pub store: bool,

    /// Run the sync stage
    #[arg(long = "sync")]
    pub do_sync: bool,

    /// Run the build stage
    #[arg(long = "build")]
    pub do_build: bool,

    /// Run the bundle stage
    #[arg(long = "bundle")]
    pub do_bundle: bool,

    /// Run the test stage
    #[arg(long = "test")]
    pub do_test: bool,

    /// Directory containing the repository checkouts
    #[arg(long, value_name = "DIR")]
    pub top_dir: Option<PathBuf>,

    /// Root of the release-data tree
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

impl RunArgs {
    fn into_options(self) -> (Options, Option<PathBuf>, Option<PathBuf>) {
        let opts = Options {
            branch: self.branch,
            update: self.update,
            ignore_dirty: self.ignore_dirty,
            debug: self.debug,
            ssh: self.ssh,
            private_repos: self.private_repos,
            release_version: self.release,
            store: self.store,
            do_sync: self.do_sync,
            do_build: self.do_build,
            do_bundle: self.do_bundle,
            do_test: self.do_test,
        };
        (opts, self.top_dir, self.data_dir)
    }
}

pub fn run(args: RunArgs) -> Result<()> {
    let (opts, top_dir, data_dir) = args.into_options();
    let cfg = Config::new(&opts, top_dir, data_dir)?;
    pipeline::run(&cfg, &opts, &SystemGit)
}
