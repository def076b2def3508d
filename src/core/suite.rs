//! Test stage: hand the extracted bundle to the suite repository's runner.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::log_status;
use crate::pipeline::InstallDirMap;
use crate::repos::{REPO_ENGINE, REPO_SUITE, REPO_WORKBENCH};
use crate::runner::{self, Invocation, SUITE_TIMEOUT_SECS};

/// Entry point script inside the suite repository.
pub const SUITE_RUNNER: &str = "run_suite.py";

/// Run the validation suite against the given install directories.
///
/// With an empty map (test stage requested on its own) the directories are
/// taken from the extracted bundle of a previous run.
pub fn run_suite(cfg: &Config, install_dirs: &InstallDirMap) -> Result<()> {
    log_status!("Running validation suite...");

    let install_dirs = if install_dirs.is_empty() {
        crate::bundle::extracted_install_dirs(cfg)?
    } else {
        install_dirs.clone()
    };

    let suite_dir = cfg.repo_dir(REPO_SUITE);
    if !suite_dir.is_dir() {
        return Err(Error::MissingDirectory(suite_dir));
    }

    let engine_dir = install_dirs
        .get(REPO_ENGINE)
        .ok_or_else(|| Error::Other("No engine install directory for the suite".to_string()))?;
    let workbench_dir = install_dirs
        .get(REPO_WORKBENCH)
        .ok_or_else(|| Error::Other("No workbench install directory for the suite".to_string()))?;

    let cmd = vec![
        suite_dir.join(SUITE_RUNNER).display().to_string(),
        "--engine-dir".to_string(),
        engine_dir.display().to_string(),
        "--workbench-dir".to_string(),
        workbench_dir.display().to_string(),
    ];
    runner::run_checked(
        &Invocation::new(cmd, &suite_dir)
            .via_shell()
            .timeout_secs(SUITE_TIMEOUT_SECS),
    )
}
