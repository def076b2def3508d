//! Build stage: invoke each component's native build tooling.
//!
//! The concrete configure/compile flags are data, not logic; every
//! invocation goes through the guarded runner with a bounded timeout.

use std::fs;
use std::thread;

use crate::config::Config;
use crate::error::Result;
use crate::options::Options;
use crate::pipeline::InstallDirMap;
use crate::repos::{REPO_ENGINE, REPO_MESHER, REPO_WORKBENCH};
use crate::runner::{self, Invocation, BUILD_TIMEOUT_SECS};
use crate::{log_status, log_warning};

/// Build all components, returning where each one was installed.
pub fn build_all(cfg: &Config, opts: &Options) -> Result<InstallDirMap> {
    let mut install_dirs = InstallDirMap::new();

    install_dirs.insert(REPO_ENGINE.to_string(), build_engine(cfg, opts)?);
    install_dirs.insert(REPO_WORKBENCH.to_string(), build_workbench(cfg)?);

    // Best effort: a failed mesher build degrades the bundle but does not
    // block the release of the other components.
    build_mesher(cfg, opts)?;

    Ok(install_dirs)
}

fn build_engine(cfg: &Config, opts: &Options) -> Result<std::path::PathBuf> {
    log_status!("Running engine build...");
    let build_dir = cfg.build_dir(REPO_ENGINE);
    fs::create_dir_all(&build_dir)?;

    let build_type = if opts.debug { "Debug" } else { "Release" };
    let configure = vec![
        "cmake".to_string(),
        cfg.repo_dir(REPO_ENGINE).display().to_string(),
        format!("-DCMAKE_BUILD_TYPE={}", build_type),
    ];
    runner::run_checked(&Invocation::new(configure, &build_dir))?;

    let compile = vec!["make".to_string(), format!("-j{}", parallel_jobs())];
    runner::run_checked(
        &Invocation::new(compile, &build_dir).timeout_secs(BUILD_TIMEOUT_SECS),
    )?;

    Ok(build_dir)
}

fn build_workbench(cfg: &Config) -> Result<std::path::PathBuf> {
    log_status!("Running workbench build...");
    let install_dir = cfg.build_dir(REPO_WORKBENCH);
    fs::create_dir_all(&install_dir)?;

    // In-source build; the makefile installs straight into our work tree.
    let compile = vec![
        "make".to_string(),
        "-f".to_string(),
        "Makefile".to_string(),
        "install".to_string(),
        format!("INSTALL_DIR={}", install_dir.display()),
    ];
    runner::run_checked(
        &Invocation::new(compile, &cfg.repo_dir(REPO_WORKBENCH))
            .timeout_secs(BUILD_TIMEOUT_SECS),
    )?;

    Ok(install_dir)
}

/// The only call site in the pipeline that tolerates a non-zero exit code.
fn build_mesher(cfg: &Config, opts: &Options) -> Result<()> {
    log_status!("Running mesher build (best effort)...");
    let build_dir = cfg.build_dir(REPO_MESHER);
    fs::create_dir_all(&build_dir)?;

    let build_type = if opts.debug { "Debug" } else { "Release" };
    let log_file = build_dir.join("mesher_build.log");

    let configure = vec![
        "cmake".to_string(),
        cfg.repo_dir(REPO_MESHER).display().to_string(),
        format!("-DCMAKE_BUILD_TYPE={}", build_type),
    ];
    let outcome = runner::run(&Invocation::new(configure, &build_dir).output_file(&log_file))?;
    if outcome.success() {
        let compile = vec!["make".to_string(), format!("-j{}", parallel_jobs())];
        let outcome = runner::run(
            &Invocation::new(compile, &build_dir)
                .timeout_secs(BUILD_TIMEOUT_SECS)
                .output_file(&log_file),
        )?;
        if outcome.success() {
            return Ok(());
        }
    }

    log_warning!(
        "Mesher build failed, continuing without it (see '{}').",
        log_file.display()
    );
    Ok(())
}

/// Half the available cores, at least one.
fn parallel_jobs() -> usize {
    let cores = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    (cores / 2).max(1)
}
