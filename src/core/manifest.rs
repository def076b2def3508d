//! Release manifest written before the build stage starts.
//!
//! A plain-text record of what went into a run: product and release label,
//! host platform, and the exact commit each repository was checked out at.

use std::fs;
use std::path::PathBuf;

use chrono::Local;

use crate::config::{Config, PRODUCT_NAME};
use crate::error::Result;
use crate::log_warning;
use crate::repos::REPOSITORIES;
use crate::vcs::Vcs;

pub const MANIFEST_FILE_NAME: &str = "release-manifest.txt";

/// Write the manifest into the work directory, returning its path.
pub fn write(cfg: &Config, vcs: &dyn Vcs) -> Result<PathBuf> {
    fs::create_dir_all(&cfg.work_dir)?;

    let mut lines = Vec::new();
    lines.push(format!("product: {}", PRODUCT_NAME));
    lines.push(format!("release: {}", cfg.release_label));
    lines.push(format!("os: {}", cfg.os_name));
    lines.push(format!("arch: {}", std::env::consts::ARCH));
    lines.push(format!("date: {}", Local::now().format("%Y-%m-%d %H:%M:%S")));
    lines.push(format!("git: {}", vcs.version()?));
    lines.push(String::new());

    for repo in REPOSITORIES {
        let dir = cfg.repo_dir(repo.name);
        if !dir.is_dir() {
            log_warning!(
                "Repository '{}' is not checked out, leaving it out of the manifest.",
                repo.name
            );
            continue;
        }
        let commit = vcs.head_commit(&dir)?;
        let branch = vcs.branch_description(&dir)?;
        lines.push(format!("{}: {} ({})", repo.name, commit, branch));
    }

    let path = cfg.work_dir.join(MANIFEST_FILE_NAME);
    fs::write(&path, lines.join("\n") + "\n")?;
    Ok(path)
}
