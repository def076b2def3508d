//! Stage sequencing for one pipeline run.
//!
//! Stages run in fixed order (sync, build, bundle, test, store), each gated
//! by its enable flag, threading the component -> install-directory map into
//! the next stage. Any failure inside a stage ends the run; there is no
//! partial-stage retry and stages never overlap.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::build;
use crate::bundle;
use crate::config::Config;
use crate::error::Result;
use crate::log_status;
use crate::manifest;
use crate::options::Options;
use crate::store;
use crate::suite;
use crate::sync::SyncEngine;
use crate::vcs::Vcs;

/// Component name -> directory where it was built or installed. Entries are
/// added, never removed, within a single run.
pub type InstallDirMap = BTreeMap<String, PathBuf>;

/// Execute the enabled stages of the pipeline.
pub fn run(cfg: &Config, opts: &Options, vcs: &dyn Vcs) -> Result<()> {
    let plan = opts.stage_plan();

    if plan.sync {
        SyncEngine::new(cfg, opts, vcs).sync_all()?;
    }

    let mut install_dirs = InstallDirMap::new();
    if plan.build {
        manifest::write(cfg, vcs)?;
        install_dirs = build::build_all(cfg, opts)?;
    }

    if plan.bundle {
        bundle::create_bundle(cfg, &install_dirs)?;
        // Extract right away so a following test stage runs against the
        // exact content of the archive.
        install_dirs = bundle::extract_bundle(cfg)?;
    }

    if plan.test {
        suite::run_suite(cfg, &install_dirs)?;
    }

    if plan.store {
        store::store_archive(cfg)?;
    }

    log_status!("--- All stages finished successfully ---");
    Ok(())
}
