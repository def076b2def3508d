//! Bundle stage: stage install trees under one product directory, pack them
//! into a compressed tar archive, and unpack that archive for verification.

use std::fs;
use std::path::PathBuf;

use crate::config::{Config, PRODUCT_NAME};
use crate::error::{Error, Result};
use crate::fsops;
use crate::log_status;
use crate::pipeline::InstallDirMap;
use crate::repos::{REPO_ENGINE, REPO_WORKBENCH};
use crate::runner::{self, Invocation};

const STAGE_DIR_NAME: &str = "bundle";
const EXTRACT_DIR_NAME: &str = "extracted";

/// Assemble the bundle archive at `cfg.bundle_archive_path`.
///
/// With an empty map (bundle requested without a preceding build stage) the
/// default build directories of the previous run are picked up instead.
pub fn create_bundle(cfg: &Config, install_dirs: &InstallDirMap) -> Result<()> {
    log_status!("Creating bundle archive...");

    let install_dirs = if install_dirs.is_empty() {
        default_install_dirs(cfg)?
    } else {
        install_dirs.clone()
    };

    let stage_dir = cfg.work_dir.join(STAGE_DIR_NAME).join(PRODUCT_NAME);
    if stage_dir.exists() {
        fs::remove_dir_all(&stage_dir)?;
    }
    fs::create_dir_all(&stage_dir)?;

    for (name, dir) in &install_dirs {
        log_status!("Staging component '{}' from '{}'", name, dir.display());
        fsops::copy_tree(dir, &stage_dir.join(name))?;
    }

    let pack = vec![
        "tar".to_string(),
        "-czf".to_string(),
        cfg.bundle_archive_path.display().to_string(),
        PRODUCT_NAME.to_string(),
    ];
    runner::run_checked(&Invocation::new(pack, &cfg.work_dir.join(STAGE_DIR_NAME)))?;

    log_status!("Bundle written to '{}'", cfg.bundle_archive_path.display());
    Ok(())
}

/// Unpack the bundle archive into a fresh extraction directory and return
/// the install directories found inside it.
pub fn extract_bundle(cfg: &Config) -> Result<InstallDirMap> {
    if !cfg.bundle_archive_path.is_file() {
        return Err(Error::Other(format!(
            "Bundle archive '{}' does not exist, run the bundle stage first",
            cfg.bundle_archive_path.display()
        )));
    }

    let extract_dir = cfg.work_dir.join(EXTRACT_DIR_NAME);
    if extract_dir.exists() {
        fs::remove_dir_all(&extract_dir)?;
    }
    fs::create_dir_all(&extract_dir)?;

    let unpack = vec![
        "tar".to_string(),
        "-xzf".to_string(),
        cfg.bundle_archive_path.display().to_string(),
    ];
    runner::run_checked(&Invocation::new(unpack, &extract_dir))?;

    extracted_install_dirs(cfg)
}

/// Install directories inside a previously extracted bundle.
pub fn extracted_install_dirs(cfg: &Config) -> Result<InstallDirMap> {
    let product_dir = cfg.work_dir.join(EXTRACT_DIR_NAME).join(PRODUCT_NAME);
    let mut map = InstallDirMap::new();
    for name in [REPO_ENGINE, REPO_WORKBENCH] {
        let dir = product_dir.join(name);
        if !dir.is_dir() {
            return Err(Error::MissingDirectory(dir));
        }
        map.insert(name.to_string(), dir);
    }
    Ok(map)
}

fn default_install_dirs(cfg: &Config) -> Result<InstallDirMap> {
    let mut map = InstallDirMap::new();
    for name in [REPO_ENGINE, REPO_WORKBENCH] {
        let dir = cfg.build_dir(name);
        if !dir.is_dir() {
            return Err(Error::MissingDirectory(dir));
        }
        map.insert(name.to_string(), dir);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use tempfile::tempdir;

    fn fixture() -> (tempfile::TempDir, Config) {
        let top = tempdir().unwrap();
        let cfg = Config::new(
            &Options::default(),
            Some(top.path().to_path_buf()),
            None,
        )
        .unwrap();
        (top, cfg)
    }

    fn seed_build_dirs(cfg: &Config) {
        for name in [REPO_ENGINE, REPO_WORKBENCH] {
            let dir = cfg.build_dir(name);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("artifact.bin"), name).unwrap();
        }
    }

    #[test]
    fn bundle_round_trip_restores_both_components() {
        let (_top, cfg) = fixture();
        seed_build_dirs(&cfg);

        create_bundle(&cfg, &InstallDirMap::new()).unwrap();
        assert!(cfg.bundle_archive_path.is_file());

        let dirs = extract_bundle(&cfg).unwrap();
        assert_eq!(dirs.len(), 2);
        let engine = &dirs[REPO_ENGINE];
        assert_eq!(
            fs::read_to_string(engine.join("artifact.bin")).unwrap(),
            REPO_ENGINE
        );
    }

    #[test]
    fn bundling_without_build_output_fails() {
        let (_top, cfg) = fixture();
        let err = create_bundle(&cfg, &InstallDirMap::new()).unwrap_err();
        assert!(matches!(err, Error::MissingDirectory(_)));
    }

    #[test]
    fn extracting_without_an_archive_fails() {
        let (_top, cfg) = fixture();
        let err = extract_bundle(&cfg).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
