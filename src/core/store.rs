//! Store stage: move the finished archive into the release-data tree.

use std::fs;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::log_status;

/// Copy the bundle archive into `releases/` for release builds and
/// `builds/` for internal ones.
pub fn store_archive(cfg: &Config) -> Result<()> {
    if !cfg.bundle_archive_path.is_file() {
        return Err(Error::Other(format!(
            "Bundle archive '{}' does not exist, nothing to store",
            cfg.bundle_archive_path.display()
        )));
    }

    let target_dir = if cfg.is_release() {
        cfg.releases_dir()
    } else {
        cfg.builds_dir()
    };
    if !target_dir.is_dir() {
        return Err(Error::Config(format!(
            "Storage directory '{}' does not exist; the archive remains at '{}'",
            target_dir.display(),
            cfg.bundle_archive_path.display()
        )));
    }

    let file_name = cfg
        .bundle_archive_path
        .file_name()
        .ok_or_else(|| Error::Other("Bundle archive path has no file name".to_string()))?;
    let target = target_dir.join(file_name);
    fs::copy(&cfg.bundle_archive_path, &target)?;

    log_status!("Stored archive as '{}'", target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use tempfile::tempdir;

    fn fixture(release: Option<&str>) -> (tempfile::TempDir, Config) {
        let top = tempdir().unwrap();
        let opts = Options {
            release_version: release.map(|v| v.to_string()),
            ..Options::default()
        };
        let cfg = Config::new(&opts, Some(top.path().to_path_buf()), None).unwrap();
        fs::create_dir_all(&cfg.work_dir).unwrap();
        fs::write(&cfg.bundle_archive_path, b"archive").unwrap();
        (top, cfg)
    }

    #[test]
    fn internal_archives_land_in_builds() {
        let (_top, cfg) = fixture(None);
        fs::create_dir_all(cfg.builds_dir()).unwrap();

        store_archive(&cfg).unwrap();

        let name = cfg.bundle_archive_path.file_name().unwrap();
        assert!(cfg.builds_dir().join(name).is_file());
    }

    #[test]
    fn release_archives_land_in_releases() {
        let (_top, cfg) = fixture(Some("4.2"));
        fs::create_dir_all(cfg.releases_dir()).unwrap();

        store_archive(&cfg).unwrap();

        let name = cfg.bundle_archive_path.file_name().unwrap();
        assert!(cfg.releases_dir().join(name).is_file());
        assert!(!cfg.builds_dir().exists());
    }

    #[test]
    fn missing_storage_directory_reports_where_the_archive_is() {
        let (_top, cfg) = fixture(None);

        let err = store_archive(&cfg).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("does not exist"));
        assert!(message.contains(&cfg.bundle_archive_path.display().to_string()));
    }

    #[test]
    fn storing_without_an_archive_fails() {
        let top = tempdir().unwrap();
        let cfg = Config::new(
            &Options::default(),
            Some(top.path().to_path_buf()),
            None,
        )
        .unwrap();

        let err = store_archive(&cfg).unwrap_err();
        assert!(err.to_string().contains("nothing to store"));
    }
}
