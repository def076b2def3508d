//! Run configuration built once at startup.
//!
//! All host introspection (OS identity, directory layout, archive naming)
//! happens here; the rest of the pipeline receives a `Config` reference and
//! never reads ambient global state.

use std::env;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::options::Options;

/// Name of the assembled product and of the top-level directory inside the
/// bundle archive.
pub const PRODUCT_NAME: &str = "shipwright-suite";

pub const WORK_DIR_NAME: &str = "work";
pub const BUNDLE_EXT: &str = "tar.gz";
pub const RELEASES_DIR_NAME: &str = "releases";
pub const BUILDS_DIR_NAME: &str = "builds";
pub const DATA_DIR_NAME: &str = "release-data";

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory containing all repository checkouts.
    pub top_dir: PathBuf,
    /// Scratch directory for build, bundle and extraction output.
    pub work_dir: PathBuf,
    /// Root of the release-data tree (`releases/`, `builds/`).
    pub data_dir: PathBuf,
    /// Simplified OS identity, e.g. `Linux-x86_64`.
    pub os_name: String,
    /// Release version label or `internal`.
    pub release_label: String,
    /// Full path of the result bundle archive.
    pub bundle_archive_path: PathBuf,
}

impl Config {
    /// Build the configuration from options and optional directory
    /// overrides. Without an override the top directory is the parent of
    /// the current working directory, mirroring a checkout layout where the
    /// tool runs from inside one repository among its siblings.
    pub fn new(
        opts: &Options,
        top_dir: Option<PathBuf>,
        data_dir: Option<PathBuf>,
    ) -> Result<Config> {
        let top_dir = match top_dir {
            Some(dir) => dir,
            None => {
                let cwd = env::current_dir()?;
                cwd.parent()
                    .map(Path::to_path_buf)
                    .ok_or_else(|| {
                        Error::Config("Cannot determine top directory from cwd".to_string())
                    })?
            }
        };
        let work_dir = top_dir.join(WORK_DIR_NAME);
        let data_dir = data_dir.unwrap_or_else(|| top_dir.join(DATA_DIR_NAME));

        let os_name = format!("{}-{}", simplified_os(), env::consts::ARCH);
        let release_label = opts.release_label().to_string();

        let archive_name = format!(
            "{}-{}-{}-{}.{}",
            PRODUCT_NAME,
            release_label,
            os_name,
            Local::now().format("%Y%m%d"),
            BUNDLE_EXT
        );
        let bundle_archive_path = work_dir.join(archive_name);

        Ok(Config {
            top_dir,
            work_dir,
            data_dir,
            os_name,
            release_label,
            bundle_archive_path,
        })
    }

    pub fn repo_dir(&self, name: &str) -> PathBuf {
        self.top_dir.join(name)
    }

    pub fn build_dir(&self, name: &str) -> PathBuf {
        self.work_dir.join(format!("build_{}", name))
    }

    pub fn releases_dir(&self) -> PathBuf {
        self.data_dir.join(RELEASES_DIR_NAME)
    }

    pub fn builds_dir(&self) -> PathBuf {
        self.data_dir.join(BUILDS_DIR_NAME)
    }

    pub fn is_release(&self) -> bool {
        self.release_label != "internal"
    }

    pub fn platform_info(&self) -> PlatformInfo {
        PlatformInfo {
            os_name: self.os_name.clone(),
            top_dir: self.top_dir.display().to_string(),
            work_dir: self.work_dir.display().to_string(),
            bundle_archive_path: self.bundle_archive_path.display().to_string(),
        }
    }
}

/// Platform-dependent names, printed by `shipwright info`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformInfo {
    pub os_name: String,
    pub top_dir: String,
    pub work_dir: String,
    pub bundle_archive_path: String,
}

fn simplified_os() -> String {
    match env::consts::OS {
        "linux" => "Linux".to_string(),
        "macos" => "macOS".to_string(),
        "windows" => "Windows".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(opts: &Options) -> Config {
        Config::new(
            opts,
            Some(PathBuf::from("/tmp/checkout")),
            None,
        )
        .unwrap()
    }

    #[test]
    fn directories_hang_off_the_top_dir() {
        let cfg = config_with(&Options::default());
        assert_eq!(cfg.work_dir, PathBuf::from("/tmp/checkout/work"));
        assert_eq!(cfg.repo_dir("engine"), PathBuf::from("/tmp/checkout/engine"));
        assert_eq!(
            cfg.build_dir("engine"),
            PathBuf::from("/tmp/checkout/work/build_engine")
        );
        assert!(cfg.releases_dir().ends_with("release-data/releases"));
    }

    #[test]
    fn archive_name_carries_label_and_os_identity() {
        let opts = Options {
            release_version: Some("4.2".to_string()),
            ..Options::default()
        };
        let cfg = config_with(&opts);
        let name = cfg
            .bundle_archive_path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .to_string();
        assert!(name.starts_with(PRODUCT_NAME));
        assert!(name.contains("4.2"));
        assert!(name.contains(&cfg.os_name));
        assert!(name.ends_with(BUNDLE_EXT));
        assert!(cfg.is_release());
    }

    #[test]
    fn internal_builds_are_not_releases() {
        let cfg = config_with(&Options::default());
        assert_eq!(cfg.release_label, "internal");
        assert!(!cfg.is_release());
    }
}
