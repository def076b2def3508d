use crate::repos::{self, DEFAULT_BRANCH};

/// Immutable-after-parse configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct Options {
    /// Branch requested for all base repositories.
    pub branch: String,
    /// Additionally `pull` after checkout.
    pub update: bool,
    /// Tolerate dirty working trees everywhere, not only on the allow-list.
    pub ignore_dirty: bool,
    /// Build the debug variant of the components.
    pub debug: bool,
    /// Clone over SSH instead of HTTPS.
    pub ssh: bool,
    /// Use the private repository mirrors.
    pub private_repos: bool,
    /// Release version label; `None` marks an internal, unversioned build.
    pub release_version: Option<String>,
    /// Copy the result archive into the release-data directory.
    pub store: bool,

    // Explicit stage selection. When none of these is set, the default
    // subset applies (sync + build).
    pub do_sync: bool,
    pub do_build: bool,
    pub do_bundle: bool,
    pub do_test: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            branch: DEFAULT_BRANCH.to_string(),
            update: false,
            ignore_dirty: false,
            debug: false,
            ssh: false,
            private_repos: false,
            release_version: None,
            store: false,
            do_sync: false,
            do_build: false,
            do_bundle: false,
            do_test: false,
        }
    }
}

/// Which stages an actual run executes, in fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagePlan {
    pub sync: bool,
    pub build: bool,
    pub bundle: bool,
    pub test: bool,
    pub store: bool,
}

impl Options {
    /// Resolve the stage subset. With no stage explicitly requested, sync
    /// and build run; bundle and test stay off. Store always needs its own
    /// flag.
    pub fn stage_plan(&self) -> StagePlan {
        let any_explicit = self.do_sync || self.do_build || self.do_bundle || self.do_test;
        if any_explicit {
            StagePlan {
                sync: self.do_sync,
                build: self.do_build,
                bundle: self.do_bundle,
                test: self.do_test,
                store: self.store,
            }
        } else {
            StagePlan {
                sync: true,
                build: true,
                bundle: false,
                test: false,
                store: self.store,
            }
        }
    }

    /// Remote base URL variant selected by the ssh / private flags.
    pub fn base_url(&self) -> &'static str {
        if self.private_repos {
            repos::BASE_URL_PRIVATE_SSH
        } else if self.ssh {
            repos::BASE_URL_SSH
        } else {
            repos::BASE_URL_HTTPS
        }
    }

    /// Label used in archive names and for the store-stage target choice.
    pub fn release_label(&self) -> &str {
        self.release_version.as_deref().unwrap_or("internal")
    }
}
