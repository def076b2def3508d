//! Repository synchronization: bring every declared repository to a known,
//! consistent, checked-out state before any build stage runs.
//!
//! Per repository: clone if absent, fetch, resolve the target branch through
//! the fallback chain, gate on working-tree cleanliness, check out, and
//! optionally pull. Branch resolution degrades with warnings instead of
//! aborting a whole multi-repository checkout because one fork has not cut a
//! matching branch yet.

use semver::Version;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::repos::{
    self, Repository, DEFAULT_BRANCH, MIN_GIT_VERSION, ORIGIN, REPOSITORIES,
};
use crate::vcs::Vcs;
use crate::{log_status, log_warning};

pub struct SyncEngine<'a> {
    cfg: &'a Config,
    opts: &'a Options,
    vcs: &'a dyn Vcs,
}

impl<'a> SyncEngine<'a> {
    pub fn new(cfg: &'a Config, opts: &'a Options, vcs: &'a dyn Vcs) -> Self {
        SyncEngine { cfg, opts, vcs }
    }

    /// Synchronize every declared repository, in declaration order.
    pub fn sync_all(&self) -> Result<()> {
        self.check_git_version()?;
        for repo in REPOSITORIES {
            log_status!("--- Preparing repository '{}' ---", repo.name);
            self.sync_repo(repo)?;
        }
        Ok(())
    }

    /// One repository through the full state machine.
    pub fn sync_repo(&self, repo: &Repository) -> Result<()> {
        let repo_dir = self.cfg.repo_dir(repo.name);

        if !repo_dir.exists() {
            log_status!("Repository '{}' does not exist, cloning it...", repo.name);
            let url = format!("{}{}", self.opts.base_url(), repo.name);
            self.vcs.clone_repo(&self.cfg.top_dir, &url)?;
        } else {
            log_status!(
                "Repository '{}' already exists, no need to clone it.",
                repo.name
            );
        }

        self.vcs.fetch(&repo_dir)?;

        let target = self.resolve_branch(repo)?;

        if !self.vcs.is_workdir_clean(&repo_dir)? {
            if self.opts.ignore_dirty || repo.dirty_allowed {
                log_warning!(
                    "Repository '{}' is not clean, but this repo is allowed to be dirty.",
                    repo.name
                );
            } else {
                return Err(Error::DirtyWorkTree(repo.name.to_string()));
            }
        }

        log_status!("Checking out branch '{}'", target);
        self.vcs.checkout(&repo_dir, &target)?;

        if self.vcs.has_submodules(&repo_dir) {
            self.vcs.submodule_init_update(&repo_dir)?;
        }

        if self.opts.update {
            log_status!("Updating repository '{}'.", repo.name);
            self.vcs.pull(&repo_dir)?;
        }

        Ok(())
    }

    /// Resolve the branch to check out for one repository.
    ///
    /// Pinned forks use their fixed upstream branch. Otherwise the requested
    /// branch is used when `origin/<branch>` exists; when it does not, the
    /// fallback chain substitutes the version-line development branch, the
    /// forked-prefix default, or the plain global default. A fallback that is
    /// itself missing degrades once more to the bare global default.
    /// Resolution never fails: a bogus final candidate is handed to checkout,
    /// which surfaces the underlying tool error.
    pub fn resolve_branch(&self, repo: &Repository) -> Result<String> {
        if let Some(pinned) = repo.pinned_branch {
            return Ok(pinned.to_string());
        }

        let repo_dir = self.cfg.repo_dir(repo.name);
        let requested = &self.opts.branch;
        if self.vcs.remote_branch_exists(&repo_dir, requested)? {
            return Ok(requested.clone());
        }

        let fallback = if let Some(dev) = repos::version_line_dev_branch(requested) {
            dev
        } else if repo.forked {
            repos::forked_default_branch()
        } else {
            DEFAULT_BRANCH.to_string()
        };
        log_warning!(
            "Remote branch '{}/{}' does not exist in repository '{}', \
             falling back to '{}'.",
            ORIGIN,
            requested,
            repo.name,
            fallback
        );

        if fallback != DEFAULT_BRANCH && !self.vcs.remote_branch_exists(&repo_dir, &fallback)? {
            log_warning!(
                "Fallback branch '{}/{}' does not exist in repository '{}' either, \
                 using '{}'.",
                ORIGIN,
                fallback,
                repo.name,
                DEFAULT_BRANCH
            );
            return Ok(DEFAULT_BRANCH.to_string());
        }

        Ok(fallback)
    }

    /// Verify the host git meets the minimum version before touching any
    /// repository. Unparseable version strings only warn; old ones abort.
    fn check_git_version(&self) -> Result<()> {
        let reported = self.vcs.version()?;
        match parse_git_version(&reported) {
            Some(version) => {
                let minimum = Version::parse(MIN_GIT_VERSION)
                    .map_err(|e| Error::Config(format!("Bad MIN_GIT_VERSION: {}", e)))?;
                if version < minimum {
                    return Err(Error::Prerequisite(format!(
                        "Required at least git {}, found '{}'",
                        MIN_GIT_VERSION, reported
                    )));
                }
                log_status!("Checked {} - ok", reported);
            }
            None => {
                log_warning!("Could not parse git version from '{}'", reported);
            }
        }
        Ok(())
    }
}

/// Extract the numeric version from a `git --version` line, e.g.
/// `git version 2.39.2 (Apple Git-145)` -> `2.39.2`.
fn parse_git_version(reported: &str) -> Option<Version> {
    let raw = reported.split_whitespace().nth(2)?;
    // Keep only the leading dotted-numeric part.
    let numeric: String = raw
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let mut parts: Vec<&str> = numeric.split('.').filter(|p| !p.is_empty()).collect();
    while parts.len() < 3 {
        parts.push("0");
    }
    Version::parse(&parts[..3].join(".")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::{REPO_ENGINE, REPO_KINETICS, REPO_MESHER, REPO_SUITE, REPO_WORKBENCH};
    use crate::vcs::testing::MockVcs;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        cfg: Config,
    }

    /// Config rooted in a temp dir with all repository directories present,
    /// so sync skips the clone transition.
    fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        for repo in REPOSITORIES {
            fs::create_dir_all(tmp.path().join(repo.name)).unwrap();
        }
        let cfg = Config::new(
            &Options::default(),
            Some(tmp.path().to_path_buf()),
            None,
        )
        .unwrap();
        Fixture { _tmp: tmp, cfg }
    }

    fn opts_with_branch(branch: &str) -> Options {
        Options {
            branch: branch.to_string(),
            ..Options::default()
        }
    }

    fn repo(name: &str) -> &'static Repository {
        repos::find(name).unwrap()
    }

    #[test]
    fn existing_requested_branch_resolves_exactly() {
        let fx = fixture();
        let opts = opts_with_branch("release-9");
        let vcs = MockVcs::new().with_branches(REPO_ENGINE, &["develop", "release-9"]);
        let engine = SyncEngine::new(&fx.cfg, &opts, &vcs);
        assert_eq!(
            engine.resolve_branch(repo(REPO_ENGINE)).unwrap(),
            "release-9"
        );
    }

    #[test]
    fn forked_repo_falls_back_to_prefixed_default() {
        let fx = fixture();
        let opts = opts_with_branch("feature-x");
        let vcs = MockVcs::new().with_branches(REPO_KINETICS, &["develop", "sw-develop"]);
        let engine = SyncEngine::new(&fx.cfg, &opts, &vcs);
        assert_eq!(
            engine.resolve_branch(repo(REPO_KINETICS)).unwrap(),
            "sw-develop"
        );
    }

    #[test]
    fn forked_repo_degrades_to_bare_default_when_prefix_missing() {
        let fx = fixture();
        let opts = opts_with_branch("feature-x");
        let vcs = MockVcs::new().with_branches(REPO_KINETICS, &["develop"]);
        let engine = SyncEngine::new(&fx.cfg, &opts, &vcs);
        assert_eq!(
            engine.resolve_branch(repo(REPO_KINETICS)).unwrap(),
            DEFAULT_BRANCH
        );
    }

    #[test]
    fn base_repo_falls_back_to_global_default() {
        let fx = fixture();
        let opts = opts_with_branch("feature-x");
        let vcs = MockVcs::new().with_branches(REPO_WORKBENCH, &["develop"]);
        let engine = SyncEngine::new(&fx.cfg, &opts, &vcs);
        assert_eq!(
            engine.resolve_branch(repo(REPO_WORKBENCH)).unwrap(),
            DEFAULT_BRANCH
        );
    }

    #[test]
    fn known_version_line_falls_back_to_its_dev_branch() {
        let fx = fixture();
        let opts = opts_with_branch("release-4.1");
        let vcs = MockVcs::new().with_branches(REPO_ENGINE, &["develop", "release-4-dev"]);
        let engine = SyncEngine::new(&fx.cfg, &opts, &vcs);
        assert_eq!(
            engine.resolve_branch(repo(REPO_ENGINE)).unwrap(),
            "release-4-dev"
        );
    }

    #[test]
    fn missing_version_line_dev_branch_degrades_to_default() {
        let fx = fixture();
        let opts = opts_with_branch("release-4");
        let vcs = MockVcs::new().with_branches(REPO_ENGINE, &["develop"]);
        let engine = SyncEngine::new(&fx.cfg, &opts, &vcs);
        assert_eq!(
            engine.resolve_branch(repo(REPO_ENGINE)).unwrap(),
            DEFAULT_BRANCH
        );
    }

    #[test]
    fn pinned_fork_bypasses_resolution() {
        let fx = fixture();
        let opts = opts_with_branch("release-9");
        let vcs = MockVcs::new();
        let engine = SyncEngine::new(&fx.cfg, &opts, &vcs);
        assert_eq!(engine.resolve_branch(repo(REPO_MESHER)).unwrap(), "main");
    }

    #[test]
    fn dirty_unlisted_repo_aborts_without_checkout() {
        let fx = fixture();
        let opts = opts_with_branch("develop");
        let vcs = MockVcs::new()
            .with_branches(REPO_ENGINE, &["develop"])
            .with_dirty(REPO_ENGINE);
        let engine = SyncEngine::new(&fx.cfg, &opts, &vcs);

        let err = engine.sync_repo(repo(REPO_ENGINE)).unwrap_err();
        assert!(matches!(err, Error::DirtyWorkTree(_)));
        assert!(vcs.checked_out(REPO_ENGINE).is_none());
    }

    #[test]
    fn dirty_allowlisted_repo_warns_and_checks_out() {
        let fx = fixture();
        let opts = opts_with_branch("develop");
        let vcs = MockVcs::new()
            .with_branches(REPO_SUITE, &["develop"])
            .with_dirty(REPO_SUITE);
        let engine = SyncEngine::new(&fx.cfg, &opts, &vcs);

        engine.sync_repo(repo(REPO_SUITE)).unwrap();
        assert_eq!(vcs.checked_out(REPO_SUITE).unwrap(), "develop");
    }

    #[test]
    fn ignore_dirty_flag_overrides_the_gate() {
        let fx = fixture();
        let opts = Options {
            branch: "develop".to_string(),
            ignore_dirty: true,
            ..Options::default()
        };
        let vcs = MockVcs::new()
            .with_branches(REPO_ENGINE, &["develop"])
            .with_dirty(REPO_ENGINE);
        let engine = SyncEngine::new(&fx.cfg, &opts, &vcs);

        engine.sync_repo(repo(REPO_ENGINE)).unwrap();
        assert_eq!(vcs.checked_out(REPO_ENGINE).unwrap(), "develop");
    }

    #[test]
    fn update_flag_pulls_after_checkout() {
        let fx = fixture();
        let opts = Options {
            branch: "develop".to_string(),
            update: true,
            ..Options::default()
        };
        let vcs = MockVcs::new().with_branches(REPO_ENGINE, &["develop"]);
        let engine = SyncEngine::new(&fx.cfg, &opts, &vcs);

        engine.sync_repo(repo(REPO_ENGINE)).unwrap();
        assert_eq!(vcs.pulls.borrow().as_slice(), [REPO_ENGINE.to_string()]);
    }

    #[test]
    fn sync_all_mixed_branch_availability() {
        // `release-9` exists upstream for engine but not for the forked
        // kinetics repo; the run proceeds with degraded resolution.
        let fx = fixture();
        let opts = opts_with_branch("release-9");
        let vcs = MockVcs::new()
            .with_branches(REPO_ENGINE, &["develop", "release-9"])
            .with_branches(REPO_WORKBENCH, &["develop", "release-9"])
            .with_branches(REPO_SUITE, &["develop", "release-9"])
            .with_branches(REPO_KINETICS, &["develop", "sw-develop"]);
        let engine = SyncEngine::new(&fx.cfg, &opts, &vcs);

        engine.sync_all().unwrap();
        assert_eq!(vcs.checked_out(REPO_ENGINE).unwrap(), "release-9");
        assert_eq!(vcs.checked_out(REPO_KINETICS).unwrap(), "sw-develop");
        assert_eq!(vcs.checked_out(REPO_MESHER).unwrap(), "main");
    }

    #[test]
    fn git_version_parsing() {
        assert_eq!(
            parse_git_version("git version 2.39.2").unwrap(),
            Version::new(2, 39, 2)
        );
        assert_eq!(
            parse_git_version("git version 2.39.2 (Apple Git-145)").unwrap(),
            Version::new(2, 39, 2)
        );
        assert_eq!(
            parse_git_version("git version 2.45").unwrap(),
            Version::new(2, 45, 0)
        );
        assert!(parse_git_version("not git at all").is_none());
    }
}
