//! Static repository and branch tables.
//!
//! The repository set is declared at process start and never mutated. Base
//! repositories follow the umbrella project's branch naming directly; forked
//! repositories track an upstream project and keep umbrella branches under
//! the `sw-` prefix.

use std::sync::OnceLock;

use regex::Regex;

pub const ORIGIN: &str = "origin";

/// Branch used when neither the requested branch nor a fallback exists.
pub const DEFAULT_BRANCH: &str = "develop";

/// Prefix under which forked repositories store umbrella branches.
pub const FORKED_BRANCH_PREFIX: &str = "sw-";

pub const MIN_GIT_VERSION: &str = "2.20.0";

pub const BASE_URL_HTTPS: &str = "https://github.com/shipwright-project/";
pub const BASE_URL_SSH: &str = "git@github.com:shipwright-project/";
pub const BASE_URL_PRIVATE_SSH: &str = "git@github.com:shipwright-private/";

pub const REPO_ENGINE: &str = "engine";
pub const REPO_WORKBENCH: &str = "workbench";
pub const REPO_SUITE: &str = "suite";
pub const REPO_KINETICS: &str = "kinetics";
pub const REPO_MESHER: &str = "mesher";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repository {
    pub name: &'static str,
    /// Fork of an upstream project; umbrella branches live under
    /// [`FORKED_BRANCH_PREFIX`].
    pub forked: bool,
    /// Allowed to carry uncommitted local modifications during sync.
    pub dirty_allowed: bool,
    /// Fixed branch that bypasses resolution entirely. Used for forks that
    /// track their upstream default line instead of umbrella branches.
    pub pinned_branch: Option<&'static str>,
}

pub const REPOSITORIES: &[Repository] = &[
    Repository {
        name: REPO_ENGINE,
        forked: false,
        dirty_allowed: false,
        pinned_branch: None,
    },
    Repository {
        name: REPO_WORKBENCH,
        forked: false,
        dirty_allowed: false,
        pinned_branch: None,
    },
    Repository {
        name: REPO_SUITE,
        forked: false,
        dirty_allowed: true,
        pinned_branch: None,
    },
    Repository {
        name: REPO_KINETICS,
        forked: true,
        dirty_allowed: false,
        pinned_branch: None,
    },
    Repository {
        name: REPO_MESHER,
        forked: true,
        dirty_allowed: true,
        pinned_branch: Some("main"),
    },
];

pub fn find(name: &str) -> Option<&'static Repository> {
    REPOSITORIES.iter().find(|r| r.name == name)
}

/// Default development branch of a forked repository.
pub fn forked_default_branch() -> String {
    format!("{}{}", FORKED_BRANCH_PREFIX, DEFAULT_BRANCH)
}

/// Version lines with a dedicated development branch. Branches named after a
/// line that is not listed here go through the ordinary fallback rules.
pub const VERSION_LINE_DEV_BRANCHES: &[(&str, &str)] = &[
    ("release-4", "release-4-dev"),
    ("release-5", "release-5-dev"),
];

/// Map a release-line branch name (`release-<n>` or `release-<n>.<patch>`)
/// to the development branch of that line, for lines that have one.
pub fn version_line_dev_branch(branch: &str) -> Option<String> {
    static VERSION_LINE: OnceLock<Regex> = OnceLock::new();
    let re = VERSION_LINE
        .get_or_init(|| Regex::new(r"^(release-\d+)(?:\..+)?$").expect("static pattern"));
    let caps = re.captures(branch)?;
    let line = caps.get(1)?.as_str();
    VERSION_LINE_DEV_BRANCHES
        .iter()
        .find(|(known, _)| *known == line)
        .map(|(_, dev)| dev.to_string())
}
