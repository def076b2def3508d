//! Version-control queries and operations behind a trait.
//!
//! The orchestrator never sees raw git text. Mutating operations go through
//! the guarded runner; queries use structured plumbing commands (ref
//! verification, porcelain status) instead of scanning prose output.

use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};
use crate::repos::ORIGIN;
use crate::runner::{self, Invocation};

pub trait Vcs {
    /// Clone `url` into `parent_dir` (git picks the directory name).
    fn clone_repo(&self, parent_dir: &Path, url: &str) -> Result<()>;
    fn fetch(&self, repo_dir: &Path) -> Result<()>;
    fn checkout(&self, repo_dir: &Path, branch: &str) -> Result<()>;
    fn pull(&self, repo_dir: &Path) -> Result<()>;
    fn push(&self, repo_dir: &Path) -> Result<()>;
    fn reset_hard(&self, repo_dir: &Path) -> Result<()>;
    fn tag(&self, repo_dir: &Path, name: &str) -> Result<()>;
    fn submodule_init_update(&self, repo_dir: &Path) -> Result<()>;

    /// Whether `origin/<branch>` exists after the last fetch.
    fn remote_branch_exists(&self, repo_dir: &Path, branch: &str) -> Result<bool>;
    /// Whether the working tree carries no uncommitted modifications.
    fn is_workdir_clean(&self, repo_dir: &Path) -> Result<bool>;

    fn head_commit(&self, repo_dir: &Path) -> Result<String>;
    fn branch_description(&self, repo_dir: &Path) -> Result<String>;
    /// Output of `git --version`, for the prerequisite check.
    fn version(&self) -> Result<String>;

    fn has_submodules(&self, repo_dir: &Path) -> bool {
        repo_dir.join(".gitmodules").exists()
    }
}

/// Production implementation shelling out to the system git.
pub struct SystemGit;

impl SystemGit {
    fn git_checked(&self, dir: &Path, args: &[&str]) -> Result<()> {
        let mut cmd = vec!["git".to_string()];
        cmd.extend(args.iter().map(|a| a.to_string()));
        runner::run_checked(&Invocation::new(cmd, dir))
    }

    /// Query helper: trimmed stdout of a git command, error on failure.
    fn git_stdout(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|e| Error::GitCommandFailed(format!("git {}: {}", args.join(" "), e)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::GitCommandFailed(format!(
                "git {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Vcs for SystemGit {
    fn clone_repo(&self, parent_dir: &Path, url: &str) -> Result<()> {
        self.git_checked(parent_dir, &["clone", url])
    }

    fn fetch(&self, repo_dir: &Path) -> Result<()> {
        self.git_checked(repo_dir, &["fetch"])
    }

    fn checkout(&self, repo_dir: &Path, branch: &str) -> Result<()> {
        self.git_checked(repo_dir, &["checkout", branch])
    }

    fn pull(&self, repo_dir: &Path) -> Result<()> {
        self.git_checked(repo_dir, &["pull"])
    }

    fn push(&self, repo_dir: &Path) -> Result<()> {
        self.git_checked(repo_dir, &["push"])
    }

    fn reset_hard(&self, repo_dir: &Path) -> Result<()> {
        self.git_checked(repo_dir, &["reset", "--hard"])
    }

    fn tag(&self, repo_dir: &Path, name: &str) -> Result<()> {
        self.git_checked(repo_dir, &["tag", name, "-m", name])
    }

    fn submodule_init_update(&self, repo_dir: &Path) -> Result<()> {
        self.git_checked(repo_dir, &["submodule", "init"])?;
        self.git_checked(repo_dir, &["submodule", "update"])
    }

    fn remote_branch_exists(&self, repo_dir: &Path, branch: &str) -> Result<bool> {
        let reference = format!("refs/remotes/{}/{}", ORIGIN, branch);
        let status = Command::new("git")
            .args(["rev-parse", "--verify", "--quiet", &reference])
            .current_dir(repo_dir)
            .status()
            .map_err(|e| Error::GitCommandFailed(format!("git rev-parse: {}", e)))?;
        Ok(status.success())
    }

    fn is_workdir_clean(&self, repo_dir: &Path) -> Result<bool> {
        let stdout = self.git_stdout(repo_dir, &["status", "--porcelain"])?;
        Ok(stdout.is_empty())
    }

    fn head_commit(&self, repo_dir: &Path) -> Result<String> {
        self.git_stdout(repo_dir, &["rev-parse", "HEAD"])
    }

    fn branch_description(&self, repo_dir: &Path) -> Result<String> {
        self.git_stdout(repo_dir, &["describe", "--all", "--always"])
    }

    fn version(&self) -> Result<String> {
        let output = Command::new("git")
            .arg("--version")
            .output()
            .map_err(|e| Error::GitCommandFailed(format!("git --version: {}", e)))?;
        if !output.status.success() {
            return Err(Error::GitCommandFailed(
                "git --version failed".to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
