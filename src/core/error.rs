use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prerequisite check failed: {0}")]
    Prerequisite(String),

    #[error("Command '{command}' failed with exit code {code}, terminating")]
    CommandFailed { command: String, code: i32 },

    #[error("Command '{command}' terminated after a timeout of {seconds} seconds")]
    CommandTimeout { command: String, seconds: u64 },

    #[error("Git command failed: {0}")]
    GitCommandFailed(String),

    #[error(
        "Repository '{0}' is not clean. Either clean it manually or, if you are sure \
         there are no changes that need to be kept, re-run with --ignore-dirty"
    )]
    DirtyWorkTree(String),

    #[error("Missing directory: {0}")]
    MissingDirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::Prerequisite(_) => "PREREQUISITE_FAILED",
            Error::CommandFailed { .. } => "COMMAND_FAILED",
            Error::CommandTimeout { .. } => "COMMAND_TIMEOUT",
            Error::GitCommandFailed(_) => "GIT_COMMAND_FAILED",
            Error::DirtyWorkTree(_) => "DIRTY_WORK_TREE",
            Error::MissingDirectory(_) => "MISSING_DIRECTORY",
            Error::Io(_) => "IO_ERROR",
            Error::Json(_) => "JSON_ERROR",
            Error::Other(_) => "ERROR",
        }
    }
}
