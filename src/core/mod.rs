// Public modules
pub mod build;
pub mod bundle;
pub mod config;
pub mod error;
pub mod manifest;
pub mod options;
pub mod pipeline;
pub mod repos;
pub mod runner;
pub mod store;
pub mod suite;
pub mod sync;
pub mod vcs;

// Re-export common types for convenience
pub use error::{Error, Result};
