use std::path::PathBuf;
use thiserror::Error;

/// Failures the CLI reports to the user before any file is processed.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Usage: {program} <pre-data-directory> <output-data-directory>")]
    Usage { program: String },

    #[error("{} doesn't exist or is not a directory!", .0.display())]
    NotADirectory(PathBuf),
}
