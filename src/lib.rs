pub mod cli;
pub mod error;
pub mod logging;
pub mod process;

pub use error::NormalizeError;
pub use process::{normalize_directory, normalize_file, NormalizeOptions, RunSummary};
