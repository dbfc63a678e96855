// src/process/mod.rs
pub mod files;
pub mod record;
pub mod time_format;

pub use files::{normalize_directory, normalize_file, FileReport, RunSummary};
pub use record::{normalize_record, normalize_record_in_place, RecordNormalizer, MIDNIGHT_SUFFIX};
pub use time_format::has_time_component;

use csv::Terminator;

/// How logger export files are read, rewritten and written back.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Pass row 0 of every file through untouched.
    pub preserve_header: bool,
    /// Field delimiter for both reading and writing.
    pub delimiter: u8,
    /// Only directory entries whose name ends with this are processed.
    pub extension: String,
    /// Zero-based index of the timestamp field.
    pub timestamp_column: usize,
    /// Record terminator for written files.
    pub terminator: Terminator,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            preserve_header: false,
            delimiter: b';',
            extension: ".csv".to_string(),
            timestamp_column: 1,
            terminator: Terminator::CRLF,
        }
    }
}

impl NormalizeOptions {
    /// Defaults, but the first row of each file is treated as a header.
    pub fn with_header() -> Self {
        Self {
            preserve_header: true,
            ..Self::default()
        }
    }
}
