use csv::StringRecord;

use super::time_format::has_time_component;

/// Appended to timestamps the exporter truncated at midnight.
pub const MIDNIGHT_SUFFIX: &str = " 00:00:00";

/// Return a copy of `record` with `column` completed to midnight if it lacks a time.
///
/// Records too short to have `column` come back unchanged.
pub fn normalize_record(record: &StringRecord, column: usize) -> StringRecord {
    let mut out = record.clone();
    normalize_record_in_place(&mut out, column);
    out
}

/// Patch `record` in place. Returns `true` if the timestamp field was rewritten.
pub fn normalize_record_in_place(record: &mut StringRecord, column: usize) -> bool {
    let patched = match record.get(column) {
        Some(value) if !has_time_component(value) => format!("{}{}", value, MIDNIGHT_SUFFIX),
        _ => return false,
    };

    // StringRecord has no field setter, so rebuild it with the one field swapped.
    let rebuilt: StringRecord = record
        .iter()
        .enumerate()
        .map(|(i, field)| if i == column { patched.as_str() } else { field })
        .collect();
    *record = rebuilt;
    true
}

/// Applies the header mode across the rows of one file and counts patches.
#[derive(Debug)]
pub struct RecordNormalizer {
    column: usize,
    preserve_header: bool,
    seen: u64,
    patched: u64,
}

impl RecordNormalizer {
    pub fn new(column: usize, preserve_header: bool) -> Self {
        Self {
            column,
            preserve_header,
            seen: 0,
            patched: 0,
        }
    }

    /// Normalize the next row of the file. Row 0 is left alone in header mode.
    pub fn apply(&mut self, record: &mut StringRecord) {
        let is_header = self.seen == 0 && self.preserve_header;
        self.seen += 1;
        if is_header {
            return;
        }
        if normalize_record_in_place(record, self.column) {
            self.patched += 1;
        }
    }

    pub fn rows(&self) -> u64 {
        self.seen
    }

    pub fn patched(&self) -> u64 {
        self.patched
    }
}
