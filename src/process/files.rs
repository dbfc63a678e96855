use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, error, info};

use super::record::RecordNormalizer;
use super::NormalizeOptions;
use crate::error::NormalizeError;

/// Outcome of one rewritten file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub output: PathBuf,
    /// Rows written, header included.
    pub rows: u64,
    /// Rows whose timestamp got the midnight suffix.
    pub patched: u64,
}

/// Outcome of a directory run. Failed files do not stop the run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub written: Vec<FileReport>,
    pub failed: Vec<(PathBuf, anyhow::Error)>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Rewrite `input` into `output`, completing midnight timestamps.
///
/// Rows go to a `.NAME.tmp` sibling of `output` which is renamed over it once
/// the writer has been flushed, so a failed run never leaves a half-written
/// output. `input` and `output` may be the same path.
#[tracing::instrument(level = "debug", skip(input, output, opts), fields(input = %input.as_ref().display()))]
pub fn normalize_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    opts: &NormalizeOptions,
) -> Result<FileReport> {
    let input = input.as_ref();
    let output = output.as_ref();
    let tmp_path = tmp_path_for(output)?;

    let normalizer = match write_normalized(input, &tmp_path, opts) {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
    };

    if let Err(e) = fs::rename(&tmp_path, output) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e).with_context(|| {
            format!(
                "failed to rename `{}` to `{}`",
                tmp_path.display(),
                output.display()
            )
        });
    }

    debug!(
        rows = normalizer.rows(),
        patched = normalizer.patched(),
        "file complete"
    );
    Ok(FileReport {
        output: output.to_path_buf(),
        rows: normalizer.rows(),
        patched: normalizer.patched(),
    })
}

fn tmp_path_for(output: &Path) -> Result<PathBuf> {
    let name = output
        .file_name()
        .ok_or_else(|| anyhow!("output path `{}` has no file name", output.display()))?;
    Ok(output.with_file_name(format!(".{}.tmp", name.to_string_lossy())))
}

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

fn write_normalized(input: &Path, tmp: &Path, opts: &NormalizeOptions) -> Result<RecordNormalizer> {
    let data =
        fs::read(input).with_context(|| format!("Failed to open CSV file: {}", input.display()))?;
    // The reader would strip the BOM; keep it so the output matches byte for byte.
    let (bom, body) = match data.strip_prefix(UTF8_BOM) {
        Some(rest) => (UTF8_BOM, rest),
        None => (&[][..], &data[..]),
    };

    let mut rdr = ReaderBuilder::new()
        .delimiter(opts.delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(body);

    let file =
        File::create(tmp).with_context(|| format!("Failed to create {}", tmp.display()))?;
    let mut wtr = WriterBuilder::new()
        .delimiter(opts.delimiter)
        .flexible(true)
        .terminator(opts.terminator)
        .from_writer(file);
    wtr.get_ref()
        .write_all(bom)
        .with_context(|| format!("Failed to write record to {}", tmp.display()))?;

    let terminator = terminator_bytes(opts.terminator);
    let mut normalizer = RecordNormalizer::new(opts.timestamp_column, opts.preserve_header);
    let mut record = StringRecord::new();
    let mut blank = StringRecord::new();
    // Start of the line breaks that follow the previous record.
    let mut gap_start = 0usize;
    let mut seen_record = false;

    loop {
        let start = rdr.position().byte() as usize;
        let more = rdr.read_record(&mut record).with_context(|| {
            format!(
                "CSV parse error in {} at record {}",
                input.display(),
                normalizer.rows()
            )
        })?;
        let end = if more {
            rdr.position().byte() as usize
        } else {
            body.len()
        };
        let consumed = &body[start..end];

        // The reader skips empty lines; every break beyond the previous
        // record's own terminator is an empty row that has to be written back.
        let lead = consumed.iter().take_while(|b| is_line_break(**b)).count();
        let breaks = count_line_breaks(&body[gap_start..start + lead]);
        let blanks = if seen_record {
            breaks.saturating_sub(1)
        } else {
            breaks
        };
        for _ in 0..blanks {
            normalizer.apply(&mut blank);
            wtr.flush()
                .and_then(|_| wtr.get_ref().write_all(&terminator))
                .with_context(|| format!("Failed to write record to {}", tmp.display()))?;
        }

        if !more {
            break;
        }
        normalizer.apply(&mut record);
        wtr.write_record(&record)
            .with_context(|| format!("Failed to write record to {}", tmp.display()))?;
        seen_record = true;
        let tail = consumed
            .iter()
            .rev()
            .take_while(|b| is_line_break(**b))
            .count();
        gap_start = end - tail;
    }

    // into_inner flushes; dropping the returned File closes it before the rename
    wtr.into_inner()
        .map_err(|e| e.into_error())
        .with_context(|| format!("Failed to flush {}", tmp.display()))?;

    Ok(normalizer)
}

fn terminator_bytes(terminator: Terminator) -> Vec<u8> {
    match terminator {
        Terminator::Any(b) => vec![b],
        _ => b"\r\n".to_vec(),
    }
}

fn is_line_break(b: u8) -> bool {
    b == b'\r' || b == b'\n'
}

/// Line breaks in `run`, counting `\r\n` as one.
fn count_line_breaks(run: &[u8]) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i < run.len() {
        if run[i] == b'\r' && run.get(i + 1) == Some(&b'\n') {
            i += 2;
        } else {
            i += 1;
        }
        count += 1;
    }
    count
}

/// Normalize every file in `input_dir` whose name ends with the configured
/// extension, writing same-named files into `output_dir`.
///
/// - Fails with [`NormalizeError::NotADirectory`] before touching the
///   filesystem if `input_dir` is not a directory.
/// - Creates `output_dir` (and its ancestors) if missing.
/// - Files are processed in name order; a file that fails is logged and
///   recorded in the summary, and the rest still run.
#[tracing::instrument(level = "info", skip_all, fields(input = %input_dir.as_ref().display()))]
pub fn normalize_directory<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    output_dir: Q,
    opts: &NormalizeOptions,
) -> Result<RunSummary> {
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();

    if !input_dir.is_dir() {
        return Err(NormalizeError::NotADirectory(input_dir.to_path_buf()).into());
    }
    fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "failed to create output directory `{}`",
            output_dir.display()
        )
    })?;

    let inputs = collect_inputs(input_dir, &opts.extension)?;
    info!(
        count = inputs.len(),
        output = %output_dir.display(),
        header = opts.preserve_header,
        "normalizing files"
    );

    let mut summary = RunSummary::default();
    for (name, path) in inputs {
        let output = output_dir.join(&name);
        match normalize_file(&path, &output, opts) {
            Ok(report) => {
                info!(
                    rows = report.rows,
                    patched = report.patched,
                    "Updated CSV written to {}",
                    report.output.display()
                );
                summary.written.push(report);
            }
            Err(e) => {
                error!(file = %path.display(), "failed to normalize: {:#}", e);
                summary.failed.push((path, e));
            }
        }
    }

    info!(
        written = summary.written.len(),
        failed = summary.failed.len(),
        "all done"
    );
    Ok(summary)
}

/// Regular files in `dir` whose name ends with `extension`, sorted by name.
fn collect_inputs(dir: &Path, extension: &str) -> Result<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read directory `{}`", dir.display()))?;

    let mut inputs = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to list `{}`", dir.display()))?;
        let path = entry.path();
        let name = match entry.file_name().into_string() {
            Ok(n) => n,
            Err(raw) => {
                debug!(name = ?raw, "skipping non UTF-8 file name");
                continue;
            }
        };
        if !name.ends_with(extension) {
            debug!(file = %name, "skipping, extension does not match");
            continue;
        }
        if !path.is_file() {
            debug!(file = %name, "skipping, not a regular file");
            continue;
        }
        inputs.push((name, path));
    }
    inputs.sort();
    Ok(inputs)
}
