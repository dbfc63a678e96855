use anyhow::Result;
use std::path::Path;
use tracing::error;

use crate::error::NormalizeError;
use crate::process::{normalize_directory, NormalizeOptions, RunSummary};

/// Parse `<program> <pre-data-directory> <output-data-directory>` and run.
pub fn try_run(args: &[String], opts: &NormalizeOptions) -> Result<RunSummary> {
    let (input_dir, output_dir) = match args {
        [_, input, output] => (Path::new(input), Path::new(output)),
        _ => {
            let program = args
                .first()
                .and_then(|p| Path::new(p).file_name())
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "normalize".to_string());
            return Err(NormalizeError::Usage { program }.into());
        }
    };
    normalize_directory(input_dir, output_dir, opts)
}

/// Run the tool and return the process exit code.
///
/// 0 when every matching file was written, 1 on usage errors, a bad input
/// directory, or if any single file failed.
pub fn run(args: &[String], opts: &NormalizeOptions) -> i32 {
    match try_run(args, opts) {
        Ok(summary) if summary.is_success() => 0,
        Ok(summary) => {
            for (path, _) in &summary.failed {
                eprintln!("Failed to normalize {}", path.display());
            }
            1
        }
        Err(e) => {
            match e.downcast_ref::<NormalizeError>() {
                Some(user_err) => eprintln!("{}", user_err),
                None => {
                    error!("run failed: {:#}", e);
                    eprintln!("Error: {:#}", e);
                }
            }
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn wrong_argument_count_is_a_usage_error() {
        for bad in [
            args(&[]),
            args(&["normalize"]),
            args(&["normalize", "in"]),
            args(&["normalize", "in", "out", "extra"]),
        ] {
            let err = try_run(&bad, &NormalizeOptions::default()).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<NormalizeError>(),
                Some(NormalizeError::Usage { .. })
            ));
            assert_eq!(run(&bad, &NormalizeOptions::default()), 1);
        }
    }

    #[test]
    fn usage_names_the_program() {
        let err = try_run(&args(&["/usr/bin/normalize_with_header"]), &NormalizeOptions::default())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Usage: normalize_with_header <pre-data-directory> <output-data-directory>"
        );
    }

    #[test]
    fn usage_error_does_not_touch_the_filesystem() -> Result<()> {
        let tmp = tempdir()?;
        let output_dir = tmp.path().join("out");
        let out = output_dir.to_string_lossy().to_string();

        assert_eq!(run(&args(&["normalize", &out]), &NormalizeOptions::default()), 1);
        assert!(!output_dir.exists());
        Ok(())
    }

    #[test]
    fn regular_file_input_exits_non_zero() -> Result<()> {
        let tmp = tempdir()?;
        let file = tmp.path().join("data.csv");
        fs::write(&file, "1;2023.12.21\n")?;
        let output_dir = tmp.path().join("out");
        let argv = args(&[
            "normalize",
            &file.to_string_lossy(),
            &output_dir.to_string_lossy(),
        ]);

        assert_eq!(run(&argv, &NormalizeOptions::default()), 1);
        assert!(!output_dir.exists());
        Ok(())
    }

    #[test]
    fn successful_run_exits_zero() -> Result<()> {
        let tmp = tempdir()?;
        let input_dir = tmp.path().join("pre-dataD-dic");
        let output_dir = tmp.path().join("dataD-dic");
        fs::create_dir_all(&input_dir)?;
        fs::write(input_dir.join("data_94.csv"), "id;time\n1;2023.12.21\n")?;
        let argv = args(&[
            "normalize_with_header",
            &input_dir.to_string_lossy(),
            &output_dir.to_string_lossy(),
        ]);

        assert_eq!(run(&argv, &NormalizeOptions::with_header()), 0);
        assert_eq!(
            fs::read_to_string(output_dir.join("data_94.csv"))?,
            "id;time\r\n1;2023.12.21 00:00:00\r\n"
        );
        Ok(())
    }

    #[test]
    fn failed_file_exits_non_zero() -> Result<()> {
        let tmp = tempdir()?;
        let input_dir = tmp.path().join("in");
        let output_dir = tmp.path().join("out");
        fs::create_dir_all(&input_dir)?;
        fs::write(input_dir.join("bad.csv"), b"1;\xff\n")?;
        let argv = args(&[
            "normalize",
            &input_dir.to_string_lossy(),
            &output_dir.to_string_lossy(),
        ]);

        assert_eq!(run(&argv, &NormalizeOptions::default()), 1);
        Ok(())
    }
}
