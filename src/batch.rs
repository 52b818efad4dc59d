//! Batch driver: converts every matching file of one directory.

use crate::converter::Converter;
use crate::{error::Error, ConvertOptions, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Input extension without the dot; defaults to the mode's extension.
    pub input_extension: Option<String>,
    /// Delete existing outputs of the same extension before converting.
    pub clean_output: bool,
    pub convert: ConvertOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("evraklar_kaynak"),
            output_dir: PathBuf::from("evraklar_pdf"),
            input_extension: None,
            clean_output: true,
            convert: ConvertOptions::default(),
        }
    }
}

impl BatchOptions {
    pub fn input_extension(&self) -> &str {
        self.input_extension
            .as_deref()
            .map(|ext| ext.trim_start_matches('.'))
            .unwrap_or_else(|| self.convert.mode.input_extension())
    }
}

/// Outcome of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Converted { input: PathBuf, output: PathBuf },
    Failed { input: PathBuf, reason: String },
}

impl FileOutcome {
    pub fn input(&self) -> &Path {
        match self {
            Self::Converted { input, .. } | Self::Failed { input, .. } => input,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Converted { .. })
    }
}

/// Per-file outcomes of a batch run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Failed { input, reason } => Some((input.as_path(), reason.as_str())),
            FileOutcome::Converted { .. } => None,
        })
    }
}

/// Files directly inside `dir` whose extension matches `extension`,
/// case-insensitively, sorted by name.
pub fn find_inputs(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && has_extension(entry.path(), extension) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
}

/// Deletes files in `dir` carrying `extension`. Returns how many were removed.
fn clean_outputs(dir: &Path, extension: &str) -> Result<usize> {
    let stale = find_inputs(dir, extension)?;
    for path in &stale {
        fs::remove_file(path)?;
    }
    Ok(stale.len())
}

/// Converts every matching file in the source directory.
///
/// Nothing is created when there are no inputs. A failing file is recorded
/// in the report and never stops the run.
///
/// # Errors
///
/// [`Error::SourceDirMissing`] when the source directory does not exist, or
/// an I/O error while scanning or preparing the output directory.
pub fn run(options: &BatchOptions) -> Result<BatchReport> {
    if !options.source_dir.is_dir() {
        return Err(Error::SourceDirMissing(options.source_dir.clone()));
    }

    let extension = options.input_extension();
    let inputs = find_inputs(&options.source_dir, extension)?;
    if inputs.is_empty() {
        log::info!(
            "No .{extension} files in {}",
            options.source_dir.display()
        );
        return Ok(BatchReport::default());
    }

    fs::create_dir_all(&options.output_dir)?;
    if options.clean_output {
        let removed = clean_outputs(
            &options.output_dir,
            options.convert.mode.output_extension(),
        )?;
        if removed > 0 {
            log::debug!("Removed {removed} previous outputs");
        }
    }

    let converter = Converter::new(options.convert.clone())?;
    let mut report = BatchReport::default();
    for input in inputs {
        let outcome = match converter.convert_file(&input, &options.output_dir) {
            Ok(output) => FileOutcome::Converted { input, output },
            Err(e) => {
                log::warn!("{}: {e}", input.display());
                FileOutcome::Failed {
                    input,
                    reason: e.to_string(),
                }
            }
        };
        report.outcomes.push(outcome);
    }

    log::info!(
        "Converted {}/{} files into {}",
        report.succeeded(),
        report.total(),
        options.output_dir.display()
    );
    Ok(report)
}
