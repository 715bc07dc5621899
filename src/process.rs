use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::RebaseError;
use crate::rewrite::{RewriteOptions, RewriteStats, rewrite_document};

/// File extensions picked up when a directory of reports is given.
const SARIF_EXTENSIONS: [&str; 2] = ["json", "sarif"];

/// A file from a batch that could not be rebased.
#[derive(Debug)]
pub(crate) struct BatchFailure {
    pub(crate) path: PathBuf,
    pub(crate) error: RebaseError,
}

/// Outcome of [`process_batch`].
#[derive(Debug, Default)]
pub(crate) struct BatchReport {
    pub(crate) rewritten: Vec<PathBuf>,
    pub(crate) skipped: usize,
    pub(crate) failures: Vec<BatchFailure>,
}

pub(crate) fn load_sarif(path: &Path) -> Result<Value, RebaseError> {
    if !path.exists() {
        return Err(RebaseError::SarifNotFound {
            path: path.to_path_buf(),
        });
    }
    let content =
        fs::read_to_string(path).map_err(|source| RebaseError::io("read", path, source))?;
    serde_json::from_str(&content).map_err(|source| RebaseError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the document as two-space indented JSON. `-` writes to stdout.
pub(crate) fn write_sarif(path: &Path, document: &Value) -> Result<(), RebaseError> {
    info!("writing SARIF file: {}", path.display());
    let mut writer = output_writer(path)?;
    serde_json::to_writer_pretty(&mut writer, document)
        .map_err(|source| RebaseError::io("write", path, source.into()))?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|source| RebaseError::io("write", path, source))
}

fn output_writer(path: &Path) -> Result<Box<dyn Write>, RebaseError> {
    if path == Path::new("-") {
        return Ok(Box::new(io::stdout()));
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|source| RebaseError::io("create directory", parent, source))?;
    }
    let file = File::create(path).map_err(|source| RebaseError::io("create", path, source))?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Loads, rewrites and writes one report. Nothing is written unless the
/// rewrite succeeds.
fn rebase_file(
    input: &Path,
    output: &Path,
    offset: &str,
    options: RewriteOptions,
) -> Result<RewriteStats, RebaseError> {
    info!("processing SARIF file: {}", input.display());
    let mut document = load_sarif(input)?;
    let stats = rewrite_document(&mut document, input, offset, options)?;
    info!(
        "rewrote {} locations in {} runs; dropped {} locations and {} results",
        stats.rewritten_locations, stats.runs, stats.dropped_locations, stats.dropped_results
    );
    write_sarif(output, &document)?;
    Ok(stats)
}

/// Rebases a single report, overwriting it unless `output` is given.
pub(crate) fn process_single(
    input: &Path,
    output: Option<&Path>,
    offset: &str,
    options: RewriteOptions,
) -> Result<RewriteStats, RebaseError> {
    let output = match output {
        Some(output) => output,
        None => {
            info!("replacing existing SARIF file");
            input
        }
    };
    rebase_file(input, output, offset, options)
}

/// Rebases every `.json`/`.sarif` file directly inside `dir`.
///
/// Files are handled in name order and independently: a failure is recorded in
/// the report and the remaining files are still processed.
/// Outputs go to `output_dir` under the same file name, or replace the inputs.
pub(crate) fn process_batch(
    dir: &Path,
    output_dir: Option<&Path>,
    offset: &str,
    options: RewriteOptions,
) -> Result<BatchReport, RebaseError> {
    let mut entries = Vec::new();
    let listing =
        fs::read_dir(dir).map_err(|source| RebaseError::io("read directory", dir, source))?;
    for entry in listing {
        let entry = entry.map_err(|source| RebaseError::io("read directory", dir, source))?;
        entries.push(entry.path());
    }
    entries.sort();

    let mut report = BatchReport::default();
    for input in entries {
        if !input.is_file() || !is_sarif_candidate(&input) {
            debug!("skipping {}", input.display());
            report.skipped += 1;
            continue;
        }
        let output = match (output_dir, input.file_name()) {
            (Some(output_dir), Some(name)) => output_dir.join(name),
            _ => {
                info!("replacing existing SARIF file");
                input.clone()
            }
        };
        match rebase_file(&input, &output, offset, options) {
            Ok(_) => report.rewritten.push(output),
            Err(err) => report.failures.push(BatchFailure { path: input, error: err }),
        }
    }
    Ok(report)
}

fn is_sarif_candidate(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| SARIF_EXTENSIONS.contains(&extension))
}
