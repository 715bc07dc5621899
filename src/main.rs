mod error;
mod logging;
mod offset;
mod process;
mod rewrite;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use crate::error::RebaseError;
use crate::offset::{PathOffset, absolutize};
use crate::process::{process_batch, process_single};
use crate::rewrite::{EmptyRunPolicy, RewriteOptions};

/// CLI arguments for sarif-rebase execution.
#[derive(Parser, Debug)]
#[command(
    name = "sarif-rebase",
    about = "Rebase SARIF artifact URIs from the directory a scanner ran in onto the repository root.",
    version
)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "PATH",
        env = "GITHUB_WORKSPACE",
        help = "Root directory that artifact URIs should become relative to."
    )]
    root: Option<PathBuf>,
    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "Directory the analysis tool ran in. Defaults to the current directory."
    )]
    working: Option<PathBuf>,
    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "SARIF file, or directory whose .json/.sarif files are rebased."
    )]
    sarif: PathBuf,
    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "Output file (or directory when --sarif is a directory). Inputs are overwritten when omitted."
    )]
    output: Option<PathBuf>,
    #[arg(long, help = "Enable debug logging.")]
    debug: bool,
    #[arg(
        long,
        help = "Empty a run's results when none of them has an artifact URI, instead of keeping them unmodified."
    )]
    clear_empty_runs: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let subscriber = logging::subscriber(cli.debug);
    match tracing::subscriber::with_default(subscriber, || run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:?}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let root = cli
        .root
        .filter(|root| !root.as_os_str().is_empty())
        .ok_or_else(|| {
            RebaseError::Configuration(
                "no root path provided; pass --root or set GITHUB_WORKSPACE".to_string(),
            )
        })?;
    if !root.exists() {
        return Err(RebaseError::RootNotFound { path: root }.into());
    }

    let cwd = std::env::current_dir().context("failed to resolve the current directory")?;
    let root = absolutize(&root, &cwd);
    let working = absolutize(cli.working.as_deref().unwrap_or(cwd.as_path()), &cwd);

    info!("root path    :: {}", root.display());
    info!("working path :: {}", working.display());
    info!("sarif path   :: {}", cli.sarif.display());

    let offset = match PathOffset::between(&root, &working) {
        PathOffset::Same => {
            warn!("root and working paths are the same... not configured correctly?");
            warn!("please check and see if you need the tool");
            return Ok(());
        }
        PathOffset::Relative(offset) => offset,
    };
    info!("difference in paths :: {offset}");

    let options = RewriteOptions {
        empty_runs: if cli.clear_empty_runs {
            EmptyRunPolicy::Clear
        } else {
            EmptyRunPolicy::KeepOriginal
        },
    };
    let output = cli.output.filter(|output| !output.as_os_str().is_empty());

    if cli.sarif.is_dir() {
        if output.as_deref() == Some(Path::new("-")) {
            return Err(RebaseError::Configuration(
                "--output - (stdout) needs a single SARIF file, not a directory".to_string(),
            )
            .into());
        }
        let report = process_batch(&cli.sarif, output.as_deref(), &offset, options)
            .with_context(|| format!("failed to process {}", cli.sarif.display()))?;
        info!(
            "rebased {} files, skipped {}",
            report.rewritten.len(),
            report.skipped
        );
        if !report.failures.is_empty() {
            for failure in &report.failures {
                error!("failed to rebase {}: {}", failure.path.display(), failure.error);
            }
            anyhow::bail!(
                "{} SARIF file(s) in {} could not be rebased",
                report.failures.len(),
                cli.sarif.display()
            );
        }
    } else {
        process_single(&cli.sarif, output.as_deref(), &offset, options)
            .with_context(|| format!("failed to rebase {}", cli.sarif.display()))?;
    }
    Ok(())
}
