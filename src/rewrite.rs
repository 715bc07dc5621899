use std::path::Path;

use serde_json::Value;
use serde_sarif::sarif::ToolComponent;
use tracing::{debug, info, warn};

use crate::error::RebaseError;

/// Prefix shared by every published SARIF schema URI.
pub(crate) const SARIF_SCHEMA_PREFIX: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema";

/// What to do with a run whose results all lack a usable artifact URI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum EmptyRunPolicy {
    /// Leave the run's original results in place, untouched.
    #[default]
    KeepOriginal,
    /// Replace the run's results with an empty list.
    Clear,
}

/// Knobs for [`rewrite_document`].
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct RewriteOptions {
    pub(crate) empty_runs: EmptyRunPolicy,
}

/// Counters collected while rewriting a single document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RewriteStats {
    pub(crate) runs: usize,
    pub(crate) rewritten_locations: usize,
    pub(crate) dropped_locations: usize,
    pub(crate) dropped_results: usize,
    /// Runs left as-is because no result had a usable URI.
    pub(crate) untouched_runs: usize,
}

/// Fails unless the document declares a SARIF `$schema`.
pub(crate) fn ensure_sarif(document: &Value, source: &Path) -> Result<(), RebaseError> {
    let schema = document
        .get("$schema")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if schema.starts_with(SARIF_SCHEMA_PREFIX) {
        Ok(())
    } else {
        Err(RebaseError::NotSarif {
            path: source.to_path_buf(),
        })
    }
}

/// Prefixes every result location URI with `offset` and drops locations and
/// results that have no URI to rewrite.
///
/// The URI becomes `"{offset}/{uri}"` verbatim; no separator normalization or
/// escaping is applied. Every other field of the document is left as it was.
pub(crate) fn rewrite_document(
    document: &mut Value,
    source: &Path,
    offset: &str,
    options: RewriteOptions,
) -> Result<RewriteStats, RebaseError> {
    ensure_sarif(document, source)?;

    let mut stats = RewriteStats::default();
    let Some(runs) = document.get_mut("runs").and_then(Value::as_array_mut) else {
        return Ok(stats);
    };
    for run in runs {
        stats.runs += 1;
        log_tool(run);
        rewrite_run(run, offset, options, &mut stats);
    }
    Ok(stats)
}

fn log_tool(run: &Value) {
    let driver = run
        .pointer("/tool/driver")
        .cloned()
        .and_then(|driver| serde_json::from_value::<ToolComponent>(driver).ok());
    match driver {
        Some(driver) => info!(
            "processing tool: {} ({})",
            driver.name,
            driver.semantic_version.as_deref().unwrap_or("unknown version")
        ),
        None => info!("processing tool: <unnamed>"),
    }
}

fn rewrite_run(
    run: &mut Value,
    offset: &str,
    options: RewriteOptions,
    stats: &mut RewriteStats,
) {
    let Some(results) = run.get_mut("results").and_then(Value::as_array_mut) else {
        return;
    };

    // Nothing is mutated unless at least one result survives.
    if !results.iter().any(has_resolvable_location) {
        if results.is_empty() {
            return;
        }
        match options.empty_runs {
            EmptyRunPolicy::KeepOriginal => {
                warn!(
                    "no result in this run has an artifact URI; keeping its {} original results",
                    results.len()
                );
                stats.untouched_runs += 1;
            }
            EmptyRunPolicy::Clear => {
                stats.dropped_locations += results.iter().map(location_count).sum::<usize>();
                stats.dropped_results += results.len();
                results.clear();
            }
        }
        return;
    }

    results.retain_mut(|result| {
        let kept = rewrite_result(result, offset, stats);
        if !kept {
            stats.dropped_results += 1;
        }
        kept
    });
}

fn rewrite_result(result: &mut Value, offset: &str, stats: &mut RewriteStats) -> bool {
    let rule_id = result
        .get("ruleId")
        .and_then(Value::as_str)
        .unwrap_or("<none>");
    debug!("Rule({rule_id})");
    let Some(locations) = result.get_mut("locations").and_then(Value::as_array_mut) else {
        return false;
    };
    locations.retain_mut(|location| {
        let rewritten = rewrite_location(location, offset);
        if rewritten {
            stats.rewritten_locations += 1;
        } else {
            stats.dropped_locations += 1;
        }
        rewritten
    });
    !locations.is_empty()
}

fn rewrite_location(location: &mut Value, offset: &str) -> bool {
    let Some(uri) = location.pointer_mut("/physicalLocation/artifactLocation/uri") else {
        return false;
    };
    let Some(current) = uri.as_str().filter(|current| !current.is_empty()) else {
        return false;
    };
    let rebased = format!("{offset}/{current}");
    debug!("update: {current} => {rebased}");
    *uri = Value::String(rebased);
    true
}

fn has_resolvable_location(result: &Value) -> bool {
    result
        .get("locations")
        .and_then(Value::as_array)
        .is_some_and(|locations| {
            locations.iter().any(|location| {
                location
                    .pointer("/physicalLocation/artifactLocation/uri")
                    .and_then(Value::as_str)
                    .is_some_and(|uri| !uri.is_empty())
            })
        })
}

fn location_count(result: &Value) -> usize {
    result
        .get("locations")
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}
