use tracing::Subscriber;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Environment variable that overrides the log filter, e.g. `sarif_rebase=trace`.
pub(crate) const LOG_ENV: &str = "SARIF_REBASE_LOG";

pub(crate) fn default_level(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

/// Builds the subscriber for one invocation. Logs go to stderr so that SARIF
/// written to stdout stays parseable.
///
/// The caller scopes it with [`tracing::subscriber::with_default`] rather than
/// installing it process-wide.
pub(crate) fn subscriber(debug: bool) -> impl Subscriber + Send + Sync + 'static {
    let env_filter = EnvFilter::builder()
        .with_env_var(LOG_ENV)
        .with_default_directive(default_level(debug).into())
        .from_env_lossy();

    let fmt = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry().with(fmt).with(env_filter)
}
