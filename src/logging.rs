use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const LOG_ENV: &str = "MASKCRAFT_LOG";
const FALLBACK_LOG_ENV: &str = "RUST_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

/// Installs the global subscriber. Later calls are no-ops.
pub fn init() {
    init_with_verbosity(0);
}

/// Like [`init`], but `-v` style verbosity raises the default level when no
/// filter is set in the environment.
pub fn init_with_verbosity(verbosity: u8) {
    let filter = env_filter(verbosity);
    let result = Registry::default()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .try_init();
    if result.is_ok() {
        tracing::debug!(verbosity, "logging initialised");
    }
}

fn env_filter(verbosity: u8) -> EnvFilter {
    [LOG_ENV, FALLBACK_LOG_ENV]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive(verbosity)))
}

fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => DEFAULT_DIRECTIVE,
        1 => "debug",
        _ => "trace",
    }
}
