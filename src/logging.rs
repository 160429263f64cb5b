use tracing::level_filters::LevelFilter;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::Registry;

/// Installs the global subscriber: a stdout fmt layer filtered at `level`.
pub fn init(level: Level) -> Result<(), SetGlobalDefaultError> {
    let stdout_log = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true);
    let subscriber = Registry::default()
        .with(stdout_log)
        .with(LevelFilter::from_level(level));

    tracing::subscriber::set_global_default(subscriber)
}
