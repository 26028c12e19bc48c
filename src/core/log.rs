use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Installs the global subscriber. `RUST_LOG` wins when set; otherwise
/// `verbose` turns on debug output, except in the full-screen app where
/// log lines would tear the display.
pub fn init_logging(verbose: bool, interactive: bool) {
    let (level_filter, level) = if verbose && !interactive {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::OFF, "off")
    };
    let env_filter = EnvFilter::try_from_default_env().ok();
    let level_filter = if env_filter.is_some() {
        LevelFilter::TRACE
    } else {
        level_filter
    };
    let app_filter = Targets::new().with_target("nprtrack", level_filter);
    let env_filter = env_filter.unwrap_or_else(|| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(app_filter)
        .with(env_filter)
        .init();
}
