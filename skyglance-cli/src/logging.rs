use std::{fs, fs::OpenOptions, sync::Mutex};

use skyglance_core::Config;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// Diagnostics go to the log file so they don't interleave with the widget;
/// `--verbose` sends them to stderr at debug level instead.
pub fn init(config: &Config, verbose: bool) {
    let level = if verbose { "debug" } else { config.log_level() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("skyglance={level},skyglance_core={level}").into());

    let registry = tracing_subscriber::registry().with(filter);

    if !verbose {
        if let Some(file) = open_log_file() {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
            return;
        }
    }

    registry
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_log_file() -> Option<fs::File> {
    let path = Config::log_file_path().ok()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}
