//! Tracing setup: stderr plus a daily-rolling file under `logs/`.

use biglabs_infrastructure::paths::BiglabsPaths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const NOISY_CRATES: &str = "hyper=warn,hyper_util=warn,h2=warn,reqwest=warn,rustls=warn";

/// Installs the global subscriber.
///
/// Terminal filter: `--debug` > `RUST_LOG` > "warn". File filter: the
/// configured `log_level`. The returned guard flushes the file writer and
/// must live until exit.
pub fn init(paths: &BiglabsPaths, log_level: &str, debug: bool) -> Option<WorkerGuard> {
    let terminal_filter = if debug {
        EnvFilter::new(format!("debug,{NOISY_CRATES}"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let terminal_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(terminal_filter);

    let file_writer = paths
        .logs_dir()
        .ok()
        .and_then(|dir| std::fs::create_dir_all(&dir).ok().map(|_| dir))
        .map(|dir| tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "biglabs.log")));

    match file_writer {
        Some((writer, guard)) => {
            let file_filter = EnvFilter::try_new(format!("{log_level},{NOISY_CRATES}"))
                .unwrap_or_else(|_| EnvFilter::new("info"));
            let file_layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(file_filter);

            tracing_subscriber::registry()
                .with(terminal_layer)
                .with(file_layer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(terminal_layer).init();
            None
        }
    }
}
