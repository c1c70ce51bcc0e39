//! Tracing subscriber setup.
//!
//! Diagnostics go to an append-only file in the data directory so they never
//! interleave with the interactive prompt. `GOLENDAR_LOG` overrides the
//! configured filter.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use golendar_core::storage::LogConfig;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "GOLENDAR_LOG";

fn filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Falls back to stderr if the log file
/// cannot be opened.
pub fn init(config: &LogConfig, data_dir: &Path) {
    let path = data_dir.join(&config.file);
    let file = OpenOptions::new().create(true).append(true).open(&path);

    let installed = match file {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter(config))
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init(),
        Err(e) => {
            eprintln!("cannot open log file {}: {e}", path.display());
            tracing_subscriber::fmt()
                .with_env_filter(filter(config))
                .with_writer(std::io::stderr)
                .try_init()
        }
    };
    if let Err(e) = installed {
        eprintln!("logging disabled: {e}");
    }
}
