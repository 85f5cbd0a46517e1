//! Sunbeam terminal launcher.

use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILTER_ENV: &str = "SUNBEAM_LOG";
const LOG_FILE_ENV: &str = "SUNBEAM_LOG_FILE";

fn log_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(LOG_FILE_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|dir| dir.join("sunbeam").join("sunbeam.log"))
}

fn open_log() -> Option<File> {
    let path = log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging() {
    let Some(file) = open_log() else {
        return;
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_FILTER_ENV)
                .unwrap_or_else(|_| "sunbeam=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
}

fn main() {
    init_logging();

    if let Err(e) = sunbeam::cli::run() {
        tracing::error!(error = %e, "exiting with error");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
