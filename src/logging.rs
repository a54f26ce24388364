//! Opt-in diagnostic logging.
//!
//! Stdout is the rendered screen, so events go to a file instead. Nothing is
//! installed unless `--debug` is given or `GAZE_LOG` is set.

use std::env;
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::EnvFilter;

/// Filter directives, e.g. `gaze=trace`. Setting it enables logging.
pub const LOG_FILTER_ENV: &str = "GAZE_LOG";

/// Log file path override.
pub const LOG_FILE_ENV: &str = "GAZE_LOG_FILE";

const DEFAULT_FILTER: &str = "debug";

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Where logs are written: `$GAZE_LOG_FILE`, else `gaze.log` in the temp dir.
pub fn log_path() -> PathBuf {
    path_from(env::var_os(LOG_FILE_ENV))
}

fn path_from(var: Option<OsString>) -> PathBuf {
    var.filter(|v| !v.is_empty())
        .map_or_else(|| env::temp_dir().join("gaze.log"), PathBuf::from)
}

/// The filter to install, or `None` when logging stays off.
fn filter_directive(debug: bool, var: Option<String>) -> Option<String> {
    match var {
        Some(v) if !v.trim().is_empty() => Some(v),
        _ if debug => Some(DEFAULT_FILTER.to_string()),
        _ => None,
    }
}

/// Install the file logger if enabled. Returns the log path when it is.
pub fn init(debug: bool) -> Option<PathBuf> {
    let directive = filter_directive(debug, env::var(LOG_FILTER_ENV).ok())?;
    let path = log_path();
    init_once(&directive, &path, &TRACING_INIT).then_some(path)
}

fn init_once(directive: &str, path: &Path, once: &OnceLock<()>) -> bool {
    if once.get().is_some() {
        return true;
    }
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("gaze: unable to open log file {}: {e}", path.display());
            return false;
        }
    };
    let filter =
        EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    once.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_thread_names(true)
            .try_init();
    });
    true
}
