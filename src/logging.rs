//! Structured JSONL logging to a file plus compact stderr output.
//!
//! - **JSONL to file** (`<config dir>/anilist-markdown/logs/anilist-markdown.jsonl`)
//! - **Compact to stderr**, warnings only unless verbose
//!
//! # Usage
//!
//! ```rust,ignore
//! use anilist_markdown::logging;
//!
//! // Keep the guard alive for the duration of the program
//! let _guard = logging::init(false);
//!
//! tracing::info!(event_type = "render", "Rendered comment");
//! ```
//!
//! # JSONL Output Format
//!
//! ```json
//! {"timestamp":"2026-10-17T10:30:45.123Z","level":"INFO","target":"anilist_markdown::shortcuts::settings","fields":{"message":"Hotkeys updated","bindings":15,"overrides":1}}
//! ```

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

const LOG_FILE_NAME: &str = "anilist-markdown.jsonl";

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize the dual-output logging system.
///
/// `RUST_LOG` overrides the default `info` filter for the file. Stderr only
/// shows warnings and errors unless `verbose` is set, so command output on
/// stdout stays clean.
pub fn init(verbose: bool) -> LoggingGuard {
    let log_dir = log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }

    let log_path = log_dir.join(LOG_FILE_NAME);
    let file: Box<dyn Write + Send> = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => Box::new(file),
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            Box::new(io::sink())
        }
    };

    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    let stderr_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact()
        .with_filter(stderr_level);

    // A second init (tests, embedding hosts) keeps the existing subscriber
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(stderr_layer)
        .try_init();

    tracing::debug!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %log_path.display(),
        "Logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

fn log_dir() -> PathBuf {
    crate::config::app_dir().join("logs")
}

/// Path of the JSONL log file.
pub fn log_path() -> PathBuf {
    log_dir().join(LOG_FILE_NAME)
}

// =============================================================================
// STRUCTURED LOGGING HELPERS
// =============================================================================

/// Log a hotkey command applied to a surface.
pub fn log_hotkey_event(command: &str, chord: &str, handled: bool) {
    tracing::info!(
        event_type = "hotkey",
        command = command,
        chord = chord,
        handled = handled,
        "Hotkey {} ({})",
        command,
        chord
    );
}

/// Log a markdown render with its sizes and timing.
pub fn log_render(source_chars: usize, html_chars: usize, widgets: usize, duration_us: u128) {
    tracing::info!(
        event_type = "render",
        source_chars = source_chars,
        html_chars = html_chars,
        widgets = widgets,
        duration_us = duration_us as u64,
        "Rendered markdown"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_lives_under_app_dir() {
        let path = log_path();
        assert!(path.starts_with(crate::config::app_dir()));
        assert_eq!(path.file_name().unwrap(), LOG_FILE_NAME);
    }

    #[test]
    fn helpers_do_not_panic_without_subscriber() {
        log_hotkey_event("Bold", "ctrl+b", true);
        log_render(10, 20, 1, 5);
    }
}
