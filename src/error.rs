use thiserror::Error;
use tracing::{error, warn};

use crate::shortcuts::ShortcutParseError;
use crate::storage::StorageError;

/// Errors from editing the hotkey mapping set.
#[derive(Error, Debug)]
pub enum HotkeyError {
    #[error("no hotkey command named '{0}'")]
    UnknownCommand(String),

    #[error("'{chord}' is already bound to '{existing}'")]
    ChordConflict { chord: String, existing: String },

    #[error("invalid chord '{chord}': {source}")]
    InvalidChord {
        chord: String,
        #[source]
        source: ShortcutParseError,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Crate-wide error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Hotkey(#[from] HotkeyError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the user doesn't need to know.
///
/// ```ignore
/// use anilist_markdown::error::ResultExt;
///
/// let config = read_overrides().warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = %error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = %error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

/// Panic in debug mode, log error in release mode.
///
/// Use for "impossible" states that should crash during development
/// but gracefully degrade in production.
///
/// ```ignore
/// let Some(link) = config.by_description("Link") else {
///     debug_panic!("built-in command 'Link' is missing");
///     return;
/// };
/// ```
#[macro_export]
macro_rules! debug_panic {
    ( $($fmt_arg:tt)* ) => {
        if cfg!(debug_assertions) {
            panic!( $($fmt_arg)* );
        } else {
            tracing::error!("IMPOSSIBLE STATE: {}", format_args!($($fmt_arg)*));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_ext_passes_values_through() {
        let ok: std::result::Result<u8, HotkeyError> = Ok(3);
        assert_eq!(ok.log_err(), Some(3));
    }

    #[test]
    fn test_result_ext_swallows_errors() {
        let err: std::result::Result<u8, HotkeyError> =
            Err(HotkeyError::UnknownCommand("Nope".to_string()));
        assert_eq!(err.warn_on_err(), None);
    }

    #[test]
    fn test_error_messages() {
        let err = HotkeyError::ChordConflict {
            chord: "ctrl+b".to_string(),
            existing: "Bold".to_string(),
        };
        assert_eq!(err.to_string(), "'ctrl+b' is already bound to 'Bold'");

        let err: Error = HotkeyError::UnknownCommand("Nope".to_string()).into();
        assert_eq!(err.to_string(), "no hotkey command named 'Nope'");
    }

    #[test]
    #[should_panic(expected = "impossible")]
    fn test_debug_panic_panics_in_debug_builds() {
        crate::debug_panic!("impossible {}", "state");
    }
}
