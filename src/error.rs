use thiserror::Error;
use tracing::{error, warn};

/// Errors produced while turning a user-authored `/body/flags` string into
/// an executable pattern.
///
/// Every variant is recoverable: the engine treats a failed parse as "this
/// script is a no-op" and keeps folding over the remaining scripts. User
/// script data must never crash the host pipeline.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern is not delimited as /body/flags: {0:?}")]
    Malformed(String),

    #[error("pattern body is empty")]
    EmptyPattern,

    #[error("invalid or duplicate pattern flags: {0:?}")]
    InvalidFlags(String),

    #[error("pattern failed to compile: {0}")]
    Compile(#[from] regex::Error),
}

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the caller degrades to a
/// fallback instead of propagating.
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable
    /// failures. The engine itself only warns (a bad user script is an
    /// expected failure); this error-level variant is exported for hosts
    /// wiring their own fallible calls around the pipeline.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
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
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}
