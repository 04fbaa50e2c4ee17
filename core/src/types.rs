//! types.rs
//! Unified error for dictionary handles, views and sessions.

use thiserror::Error;

use crate::dictionary::DictMode;

/// Error surfaced by every fallible operation in this crate.
/// - `Clone` so a memoised format check can be replayed to later callers.
/// - No variant is retried internally; retry is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DictError {
    /// Dictionary content was not a bytes-like value (raised by the bindings).
    #[error("dict_content must be a bytes-like object, got {got}")]
    Type { got: String },

    /// Content is not a valid zstd dictionary and `is_raw` was false.
    #[error("invalid zstd dictionary: {reason}")]
    Format { reason: String },

    /// The engine could not allocate the requested resource.
    #[error("unable to allocate {what}")]
    Allocation { what: String },

    /// Prefix-mode frame decoded with different prefix bytes.
    #[error("prefix content mismatch: {msg}")]
    ContentMismatch { msg: String },

    /// Long distance matching requested together with a dictionary mode.
    #[error("{mode} dictionary cannot be combined with long distance matching, use a prefix")]
    Incompatible { mode: DictMode },

    /// Any other engine failure.
    #[error("zstd {op} failed: {msg}")]
    Engine { op: &'static str, msg: String },

    /// Internal state failure (worker panic).
    #[error("dictionary state error: {0}")]
    State(String),
}

impl DictError {
    /// Wrap a zstd error code.
    pub fn engine(op: &'static str, code: usize) -> Self {
        DictError::Engine {
            op,
            msg: zstd_safe::get_error_name(code).to_string(),
        }
    }

    pub fn format(reason: impl Into<String>) -> Self {
        DictError::Format { reason: reason.into() }
    }

    pub fn allocation(what: impl Into<String>) -> Self {
        DictError::Allocation { what: what.into() }
    }
}
