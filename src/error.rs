//! User-facing shell errors.
//!
//! Every variant renders as the exact line the shell prints to standard error.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{0}: command not found")]
    CommandNotFound(String),

    /// `type` could not find the name among builtins or on PATH.
    #[error("{0}: not found")]
    NotFound(String),

    #[error("{0}: missing argument")]
    MissingArgument(&'static str),

    #[error("cd: {path}: {}", describe_io_error(.source))]
    ChangeDir {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("cd: HOME not set")]
    HomeNotSet,

    #[error("syntax error near unexpected token `newline' after `{0}'")]
    MissingRedirectTarget(String),

    #[error("{path}: {}", describe_io_error(.source))]
    Redirect {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Render an I/O error the way the C library's `strerror` would, without the
/// `(os error N)` suffix Rust appends.
pub fn describe_io_error(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => "No such file or directory".to_string(),
        io::ErrorKind::PermissionDenied => "Permission denied".to_string(),
        _ => {
            let text = err.to_string();
            match text.find(" (os error") {
                Some(idx) => text[..idx].to_string(),
                None => text,
            }
        }
    }
}
