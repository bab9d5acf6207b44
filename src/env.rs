use std::collections::HashMap;
use std::env as stdenv;
use std::ffi::OsString;
use std::path::PathBuf;

/// Mutable, session-level view of the process environment used by the interpreter.
///
/// The environment contains:
/// - `vars`: variable overrides layered on top of the live process environment.
///   They are visible to lookups and are passed to spawned commands.
/// - `current_dir`: the working directory for command execution.
/// - `should_exit`: set by the `exit` builtin so the interactive loop knows to stop.
///
/// Lookups fall through to the process environment on every call, so a `PATH`
/// or `HOME` changed during the session is honoured without a restart.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Variable overrides (e.g. PATH, HOME) that take precedence over the process environment.
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// When set to true, indicates that the interactive loop should exit.
    pub should_exit: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Capture the current working directory with no variable overrides.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            vars: HashMap::new(),
            current_dir,
            should_exit: false,
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// The raw `PATH` value used for executable lookup, if any.
    pub fn search_paths(&self) -> Option<OsString> {
        match self.vars.get("PATH") {
            Some(path) => Some(OsString::from(path)),
            None => stdenv::var_os("PATH"),
        }
    }

    /// The user's home directory as named by `HOME`.
    pub fn home_dir(&self) -> Option<String> {
        self.get_var("HOME").filter(|home| !home.is_empty())
    }
}
