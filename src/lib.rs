//! A small interactive shell with PATH-aware tab completion.
//!
//! The crate is split the way a shell front-end naturally splits: the
//! [`resolver`] finds builtins and executables on `PATH`, the [`completion`]
//! engine turns those candidates into terminal behaviour across successive tab
//! presses, and the [`Interpreter`] tokenizes submitted lines, applies output
//! redirection and runs either a builtin or an external program.
//!
//! The public modules expose traits and types for implementing your own
//! commands and for driving completion without a terminal.

mod builtin;
pub mod command;
pub mod completion;
pub mod config;
mod editor;
pub mod env;
pub mod error;
mod external;
mod interpreter;
pub mod io_adapters;
pub mod parser;
pub mod resolver;

pub use builtin::BUILTIN_NAMES;
pub use config::ShellConfig;
pub use editor::ShellHelper;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;
