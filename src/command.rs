use crate::env::Environment;
use anyhow::Result;
use std::fs::File;
use std::io::{self, Write};
use std::process::Stdio;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Abstraction over a writable output stream that can also be converted into
/// a [`Stdio`] handle for spawning external processes.
///
/// Builtins write to it in-process; external commands receive it as the child's
/// stdout or stderr, which is how redirection reaches a child without touching
/// the shell's own streams.
pub trait Stdout: Write {
    /// Convert this output into a [`Stdio`] handle suitable for `std::process::Command`.
    fn stdio(self: Box<Self>) -> Stdio;

    /// A second handle to the same stream, kept for reporting after the
    /// original has been handed to a child.
    fn try_clone_boxed(&self) -> io::Result<Box<dyn Stdout>>;
}

impl Stdout for io::Stdout {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }

    fn try_clone_boxed(&self) -> io::Result<Box<dyn Stdout>> {
        Ok(Box::new(io::stdout()))
    }
}

impl Stdout for io::Stderr {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }

    fn try_clone_boxed(&self) -> io::Result<Box<dyn Stdout>> {
        Ok(Box::new(io::stderr()))
    }
}

impl Stdout for File {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }

    fn try_clone_boxed(&self) -> io::Result<Box<dyn Stdout>> {
        Ok(Box::new(self.try_clone()?))
    }
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    /// Executes the command with the given standard output and standard error.
    fn execute(
        self: Box<Self>,
        stdout: Box<dyn Stdout>,
        stderr: Box<dyn Stdout>,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
/// Implementations can use the environment to resolve executables (e.g., using PATH).
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>>;
}
