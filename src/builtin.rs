use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Stdout};
use crate::env::Environment;
use crate::error::ShellError;
use crate::interpreter::Factory;
use crate::resolver::resolve_executable;
use anyhow::Result;
use argh::{EarlyExit, FromArgs};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Names of every builtin, in the order the completer offers them.
pub const BUILTIN_NAMES: &[&str] = &["echo", "exit", "pwd", "cd", "type", "help"];

/// Whether `name` is handled in-process rather than spawned.
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// Executes the command using provided output streams and environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(
        self,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        mut stdout: Box<dyn Stdout>,
        mut stderr: Box<dyn Stdout>,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let result = <T as BuiltinCommand>::execute(*self, &mut stdout, &mut stderr, env);
        stdout.flush()?;
        match result {
            Ok(x) => Ok(x),
            Err(e) => {
                writeln!(stderr, "{e}")?;
                Ok(1)
            }
        }
    }
}

/// Output of argument parsing that stopped early: `--help` text or a usage error.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        mut stdout: Box<dyn Stdout>,
        mut stderr: Box<dyn Stdout>,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        if self.is_error {
            writeln!(stderr, "{}", self.output.trim_end())?;
            Ok(1)
        } else {
            writeln!(stdout, "{}", self.output.trim_end())?;
            Ok(0)
        }
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], args) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

/// Raw first argument; anything after it is ignored.
fn first_arg(args: &[&str]) -> Option<String> {
    args.first().map(|arg| arg.to_string())
}

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Pwd {
    #[argh(positional, greedy)]
    /// ignored
    pub _args: Vec<String>,
}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(
        self,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        writeln!(stdout, "{}", env.current_dir.to_string_lossy())?;
        Ok(0)
    }
}

/// Change the current working directory.
/// If no target is provided, or the target is `~`, changes to $HOME.
///
/// Only the first argument is looked at, and it is taken as a path even when
/// it starts with `-`.
pub struct Cd {
    pub target: Option<String>,
}

impl FromArgs for Cd {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Cd {
            target: first_arg(args),
        })
    }
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(
        self,
        _stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let shown = match self.target.as_deref() {
            Some(t) if !t.is_empty() && t != "~" => t.to_string(),
            _ => env.home_dir().ok_or(ShellError::HomeNotSet)?,
        };

        let target = PathBuf::from(&shown);
        let new_dir = if target.is_absolute() {
            target
        } else {
            env.current_dir.join(target)
        };

        let change_dir_error = |source| ShellError::ChangeDir {
            path: shown.clone(),
            source,
        };
        let canonical = fs::canonicalize(&new_dir).map_err(change_dir_error)?;
        env::set_current_dir(&canonical).map_err(change_dir_error)?;
        tracing::debug!(dir = %canonical.display(), "changed directory");
        env.current_dir = canonical;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Exit the shell.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored; the shell always exits with status 0
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(
        self,
        _stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        env.should_exit = true;
        Ok(0)
    }
}

/// Write the arguments to standard output, separated by spaces and followed
/// by a newline.
///
/// Every argument is printed literally, so `echo` parses its own arguments
/// instead of deriving `FromArgs`.
pub struct Echo {
    pub args: Vec<String>,
}

impl FromArgs for Echo {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Echo {
            args: args.iter().map(|arg| arg.to_string()).collect(),
        })
    }
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn execute(
        self,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        writeln!(stdout, "{}", self.args.join(" "))?;
        Ok(0)
    }
}

/// Report whether a name is a shell builtin or which executable it runs.
pub struct Type {
    pub name: Option<String>,
}

impl FromArgs for Type {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Type {
            name: first_arg(args),
        })
    }
}

impl BuiltinCommand for Type {
    fn name() -> &'static str {
        "type"
    }

    fn execute(
        self,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let name = self.name.ok_or(ShellError::MissingArgument("type"))?;
        if is_builtin(&name) {
            writeln!(stdout, "{name} is a shell builtin")?;
            return Ok(0);
        }
        let search_paths = env.search_paths();
        match resolve_executable(search_paths.as_deref(), &name) {
            Some(path) => {
                writeln!(stdout, "{name} is {}", path.display())?;
                Ok(0)
            }
            None => Err(ShellError::NotFound(name).into()),
        }
    }
}

pub(crate) const HELP_TEXT: &str = "\
Built-in commands:
  cd [dir]     - Change directory
  echo [text]  - Print text
  exit         - Exit the shell
  help         - Show this help
  pwd          - Print working directory
  type [cmd]   - Show command type/location
";

#[derive(FromArgs)]
/// Show a summary of the builtin commands.
pub struct Help {
    #[argh(positional, greedy)]
    /// ignored
    pub _args: Vec<String>,
}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn execute(
        self,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        stdout.write_all(HELP_TEXT.as_bytes())?;
        Ok(0)
    }
}
