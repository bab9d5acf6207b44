use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Stdout};
use crate::env::Environment;
use crate::error::ShellError;
use crate::interpreter::{Factory, STATUS_NOT_FOUND};
use crate::resolver::resolve_executable;
use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tracing::debug;

/// Command that is not a builtin.
pub struct ExternalCommand {
    /// The name as typed, passed to the program as `argv[0]`.
    name: String,
    /// Resolved location of the executable.
    path: PathBuf,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(name: String, path: PathBuf, args: Vec<String>) -> Self {
        Self { name, path, args }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        let search_paths = env.search_paths();
        let path = resolve_executable(search_paths.as_deref(), name)?;
        Some(Box::new(ExternalCommand::new(
            name.to_string(),
            path,
            args.iter().map(|x| x.to_string()).collect(),
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(
        self: Box<Self>,
        stdout: Box<dyn Stdout>,
        stderr: Box<dyn Stdout>,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let mut report_to = stderr.try_clone_boxed()?;
        let mut cmd = std::process::Command::new(&self.path);
        cmd.args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(stdout.stdio())
            .stderr(stderr.stdio())
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir);
        set_arg0(&mut cmd, &self.name);

        debug!(name = %self.name, path = %self.path.display(), "spawning external command");
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                debug!(name = %self.name, %err, "spawn failed");
                writeln!(report_to, "{}", ShellError::CommandNotFound(self.name))?;
                report_to.flush()?;
                return Ok(STATUS_NOT_FOUND);
            }
        };
        let exit_status = child.wait()?;
        debug!(name = %self.name, status = %exit_status, "external command finished");
        match exit_status.code() {
            Some(x) => Ok(x),
            None => Ok(terminated_by_signal(exit_status)),
        }
    }
}

#[cfg(unix)]
fn set_arg0(cmd: &mut std::process::Command, name: &str) {
    use std::os::unix::process::CommandExt;
    cmd.arg0(name);
}

#[cfg(not(unix))]
fn set_arg0(_cmd: &mut std::process::Command, _name: &str) {}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}
