use crate::command::{CommandFactory, ExitCode, Stdout};
use crate::config::ShellConfig;
use crate::editor::ShellHelper;
use crate::env::Environment;
use crate::error::ShellError;
use crate::parser::{self, Redirect, RedirectMode, RedirectStream};
use anyhow::Context;
use rustyline::config::{BellStyle, CompletionType, Config};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::fs::{File, OpenOptions};
use std::io::Write;
use tracing::debug;

/// Status for a name that is neither a builtin nor an executable on PATH.
pub const STATUS_NOT_FOUND: ExitCode = 127;
/// Status for a redirection operator with no file name.
pub const STATUS_SYNTAX_ERROR: ExitCode = 2;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate: builtins and ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A minimal shell that dispatches lines to built-in and external commands.
///
/// The interpreter maintains an [`Environment`] and a list of [`CommandFactory`] objects
/// that are queried in order to create commands by name. See [`Default`] for the
/// factories included out of the box.
///
/// Example
/// ```
/// use tabsh::Interpreter;
/// use tabsh::io_adapters::{captured, MemWriter};
///
/// let mut sh = Interpreter::default();
/// let (out, handle) = MemWriter::with_handle();
/// let code = sh.dispatch_with("echo hello world", Box::new(out), Box::new(std::io::stderr()));
/// assert_eq!(code, 0);
/// assert_eq!(captured(&handle), "hello world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
    config: ShellConfig,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            commands,
            config: ShellConfig::default(),
        }
    }

    /// Create an interpreter with the default commands and the given configuration.
    pub fn with_config(config: ShellConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Whether `exit` has been run.
    pub fn should_exit(&self) -> bool {
        self.env.should_exit
    }

    /// Dispatch a line against the process's own stdout and stderr.
    pub fn dispatch(&mut self, line: &str) -> ExitCode {
        self.dispatch_with(line, Box::new(std::io::stdout()), Box::new(std::io::stderr()))
    }

    /// Tokenize, classify and run a single line.
    ///
    /// A redirection replaces `stdout` or `stderr` with the target file for this
    /// command only. Failures are reported on `stderr` (or on its redirection)
    /// and reflected in the returned status; they never end the session.
    pub fn dispatch_with(
        &mut self,
        line: &str,
        stdout: Box<dyn Stdout>,
        mut stderr: Box<dyn Stdout>,
    ) -> ExitCode {
        let parsed = match parser::parse(line) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => return 0,
            Err(err) => {
                report(&mut stderr, &err);
                return STATUS_SYNTAX_ERROR;
            }
        };

        let (stdout, mut stderr) = match &parsed.redirect {
            None => (stdout, stderr),
            Some(redirect) => match open_redirect(redirect) {
                Ok(file) => match redirect.stream {
                    RedirectStream::Stdout => (Box::new(file) as Box<dyn Stdout>, stderr),
                    RedirectStream::Stderr => (stdout, Box::new(file) as Box<dyn Stdout>),
                },
                Err(err) => {
                    report(&mut stderr, &err);
                    return 1;
                }
            },
        };

        let Some(name) = parsed.name() else {
            // a bare redirection only creates or truncates its target
            return 0;
        };
        let args = parsed.args();

        let Some(cmd) = self
            .commands
            .iter()
            .find_map(|factory| factory.try_create(&self.env, name, &args))
        else {
            debug!(name, "no builtin or executable matched");
            report(&mut stderr, &ShellError::CommandNotFound(name.to_string()));
            return STATUS_NOT_FOUND;
        };

        debug!(name, args = ?args, "dispatching");
        match cmd.execute(stdout, stderr, &mut self.env) {
            Ok(code) => code,
            Err(err) => {
                // the command consumed its streams, so report through the shell's own
                report(&mut std::io::stderr(), &err);
                1
            }
        }
    }

    /// Read-Eval-Print Loop on top of rustyline with tab completion.
    ///
    /// Returns when input ends or after `exit`.
    pub fn repl(&mut self) -> anyhow::Result<()> {
        let config = Config::builder()
            .completion_type(CompletionType::List)
            .bell_style(BellStyle::None)
            .auto_add_history(false)
            .build();
        let mut rl: Editor<ShellHelper, DefaultHistory> =
            Editor::with_config(config).context("failed to initialise line editor")?;
        rl.set_helper(Some(ShellHelper::new(&self.config)));

        loop {
            match rl.readline(&self.config.prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line.as_str())?;
                    let status = self.dispatch(&line);
                    debug!(status, "line finished");
                    if self.should_exit() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => return Err(err).context("failed to read line"),
            }
        }

        Ok(())
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default set of commands:
    /// - built-ins: `echo`, `exit`, `pwd`, `cd`, `type`, `help`
    /// - external command launcher
    fn default() -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::new(vec![
            Box::new(Factory::<Echo>::default()),
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Pwd>::default()),
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Type>::default()),
            Box::new(Factory::<Help>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ])
    }
}

fn open_redirect(redirect: &Redirect) -> Result<File, ShellError> {
    let mut options = OpenOptions::new();
    options.create(true);
    match redirect.mode {
        RedirectMode::Truncate => options.write(true).truncate(true),
        RedirectMode::Append => options.append(true),
    };
    options.open(&redirect.path).map_err(|source| ShellError::Redirect {
        path: redirect.path.clone(),
        source,
    })
}

fn report(stderr: &mut dyn Write, err: &dyn std::fmt::Display) {
    // nothing sensible is left to do if stderr itself is gone
    let _ = writeln!(stderr, "{err}");
    let _ = stderr.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_adapters::{captured, MemWriter};
    use crate::test_support::{lock_current_dir, write_script};
    use std::cell::RefCell;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use std::rc::Rc;

    type Buffer = Rc<RefCell<Vec<u8>>>;

    fn run(sh: &mut Interpreter, line: &str) -> (ExitCode, String, String) {
        let (out, out_handle): (MemWriter, Buffer) = MemWriter::with_handle();
        let (err, err_handle) = MemWriter::with_handle();
        let code = sh.dispatch_with(line, Box::new(out), Box::new(err));
        (code, captured(&out_handle), captured(&err_handle))
    }

    fn shell_with_path(dir: &Path) -> Interpreter {
        let mut sh = Interpreter::default();
        let env = sh.env_mut();
        env.set_var("PATH", dir.to_string_lossy().to_string());
        // other tests may be sitting in a directory that is about to vanish
        env.current_dir = std::env::temp_dir();
        sh
    }

    #[test]
    fn test_echo_line() {
        let _lock = lock_current_dir();
        let mut sh = Interpreter::default();
        let before = std::env::current_dir().unwrap();

        let (code, out, err) = run(&mut sh, "echo a b c");

        assert_eq!(code, 0);
        assert_eq!(out, "a b c\n");
        assert!(err.is_empty());
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_empty_lines_are_ignored() {
        let mut sh = Interpreter::default();
        for line in ["", "   ", "\t\n"] {
            assert_eq!(run(&mut sh, line), (0, String::new(), String::new()));
        }
    }

    #[test]
    fn test_cd_failure_keeps_directory() {
        let _lock = lock_current_dir();
        let mut sh = Interpreter::default();
        let before = std::env::current_dir().unwrap();

        let (code, out, err) = run(&mut sh, "cd /nonexistent");

        assert_eq!(code, 1);
        assert!(out.is_empty());
        assert_eq!(err, "cd: /nonexistent: No such file or directory\n");
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_cd_then_pwd() {
        let _lock = lock_current_dir();
        let temp = tempfile::tempdir().unwrap();
        let canonical = fs::canonicalize(temp.path()).unwrap();
        let orig = std::env::current_dir().unwrap();
        let mut sh = Interpreter::default();

        let (cd_code, _, _) = run(&mut sh, &format!("cd {}", canonical.display()));
        let (pwd_code, out, _) = run(&mut sh, "pwd");
        std::env::set_current_dir(orig).unwrap();

        assert_eq!(cd_code, 0);
        assert_eq!(pwd_code, 0);
        assert_eq!(out, format!("{}\n", canonical.display()));
    }

    #[test]
    fn test_type_lines() {
        let mut sh = Interpreter::default();

        let (code, out, _) = run(&mut sh, "type cd");
        assert_eq!(code, 0);
        assert_eq!(out, "cd is a shell builtin\n");

        let (code, out, err) = run(&mut sh, "type zzzznotacommand");
        assert_ne!(code, 0);
        assert!(out.is_empty());
        assert_eq!(err, "zzzznotacommand: not found\n");

        let (code, _, err) = run(&mut sh, "type");
        assert_eq!(code, 1);
        assert_eq!(err, "type: missing argument\n");
    }

    #[test]
    fn test_builtin_usage_errors_go_to_stderr() {
        let mut sh = Interpreter::default();
        let (code, out, err) = run(&mut sh, "pwd --bogus");
        assert_eq!(code, 1);
        assert!(out.is_empty());
        assert!(!err.is_empty());
    }

    #[test]
    fn test_extra_builtin_arguments_are_ignored() {
        let _lock = lock_current_dir();
        let temp = tempfile::tempdir().unwrap();
        let canonical = fs::canonicalize(temp.path()).unwrap();
        let orig = std::env::current_dir().unwrap();
        let mut sh = Interpreter::default();

        let (code, out, err) = run(&mut sh, "type echo extra");
        assert_eq!((code, out.as_str(), err.as_str()), (0, "echo is a shell builtin\n", ""));

        let (cd_code, _, cd_err) = run(&mut sh, &format!("cd {} extra", canonical.display()));
        let (pwd_code, pwd_out, _) = run(&mut sh, "pwd x");
        std::env::set_current_dir(orig).unwrap();

        assert_eq!(cd_code, 0, "{cd_err}");
        assert_eq!(pwd_code, 0);
        assert_eq!(pwd_out, format!("{}\n", canonical.display()));
    }

    #[test]
    fn test_cd_into_directory_starting_with_dash() {
        let _lock = lock_current_dir();
        let temp = tempfile::tempdir().unwrap();
        let canonical = fs::canonicalize(temp.path()).unwrap();
        fs::create_dir(canonical.join("-logs")).unwrap();
        let orig = std::env::current_dir().unwrap();
        let mut sh = Interpreter::default();
        sh.env_mut().current_dir = canonical.clone();

        let (code, out, err) = run(&mut sh, "cd -logs");
        std::env::set_current_dir(orig).unwrap();

        assert_eq!((code, out.as_str(), err.as_str()), (0, "", ""));
        assert_eq!(sh.env().current_dir, canonical.join("-logs"));
    }

    #[test]
    fn test_exit_sets_flag_without_output() {
        let mut sh = Interpreter::default();
        assert!(!sh.should_exit());
        let (code, out, err) = run(&mut sh, "exit");
        assert_eq!(code, 0);
        assert!(out.is_empty() && err.is_empty());
        assert!(sh.should_exit());
    }

    #[test]
    fn test_unknown_command() {
        let dir = tempfile::tempdir().unwrap();
        let mut sh = shell_with_path(dir.path());

        let (code, out, err) = run(&mut sh, "zzzznotacommand --flag");

        assert_eq!(code, STATUS_NOT_FOUND);
        assert!(out.is_empty());
        assert_eq!(err, "zzzznotacommand: command not found\n");
        assert!(!sh.should_exit());
    }

    #[test]
    fn test_echo_redirect_truncates_then_appends() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        fs::write(&target, "stale contents\n").unwrap();
        let mut sh = Interpreter::default();

        let (code, out, _) = run(&mut sh, &format!("echo hi > {}", target.display()));
        assert_eq!(code, 0);
        assert!(out.is_empty(), "redirected output leaked: {out:?}");
        assert_eq!(fs::read_to_string(&target).unwrap(), "hi\n");

        run(&mut sh, &format!("echo again 1>> {}", target.display()));
        assert_eq!(fs::read_to_string(&target).unwrap(), "hi\nagain\n");

        // the next command writes to the shell's stdout again
        let (_, out, _) = run(&mut sh, "echo back");
        assert_eq!(out, "back\n");
    }

    #[test]
    fn test_stderr_redirect_for_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("err.txt");
        let mut sh = Interpreter::default();

        let (code, _, err) = run(&mut sh, &format!("type nothing_here_zz 2> {}", target.display()));

        assert_eq!(code, 1);
        assert!(err.is_empty());
        assert_eq!(fs::read_to_string(&target).unwrap(), "nothing_here_zz: not found\n");
    }

    #[test]
    fn test_external_stdout_redirect() {
        let dir = tempfile::tempdir().unwrap();
        write_script(dir.path(), "greet", "echo \"hello $1\"");
        let target = dir.path().join("greeting.txt");
        let mut sh = shell_with_path(dir.path());

        let line = format!("greet world > {} ignored 2> also-ignored", target.display());
        let (code, _, _) = run(&mut sh, &line);

        assert_eq!(code, 0);
        assert_eq!(fs::read_to_string(&target).unwrap(), "hello world\n");
        assert!(!dir.path().join("also-ignored").exists());
    }

    #[test]
    fn test_external_stderr_append() {
        let dir = tempfile::tempdir().unwrap();
        write_script(dir.path(), "complain", "echo \"oops $1\" 1>&2; exit 4");
        let target = dir.path().join("errors.log");
        let mut sh = shell_with_path(dir.path());

        let line = format!("complain one 2>> {}", target.display());
        assert_eq!(run(&mut sh, &line).0, 4);
        let line = format!("complain two 2>> {}", target.display());
        assert_eq!(run(&mut sh, &line).0, 4);

        assert_eq!(fs::read_to_string(&target).unwrap(), "oops one\noops two\n");
    }

    #[test]
    fn test_spawn_failure_follows_stderr_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken");
        fs::write(&broken, "#!/nonexistent/interpreter\n").unwrap();
        fs::set_permissions(&broken, fs::Permissions::from_mode(0o755)).unwrap();
        let target = dir.path().join("err.txt");
        let mut sh = shell_with_path(dir.path());

        let (code, out, err) = run(&mut sh, &format!("broken 2> {}", target.display()));

        assert_eq!(code, STATUS_NOT_FOUND);
        assert!(out.is_empty() && err.is_empty(), "{out:?} {err:?}");
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "broken: command not found\n"
        );
    }

    #[test]
    fn test_missing_redirect_target() {
        let mut sh = Interpreter::default();
        let (code, out, err) = run(&mut sh, "echo hi >");
        assert_eq!(code, STATUS_SYNTAX_ERROR);
        assert!(out.is_empty());
        assert!(err.starts_with("syntax error"), "{err}");
    }

    #[test]
    fn test_unopenable_redirect_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing-dir").join("out.txt");
        let mut sh = Interpreter::default();

        let (code, out, err) = run(&mut sh, &format!("echo hi > {}", target.display()));

        assert_eq!(code, 1);
        assert!(out.is_empty());
        assert_eq!(
            err,
            format!("{}: No such file or directory\n", target.display())
        );
    }

    #[test]
    fn test_bare_redirect_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("touched");
        let mut sh = Interpreter::default();

        assert_eq!(run(&mut sh, &format!("> {}", target.display())).0, 0);
        assert!(target.exists());
    }

    #[test]
    fn test_runtime_path_change_is_honoured() {
        let dir = tempfile::tempdir().unwrap();
        let mut sh = shell_with_path(Path::new("/definitely/not/here"));
        assert_eq!(run(&mut sh, "latecomer").0, STATUS_NOT_FOUND);

        write_script(dir.path(), "latecomer", "exit 0");
        sh.env_mut()
            .set_var("PATH", dir.path().to_string_lossy().to_string());
        assert_eq!(run(&mut sh, "latecomer").0, 0);
    }

    #[test]
    fn test_with_config_keeps_default_commands() {
        let config = ShellConfig {
            prompt: "> ".into(),
            ..ShellConfig::default()
        };
        let mut sh = Interpreter::with_config(config);
        assert_eq!(sh.config().prompt, "> ");
        assert_eq!(run(&mut sh, "echo ok").1, "ok\n");
    }
}
