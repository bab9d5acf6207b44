use argh::FromArgs;
use tabsh::config::{DEFAULT_MAX_CANDIDATES, DEFAULT_PROMPT};
use tabsh::{Interpreter, ShellConfig};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `TABSH_LOG=debug`.
const LOG_ENV: &str = "TABSH_LOG";

#[derive(FromArgs)]
/// An interactive shell with PATH-aware tab completion.
struct Args {
    /// prompt printed before each line
    #[argh(option, default = "DEFAULT_PROMPT.to_string()")]
    prompt: String,

    /// upper bound on completion candidates gathered per tab press
    #[argh(option, default = "DEFAULT_MAX_CANDIDATES")]
    max_candidates: usize,

    /// do not print the startup banner
    #[argh(switch)]
    no_banner: bool,
}

impl From<Args> for ShellConfig {
    fn from(args: Args) -> Self {
        ShellConfig {
            prompt: args.prompt,
            max_candidates: args.max_candidates,
            show_banner: !args.no_banner,
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_banner() {
    print!("\x1b[32m");
    println!(r"   _        _         _     ");
    println!(r"  | |_ __ _| |__  ___| |__  ");
    println!(r"  | __/ _` | '_ \/ __| '_ \ ");
    println!(r"  | || (_| | |_) \__ \ | | |");
    println!(r"   \__\__,_|_.__/|___/_| |_|");
    println!("Welcome to tabsh! Type 'help' for commands.");
    print!("\x1b[0m");
}

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();
    init_logging();

    let config = ShellConfig::from(args);
    if config.show_banner {
        print_banner();
    }

    let mut shell = Interpreter::with_config(config);
    shell.repl()
}
