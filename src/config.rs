/// Default upper bound on completion candidates gathered per tab press.
pub const DEFAULT_MAX_CANDIDATES: usize = 256;

/// Default prompt, also used when redrawing after a candidate listing.
pub const DEFAULT_PROMPT: &str = "$ ";

/// Session configuration shared by the interpreter and the line editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Prompt printed before each line.
    pub prompt: String,
    /// Cap on the number of completion candidates (builtins included).
    pub max_candidates: usize,
    /// Whether the binary prints its banner on startup.
    pub show_banner: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            max_candidates: DEFAULT_MAX_CANDIDATES,
            show_banner: true,
        }
    }
}
