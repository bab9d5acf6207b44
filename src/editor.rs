//! rustyline integration: the completion callback and the helper traits.
//!
//! rustyline runs in `CompletionType::List` mode and the helper always hands
//! back exactly one replacement for the word under the cursor, so rustyline
//! simply applies it and never runs its own multi-candidate logic. The bell
//! and candidate listing come from [`completion::render`](crate::completion::render).

use crate::completion::{render, CompletionEngine};
use crate::config::ShellConfig;
use crate::resolver::find_candidates;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::cell::RefCell;
use std::ffi::OsString;
use std::io;

/// Characters that end the word being completed, as in classic readline.
const WORD_BREAK_CHARS: &[char] = &[
    ' ', '\t', '\n', '"', '\\', '\'', '`', '@', '$', '>', '<', '=', ';', '|', '&', '{', '(',
];

/// Line-editor helper owning the session's completion state.
pub struct ShellHelper {
    engine: RefCell<CompletionEngine>,
    prompt: String,
    max_candidates: usize,
    /// Fixed search path; `None` reads the process `PATH` on every press.
    search_paths: Option<OsString>,
}

impl ShellHelper {
    pub fn new(config: &ShellConfig) -> Self {
        Self {
            engine: RefCell::new(CompletionEngine::new()),
            prompt: config.prompt.clone(),
            max_candidates: config.max_candidates,
            search_paths: None,
        }
    }

    /// Complete against `paths` instead of the process `PATH`.
    pub fn with_search_paths(mut self, paths: impl Into<OsString>) -> Self {
        self.search_paths = Some(paths.into());
        self
    }
}

/// Start offset and text of the word ending at `pos`.
pub(crate) fn word_at(line: &str, pos: usize) -> (usize, &str) {
    let head = &line[..pos];
    let start = head
        .rfind(WORD_BREAK_CHARS)
        .map(|idx| idx + head[idx..].chars().next().map_or(1, char::len_utf8))
        .unwrap_or(0);
    (start, &head[start..])
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, word) = word_at(line, pos);
        // PATH is read on every press so changes made during the session apply
        let search_paths = match &self.search_paths {
            Some(paths) => Some(paths.clone()),
            None => std::env::var_os("PATH"),
        };
        let candidates = find_candidates(word, search_paths.as_deref(), self.max_candidates);
        let outcome = self.engine.borrow_mut().on_tab(word, candidates);

        render(&outcome, &self.prompt, line, &mut io::stdout().lock())?;

        let replacement = format!("{word}{}", outcome.insertion());
        Ok((
            start,
            vec![Pair {
                display: replacement.clone(),
                replacement,
            }],
        ))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}
