//! Tab-completion state machine.
//!
//! The engine remembers the text it last completed and whether an ambiguous
//! press has already been spent on it. A first press extends the text to the
//! longest common prefix of the candidates and rings the bell; a second press
//! on the same text lists every candidate and redraws the prompt. The engine
//! itself never touches the terminal: it returns a [`CompletionOutcome`] and
//! [`render`] writes the bell or listing to whatever sink the caller provides.

use crate::resolver::longest_common_prefix;
use std::io::{self, Write};
use tracing::trace;

/// Terminal bell.
pub const BELL: &str = "\x07";

/// Whether an ambiguous press has already been consumed for the pending text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Fresh,
    Armed,
}

/// What a single completion-key press should do to the terminal and buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Nothing matched: ring the bell, insert nothing.
    NoMatch,
    /// Exactly one candidate: insert the rest of it plus a space.
    Complete { suffix: String },
    /// Several candidates sharing a longer prefix: insert up to it and ring the bell.
    Extend { suffix: String },
    /// Several candidates and no common extension: ring the bell only.
    Ambiguous,
    /// Second press on the same ambiguous text: list the candidates.
    List { candidates: Vec<String> },
}

impl CompletionOutcome {
    /// Text to insert at the cursor.
    pub fn insertion(&self) -> &str {
        match self {
            CompletionOutcome::Complete { suffix } | CompletionOutcome::Extend { suffix } => suffix,
            _ => "",
        }
    }

    pub fn rings_bell(&self) -> bool {
        matches!(
            self,
            CompletionOutcome::NoMatch | CompletionOutcome::Extend { .. } | CompletionOutcome::Ambiguous
        )
    }
}

/// Completion state for one interactive session.
#[derive(Debug, Default)]
pub struct CompletionEngine {
    pending_text: String,
    phase: Phase,
}

impl CompletionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The text the engine considers "the same text" for a second press.
    pub fn pending_text(&self) -> &str {
        &self.pending_text
    }

    /// Handle one press of the completion key.
    ///
    /// `text` is the word under the cursor and `candidates` the resolver's
    /// matches for it; every candidate is expected to start with `text`.
    pub fn on_tab(&mut self, text: &str, candidates: Vec<String>) -> CompletionOutcome {
        if text != self.pending_text {
            self.pending_text = text.to_string();
            self.phase = Phase::Fresh;
        }

        let outcome = match (candidates.len(), self.phase) {
            (0, _) => {
                self.phase = Phase::Fresh;
                CompletionOutcome::NoMatch
            }
            (1, _) => {
                self.phase = Phase::Fresh;
                let rest = candidates[0].strip_prefix(text).unwrap_or_default();
                CompletionOutcome::Complete {
                    suffix: format!("{rest} "),
                }
            }
            (_, Phase::Fresh) => {
                self.phase = Phase::Armed;
                let prefix = longest_common_prefix(&candidates);
                if prefix.len() > text.len() && prefix.starts_with(text) {
                    let suffix = prefix[text.len()..].to_string();
                    // the next press sees the extended text and must count as a repeat
                    self.pending_text = prefix;
                    CompletionOutcome::Extend { suffix }
                } else {
                    CompletionOutcome::Ambiguous
                }
            }
            (_, Phase::Armed) => {
                self.phase = Phase::Fresh;
                CompletionOutcome::List { candidates }
            }
        };
        trace!(text, ?outcome, phase = ?self.phase, "completion key handled");
        outcome
    }
}

/// Write the terminal side effects of `outcome`.
///
/// A listing is printed on a fresh line, each candidate followed by two
/// spaces, and then `prompt` and `line` are redrawn on the next line.
pub fn render(
    outcome: &CompletionOutcome,
    prompt: &str,
    line: &str,
    out: &mut dyn Write,
) -> io::Result<()> {
    if outcome.rings_bell() {
        out.write_all(BELL.as_bytes())?;
    }
    if let CompletionOutcome::List { candidates } = outcome {
        out.write_all(b"\n")?;
        for candidate in candidates {
            write!(out, "{candidate}  ")?;
        }
        write!(out, "\n{prompt}{line}")?;
    }
    out.flush()
}
