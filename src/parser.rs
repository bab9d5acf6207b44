//! Turns a submitted line into a [`ParsedCommand`].
//!
//! Tokenizing is deliberately plain: words are separated by spaces, tabs and
//! newlines, with no quoting, escaping or expansion. The only syntax recognised
//! is a single output redirection written as its own token.

use crate::error::ShellError;

/// Which of the command's streams a redirection rebinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectStream {
    Stdout,
    Stderr,
}

/// Whether the redirection target is truncated or appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    Truncate,
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub stream: RedirectStream,
    pub mode: RedirectMode,
    pub path: String,
}

/// A tokenized line: the argument vector plus at most one redirection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub argv: Vec<String>,
    pub redirect: Option<Redirect>,
}

impl ParsedCommand {
    /// The command name, if the line names one.
    pub fn name(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// Arguments after the command name.
    pub fn args(&self) -> Vec<&str> {
        self.argv.iter().skip(1).map(String::as_str).collect()
    }
}

/// Split a line on spaces, tabs and newlines, dropping empty words.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split([' ', '\t', '\n'])
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// Recognise a standalone redirection operator.
pub fn redirect_operator(token: &str) -> Option<(RedirectStream, RedirectMode)> {
    use RedirectMode::*;
    use RedirectStream::*;
    match token {
        ">" | "1>" => Some((Stdout, Truncate)),
        ">>" | "1>>" => Some((Stdout, Append)),
        "2>" => Some((Stderr, Truncate)),
        "2>>" => Some((Stderr, Append)),
        _ => None,
    }
}

/// Parse a submitted line.
///
/// Returns `Ok(None)` for a line with no words. The first redirection operator
/// ends the argument list: it and its file name are consumed, and any later
/// tokens (including further operators) are dropped, so redirections are never
/// composed.
pub fn parse(line: &str) -> Result<Option<ParsedCommand>, ShellError> {
    let mut tokens = tokenize(line);
    if tokens.is_empty() {
        return Ok(None);
    }

    let found = tokens
        .iter()
        .enumerate()
        .find_map(|(idx, token)| redirect_operator(token).map(|op| (idx, op)));
    let Some((idx, (stream, mode))) = found else {
        return Ok(Some(ParsedCommand {
            argv: tokens,
            redirect: None,
        }));
    };

    let Some(path) = tokens.get(idx + 1).cloned() else {
        return Err(ShellError::MissingRedirectTarget(tokens[idx].clone()));
    };
    tokens.truncate(idx);

    Ok(Some(ParsedCommand {
        argv: tokens,
        redirect: Some(Redirect { stream, mode, path }),
    }))
}
