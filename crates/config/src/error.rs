//! Error types for configuration loading and validation.

use std::{
    cmp::{max, min},
    fmt::Write as _,
    path::{Path, PathBuf},
};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors produced while loading, parsing, or validating a configuration.
pub enum Error {
    #[error("{message}")]
    /// I/O or filesystem read error.
    Read {
        /// Optional path associated with the read error.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
    #[error("{message}")]
    /// RON syntax or shape error with a concrete line/column location and excerpt.
    Parse {
        /// Optional path associated with the parse error.
        path: Option<PathBuf>,
        /// 1-based line number.
        line: usize,
        /// 1-based column number.
        col: usize,
        /// Human-readable error message.
        message: String,
        /// Rendered excerpt including a caret at the error location.
        excerpt: String,
    },
    #[error("hotkey rule {index} in scheme '{scheme}': {message}")]
    /// A hotkey rule is missing a field or carries an out-of-range value.
    MalformedRule {
        /// Optional path of the file the rule came from.
        path: Option<PathBuf>,
        /// Scheme containing the rule.
        scheme: String,
        /// 0-based position of the rule within the scheme.
        index: usize,
        /// What is wrong with it.
        message: String,
    },
    #[error("{message}")]
    /// Any other semantic problem (bad GUID match, bad action entry, bad firmware image).
    Validation {
        /// Optional path associated with the validation error.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
}

impl Error {
    /// Render a human-friendly error message including location and an excerpt when available.
    pub fn pretty(&self) -> String {
        let at = |path: &Option<PathBuf>| match path {
            Some(p) => format!(" at {}", p.display()),
            None => String::new(),
        };
        match self {
            Self::Read { path, message } => format!("Read error{}: {}", at(path), message),
            Self::Parse {
                path,
                line,
                col,
                message,
                excerpt,
            } => match path {
                Some(p) => format!(
                    "Config parse error at {}:{}:{}\n{}\n{}",
                    p.display(),
                    line,
                    col,
                    message,
                    excerpt
                ),
                None => format!(
                    "Config parse error at line {}, column {}\n{}\n{}",
                    line, col, message, excerpt
                ),
            },
            Self::MalformedRule { path, .. } => {
                format!("Config validation error{}\n{}", at(path), self)
            }
            Self::Validation { path, message } => {
                format!("Config validation error{}\n{}", at(path), message)
            }
        }
    }

    /// Access the optional path attached to this error.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::MalformedRule { path, .. }
            | Self::Validation { path, .. } => path.as_deref(),
        }
    }

    /// Attach `path` to an error produced from in-memory text.
    pub(crate) fn with_path(mut self, p: &Path) -> Self {
        match &mut self {
            Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::MalformedRule { path, .. }
            | Self::Validation { path, .. } => *path = Some(p.to_path_buf()),
        }
        self
    }

    /// Shorthand for a validation error without a path.
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            path: None,
            message: message.into(),
        }
    }
}

/// Build a small 2–3 line excerpt with a caret at `(line_no, col_no)`.
pub fn excerpt_at(source: &str, line_no: usize, col_no: usize) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let total = lines.len();
    let start = max(1usize, line_no.saturating_sub(2));
    let end = min(total, line_no + 1);

    let mut out = String::new();
    for n in start..=end {
        let text = lines.get(n - 1).copied().unwrap_or("");
        let _ignored = writeln!(out, " {:>4} | {}", n, text);
        if n == line_no {
            let prefix = format!(" {:>4} | ", n);
            let _ignored = writeln!(
                out,
                "{}{}^",
                " ".repeat(prefix.len()),
                " ".repeat(col_no.saturating_sub(1))
            );
        }
    }
    out
}
