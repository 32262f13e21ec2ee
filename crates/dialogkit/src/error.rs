//! Error types for mixin composition, static member access, presentation, and profiles.

use std::{
    cmp::{max, min},
    fmt::Write as _,
    path::{Path, PathBuf},
    result::Result as StdResult,
};

use thiserror::Error;

/// Convenient result type for the dialogkit crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for dialogkit.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A mixin spec or statics table is malformed. Raised when `mixin()` runs.
    #[error("Invalid mixin: {0}")]
    InvalidMixin(String),

    /// `call_static` was asked for a member the invoker does not carry.
    #[error("Unknown static member '{0}'")]
    UnknownMember(String),

    /// `call_static` was asked to call a plain value or a member that needs typed access.
    #[error("Static member '{0}' is not callable here")]
    NotCallable(String),

    /// A builtin was called through `call_static` with arguments of the wrong shape.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The presentation collaborator rejected the dialog.
    #[error("Presentation error: {0}")]
    Presentation(String),

    /// The presentation collaborator dropped a pending dialog without resolving it.
    #[error("Dialog was abandoned before it resolved")]
    Abandoned,

    /// Profile loading failed.
    #[error("{0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error, Clone, PartialEq)]
/// Errors produced while loading, parsing, or validating a dialog profile.
pub enum ConfigError {
    #[error("{message}")]
    /// I/O or filesystem read error.
    Read {
        /// Optional path associated with the read error.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
    #[error("{message}")]
    /// JSON parse error with a concrete line/column location and excerpt.
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
    #[error("{message}")]
    /// The document parsed but does not describe a valid profile.
    Validation {
        /// Optional path associated with the validation error.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
}

impl ConfigError {
    /// Render a human-friendly error message including location and an excerpt when available.
    pub fn pretty(&self) -> String {
        match self {
            Self::Read { path, message } => match path {
                Some(p) => format!("Read error at {}: {}", p.display(), message),
                None => format!("Read error: {}", message),
            },
            Self::Parse {
                path,
                line,
                col,
                message,
                excerpt,
            } => match path {
                Some(p) => format!(
                    "Profile parse error at {}:{}:{}\n{}\n{}",
                    p.display(),
                    line,
                    col,
                    message,
                    excerpt
                ),
                None => format!(
                    "Profile parse error at line {}, column {}\n{}\n{}",
                    line, col, message, excerpt
                ),
            },
            Self::Validation { path, message } => match path {
                Some(p) => format!("Profile validation error at {}\n{}", p.display(), message),
                None => format!("Profile validation error\n{}", message),
            },
        }
    }

    /// Access the optional path attached to this error.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } | Self::Validation { path, .. } => {
                path.as_deref()
            }
        }
    }
}

/// Build a small 2–3 line excerpt with a caret at `(line_no, col_no)`.
pub(crate) fn excerpt_at(source: &str, line_no: usize, col_no: usize) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_points_at_column() {
        let src = "{\n  \"defaults\": {\n    \"title\" 1\n  }\n}";
        let ex = excerpt_at(src, 3, 13);
        let lines: Vec<&str> = ex.lines().collect();
        assert_eq!(lines[0], "    1 | {");
        assert_eq!(lines[2], "    3 |     \"title\" 1");
        assert_eq!(lines[3].find('^'), Some(8 + 12));
    }

    #[test]
    fn pretty_includes_location() {
        let err = ConfigError::Parse {
            path: Some(PathBuf::from("/tmp/p.json")),
            line: 2,
            col: 4,
            message: "expected value".into(),
            excerpt: "ex".into(),
        };
        assert_eq!(
            err.pretty(),
            "Profile parse error at /tmp/p.json:2:4\nexpected value\nex"
        );
        assert_eq!(err.path(), Some(Path::new("/tmp/p.json")));
    }
}
