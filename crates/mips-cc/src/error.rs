//! Error type for the compilation pipeline, separating failures by cause.
//!
//! Keeping usage/unsupported-program/internal failures distinct lets callers (the CLI, the test
//! suite) tell "the input uses a feature outside this subset" apart from "the generator hit a bug"
//! without string matching.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// I/O failure: the source file could not be opened, read, or the destination written.
    Usage(String),
    /// The input is outside the supported C subset (e.g. a fifth call argument, `&` on a
    /// non-variable, a non-constant `case` label).
    Unsupported { node_kind: String, detail: String },
    /// An invariant internal to this crate was violated (a dispatch gap, an allocator double
    /// release, a label-stack underflow). Distinct from `Unsupported` because it indicates a bug
    /// in this crate or its caller, not a limitation of the supported subset.
    Internal { detail: String },
}

impl CompileError {
    pub fn unsupported(node_kind: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Unsupported { node_kind: node_kind.into(), detail: detail.into() }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal { detail: detail.into() }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(msg) => write!(f, "usage error: {msg}"),
            Self::Unsupported { node_kind, detail } => {
                write!(f, "unsupported construct at {node_kind}: {detail}")
            }
            Self::Internal { detail } => write!(f, "internal error: {detail}"),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<std::io::Error> for CompileError {
    fn from(error: std::io::Error) -> Self {
        Self::Usage(error.to_string())
    }
}
