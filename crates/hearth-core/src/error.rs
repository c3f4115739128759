//! Error types for every Hearth subsystem.
//!
//! Organized the way errors surface: parse/patch failures from the
//! dictionary store, registry failures from variant construction, process
//! failures from the runner, and the controller envelope wrapping any of
//! them for API consumers.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

// ── ParseError ───────────────────────────────────────────────────

/// Dictionary text did not match the expected grammar at an anchor point.
#[derive(Clone, Debug, PartialEq)]
pub enum ParseError {
    /// The `boundaryField` anchor is missing from the file.
    MissingBoundaryField {
        /// File that was being parsed or patched.
        path: PathBuf,
    },
    /// The named block being updated or removed is not in the file.
    MissingBoundary {
        /// Boundary name that was looked up.
        name: String,
        /// File that was being patched.
        path: PathBuf,
    },
    /// The file has no `internalField` clause to update.
    MissingInternalField {
        /// File that was being patched.
        path: PathBuf,
    },
    /// A literal could not be read (bad number, unterminated list, ...).
    BadLiteral {
        /// What was being parsed when the literal failed.
        context: String,
        /// The offending text, truncated.
        text: String,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingBoundaryField { path } => {
                write!(f, "no boundaryField block in {}", path.display())
            }
            Self::MissingBoundary { name, path } => {
                write!(f, "boundary '{name}' not found in {}", path.display())
            }
            Self::MissingInternalField { path } => {
                write!(f, "no internalField clause in {}", path.display())
            }
            Self::BadLiteral { context, text } => {
                write!(f, "bad literal while parsing {context}: '{text}'")
            }
        }
    }
}

impl Error for ParseError {}

// ── BoundaryError ────────────────────────────────────────────────

/// Errors from boundary-variant construction and mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoundaryError {
    /// The kind name is not in any of the six family tables.
    UnknownKind {
        /// The requested kind name.
        name: String,
    },
    /// The parameter is not part of the kind's schema.
    UnknownParameter {
        /// Kind whose schema was consulted.
        kind: &'static str,
        /// The rejected parameter name.
        param: String,
    },
}

impl fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKind { name } => write!(f, "unknown boundary kind '{name}'"),
            Self::UnknownParameter { kind, param } => {
                write!(f, "boundary kind '{kind}' has no parameter '{param}'")
            }
        }
    }
}

impl Error for BoundaryError {}

// ── IllegalMutation ──────────────────────────────────────────────

/// A mutation violated the store's structural rules or a physical range.
#[derive(Clone, Debug, PartialEq)]
pub enum IllegalMutation {
    /// Boundaries may only be newly introduced at time zero.
    NotTimeZero {
        /// Boundary that was being added.
        name: String,
        /// The store's current timestep.
        time: String,
    },
    /// A value fell outside its allowed physical range.
    OutOfRange {
        /// What was being set (e.g. "heater temperature").
        what: &'static str,
        /// The rejected value, rendered.
        value: String,
        /// Allowed range, rendered.
        range: String,
    },
}

impl fmt::Display for IllegalMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotTimeZero { name, time } => write!(
                f,
                "boundary '{name}' can only be added at time 0, store is at time {time}"
            ),
            Self::OutOfRange { what, value, range } => {
                write!(f, "{what} must be within {range}, not {value}")
            }
        }
    }
}

impl Error for IllegalMutation {}

// ── RunError ─────────────────────────────────────────────────────

/// Classification of an external tool's fatal completion flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// The tool printed a fatal error banner.
    FatalError,
    /// The tool died on a floating-point exception.
    FatalFpe,
    /// The tool dumped a stack trace.
    FatalStackdump,
    /// The tool exited abnormally without a recognized banner.
    Unknown,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FatalError => f.write_str("fatal error"),
            Self::FatalFpe => f.write_str("fatal floating-point exception"),
            Self::FatalStackdump => f.write_str("fatal stack dump"),
            Self::Unknown => f.write_str("unknown error"),
        }
    }
}

/// Errors from invoking and supervising external solver processes.
#[derive(Debug)]
pub enum RunError {
    /// The command ran and reported a fatal condition.
    Failed {
        /// The command that failed (e.g. `decomposePar`).
        command: String,
        /// Failure classification from the tool's own output.
        kind: FailureKind,
        /// Captured diagnostic text, possibly empty.
        detail: String,
    },
    /// Graceful stop exceeded its bound; the process was force-killed.
    ForceKillRequired {
        /// The supervised command.
        command: String,
    },
    /// The process could not be spawned at all.
    Spawn {
        /// The command that failed to start.
        command: String,
        /// The underlying OS error.
        source: std::io::Error,
    },
    /// I/O failure while supervising the process or reading its output.
    Io(std::io::Error),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed {
                command,
                kind,
                detail,
            } => {
                write!(f, "{command} run failed with {kind}")?;
                if !detail.is_empty() {
                    write!(f, ": {detail}")?;
                }
                Ok(())
            }
            Self::ForceKillRequired { command } => {
                write!(f, "{command} did not stop within bound and was killed")
            }
            Self::Spawn { command, source } => {
                write!(f, "failed to spawn {command}: {source}")
            }
            Self::Io(e) => write!(f, "process supervision i/o error: {e}"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RunError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ── CaseError ────────────────────────────────────────────────────

/// Controller-level errors: the single shape API consumers see.
#[derive(Debug)]
pub enum CaseError {
    /// A dictionary parse/patch failed.
    Parse(ParseError),
    /// Variant construction or mutation failed.
    Boundary(BoundaryError),
    /// A mutation violated structure or range rules.
    Mutation(crate::error::IllegalMutation),
    /// An external command or the solver failed.
    Run(RunError),
    /// A phyng property setter failed; wraps the underlying stage.
    PhyngMutation {
        /// Name of the phyng whose setter failed.
        phyng: String,
        /// The underlying cause.
        source: Box<CaseError>,
    },
    /// The operation is not valid in the case's current state.
    BadState {
        /// Human-readable description of the conflict.
        reason: String,
    },
    /// Filesystem failure while manipulating the case directory.
    Io(std::io::Error),
}

impl fmt::Display for CaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "{e}"),
            Self::Boundary(e) => write!(f, "{e}"),
            Self::Mutation(e) => write!(f, "{e}"),
            Self::Run(e) => write!(f, "{e}"),
            Self::PhyngMutation { phyng, source } => {
                write!(f, "failed to set value on phyng '{phyng}': {source}")
            }
            Self::BadState { reason } => write!(f, "invalid case state: {reason}"),
            Self::Io(e) => write!(f, "case i/o error: {e}"),
        }
    }
}

impl Error for CaseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Boundary(e) => Some(e),
            Self::Mutation(e) => Some(e),
            Self::Run(e) => Some(e),
            Self::PhyngMutation { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            Self::BadState { .. } => None,
        }
    }
}

impl From<ParseError> for CaseError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<BoundaryError> for CaseError {
    fn from(e: BoundaryError) -> Self {
        Self::Boundary(e)
    }
}

impl From<IllegalMutation> for CaseError {
    fn from(e: IllegalMutation) -> Self {
        Self::Mutation(e)
    }
}

impl From<RunError> for CaseError {
    fn from(e: RunError) -> Self {
        Self::Run(e)
    }
}

impl From<std::io::Error> for CaseError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phyng_envelope_chains_source() {
        let inner = CaseError::Boundary(BoundaryError::UnknownKind {
            name: "bogus".into(),
        });
        let err = CaseError::PhyngMutation {
            phyng: "heater".into(),
            source: Box::new(inner),
        };
        assert!(err.to_string().contains("heater"));
        assert!(err.source().unwrap().to_string().contains("bogus"));
    }

    #[test]
    fn run_failed_includes_detail() {
        let err = RunError::Failed {
            command: "chtMultiRegionFoam".into(),
            kind: FailureKind::FatalFpe,
            detail: "divide by zero".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("floating-point"));
        assert!(msg.contains("divide by zero"));
    }
}
