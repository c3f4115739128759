//! External process invocation for the solver family's tools.
//!
//! Utilities (meshing, decomposition, dictionary edits) run to completion
//! through [`CaseCommand`], which owns the argv contracts and classifies
//! failures from the tools' output markers. The long-running solver goes
//! through [`SolverHandle`], which supervises the process group and
//! implements the two-phase interrupt-then-kill stop.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod command;
mod solver;

pub use command::{CaseCommand, ZoneSplit};
pub use solver::{SolverHandle, STOP_BOUND};
