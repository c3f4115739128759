//! Probe registry and solver probe-output tailing.
//!
//! A case declares the points it wants sampled in `<case>/system/probes`;
//! the solver appends one line per write to
//! `postProcessing/probes/<region>/<time>/<field>`. This crate keeps the
//! dictionary an idempotent union of the registered probes and runs a
//! background thread that tails the output files into shared [`Probe`]
//! handles.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod dict;
mod parser;
mod probe;
mod registry;

pub use parser::{ProbeParser, DEFAULT_PERIOD};
pub use probe::{Probe, Sample, LOCATION_TOLERANCE};
pub use registry::ProbeRegistry;
