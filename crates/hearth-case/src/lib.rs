//! The case controller: lifecycle, phyngs, pacing, and housekeeping.
//!
//! [`Case`] drives one solver case end to end. [`Case::setup`] meshes it
//! and extracts its boundary state, [`Case::run`] and [`Case::stop`]
//! manage the solver, and the phyng operations patch boundary conditions
//! live under the stop-before-mutate protocol. Background threads handle
//! realtime pacing ([`pacing`]) and result pruning.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod behavior;
mod case;
mod cleaner;
pub mod config;
pub mod fs;
pub mod pacing;
mod pause;
pub mod phyng;

pub use case::{Case, CaseTime};
pub use config::{CaseConfig, ConfigValue};
pub use pacing::{decide, CaseClock, PacingDecision, PacingMonitor};
pub use phyng::{Ac, Heater, Opening, Phyng, Sensor};
