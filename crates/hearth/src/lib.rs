//! Hearth: a case execution controller and live boundary-state
//! synchronization engine for conjugate-heat-transfer solver cases.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Hearth sub-crates. For most users, adding `hearth` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use hearth::prelude::*;
//!
//! let dir = std::env::temp_dir().join("hearth-quick-start");
//! std::fs::create_dir_all(&dir).unwrap();
//!
//! // Describe the case and hand it to a controller.
//! let mut config = CaseConfig::new(&dir);
//! config.end_time = 3600.0;
//! config.clean_limit = 300.0;
//! let case = Case::new(config);
//!
//! // Phyngs participate at the next setup; sensors attach immediately.
//! case.add_heater("heater").unwrap();
//! case.add_window("window", 0).unwrap();
//!
//! let dump = case.dump_case();
//! assert_eq!(dump.get("type").unwrap().as_text(), Some("cht"));
//! assert!(dump.get("heaters").unwrap().get("heater").is_some());
//! ```
//!
//! A full session then runs `case.setup()` (meshing and boundary
//! extraction need the solver family's tools on `PATH`), `case.run()`,
//! and live mutations such as `case.set_heater_temperature("heater",
//! 313.0)` while the solver works.
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `hearth-core` | Value model, field table, error taxonomy |
//! | [`boundary`] | `hearth-boundary` | Boundary dictionary stores and variants |
//! | [`probes`] | `hearth-probes` | Probe registry and output tailing |
//! | [`runner`] | `hearth-runner` | External tool commands and solver supervision |
//! | [`case`] | `hearth-case` | The controller, phyngs, pacing, cleanup |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core value model, field table, and error taxonomy (`hearth-core`).
///
/// Contains [`types::Value`], [`types::FieldKind`], the temperature and
/// velocity limits, and every error enum the other crates raise.
pub use hearth_core as types;

/// Boundary dictionary stores (`hearth-boundary`).
///
/// [`boundary::BoundaryFile`] parses and patches one field's dictionary
/// file in place; [`boundary::BoundaryVariant`] models a typed boundary
/// condition and its parameters.
pub use hearth_boundary as boundary;

/// Probe registry and solver output tailing (`hearth-probes`).
///
/// Register sample points with [`probes::ProbeRegistry`] and tail the
/// solver's probe output with [`probes::ProbeParser`].
pub use hearth_probes as probes;

/// External tool invocation and solver supervision (`hearth-runner`).
///
/// [`runner::CaseCommand`] runs meshing and dictionary tools to
/// completion; [`runner::SolverHandle`] supervises the long-running
/// solver and stops it in two phases.
pub use hearth_runner as runner;

/// The case controller (`hearth-case`).
///
/// [`case::Case`] drives a case end to end: setup, runs, realtime
/// pacing, result cleanup, and live phyng mutations.
pub use hearth_case as case;

/// Common imports for typical Hearth usage.
///
/// ```rust
/// use hearth::prelude::*;
/// ```
pub mod prelude {
    // Controller
    pub use hearth_case::{Case, CaseConfig, CaseTime, ConfigValue, Phyng};

    // Core values and fields
    pub use hearth_core::{FieldKind, Value};

    // Errors
    pub use hearth_core::{BoundaryError, CaseError, IllegalMutation, ParseError, RunError};

    // Boundary stores
    pub use hearth_boundary::{BoundaryFile, BoundaryVariant};

    // Probes
    pub use hearth_probes::{Probe, ProbeParser, ProbeRegistry};

    // External tools
    pub use hearth_runner::{CaseCommand, SolverHandle, ZoneSplit};
}
