//! Core types and error taxonomy for the Hearth case controller.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! literal value model shared by the dictionary parser and the boundary
//! registry, the table of solver fields the controller manages, and the
//! error enums raised by every subsystem.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod field;
pub mod value;

pub use error::{BoundaryError, CaseError, FailureKind, IllegalMutation, ParseError, RunError};
pub use field::FieldKind;
pub use value::Value;

/// Lowest temperature any boundary value may be set to, in kelvin.
pub const MIN_TEMP: f64 = 233.15;
/// Default ambient temperature for newly created boundaries, in kelvin.
pub const ROOM_TEMP: f64 = 293.15;
/// Highest temperature any boundary value may be set to, in kelvin.
pub const MAX_TEMP: f64 = 313.15;

/// Smallest magnitude a velocity component may carry, in m/s.
pub const MIN_VEL: f64 = 0.01;
/// Largest magnitude a velocity component may carry, in m/s.
pub const MAX_VEL: f64 = 5.0;
