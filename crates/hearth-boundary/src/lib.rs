//! Boundary-condition registry and dictionary file store.
//!
//! A simulation case keeps one dictionary file per solver field and
//! timestep, holding the field's internal value and a block per mesh
//! patch. This crate models those files: a closed registry of boundary
//! kinds in six families, a span-tracking parser, a splice-based patcher
//! that never rewrites unrelated text, and [`BoundaryFile`], the store
//! that keeps the in-memory state and the file in sync.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod families;
mod file;
mod parse;
mod patch;
mod template;
mod variant;

pub use families::{Family, KindSpec, ParamSpec};
pub use file::BoundaryFile;
pub use variant::BoundaryVariant;
