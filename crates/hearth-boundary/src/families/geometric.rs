//! Mesh-geometry constraint kinds. None of them carry parameters.

use super::{kind, KindSpec};

/// Geometric constraint kinds.
pub static GEOMETRIC_KINDS: &[KindSpec] = &[
    kind("empty", &[]),
    kind("processor", &[]),
    kind("symmetryPlane", &[]),
    kind("wedge", &[]),
];
