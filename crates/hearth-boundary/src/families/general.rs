//! Field-agnostic boundary kinds.

use super::{kind, p, pu, KindSpec};

/// General-purpose kinds usable on any field.
pub static GENERAL_KINDS: &[KindSpec] = &[
    kind("fixedValue", &[pu("value")]),
    kind("fixedGradient", &[pu("gradient")]),
    kind(
        "mixed",
        &[pu("refValue"), pu("refGradient"), pu("valueFraction")],
    ),
    kind(
        "codedFixedValue",
        &[pu("value"), p("redirectType"), p("code")],
    ),
    kind("uniformFixedValue", &[p("uniformValue")]),
    kind("zeroGradient", &[]),
    kind("calculated", &[pu("value")]),
];
