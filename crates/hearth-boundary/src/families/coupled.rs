//! Coupled patch-pair kinds.

use super::{kind, p, pu, KindSpec};

/// Coupled kinds. A `fan` patch is a cyclic pair in the dictionary, so
/// its `type` token is written as `cyclic`.
pub static COUPLED_KINDS: &[KindSpec] = &[
    kind("cyclicAMI", &[p("neighbourPatch"), p("transform")]),
    kind("cyclic", &[p("neighbourPatch"), p("transform")]),
    KindSpec {
        name: "fan",
        written: "cyclic",
        params: &[],
    },
    kind(
        "compressible::turbulentTemperatureCoupledBaffleMixed",
        &[
            pu("refValue"),
            pu("refGradient"),
            pu("valueFraction"),
            p("neighbourFieldName"),
            p("kappaMethod"),
            p("kappa"),
            p("Tnbr"),
            pu("value"),
            p("thicknessLayers"),
            p("kappaLayers"),
            p("alphaAni"),
        ],
    ),
];
