//! Wall kinds: slip conditions and the turbulence wall-function set.

use super::{kind, p, pu, KindSpec, ParamSpec};

const NUT_WALL_FUNCTION: &[ParamSpec] = &[
    pu("value"),
    p("Cmu"),
    p("kappa"),
    p("E"),
    p("blending"),
    p("n"),
    p("U"),
];

/// Wall kinds.
pub static WALL_KINDS: &[KindSpec] = &[
    kind("noSlip", &[]),
    kind("translatingWallVelocity", &[p("U")]),
    kind("movingWallVelocity", &[pu("value")]),
    kind(
        "atmTurbulentHeatFluxTemperature",
        &[
            pu("gradient"),
            p("heatSource"),
            p("alphaEff"),
            p("Cp0"),
            pu("q"),
        ],
    ),
    kind(
        "atmAlphatkWallFunction",
        &[
            pu("value"),
            p("Pr"),
            pu("Prt"),
            pu("z0"),
            p("Cmu"),
            p("kappa"),
        ],
    ),
    kind(
        "atmEpsilonWallFunction",
        &[
            pu("value"),
            p("lowReCorrection"),
            p("blending"),
            p("n"),
            pu("z0"),
            p("Cmu"),
            p("kappa"),
        ],
    ),
    kind(
        "atmNutkWallFunction",
        &[
            pu("value"),
            p("Cmu"),
            p("kappa"),
            p("E"),
            p("blending"),
            p("n"),
            p("U"),
            pu("z0"),
            p("boundNut"),
        ],
    ),
    kind(
        "atmNutUWallFunction",
        &[
            pu("value"),
            p("Cmu"),
            p("kappa"),
            p("E"),
            p("blending"),
            p("n"),
            p("U"),
            pu("z0"),
            p("boundNut"),
        ],
    ),
    kind(
        "atmNutWallFunction",
        &[
            pu("value"),
            p("Cmu"),
            p("kappa"),
            p("E"),
            p("blending"),
            p("n"),
            p("U"),
            p("z0Min"),
            pu("z0"),
        ],
    ),
    kind(
        "atmOmegaWallFunction",
        &[
            pu("value"),
            p("beta1"),
            p("blended"),
            p("blending"),
            p("n"),
            p("z0Min"),
            pu("z0"),
            p("Cmu"),
            p("kappa"),
        ],
    ),
    kind(
        "epsilonWallFunction",
        &[pu("value"), p("lowReCorrection"), p("blending"), p("n")],
    ),
    kind(
        "kLowReWallFunction",
        &[pu("value"), p("Ceps2"), p("Ck"), p("Bk"), p("C")],
    ),
    kind("kqRWallFunction", &[pu("value")]),
    kind(
        "nutkRoughWallFunction",
        &[
            pu("value"),
            p("Cmu"),
            p("kappa"),
            p("E"),
            p("blending"),
            p("n"),
            p("U"),
            pu("Ks"),
            pu("Cs"),
        ],
    ),
    kind("nutkWallFunction", NUT_WALL_FUNCTION),
    kind("nutLowReWallFunction", NUT_WALL_FUNCTION),
    kind("nutUBlendedWallFunction", NUT_WALL_FUNCTION),
    kind(
        "nutURoughWallFunction",
        &[
            pu("value"),
            p("Cmu"),
            p("kappa"),
            p("E"),
            p("blending"),
            p("n"),
            p("U"),
            p("roughnessHeight"),
            p("roughnessConstant"),
            p("roughnessFactor"),
            p("maxIter"),
            p("tolerance"),
        ],
    ),
    kind(
        "nutUSpaldingWallFunction",
        &[
            pu("value"),
            p("Cmu"),
            p("kappa"),
            p("E"),
            p("blending"),
            p("n"),
            p("U"),
            p("maxIter"),
            p("tolerance"),
        ],
    ),
    kind(
        "nutUTabulatedWallFunction",
        &[
            pu("value"),
            p("Cmu"),
            p("kappa"),
            p("E"),
            p("blending"),
            p("n"),
            p("U"),
            p("uPlusTable"),
        ],
    ),
    kind("nutUWallFunction", NUT_WALL_FUNCTION),
    kind("nutWallFunction", NUT_WALL_FUNCTION),
    kind(
        "omegaWallFunction",
        &[pu("value"), p("beta1"), p("blended"), p("blending"), p("n")],
    ),
    kind(
        "compressible::alphatWallFunction",
        &[p("Prt"), pu("value")],
    ),
    kind("compressible::epsilonWallFunction", &[pu("value")]),
    kind("fixedFluxPressure", &[pu("gradient"), pu("value")]),
];
