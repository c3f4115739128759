//! Flow inlet kinds, including the atmospheric boundary layer set.

use super::{kind, p, pu, KindSpec, ParamSpec};

const ATM_BOUNDARY_LAYER: &[ParamSpec] = &[
    pu("inletValue"),
    pu("value"),
    p("phi"),
    p("flowDir"),
    p("zDir"),
    p("Uref"),
    p("Zref"),
    pu("z0"),
    pu("d"),
    p("kappa"),
    p("Cmu"),
    p("initABL"),
    p("C1"),
    p("C2"),
];

/// Inlet kinds.
pub static INLET_KINDS: &[KindSpec] = &[
    kind("outletInlet", &[pu("outletValue"), pu("value"), p("phi")]),
    kind(
        "flowRateInletVelocity",
        &[pu("value"), p("volumetricFlowRate"), p("massFlowRate")],
    ),
    kind(
        "turbulentDigitalFilterInlet",
        &[
            pu("value"),
            p("n"),
            p("L"),
            pu("R"),
            pu("Umean"),
            p("Ubulk"),
            p("fsm"),
            p("Gaussian"),
            p("fixSeed"),
            p("continuous"),
            p("correctFlowRate"),
            p("mapMethod"),
            p("perturb"),
            p("C1"),
            p("C1FSM"),
            p("C2FSM"),
        ],
    ),
    kind(
        "turbulentDFSEMInlet",
        &[p("delta"), p("nCellPerEddy"), p("mapMethod"), pu("value")],
    ),
    kind(
        "fanPressure",
        &[
            p("file"),
            p("outOfBounds"),
            p("direction"),
            pu("p0"),
            pu("value"),
            p("U"),
            p("phi"),
        ],
    ),
    kind(
        "turbulentIntensityKineticEnergyInlet",
        &[p("intensity"), pu("value"), p("U"), p("phi")],
    ),
    kind(
        "turbulentMixingLengthDissipationRateInlet",
        &[p("mixingLength"), pu("value"), p("k"), p("phi")],
    ),
    kind(
        "turbulentMixingLengthFrequencyInlet",
        &[p("mixingLength"), pu("value"), p("Cmu"), p("k"), p("phi")],
    ),
    kind("atmBoundaryLayerInletEpsilon", ATM_BOUNDARY_LAYER),
    kind("atmBoundaryLayerInletK", ATM_BOUNDARY_LAYER),
    kind("atmBoundaryLayerInletOmega", ATM_BOUNDARY_LAYER),
    kind("atmBoundaryLayerInletVelocity", ATM_BOUNDARY_LAYER),
    kind("atmBoundaryLayer", ATM_BOUNDARY_LAYER),
];
