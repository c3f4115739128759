//! Flow outlet kinds.

use super::{kind, p, pu, KindSpec};

/// Outlet kinds. `fanPressure` also serves as an outlet but lives in the
/// inlet table, which is consulted first.
pub static OUTLET_KINDS: &[KindSpec] = &[
    kind("inletOutlet", &[pu("inletValue"), pu("value"), p("phi")]),
    kind(
        "pressureInletOutletVelocity",
        &[pu("tangentialVelocity"), pu("value"), p("phi")],
    ),
    kind(
        "totalPressure",
        &[p("rho"), pu("p0"), pu("value"), p("U"), p("phi")],
    ),
    kind(
        "totalTemperature",
        &[p("rho"), p("gamma"), pu("T0"), p("U"), p("phi"), p("psi")],
    ),
];
