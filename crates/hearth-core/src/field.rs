//! The table of solver fields whose boundary files the controller manages.

use std::fmt;

/// One of the nine fields a conjugate-heat-transfer case carries per region.
///
/// Files for any other field under `<case>/<time>/<region>/` are left
/// untouched by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Temperature.
    T,
    /// Velocity.
    U,
    /// Pressure.
    P,
    /// Dynamic pressure (`p_rgh = p - rho*g*h`).
    PRgh,
    /// Turbulent thermal diffusivity.
    Alphat,
    /// Turbulent kinetic energy dissipation rate.
    Epsilon,
    /// Turbulent kinetic energy.
    K,
    /// Turbulent viscosity.
    Nut,
    /// Turbulence specific dissipation rate.
    Omega,
}

impl FieldKind {
    /// All managed fields, in the order boundary recipes touch them.
    pub const ALL: [FieldKind; 9] = [
        FieldKind::Alphat,
        FieldKind::Epsilon,
        FieldKind::K,
        FieldKind::Nut,
        FieldKind::Omega,
        FieldKind::P,
        FieldKind::PRgh,
        FieldKind::T,
        FieldKind::U,
    ];

    /// Resolve a field file name. Returns `None` for unmanaged fields.
    pub fn from_name(name: &str) -> Option<FieldKind> {
        Some(match name {
            "T" => FieldKind::T,
            "U" => FieldKind::U,
            "p" => FieldKind::P,
            "p_rgh" => FieldKind::PRgh,
            "alphat" => FieldKind::Alphat,
            "epsilon" => FieldKind::Epsilon,
            "k" => FieldKind::K,
            "nut" => FieldKind::Nut,
            "omega" => FieldKind::Omega,
            _ => return None,
        })
    }

    /// The field's file name under a timestep directory.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::T => "T",
            FieldKind::U => "U",
            FieldKind::P => "p",
            FieldKind::PRgh => "p_rgh",
            FieldKind::Alphat => "alphat",
            FieldKind::Epsilon => "epsilon",
            FieldKind::K => "k",
            FieldKind::Nut => "nut",
            FieldKind::Omega => "omega",
        }
    }

    /// The FoamFile `class` entry for a newly created file.
    pub fn class(&self) -> &'static str {
        match self {
            FieldKind::U => "volVectorField",
            _ => "volScalarField",
        }
    }

    /// The `dimensions` entry (`[kg m s K mol A cd]`) for a new file.
    pub fn dimensions(&self) -> &'static str {
        match self {
            FieldKind::T => "[0 0 0 1 0 0 0]",
            FieldKind::U => "[0 1 -1 0 0 0 0]",
            FieldKind::P | FieldKind::PRgh => "[1 -1 -2 0 0 0 0]",
            FieldKind::Alphat => "[1 -1 -1 0 0 0 0]",
            FieldKind::Epsilon => "[0 2 -3 0 0 0 0]",
            FieldKind::K => "[0 2 -2 0 0 0 0]",
            FieldKind::Nut => "[0 2 -1 0 0 0 0]",
            FieldKind::Omega => "[0 0 -1 0 0 0 0]",
        }
    }

    /// Whether the field stores vectors per cell.
    pub fn is_vector(&self) -> bool {
        matches!(self, FieldKind::U)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trips() {
        for kind in FieldKind::ALL {
            assert_eq!(FieldKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn unmanaged_field_is_none() {
        assert_eq!(FieldKind::from_name("G"), None);
        assert_eq!(FieldKind::from_name(""), None);
    }

    #[test]
    fn only_velocity_is_vector() {
        assert!(FieldKind::U.is_vector());
        assert_eq!(FieldKind::U.class(), "volVectorField");
        assert!(FieldKind::ALL
            .iter()
            .filter(|k| **k != FieldKind::U)
            .all(|k| k.class() == "volScalarField"));
    }
}
