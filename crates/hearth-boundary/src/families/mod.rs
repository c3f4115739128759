//! The closed set of boundary-condition kinds, grouped into six families.
//!
//! Each family is a static table of [`KindSpec`]s. A kind's schema lists
//! every parameter it may carry; parameters flagged `uniform` have a
//! companion uniform/nonuniform toggle in the dictionary syntax.

use hearth_core::BoundaryError;

mod coupled;
mod general;
mod geometric;
mod inlet;
mod outlet;
mod wall;

pub use coupled::COUPLED_KINDS;
pub use general::GENERAL_KINDS;
pub use geometric::GEOMETRIC_KINDS;
pub use inlet::INLET_KINDS;
pub use outlet::OUTLET_KINDS;
pub use wall::WALL_KINDS;

/// The family a boundary kind belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    /// Mesh-geometry constraints (empty, wedge, ...).
    Geometric,
    /// Field-agnostic conditions (fixedValue, zeroGradient, ...).
    General,
    /// Flow inlets.
    Inlet,
    /// Flow outlets.
    Outlet,
    /// Solid walls and wall functions.
    Wall,
    /// Patch pairs coupled to each other or to another region.
    Coupled,
}

/// One parameter of a boundary kind's schema.
#[derive(Debug, PartialEq, Eq)]
pub struct ParamSpec {
    /// Dictionary keyword.
    pub name: &'static str,
    /// Whether the parameter takes an optional `uniform` prefix.
    pub uniform: bool,
}

/// Schema of one boundary kind.
#[derive(Debug, PartialEq, Eq)]
pub struct KindSpec {
    /// The kind name looked up by the registry.
    pub name: &'static str,
    /// The `type` token written to the dictionary. Differs from `name`
    /// only for aliases (a `fan` patch is written as `cyclic`).
    pub written: &'static str,
    /// Parameters this kind may carry, in rendering order.
    pub params: &'static [ParamSpec],
}

impl KindSpec {
    /// The schema entry for `param`, if the kind has one.
    pub fn param(&self, param: &str) -> Option<&'static ParamSpec> {
        self.params.iter().find(|p| p.name == param)
    }
}

pub(crate) const fn p(name: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        uniform: false,
    }
}

pub(crate) const fn pu(name: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        uniform: true,
    }
}

pub(crate) const fn kind(name: &'static str, params: &'static [ParamSpec]) -> KindSpec {
    KindSpec {
        name,
        written: name,
        params,
    }
}

/// Resolve a kind name to its family and schema.
///
/// Families are consulted in a fixed order, so a name present in more
/// than one table (`fanPressure` is both an inlet and an outlet) resolves
/// to the first match.
pub fn lookup(name: &str) -> Result<(Family, &'static KindSpec), BoundaryError> {
    let tables: [(Family, &[KindSpec]); 6] = [
        (Family::Geometric, GEOMETRIC_KINDS),
        (Family::General, GENERAL_KINDS),
        (Family::Inlet, INLET_KINDS),
        (Family::Outlet, OUTLET_KINDS),
        (Family::Wall, WALL_KINDS),
        (Family::Coupled, COUPLED_KINDS),
    ];
    for (family, kinds) in tables {
        if let Some(spec) = kinds.iter().find(|k| k.name == name) {
            return Ok((family, spec));
        }
    }
    Err(BoundaryError::UnknownKind {
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_kinds_resolve() {
        assert_eq!(lookup("fixedValue").unwrap().0, Family::General);
        assert_eq!(lookup("noSlip").unwrap().0, Family::Wall);
        assert_eq!(lookup("inletOutlet").unwrap().0, Family::Outlet);
        assert_eq!(lookup("empty").unwrap().0, Family::Geometric);
        assert_eq!(
            lookup("compressible::turbulentTemperatureCoupledBaffleMixed")
                .unwrap()
                .0,
            Family::Coupled
        );
    }

    #[test]
    fn unknown_kind_is_an_error() {
        assert_eq!(
            lookup("bogus"),
            Err(BoundaryError::UnknownKind {
                name: "bogus".into()
            })
        );
    }

    #[test]
    fn table_valued_kinds_resolve() {
        // Kinds whose values are tables or references rather than plain
        // literals are still part of the closed set.
        assert_eq!(lookup("uniformFixedValue").unwrap().0, Family::General);
        assert_eq!(lookup("translatingWallVelocity").unwrap().0, Family::Wall);
        assert_eq!(
            lookup("nutUTabulatedWallFunction").unwrap().0,
            Family::Wall
        );
    }

    #[test]
    fn fan_pressure_resolves_to_inlet_first() {
        assert_eq!(lookup("fanPressure").unwrap().0, Family::Inlet);
    }

    #[test]
    fn fan_is_written_as_cyclic() {
        let (family, spec) = lookup("fan").unwrap();
        assert_eq!(family, Family::Coupled);
        assert_eq!(spec.written, "cyclic");
    }

    #[test]
    fn no_duplicate_names_within_a_family() {
        for kinds in [
            GEOMETRIC_KINDS,
            GENERAL_KINDS,
            INLET_KINDS,
            OUTLET_KINDS,
            WALL_KINDS,
            COUPLED_KINDS,
        ] {
            for (i, a) in kinds.iter().enumerate() {
                assert!(
                    kinds[i + 1..].iter().all(|b| b.name != a.name),
                    "duplicate kind {}",
                    a.name
                );
            }
        }
    }
}
