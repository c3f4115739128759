//! Boundary recipes for conjugate-heat-transfer cases.
//!
//! Each recipe rewrites one named boundary across every managed field of
//! a region so that it behaves as a wall, an inlet, an outlet, or a
//! solid-to-fluid heater coupling. Recipes retime the stores first so the
//! patch lands in the latest result.

use hearth_boundary::{BoundaryFile, BoundaryVariant};
use hearth_core::{CaseError, FieldKind, Value};
use indexmap::IndexMap;

/// One region's boundary stores, keyed by field.
pub type RegionBoundaries = IndexMap<FieldKind, BoundaryFile>;

/// Point every field store of the region at `time`.
pub fn retime_all(fields: &mut RegionBoundaries, time: &str) -> Result<(), CaseError> {
    for file in fields.values_mut() {
        file.retime(time)?;
    }
    Ok(())
}

fn field_mut<'a>(
    fields: &'a mut RegionBoundaries,
    kind: FieldKind,
) -> Result<&'a mut BoundaryFile, CaseError> {
    fields.get_mut(&kind).ok_or_else(|| CaseError::BadState {
        reason: format!("region has no boundary file for field {}", kind.name()),
    })
}

/// A variant with a single uniform `value` parameter.
fn with_value(kind: &str, value: impl Into<Value>) -> Result<BoundaryVariant, CaseError> {
    let mut variant = BoundaryVariant::new(kind)?;
    variant.set("value", value)?;
    variant.set_uniform("value", true)?;
    Ok(variant)
}

fn set(
    fields: &mut RegionBoundaries,
    field: FieldKind,
    name: &str,
    variant: BoundaryVariant,
) -> Result<(), CaseError> {
    field_mut(fields, field)?.set_boundary(name, variant)
}

/// Make `name` a solid wall at `temperature` kelvin.
pub fn set_wall(
    fields: &mut RegionBoundaries,
    name: &str,
    temperature: f64,
    time: &str,
) -> Result<(), CaseError> {
    retime_all(fields, time)?;
    set(fields, FieldKind::Alphat, name, with_value("compressible::alphatWallFunction", 0.0)?)?;
    set(fields, FieldKind::Epsilon, name, with_value("compressible::epsilonWallFunction", 0.001)?)?;
    set(fields, FieldKind::K, name, with_value("kqRWallFunction", 0.02)?)?;
    set(fields, FieldKind::Nut, name, with_value("nutkWallFunction", 0.0)?)?;
    set(fields, FieldKind::Omega, name, with_value("omegaWallFunction", 10.0)?)?;
    set(fields, FieldKind::P, name, with_value("calculated", 1e5)?)?;
    set(fields, FieldKind::PRgh, name, with_value("fixedFluxPressure", 1e5)?)?;
    set(fields, FieldKind::T, name, with_value("fixedValue", temperature)?)?;
    set(fields, FieldKind::U, name, BoundaryVariant::new("noSlip")?)?;
    Ok(())
}

/// Make `name` an inlet blowing `velocity` m/s at `temperature` kelvin.
pub fn set_inlet(
    fields: &mut RegionBoundaries,
    name: &str,
    velocity: [f64; 3],
    temperature: f64,
    time: &str,
) -> Result<(), CaseError> {
    retime_all(fields, time)?;
    set(fields, FieldKind::Alphat, name, with_value("calculated", 0.0)?)?;

    let mut epsilon = with_value("turbulentMixingLengthDissipationRateInlet", 0.001)?;
    epsilon.set("mixingLength", 0.007)?;
    set(fields, FieldKind::Epsilon, name, epsilon)?;

    let mut k = with_value("turbulentIntensityKineticEnergyInlet", 0.02)?;
    k.set("intensity", 0.01)?;
    set(fields, FieldKind::K, name, k)?;

    set(fields, FieldKind::Nut, name, BoundaryVariant::new("zeroGradient")?)?;

    let mut omega = with_value("turbulentMixingLengthFrequencyInlet", 10.0)?;
    omega.set("mixingLength", 0.0035)?;
    set(fields, FieldKind::Omega, name, omega)?;

    set(fields, FieldKind::P, name, with_value("calculated", 1e5)?)?;
    set(fields, FieldKind::PRgh, name, with_value("fixedFluxPressure", 1e5)?)?;
    set(fields, FieldKind::T, name, with_value("fixedValue", temperature)?)?;
    set(fields, FieldKind::U, name, with_value("fixedValue", velocity)?)?;
    Ok(())
}

/// Make `name` a pressure outlet with `velocity` as the re-entry value.
pub fn set_outlet(
    fields: &mut RegionBoundaries,
    name: &str,
    velocity: [f64; 3],
    temperature: f64,
    time: &str,
) -> Result<(), CaseError> {
    retime_all(fields, time)?;
    set(fields, FieldKind::P, name, with_value("calculated", 1e5)?)?;
    set(fields, FieldKind::PRgh, name, with_value("fixedValue", 1e5)?)?;
    set(fields, FieldKind::Alphat, name, with_value("calculated", 0.0)?)?;
    set(fields, FieldKind::K, name, BoundaryVariant::new("zeroGradient")?)?;
    set(fields, FieldKind::Nut, name, BoundaryVariant::new("zeroGradient")?)?;
    set(fields, FieldKind::Omega, name, BoundaryVariant::new("zeroGradient")?)?;

    let mut t = with_value("inletOutlet", temperature)?;
    t.set("inletValue", temperature)?;
    set(fields, FieldKind::T, name, t)?;

    set(fields, FieldKind::U, name, with_value("pressureInletOutletVelocity", velocity)?)?;

    let mut epsilon = with_value("inletOutlet", 0.001)?;
    epsilon.set("inletValue", 0.001)?;
    epsilon.set_uniform("inletValue", true)?;
    set(fields, FieldKind::Epsilon, name, epsilon)?;
    Ok(())
}

fn coupled_temperature(kappa_method: &str) -> Result<BoundaryVariant, CaseError> {
    let mut variant = BoundaryVariant::new("compressible::turbulentTemperatureCoupledBaffleMixed")?;
    variant.set("value", "$internalField")?;
    variant.set("kappaMethod", kappa_method)?;
    variant.set("kappa", "kappa")?;
    variant.set("Tnbr", "T")?;
    Ok(variant)
}

/// Couple the solid region `heater` to the fluid region `bg` at
/// `temperature` kelvin.
///
/// The solid side gets the coupled-baffle temperature plus its internal
/// field; the fluid side of the interface becomes a wall with the same
/// coupled temperature.
pub fn set_heater(
    solid: &mut RegionBoundaries,
    fluid: &mut RegionBoundaries,
    heater: &str,
    bg: &str,
    temperature: f64,
    time: &str,
) -> Result<(), CaseError> {
    field_mut(solid, FieldKind::P)?.retime(time)?;
    field_mut(solid, FieldKind::T)?.retime(time)?;
    retime_all(fluid, time)?;

    let solid_face = format!("{heater}_to_{bg}");
    let fluid_face = format!("{bg}_to_{heater}");

    set(solid, FieldKind::P, &solid_face, with_value("calculated", 1e5)?)?;
    set(solid, FieldKind::T, &solid_face, coupled_temperature("solidThermo")?)?;

    let alphat = with_value("compressible::alphatWallFunction", 0.0)?;
    set(fluid, FieldKind::Alphat, &fluid_face, alphat)?;
    let epsilon = with_value("compressible::epsilonWallFunction", 0.001)?;
    set(fluid, FieldKind::Epsilon, &fluid_face, epsilon)?;
    set(fluid, FieldKind::K, &fluid_face, with_value("kqRWallFunction", 0.02)?)?;
    set(fluid, FieldKind::Nut, &fluid_face, with_value("nutkWallFunction", 0.0)?)?;
    set(fluid, FieldKind::Omega, &fluid_face, with_value("omegaWallFunction", 10.0)?)?;
    set(fluid, FieldKind::P, &fluid_face, with_value("calculated", 1e5)?)?;
    set(fluid, FieldKind::PRgh, &fluid_face, with_value("fixedFluxPressure", 1e5)?)?;
    set(fluid, FieldKind::T, &fluid_face, coupled_temperature("fluidThermo")?)?;
    set(fluid, FieldKind::U, &fluid_face, BoundaryVariant::new("noSlip")?)?;

    field_mut(solid, FieldKind::T)?.set_internal(temperature, true)?;
    if time != "0" {
        if let Some(variant) = field_mut(solid, FieldKind::T)?.boundary_mut(&solid_face) {
            variant.set("value", temperature)?;
        }
    }
    Ok(())
}
