//! Typed records for the physical things a case simulates.
//!
//! A phyng ("physical thing") is a named object with boundary-level
//! behavior: heaters couple a solid region into the fluid, windows and
//! doors toggle between wall and inlet, air conditioners drive an
//! inlet/outlet pair, and sensors read a probe. Records validate their
//! physical ranges here; the controller applies the recipes under the
//! stop-before-mutate contract.

use std::sync::Arc;

use hearth_core::{FieldKind, IllegalMutation, MAX_TEMP, MAX_VEL, MIN_TEMP, MIN_VEL, ROOM_TEMP};
use hearth_probes::Probe;

use crate::config::ConfigValue;

/// Reject temperatures outside the modeled range.
pub(crate) fn check_temperature(what: &'static str, value: f64) -> Result<(), IllegalMutation> {
    if !(MIN_TEMP..=MAX_TEMP).contains(&value) {
        return Err(IllegalMutation::OutOfRange {
            what,
            value: format!("{value}"),
            range: format!("{MIN_TEMP} K to {MAX_TEMP} K"),
        });
    }
    Ok(())
}

/// Reject velocity magnitudes outside the modeled range.
pub(crate) fn check_speed(what: &'static str, value: f64) -> Result<(), IllegalMutation> {
    if !(MIN_VEL..=MAX_VEL).contains(&value) {
        return Err(IllegalMutation::OutOfRange {
            what,
            value: format!("{value}"),
            range: format!("{MIN_VEL} m/s to {MAX_VEL} m/s"),
        });
    }
    Ok(())
}

/// A velocity vector is acceptable when at least one component has a
/// magnitude within range.
pub(crate) fn check_velocity(what: &'static str, value: [f64; 3]) -> Result<(), IllegalMutation> {
    let ok = value
        .iter()
        .any(|v| (MIN_VEL..=MAX_VEL).contains(&v.abs()));
    if !ok {
        return Err(IllegalMutation::OutOfRange {
            what,
            value: format!("({} {} {})", value[0], value[1], value[2]),
            range: format!("some component in ±{MIN_VEL} to ±{MAX_VEL} m/s"),
        });
    }
    Ok(())
}

/// A heated solid region coupled into the fluid.
#[derive(Clone, Debug)]
pub struct Heater {
    /// Boundary and solid-region name.
    pub name: String,
    pub(crate) temperature: f64,
}

impl Heater {
    /// A heater starting at the ambient temperature.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            temperature: ROOM_TEMP,
        }
    }

    /// Surface temperature in kelvin.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// A heater may be set to anything above the lower bound; it has no
    /// upper clamp.
    pub(crate) fn check(temperature: f64) -> Result<(), IllegalMutation> {
        if temperature <= MIN_TEMP {
            return Err(IllegalMutation::OutOfRange {
                what: "heater temperature",
                value: format!("{temperature}"),
                range: format!("above {MIN_TEMP} K"),
            });
        }
        Ok(())
    }

    pub(crate) fn dump(&self) -> ConfigValue {
        let mut section = ConfigValue::section();
        section.insert("temperature", self.temperature);
        section
    }
}

/// An openable boundary in the fluid region: a wall when closed, an
/// inlet when open.
#[derive(Clone, Debug)]
pub struct Opening {
    /// Boundary name.
    pub name: String,
    pub(crate) open: bool,
    pub(crate) temperature: f64,
    pub(crate) velocity: [f64; 3],
}

impl Opening {
    /// A closed opening at the ambient temperature with the minimum
    /// draught along `axis`.
    pub fn new(name: &str, axis: usize) -> Self {
        let mut velocity = [0.0; 3];
        velocity[axis.min(1)] = MIN_VEL;
        Self {
            name: name.to_string(),
            open: false,
            temperature: ROOM_TEMP,
            velocity,
        }
    }

    /// Whether the opening currently behaves as an inlet.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Air temperature at the opening in kelvin.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Inflow velocity in m/s.
    pub fn velocity(&self) -> [f64; 3] {
        self.velocity
    }

    pub(crate) fn dump(&self) -> ConfigValue {
        let mut section = ConfigValue::section();
        section.insert("open", self.open);
        section.insert("temperature", self.temperature);
        let mut velocity = ConfigValue::section();
        velocity.insert("x", self.velocity[0]);
        velocity.insert("y", self.velocity[1]);
        velocity.insert("z", self.velocity[2]);
        section.insert("velocity", velocity);
        section
    }
}

/// An air conditioner: an intake outlet and a directed supply inlet.
#[derive(Clone, Debug)]
pub struct Ac {
    /// Base boundary name; the faces are `<name>_in` and `<name>_out`.
    pub name: String,
    pub(crate) enabled: bool,
    pub(crate) temperature: f64,
    pub(crate) speed: f64,
    pub(crate) angle: f64,
    /// Whether the unit's long axis runs along x (deflects into y).
    pub(crate) wide: bool,
}

impl Ac {
    /// A disabled unit at ambient temperature blowing at the minimum
    /// speed, 45 degrees down.
    pub fn new(name: &str, wide: bool) -> Self {
        Self {
            name: name.to_string(),
            enabled: false,
            temperature: ROOM_TEMP,
            speed: MIN_VEL,
            angle: 45.0,
            wide,
        }
    }

    /// The intake face name.
    pub fn face_in(&self) -> String {
        format!("{}_in", self.name)
    }

    /// The supply face name.
    pub fn face_out(&self) -> String {
        format!("{}_out", self.name)
    }

    /// Whether the unit currently conditions the air.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Supply air temperature in kelvin.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Supply speed in m/s.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Louver angle in degrees, -45 to 45.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Air drawn straight into the intake.
    pub(crate) fn velocity_in(&self) -> [f64; 3] {
        [0.0, 0.0, -self.speed]
    }

    /// Supply velocity: the speed split by the louver angle between the
    /// downward axis and the unit's crosswise axis.
    pub(crate) fn velocity_out(&self) -> [f64; 3] {
        let down = -self.speed * self.angle.abs().to_radians().cos();
        let side = self.speed * self.angle.to_radians().sin();
        if self.wide {
            [0.0, side, down]
        } else {
            [side, 0.0, down]
        }
    }

    pub(crate) fn check_angle(angle: f64) -> Result<(), IllegalMutation> {
        if !(-45.0..=45.0).contains(&angle) {
            return Err(IllegalMutation::OutOfRange {
                what: "ac louver angle",
                value: format!("{angle}"),
                range: "-45 to 45 degrees".to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn dump(&self) -> ConfigValue {
        let mut section = ConfigValue::section();
        section.insert("enabled", self.enabled);
        section.insert("temperature", self.temperature);
        section.insert("velocity", self.speed);
        section.insert("angle", self.angle);
        section
    }
}

/// A point probe presented as a named sensor.
#[derive(Clone, Debug)]
pub struct Sensor {
    /// Sensor name.
    pub name: String,
    /// Field the sensor reads.
    pub field: FieldKind,
    /// Sample location, after any snap to an existing probe.
    pub location: [f64; 3],
    pub(crate) probe: Arc<Probe>,
}

impl Sensor {
    /// The latest sampled value.
    pub fn value(&self) -> hearth_core::Value {
        self.probe.value()
    }

    pub(crate) fn dump(&self) -> ConfigValue {
        let mut section = ConfigValue::section();
        section.insert("field", self.field.name());
        let mut location = ConfigValue::section();
        location.insert("x", self.location[0]);
        location.insert("y", self.location[1]);
        location.insert("z", self.location[2]);
        section.insert("location", location);
        section
    }
}

/// Any phyng, as stored by the controller.
#[derive(Clone, Debug)]
pub enum Phyng {
    /// A heated solid region.
    Heater(Heater),
    /// A window opening.
    Window(Opening),
    /// A door opening.
    Door(Opening),
    /// An air conditioner.
    Ac(Ac),
    /// A probe-backed sensor.
    Sensor(Sensor),
}

impl Phyng {
    /// The phyng's name.
    pub fn name(&self) -> &str {
        match self {
            Phyng::Heater(p) => &p.name,
            Phyng::Window(p) | Phyng::Door(p) => &p.name,
            Phyng::Ac(p) => &p.name,
            Phyng::Sensor(p) => &p.name,
        }
    }
}
