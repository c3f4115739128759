//! A single probed location for one field in one region.

use std::sync::Mutex;

use hearth_core::{FieldKind, Value};

/// Per-axis tolerance when matching two probe locations.
///
/// The solver samples the cell nearest to the requested point, so two
/// locations this close land in the same cell for the modeled room sizes.
pub const LOCATION_TOLERANCE: f64 = 0.5;

/// The last sample read from the solver's probe output.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Sampled field value.
    pub value: Value,
    /// Simulation time of the sample, in seconds.
    pub time: f64,
}

/// One probe: identity plus its latest sample.
///
/// Probes are handed out as `Arc<Probe>` by the registry; the sample is
/// written by the parser thread and read by anyone holding the handle.
#[derive(Debug)]
pub struct Probe {
    field: FieldKind,
    region: String,
    location: Mutex<[f64; 3]>,
    sample: Mutex<Sample>,
}

impl Probe {
    pub(crate) fn new(field: FieldKind, region: &str, location: [f64; 3]) -> Self {
        Self {
            field,
            region: region.to_string(),
            location: Mutex::new(location),
            sample: Mutex::new(Sample {
                value: Value::Scalar(0.0),
                time: 0.0,
            }),
        }
    }

    /// The probed field.
    pub fn field(&self) -> FieldKind {
        self.field
    }

    /// The probed mesh region.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The probe location. May differ slightly from the requested one
    /// when the registry snapped it to an existing dictionary entry.
    pub fn location(&self) -> [f64; 3] {
        *self.location.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn set_location(&self, location: [f64; 3]) {
        *self.location.lock().unwrap_or_else(|e| e.into_inner()) = location;
    }

    /// The latest sample value.
    pub fn value(&self) -> Value {
        self.sample().value
    }

    /// Simulation time of the latest sample, in seconds.
    pub fn time(&self) -> f64 {
        self.sample().time
    }

    /// The latest sample as one consistent pair.
    pub fn sample(&self) -> Sample {
        self.sample.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub(crate) fn set_sample(&self, value: Value, time: f64) {
        let mut sample = self.sample.lock().unwrap_or_else(|e| e.into_inner());
        sample.value = value;
        sample.time = time;
    }

    /// Reset the sample to zero, used when a case's results are wiped.
    pub fn reset(&self) {
        self.set_sample(Value::Scalar(0.0), 0.0);
    }

    /// Whether this probe answers for the given identity.
    pub fn matches(&self, field: FieldKind, region: &str, location: [f64; 3]) -> bool {
        self.field == field && self.region == region && close(self.location(), location)
    }
}

/// Per-axis closeness at [`LOCATION_TOLERANCE`].
pub(crate) fn close(a: [f64; 3], b: [f64; 3]) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|(x, y)| (x - y).abs() <= LOCATION_TOLERANCE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_within_tolerance() {
        let probe = Probe::new(FieldKind::T, "fluid", [1.0, 2.0, 1.0]);
        assert!(probe.matches(FieldKind::T, "fluid", [1.4, 1.6, 1.0]));
        assert!(!probe.matches(FieldKind::T, "fluid", [1.6, 2.0, 1.0]));
        assert!(!probe.matches(FieldKind::U, "fluid", [1.0, 2.0, 1.0]));
        assert!(!probe.matches(FieldKind::T, "solid", [1.0, 2.0, 1.0]));
    }

    #[test]
    fn sample_updates_are_atomic_pairs() {
        let probe = Probe::new(FieldKind::T, "fluid", [0.0, 0.0, 0.0]);
        probe.set_sample(Value::Scalar(293.15), 1.5);
        let sample = probe.sample();
        assert_eq!(sample.value, Value::Scalar(293.15));
        assert_eq!(sample.time, 1.5);
        probe.reset();
        assert_eq!(probe.time(), 0.0);
    }
}
