//! Case parameters and the dump tree handed to API consumers.

use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;

/// Parameters a case is created with.
///
/// `cores` is normalized on construction: a serial case always uses one
/// core, a parallel case is clamped to the machine and rounded down to an
/// even count.
#[derive(Clone, Debug)]
pub struct CaseConfig {
    /// Path of the case directory.
    pub path: PathBuf,
    /// Solver program, e.g. `chtMultiRegionFoam`.
    pub solver: String,
    /// Whether `run()` blocks until the solver exits.
    pub blocking: bool,
    /// Whether the case is decomposed and run under MPI.
    pub parallel: bool,
    /// Cores for a parallel run.
    pub cores: usize,
    /// Mesh quality in percent, 0 to 100.
    pub mesh_quality: u8,
    /// Prune results once the latest time crosses a multiple of this;
    /// zero disables cleaning.
    pub clean_limit: f64,
    /// Simulated end time, seconds.
    pub end_time: f64,
    /// Simulated seconds between result writes.
    pub write_interval: f64,
    /// Whether the pacing monitor keeps the run near realtime.
    pub realtime: bool,
    /// Name of the background fluid region.
    pub background: String,
}

impl CaseConfig {
    /// A config for the case at `path` with the defaults of the modeled
    /// solver family.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            solver: "chtMultiRegionFoam".to_string(),
            blocking: false,
            parallel: false,
            cores: 1,
            mesh_quality: 50,
            clean_limit: 0.0,
            end_time: 10000.0,
            write_interval: 1.0,
            realtime: false,
            background: "fluid".to_string(),
        }
    }

    /// Clamp and even out the core count for the current machine.
    pub(crate) fn normalize_cores(&mut self) {
        if !self.parallel {
            self.cores = 1;
            return;
        }
        let available = std::thread::available_parallelism()
            .map(usize::from)
            .unwrap_or(1);
        if self.cores == 0 || self.cores > available {
            self.cores = available;
        }
        if self.cores == 1 {
            self.parallel = false;
        }
        if self.cores != 1 && self.cores % 2 == 1 {
            self.cores /= 2;
        }
    }
}

/// One node of the parameter dump tree.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigValue {
    /// A boolean parameter.
    Bool(bool),
    /// A numeric parameter.
    Number(f64),
    /// A text parameter.
    Text(String),
    /// A nested section, insertion-ordered.
    Map(IndexMap<String, ConfigValue>),
}

impl ConfigValue {
    /// An empty section.
    pub fn section() -> ConfigValue {
        ConfigValue::Map(IndexMap::new())
    }

    /// Insert into a section. Panics in debug builds when `self` is not
    /// a map; non-map nodes never receive inserts in practice.
    pub fn insert(&mut self, key: &str, value: impl Into<ConfigValue>) {
        if let ConfigValue::Map(map) = self {
            map.insert(key.to_string(), value.into());
        } else {
            debug_assert!(false, "insert on a non-map config node");
        }
    }

    /// Look a key up in a section.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        match self {
            ConfigValue::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// The boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The numeric payload, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ConfigValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// The text payload, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Number(v)
    }
}

impl From<usize> for ConfigValue {
    fn from(v: usize) -> Self {
        ConfigValue::Number(v as f64)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::Text(v.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::Text(v)
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(v) => write!(f, "{v}"),
            ConfigValue::Number(v) => write!(f, "{v}"),
            ConfigValue::Text(v) => f.write_str(v),
            ConfigValue::Map(map) => {
                f.write_str("{")?;
                for (idx, (key, value)) in map.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_case_always_runs_one_core() {
        let mut config = CaseConfig::new("/case");
        config.cores = 8;
        config.normalize_cores();
        assert_eq!(config.cores, 1);
    }

    #[test]
    fn parallel_core_count_is_even() {
        let mut config = CaseConfig::new("/case");
        config.parallel = true;
        config.cores = 2;
        config.normalize_cores();
        assert!(config.cores == 1 || config.cores % 2 == 0);
    }

    #[test]
    fn sections_nest_and_look_up() {
        let mut root = ConfigValue::section();
        root.insert("parallel", false);
        root.insert("cores", 1usize);
        let mut heaters = ConfigValue::section();
        heaters.insert("heater", 310.0);
        root.insert("heaters", heaters);

        assert_eq!(root.get("parallel").unwrap().as_bool(), Some(false));
        assert_eq!(
            root.get("heaters").unwrap().get("heater").unwrap().as_number(),
            Some(310.0)
        );
        assert!(root.get("missing").is_none());
    }
}
