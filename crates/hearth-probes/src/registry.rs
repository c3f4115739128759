//! Per-case probe registry.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use hearth_core::{CaseError, FieldKind};
use tracing::debug;

use crate::dict::{self, ProbesDict};
use crate::probe::Probe;

/// The probes of one case and their dictionary file.
///
/// Registration deduplicates by identity (field, region, location within
/// tolerance) and keeps `<case>/system/probes` an idempotent union of
/// every live probe. Registration order is also the column order of the
/// solver's probe output files, so it is frozen for as long as a parser
/// is running; register probes before starting the run.
#[derive(Debug)]
pub struct ProbeRegistry {
    case_dir: PathBuf,
    probes: Mutex<Vec<Arc<Probe>>>,
}

impl ProbeRegistry {
    /// A registry for the case at `case_dir`.
    pub fn new(case_dir: &Path) -> Self {
        Self {
            case_dir: case_dir.to_path_buf(),
            probes: Mutex::new(Vec::new()),
        }
    }

    fn dict_path(&self) -> PathBuf {
        self.case_dir.join("system").join("probes")
    }

    /// Register a probe, reusing the existing handle when one matches.
    ///
    /// A new probe is appended to the dictionary file unless a location
    /// within tolerance is already listed, in which case the probe snaps
    /// to the file's literal location.
    pub fn register(
        &self,
        field: FieldKind,
        region: &str,
        location: [f64; 3],
    ) -> Result<Arc<Probe>, CaseError> {
        let mut probes = self.probes.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = probes.iter().find(|p| p.matches(field, region, location)) {
            return Ok(Arc::clone(existing));
        }

        let probe = Arc::new(Probe::new(field, region, location));
        let path = self.dict_path();
        if path.exists() {
            let mut dict = ProbesDict::load(&path)?;
            dict.add_field(field);
            match dict.matching_location(location) {
                Some(snapped) => probe.set_location(snapped),
                None => dict.push_location(location),
            }
            dict.save(&path)?;
        } else {
            debug!(field = field.name(), region, "creating probes dictionary");
            std::fs::write(&path, dict::template(field, region, location))?;
        }
        probes.push(Arc::clone(&probe));
        Ok(probe)
    }

    /// Forget a probe. The dictionary file keeps its entries until the
    /// next [`ProbeRegistry::remove_unused`] pass.
    pub fn remove(&self, probe: &Arc<Probe>) {
        self.probes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|p| !Arc::ptr_eq(p, probe));
    }

    /// Prune dictionary fields and locations no live probe uses.
    /// Returns the number of live probes.
    pub fn remove_unused(&self) -> Result<usize, CaseError> {
        let probes = self.snapshot();
        let path = self.dict_path();
        if !path.exists() {
            return Ok(0);
        }
        let fields = self.fields();
        let locations: Vec<[f64; 3]> = probes.iter().map(|p| p.location()).collect();
        let mut dict = ProbesDict::load(&path)?;
        dict.retain_fields(&fields);
        dict.retain_locations(&locations);
        dict.save(&path)?;
        Ok(probes.len())
    }

    /// All live probes in registration order.
    pub fn snapshot(&self) -> Vec<Arc<Probe>> {
        self.probes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The distinct fields probed, in first-registration order.
    pub fn fields(&self) -> Vec<FieldKind> {
        let mut fields = Vec::new();
        for probe in self.snapshot() {
            if !fields.contains(&probe.field()) {
                fields.push(probe.field());
            }
        }
        fields
    }

    /// The distinct regions probed, in first-registration order.
    pub fn regions(&self) -> Vec<String> {
        let mut regions = Vec::new();
        for probe in self.snapshot() {
            if !regions.iter().any(|r| r == probe.region()) {
                regions.push(probe.region().to_string());
            }
        }
        regions
    }

    /// Whether no probes are registered.
    pub fn is_empty(&self) -> bool {
        self.probes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_empty()
    }

    /// Zero every probe's sample, used when results are wiped.
    pub fn reset_samples(&self) {
        for probe in self.snapshot() {
            probe.reset();
        }
    }

    pub(crate) fn case_dir(&self) -> &Path {
        &self.case_dir
    }
}
