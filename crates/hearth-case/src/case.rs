//! The case controller.
//!
//! A [`Case`] owns one solver case directory: its configuration, the
//! boundary stores extracted per region, the probe registry, and the
//! background threads of an active run (solver supervisor, probe parser,
//! result cleaner, pacing monitor). Handles are cheap clones sharing the
//! same state, so the pacing monitor can drive the case it belongs to.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use hearth_boundary::BoundaryFile;
use hearth_core::{CaseError, FieldKind, Value, ROOM_TEMP};
use hearth_probes::{ProbeParser, ProbeRegistry};
use hearth_runner::{CaseCommand, SolverHandle, ZoneSplit, STOP_BOUND};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::behavior::{self, RegionBoundaries};
use crate::cleaner::{self, CleanerConfig};
use crate::config::{CaseConfig, ConfigValue};
use crate::fs;
use crate::pacing::{CaseClock, PacingMonitor};
use crate::pause::{paused, RunControl};
use crate::phyng::{self, Ac, Heater, Opening, Phyng, Sensor};

/// How many seconds the simulation may run ahead of the wall clock
/// before the pacing monitor pauses it.
const PACING_TOLERANCE: f64 = 5.0;

/// Real, simulated, and relative time of a run, all in epoch/seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaseTime {
    /// Wall clock, epoch milliseconds.
    pub real_ms: f64,
    /// Simulated clock mapped onto the epoch: start timestamp plus the
    /// time probe's seconds. Zero before the first run.
    pub simulation_ms: f64,
    /// Simulated minus real, in seconds.
    pub difference: f64,
}

#[derive(Debug, Default)]
struct State {
    initialized: bool,
    decomposed: bool,
    /// Epoch ms of the first `run()`; zero after a clean.
    start_time_ms: f64,
    /// Per-region boundary stores; single-region cases use one entry
    /// under the empty name.
    boundaries: IndexMap<String, RegionBoundaries>,
}

#[derive(Debug)]
struct Inner {
    config: Mutex<CaseConfig>,
    state: Mutex<State>,
    phyngs: Mutex<IndexMap<String, Phyng>>,
    probes: Arc<ProbeRegistry>,
    parser: Mutex<ProbeParser>,
    time_probe: Mutex<Option<Arc<hearth_probes::Probe>>>,
    solver: Mutex<Option<SolverHandle>>,
    cleaner: Mutex<Option<JoinHandle<()>>>,
    monitor: PacingMonitor,
    running: Arc<AtomicBool>,
    stop_lock: Mutex<()>,
}

/// A conjugate-heat-transfer case and its lifecycle.
#[derive(Clone, Debug)]
pub struct Case {
    inner: Arc<Inner>,
}

impl Case {
    /// A controller over the case directory named by `config`.
    pub fn new(mut config: CaseConfig) -> Self {
        config.normalize_cores();
        let probes = Arc::new(ProbeRegistry::new(&config.path));
        let monitor = PacingMonitor::new(config.realtime, PACING_TOLERANCE);
        let decomposed = config.path.join("processor0").exists();
        let inner = Inner {
            state: Mutex::new(State {
                decomposed,
                ..State::default()
            }),
            phyngs: Mutex::new(IndexMap::new()),
            parser: Mutex::new(ProbeParser::new(Arc::clone(&probes))),
            probes,
            time_probe: Mutex::new(None),
            solver: Mutex::new(None),
            cleaner: Mutex::new(None),
            monitor,
            running: Arc::new(AtomicBool::new(false)),
            stop_lock: Mutex::new(()),
            config: Mutex::new(config),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// The case directory.
    pub fn path(&self) -> PathBuf {
        self.config(|c| c.path.clone())
    }

    /// Whether the solver or the pacing monitor is active.
    pub fn is_running(&self) -> bool {
        self.solver_running() || self.inner.monitor.is_running()
    }

    /// Whether the case has been set up since its last structural edit.
    pub fn is_initialized(&self) -> bool {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner()).initialized
    }

    /// Whether results currently live in processor directories.
    pub fn is_decomposed(&self) -> bool {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner()).decomposed
    }

    /// Whether realtime pacing is on.
    pub fn realtime(&self) -> bool {
        self.inner.monitor.is_enabled()
    }

    /// Switch realtime pacing. Enabling it on a running case starts the
    /// monitor immediately; disabling stops it.
    pub fn set_realtime(&self, enabled: bool) {
        self.inner.monitor.set_enabled(enabled);
        self.config_mut(|c| c.realtime = enabled);
        if enabled && self.solver_running() {
            self.inner.monitor.start(self.clone());
        }
    }

    /// Change the result-pruning limit. Takes effect on the next run.
    pub fn set_clean_limit(&self, clean_limit: f64) {
        self.config_mut(|c| c.clean_limit = clean_limit);
    }

    /// Change the simulated end time, persisting it into the control
    /// dictionary when one exists.
    pub fn set_end_time(&self, end_time: f64) -> Result<(), CaseError> {
        self.config_mut(|c| c.end_time = end_time);
        if self.path().join("system/controlDict").exists() {
            self.run_foam_dictionary("system/controlDict", "endTime", &fs::time_name(end_time))?;
        }
        Ok(())
    }

    /// Change the mesh quality. This is a structural edit: the case is
    /// stopped and must be set up again.
    pub fn set_mesh_quality(&self, mesh_quality: u8) -> Result<(), CaseError> {
        self.stop(true)?;
        self.uninitialize();
        self.config_mut(|c| c.mesh_quality = mesh_quality.min(100));
        Ok(())
    }

    /// Change the decomposition. Structural, like
    /// [`Case::set_mesh_quality`].
    pub fn set_parallel(&self, parallel: bool, cores: usize) -> Result<(), CaseError> {
        self.stop(true)?;
        self.uninitialize();
        self.config_mut(|c| {
            c.parallel = parallel;
            c.cores = cores;
            c.normalize_cores();
        });
        Ok(())
    }

    fn config<T>(&self, read: impl FnOnce(&CaseConfig) -> T) -> T {
        read(&self.inner.config.lock().unwrap_or_else(|e| e.into_inner()))
    }

    fn config_mut<T>(&self, edit: impl FnOnce(&mut CaseConfig) -> T) -> T {
        edit(&mut self.inner.config.lock().unwrap_or_else(|e| e.into_inner()))
    }

    fn solver_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    fn uninitialize(&self) {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .initialized = false;
    }

    /// The latest result time, from `processor0` when decomposed.
    pub fn latest_time(&self) -> String {
        if self.is_decomposed() {
            fs::latest_time_parallel(&self.path())
        } else {
            fs::latest_time(&self.path())
        }
    }

    /// Whether the next write would pass the configured end time.
    pub fn solved(&self) -> bool {
        let latest: f64 = self.latest_time().parse().unwrap_or(0.0);
        let (write_interval, end_time) = self.config(|c| (c.write_interval, c.end_time));
        write_interval + latest > end_time
    }

    // ── External commands ────────────────────────────────────────────

    /// Decompose the case for a parallel run.
    pub fn run_decompose(
        &self,
        all_regions: bool,
        copy_zero: bool,
        latest_time: bool,
        force: bool,
    ) -> Result<(), CaseError> {
        let (mut latest_time, mut force) = (latest_time, force);
        if self.is_decomposed() {
            // Old processor dirs hold earlier results; only the latest
            // time can be decomposed on top of them.
            latest_time = true;
            force = true;
        }
        info!("decomposing the case");
        CaseCommand::decompose(&self.path(), all_regions, copy_zero, latest_time, force)
            .run()
            .map_err(CaseError::Run)?;
        self.inner
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .decomposed = true;
        Ok(())
    }

    /// Reconstruct results out of the processor directories. A case that
    /// was never decomposed makes this a no-op.
    pub fn run_reconstruct(
        &self,
        all_regions: bool,
        region: Option<&str>,
        latest_time: bool,
        fields: Option<&[&str]>,
    ) -> Result<(), CaseError> {
        if !self.is_decomposed() {
            debug!("case is not decomposed, skipping reconstruction");
            return Ok(());
        }
        // Stale serial results would shadow the reconstructed ones.
        fs::remove_numbered_dirs_except(&self.path(), &["0".to_string()])?;
        info!(region, "reconstructing the case");
        CaseCommand::reconstruct(&self.path(), all_regions, region, latest_time, fields)
            .run()
            .map_err(CaseError::Run)?;
        Ok(())
    }

    /// Edit one entry of a solver dictionary through `foamDictionary`.
    pub fn run_foam_dictionary(
        &self,
        dict: &str,
        entry: &str,
        value: &str,
    ) -> Result<(), CaseError> {
        CaseCommand::foam_dictionary(&self.path(), dict, entry, value)
            .run()
            .map(|_| ())
            .map_err(CaseError::Run)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Mesh the case, split its regions, set up conjugate heat
    /// transfer, and extract the boundary state.
    ///
    /// Rejected while the case runs.
    pub fn setup(&self) -> Result<(), CaseError> {
        if self.is_running() {
            return Err(CaseError::BadState {
                reason: "cannot set up a running case".to_string(),
            });
        }
        info!(case = %self.path().display(), "setting up the case");
        self.clean_case()?;
        let path = self.path();
        CaseCommand::block_mesh(&path).run().map_err(CaseError::Run)?;
        CaseCommand::snappy_hex_mesh(&path)
            .run()
            .map_err(CaseError::Run)?;
        CaseCommand::split_mesh_regions(&path, ZoneSplit::CellZonesOnly)
            .run()
            .map_err(CaseError::Run)?;
        CaseCommand::setup_cht(&path).run().map_err(CaseError::Run)?;
        self.extract_boundary_conditions()?;
        self.register_time_probe()?;
        self.bind_phyngs()?;
        self.inner
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .initialized = true;
        info!("case set up");
        Ok(())
    }

    /// Open boundary stores for every managed field found under
    /// `<case>/0`, per region when the layout is multi-region.
    pub fn extract_boundary_conditions(&self) -> Result<(), CaseError> {
        debug!("extracting boundary state");
        let path = self.path();
        let zero = path.join("0");
        let mut boundaries = IndexMap::new();

        let mut region_dirs = Vec::new();
        for entry in std::fs::read_dir(&zero)?.flatten() {
            if entry.path().is_dir() {
                region_dirs.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        if region_dirs.is_empty() {
            boundaries.insert(String::new(), open_region(&path, &zero, None)?);
        } else {
            for region in region_dirs {
                let fields = open_region(&path, &zero.join(&region), Some(&region))?;
                boundaries.insert(region, fields);
            }
        }
        self.inner
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .boundaries = boundaries;
        Ok(())
    }

    fn register_time_probe(&self) -> Result<(), CaseError> {
        let background = self.config(|c| c.background.clone());
        let probe = self
            .inner
            .probes
            .register(FieldKind::T, &background, [0.0, 0.0, 0.0])?;
        self.inner
            .parser
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .parse_probe(&probe);
        *self
            .inner
            .time_probe
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(probe);
        Ok(())
    }

    /// Apply every phyng's initial boundary recipe at time zero.
    fn bind_phyngs(&self) -> Result<(), CaseError> {
        let bg = self.config(|c| c.background.clone());
        let phyngs: Vec<Phyng> = self
            .inner
            .phyngs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect();
        let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
        for item in phyngs {
            match item {
                Phyng::Heater(heater) => {
                    set_heater_regions(&mut state.boundaries, &heater.name, &bg, heater.temperature(), "0")?;
                }
                Phyng::Window(opening) | Phyng::Door(opening) => {
                    let fluid = fluid_region(&mut state.boundaries, &bg)?;
                    behavior::set_wall(fluid, &opening.name, opening.temperature(), "0")?;
                }
                Phyng::Ac(ac) => {
                    let fluid = fluid_region(&mut state.boundaries, &bg)?;
                    behavior::set_wall(fluid, &ac.name, ac.temperature(), "0")?;
                    behavior::set_wall(fluid, &ac.face_in(), ac.temperature(), "0")?;
                    behavior::set_wall(fluid, &ac.face_out(), ac.temperature(), "0")?;
                }
                Phyng::Sensor(_) => {}
            }
        }
        Ok(())
    }

    /// Start solving. A running case is left alone; an uninitialized one
    /// is cleaned and set up first. In blocking mode this waits for the
    /// solver and surfaces its classified outcome.
    pub fn run(&self) -> Result<(), CaseError> {
        if self.solver_running() {
            debug!("case is already being solved");
            return Ok(());
        }
        if !self.is_initialized() {
            self.clean_case()?;
            self.setup()?;
        }
        {
            let _guard = self.inner.stop_lock.lock().unwrap_or_else(|e| e.into_inner());
            info!("starting to solve the case");
            self.persist_control()?;
            self.save_boundaries()?;
            {
                let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
                if state.start_time_ms == 0.0 {
                    state.start_time_ms = now_ms();
                }
            }
            let (parallel, cores, solver, clean_limit, write_interval) = self.config(|c| {
                (
                    c.parallel,
                    c.cores,
                    c.solver.clone(),
                    c.clean_limit,
                    c.write_interval,
                )
            });
            if parallel {
                self.run_decompose(true, false, true, true)?;
            }
            let path = self.path();
            let mut command = CaseCommand::solver(&solver, &path);
            if parallel {
                command = command.parallel(cores);
            }
            let handle = SolverHandle::spawn(&command, &path)?;
            *self.inner.solver.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
            self.inner.running.store(true, Ordering::SeqCst);

            *self.inner.cleaner.lock().unwrap_or_else(|e| e.into_inner()) = cleaner::spawn(
                CleanerConfig {
                    case_dir: path,
                    parallel,
                    cores,
                    clean_limit,
                    write_interval,
                },
                Arc::clone(&self.inner.running),
            );
            self.inner
                .parser
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .start()?;
        }
        if self.inner.monitor.is_enabled() {
            self.inner.monitor.start(self.clone());
        }
        if self.config(|c| c.blocking) {
            return self.wait_blocking();
        }
        Ok(())
    }

    /// Wait for the supervised solver without holding its lock, so a
    /// concurrent `stop()` can still reach it.
    fn wait_blocking(&self) -> Result<(), CaseError> {
        loop {
            let done = self
                .inner
                .solver
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .as_ref()
                .is_none_or(|handle| !handle.is_running());
            if done {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        let result = self
            .inner
            .solver
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_mut()
            .map_or(Ok(()), SolverHandle::wait);
        let _ = self.stop(true);
        result.map_err(CaseError::Run)
    }

    /// Stop the run: pacing monitor, probe parser, and (when
    /// `stop_solver` is set) the solver itself. Idempotent.
    pub fn stop(&self, stop_solver: bool) -> Result<(), CaseError> {
        self.inner.monitor.stop();
        self.halt_solving(stop_solver)
    }

    /// The stop path the pacing monitor uses; leaves the monitor alive.
    fn halt_solving(&self, stop_solver: bool) -> Result<(), CaseError> {
        if !self.solver_running() {
            debug!("case is already stopped");
            return Ok(());
        }
        let _guard = self.inner.stop_lock.lock().unwrap_or_else(|e| e.into_inner());
        debug!("stopping probe parser");
        self.inner
            .parser
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .stop();
        if !stop_solver {
            return Ok(());
        }
        info!("stopping the case solver");
        let result = match self
            .inner
            .solver
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_mut()
        {
            Some(handle) => handle.stop(STOP_BOUND),
            None => Ok(()),
        };
        *self.inner.solver.lock().unwrap_or_else(|e| e.into_inner()) = None;
        self.inner.running.store(false, Ordering::SeqCst);
        let cleaner = self
            .inner
            .cleaner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = cleaner {
            let _ = handle.join();
        }
        result.map_err(CaseError::Run)
    }

    /// Stop everything and wipe results, processor directories,
    /// post-processing output, and logs. Time starts over.
    pub fn clean_case(&self) -> Result<(), CaseError> {
        debug!("cleaning the case");
        self.stop(true)?;
        let path = self.path();
        fs::remove_indexed_dirs(&path, "processor")?;
        fs::remove_numbered_dirs_except(&path, &["0".to_string()])?;
        fs::remove_dir_forced(&path.join("postProcessing"));
        fs::remove_files_matching(&path, "log.", ".log")?;
        fs::remove_files_matching(&path, "", ".foam")?;
        fs::remove_files_matching(&path, "", ".OpenFOAM")?;
        {
            let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
            state.start_time_ms = 0.0;
            state.decomposed = false;
        }
        self.inner.probes.reset_samples();
        debug!("case is clean");
        Ok(())
    }

    /// Flush every dirty boundary store.
    pub fn save_boundaries(&self) -> Result<(), CaseError> {
        let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
        for fields in state.boundaries.values_mut() {
            for file in fields.values_mut() {
                file.save()?;
            }
        }
        Ok(())
    }

    fn persist_control(&self) -> Result<(), CaseError> {
        if !self.path().join("system/controlDict").exists() {
            return Ok(());
        }
        let (end_time, write_interval) = self.config(|c| (c.end_time, c.write_interval));
        self.run_foam_dictionary("system/controlDict", "endTime", &fs::time_name(end_time))?;
        self.run_foam_dictionary(
            "system/controlDict",
            "writeInterval",
            &fs::time_name(write_interval),
        )
    }

    // ── Time ─────────────────────────────────────────────────────────

    /// Simulated minus wall time in seconds, rounded to milliseconds.
    pub fn time_difference(&self) -> f64 {
        let times = self.get_time();
        times.difference
    }

    /// The run's clocks.
    pub fn get_time(&self) -> CaseTime {
        let real_ms = now_ms();
        let start_time_ms = self
            .inner
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .start_time_ms;
        if start_time_ms == 0.0 {
            return CaseTime {
                real_ms,
                simulation_ms: 0.0,
                difference: 0.0,
            };
        }
        let probe_seconds = self
            .inner
            .time_probe
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map_or(0.0, |p| p.time());
        let simulation_ms = start_time_ms + probe_seconds * 1000.0;
        CaseTime {
            real_ms,
            simulation_ms,
            difference: round_ms((simulation_ms - real_ms) / 1000.0),
        }
    }

    // ── Dump ─────────────────────────────────────────────────────────

    /// The case parameters and every phyng's settings as one tree.
    pub fn dump_case(&self) -> ConfigValue {
        let mut root = ConfigValue::section();
        self.config(|c| {
            root.insert("type", "cht");
            root.insert("path", c.path.display().to_string());
            root.insert("blocking", c.blocking);
            root.insert("parallel", c.parallel);
            root.insert("cores", c.cores);
            root.insert("initialized", self.is_initialized());
            root.insert("mesh_quality", f64::from(c.mesh_quality));
            root.insert("clean_limit", c.clean_limit);
            root.insert(
                "started_timestamp",
                self.inner
                    .state
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .start_time_ms,
            );
            root.insert("realtime", self.realtime());
            root.insert("end_time", c.end_time);
            root.insert("background", c.background.as_str());
        });

        let mut heaters = ConfigValue::section();
        let mut windows = ConfigValue::section();
        let mut doors = ConfigValue::section();
        let mut acs = ConfigValue::section();
        let mut sensors = ConfigValue::section();
        for (name, item) in self.inner.phyngs.lock().unwrap_or_else(|e| e.into_inner()).iter() {
            match item {
                Phyng::Heater(p) => heaters.insert(name, p.dump()),
                Phyng::Window(p) => windows.insert(name, p.dump()),
                Phyng::Door(p) => doors.insert(name, p.dump()),
                Phyng::Ac(p) => acs.insert(name, p.dump()),
                Phyng::Sensor(p) => sensors.insert(name, p.dump()),
            }
        }
        root.insert("heaters", heaters);
        root.insert("windows", windows);
        root.insert("doors", doors);
        root.insert("acs", acs);
        root.insert("sensors", sensors);
        root
    }

    // ── Phyngs ───────────────────────────────────────────────────────

    /// Add a heater phyng. Structural: the case must be set up again.
    pub fn add_heater(&self, name: &str) -> Result<(), CaseError> {
        self.add_structural(name, Phyng::Heater(Heater::new(name)))
    }

    /// Add a window phyng with its draught along `axis` (0 = x, 1 = y).
    pub fn add_window(&self, name: &str, axis: usize) -> Result<(), CaseError> {
        self.add_structural(name, Phyng::Window(Opening::new(name, axis)))
    }

    /// Add a door phyng with its draught along `axis`.
    pub fn add_door(&self, name: &str, axis: usize) -> Result<(), CaseError> {
        self.add_structural(name, Phyng::Door(Opening::new(name, axis)))
    }

    /// Add an air-conditioner phyng. `wide` picks the crosswise axis the
    /// louver deflects into.
    pub fn add_ac(&self, name: &str, wide: bool) -> Result<(), CaseError> {
        self.add_structural(name, Phyng::Ac(Ac::new(name, wide)))
    }

    fn add_structural(&self, name: &str, item: Phyng) -> Result<(), CaseError> {
        let mut phyngs = self.inner.phyngs.lock().unwrap_or_else(|e| e.into_inner());
        if phyngs.contains_key(name) {
            return Err(CaseError::BadState {
                reason: format!("phyng '{name}' already exists"),
            });
        }
        phyngs.insert(name.to_string(), item);
        drop(phyngs);
        self.stop(true)?;
        self.uninitialize();
        Ok(())
    }

    /// Add a sensor reading `field` at `location` in the background
    /// region. The sensor snaps to an existing probe within tolerance.
    pub fn add_sensor(
        &self,
        name: &str,
        field: FieldKind,
        location: [f64; 3],
    ) -> Result<(), CaseError> {
        let background = self.config(|c| c.background.clone());
        let probe = self.inner.probes.register(field, &background, location)?;
        self.inner
            .parser
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .parse_probe(&probe);
        let sensor = Sensor {
            name: name.to_string(),
            field,
            location: probe.location(),
            probe,
        };
        self.inner
            .phyngs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), Phyng::Sensor(sensor));
        Ok(())
    }

    /// A snapshot of the named phyng.
    pub fn phyng(&self, name: &str) -> Option<Phyng> {
        self.inner
            .phyngs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    /// The latest reading of a sensor phyng.
    pub fn sensor_value(&self, name: &str) -> Result<Value, CaseError> {
        match self.phyng(name) {
            Some(Phyng::Sensor(sensor)) => Ok(sensor.value()),
            Some(_) => Err(CaseError::BadState {
                reason: format!("phyng '{name}' is not a sensor"),
            }),
            None => Err(CaseError::BadState {
                reason: format!("no phyng named '{name}'"),
            }),
        }
    }

    /// Remove a phyng. Sensors release their probe; anything else is a
    /// structural edit.
    pub fn remove_phyng(&self, name: &str) -> Result<(), CaseError> {
        let removed = self
            .inner
            .phyngs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .shift_remove(name);
        match removed {
            None => Err(CaseError::BadState {
                reason: format!("no phyng named '{name}'"),
            }),
            Some(Phyng::Sensor(sensor)) => {
                self.inner.probes.remove(&sensor.probe);
                self.inner.probes.remove_unused()?;
                Ok(())
            }
            Some(_) => {
                self.stop(true)?;
                self.uninitialize();
                Ok(())
            }
        }
    }

    /// Set a heater's surface temperature by patching the latest result.
    pub fn set_heater_temperature(&self, name: &str, temperature: f64) -> Result<(), CaseError> {
        Heater::check(temperature).map_err(|e| self.phyng_err(name, e.into()))?;
        let is_heater = matches!(self.phyng(name), Some(Phyng::Heater(_)));
        if !is_heater {
            return Err(CaseError::BadState {
                reason: format!("no heater named '{name}'"),
            });
        }
        if self.is_bound(name) {
            let bg = self.config(|c| c.background.clone());
            paused(self, name, &[FieldKind::T], || {
                let latest = fs::latest_time(&self.path());
                let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
                if latest == "0" {
                    set_heater_regions(&mut state.boundaries, name, &bg, temperature, &latest)?;
                } else {
                    let solid = region_mut(&mut state.boundaries, name)?;
                    let face = format!("{name}_to_{bg}");
                    let t = solid.get_mut(&FieldKind::T).ok_or_else(|| CaseError::BadState {
                        reason: format!("heater region '{name}' has no T file"),
                    })?;
                    t.retime(&latest)?;
                    t.set_internal(temperature, true)?;
                    if let Some(variant) = t.boundary_mut(&face) {
                        variant.set("value", temperature)?;
                    }
                    t.save()?;
                }
                Ok(())
            })
            .map_err(|e| self.phyng_err(name, e))?;
        }
        self.with_phyng(name, |item| {
            if let Phyng::Heater(heater) = item {
                heater.temperature = temperature;
            }
        });
        Ok(())
    }

    /// Open or close a window or door: an open one becomes an inlet, a
    /// closed one a wall at ambient temperature.
    pub fn set_opening(&self, name: &str, open: bool) -> Result<(), CaseError> {
        let Some(Phyng::Window(opening) | Phyng::Door(opening)) = self.phyng(name) else {
            return Err(CaseError::BadState {
                reason: format!("no window or door named '{name}'"),
            });
        };
        if self.is_bound_to_fluid(name) {
            let bg = self.config(|c| c.background.clone());
            paused(self, &bg, &FieldKind::ALL, || {
                let latest = fs::latest_time(&self.path());
                {
                    let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
                    let fluid = fluid_region(&mut state.boundaries, &bg)?;
                    if open {
                        behavior::set_inlet(
                            fluid,
                            name,
                            opening.velocity(),
                            opening.temperature(),
                            &latest,
                        )?;
                    } else {
                        behavior::set_wall(fluid, name, ROOM_TEMP, &latest)?;
                    }
                    save_region(fluid)?;
                }
                self.flip_patch_type(&bg, name, if open { "patch" } else { "wall" })
            })
            .map_err(|e| self.phyng_err(name, e))?;
        }
        self.with_phyng(name, |item| {
            if let Phyng::Window(o) | Phyng::Door(o) = item {
                o.open = open;
                if !open {
                    o.temperature = ROOM_TEMP;
                }
            }
        });
        Ok(())
    }

    /// Set the inflow velocity of an open window or door.
    pub fn set_opening_velocity(&self, name: &str, velocity: [f64; 3]) -> Result<(), CaseError> {
        phyng::check_velocity("opening velocity", velocity)
            .map_err(|e| self.phyng_err(name, e.into()))?;
        let Some(Phyng::Window(opening) | Phyng::Door(opening)) = self.phyng(name) else {
            return Err(CaseError::BadState {
                reason: format!("no window or door named '{name}'"),
            });
        };
        if opening.is_open() && self.is_bound_to_fluid(name) {
            let bg = self.config(|c| c.background.clone());
            paused(self, &bg, &[FieldKind::U], || {
                let latest = fs::latest_time(&self.path());
                let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
                let fluid = fluid_region(&mut state.boundaries, &bg)?;
                behavior::retime_all(fluid, &latest)?;
                set_boundary_value(fluid, FieldKind::U, name, velocity)?;
                Ok(())
            })
            .map_err(|e| self.phyng_err(name, e))?;
        }
        self.with_phyng(name, |item| {
            if let Phyng::Window(o) | Phyng::Door(o) = item {
                o.velocity = velocity;
            }
        });
        Ok(())
    }

    /// Set the air temperature at a window or door.
    pub fn set_opening_temperature(&self, name: &str, temperature: f64) -> Result<(), CaseError> {
        phyng::check_temperature("opening temperature", temperature)
            .map_err(|e| self.phyng_err(name, e.into()))?;
        if !matches!(self.phyng(name), Some(Phyng::Window(_) | Phyng::Door(_))) {
            return Err(CaseError::BadState {
                reason: format!("no window or door named '{name}'"),
            });
        }
        if self.is_bound_to_fluid(name) {
            let bg = self.config(|c| c.background.clone());
            paused(self, &bg, &[FieldKind::T], || {
                let latest = fs::latest_time(&self.path());
                let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
                let fluid = fluid_region(&mut state.boundaries, &bg)?;
                set_retimed_value(fluid, FieldKind::T, name, temperature, &latest)?;
                Ok(())
            })
            .map_err(|e| self.phyng_err(name, e))?;
        }
        self.with_phyng(name, |item| {
            if let Phyng::Window(o) | Phyng::Door(o) = item {
                o.temperature = temperature;
            }
        });
        Ok(())
    }

    /// Enable or disable an air conditioner. Enabled, its intake becomes
    /// an outlet and its supply an inlet; disabled, both become walls.
    pub fn set_ac_enabled(&self, name: &str, enabled: bool) -> Result<(), CaseError> {
        let Some(Phyng::Ac(ac)) = self.phyng(name) else {
            return Err(CaseError::BadState {
                reason: format!("no ac named '{name}'"),
            });
        };
        if self.is_bound_to_fluid(&ac.face_in()) {
            let bg = self.config(|c| c.background.clone());
            paused(self, &bg, &FieldKind::ALL, || {
                let latest = fs::latest_time(&self.path());
                {
                    let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
                    let fluid = fluid_region(&mut state.boundaries, &bg)?;
                    if enabled {
                        behavior::set_outlet(
                            fluid,
                            &ac.face_in(),
                            ac.velocity_in(),
                            ac.temperature(),
                            &latest,
                        )?;
                        behavior::set_inlet(
                            fluid,
                            &ac.face_out(),
                            ac.velocity_out(),
                            ROOM_TEMP,
                            &latest,
                        )?;
                    } else {
                        behavior::set_wall(fluid, &ac.face_in(), ROOM_TEMP, &latest)?;
                        behavior::set_wall(fluid, &ac.face_out(), ROOM_TEMP, &latest)?;
                    }
                    save_region(fluid)?;
                }
                self.flip_patch_type(&bg, &ac.face_in(), if enabled { "patch" } else { "wall" })?;
                self.flip_patch_type(&bg, &ac.face_out(), if enabled { "patch" } else { "wall" })
            })
            .map_err(|e| self.phyng_err(name, e))?;
        }
        self.with_phyng(name, |item| {
            if let Phyng::Ac(a) = item {
                a.enabled = enabled;
                if !enabled {
                    a.speed = hearth_core::MIN_VEL;
                    a.angle = 45.0;
                    a.temperature = ROOM_TEMP;
                }
            }
        });
        Ok(())
    }

    /// Set an air conditioner's supply temperature.
    pub fn set_ac_temperature(&self, name: &str, temperature: f64) -> Result<(), CaseError> {
        phyng::check_temperature("ac temperature", temperature)
            .map_err(|e| self.phyng_err(name, e.into()))?;
        let Some(Phyng::Ac(ac)) = self.phyng(name) else {
            return Err(CaseError::BadState {
                reason: format!("no ac named '{name}'"),
            });
        };
        if ac.is_enabled() && self.is_bound_to_fluid(&ac.face_in()) {
            let bg = self.config(|c| c.background.clone());
            paused(self, &bg, &[FieldKind::T], || {
                let latest = fs::latest_time(&self.path());
                let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
                let fluid = fluid_region(&mut state.boundaries, &bg)?;
                set_retimed_value(fluid, FieldKind::T, &ac.face_in(), ROOM_TEMP, &latest)?;
                set_retimed_value(fluid, FieldKind::T, &ac.face_out(), temperature, &latest)?;
                Ok(())
            })
            .map_err(|e| self.phyng_err(name, e))?;
        }
        self.with_phyng(name, |item| {
            if let Phyng::Ac(a) = item {
                a.temperature = temperature;
            }
        });
        Ok(())
    }

    /// Set an air conditioner's supply speed in m/s.
    pub fn set_ac_speed(&self, name: &str, speed: f64) -> Result<(), CaseError> {
        phyng::check_speed("ac velocity", speed).map_err(|e| self.phyng_err(name, e.into()))?;
        self.apply_ac_flow(name, |ac| ac.speed = speed)
    }

    /// Set an air conditioner's louver angle in degrees.
    pub fn set_ac_angle(&self, name: &str, angle: f64) -> Result<(), CaseError> {
        Ac::check_angle(angle).map_err(|e| self.phyng_err(name, e.into()))?;
        self.apply_ac_flow(name, |ac| ac.angle = angle)
    }

    fn apply_ac_flow(&self, name: &str, edit: impl Fn(&mut Ac)) -> Result<(), CaseError> {
        let Some(Phyng::Ac(mut ac)) = self.phyng(name) else {
            return Err(CaseError::BadState {
                reason: format!("no ac named '{name}'"),
            });
        };
        edit(&mut ac);
        if ac.is_enabled() && self.is_bound_to_fluid(&ac.face_in()) {
            let bg = self.config(|c| c.background.clone());
            paused(self, &bg, &[FieldKind::U], || {
                let latest = fs::latest_time(&self.path());
                let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
                let fluid = fluid_region(&mut state.boundaries, &bg)?;
                behavior::retime_all(fluid, &latest)?;
                set_boundary_value(fluid, FieldKind::U, &ac.face_in(), ac.velocity_in())?;
                set_boundary_value(fluid, FieldKind::U, &ac.face_out(), ac.velocity_out())?;
                Ok(())
            })
            .map_err(|e| self.phyng_err(name, e))?;
        }
        self.with_phyng(name, |item| {
            if let Phyng::Ac(a) = item {
                edit(a);
            }
        });
        Ok(())
    }

    fn with_phyng(&self, name: &str, edit: impl FnOnce(&mut Phyng)) {
        if let Some(item) = self
            .inner
            .phyngs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(name)
        {
            edit(item);
        }
    }

    fn phyng_err(&self, name: &str, source: CaseError) -> CaseError {
        CaseError::PhyngMutation {
            phyng: name.to_string(),
            source: Box::new(source),
        }
    }

    /// Whether the named region's boundary stores were extracted.
    fn is_bound(&self, region: &str) -> bool {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .boundaries
            .contains_key(region)
    }

    /// Whether the fluid region carries the named boundary.
    fn is_bound_to_fluid(&self, boundary: &str) -> bool {
        let bg = self.config(|c| c.background.clone());
        let state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
        let Some(fluid) = state.boundaries.get(&bg).or_else(|| state.boundaries.get("")) else {
            return false;
        };
        fluid
            .values()
            .next()
            .is_some_and(|file| file.boundary(boundary).is_some())
    }

    /// Flip a patch's mesh-level type in the region's polyMesh boundary
    /// dictionary, when the mesh exists.
    fn flip_patch_type(&self, region: &str, name: &str, kind: &str) -> Result<(), CaseError> {
        let dict = format!("constant/{region}/polyMesh/boundary");
        if !self.path().join(&dict).exists() {
            return Ok(());
        }
        self.run_foam_dictionary(&dict, &format!("entry0.{name}.type"), kind)
    }
}

// ── Trait plumbing ───────────────────────────────────────────────────

impl RunControl for Case {
    fn is_running(&self) -> bool {
        self.solver_running()
    }

    fn halt(&self) -> Result<(), CaseError> {
        self.halt_solving(true)
    }

    fn resume(&self) -> Result<(), CaseError> {
        self.run()
    }

    fn needs_reconstruct(&self) -> bool {
        self.config(|c| c.parallel) && self.is_decomposed()
    }

    fn reconstruct_fields(&self, region: &str, fields: &[FieldKind]) -> Result<(), CaseError> {
        let names: Vec<&str> = fields.iter().map(FieldKind::name).collect();
        self.run_reconstruct(false, Some(region), true, Some(&names))
    }
}

impl CaseClock for Case {
    fn start(&self) {
        if let Err(e) = self.run() {
            warn!(error = %e, "pacing monitor failed to resume the case");
        }
    }

    fn stop(&self) {
        if let Err(e) = self.halt_solving(true) {
            warn!(error = %e, "pacing monitor failed to pause the case");
        }
    }

    fn time_difference(&self) -> f64 {
        Case::time_difference(self)
    }

    fn solved(&self) -> bool {
        Case::solved(self)
    }
}

// ── Free helpers ─────────────────────────────────────────────────────

fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64() * 1000.0)
}

fn round_ms(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

/// Open every managed field file present in `dir`.
fn open_region(
    case_dir: &Path,
    dir: &Path,
    region: Option<&str>,
) -> Result<RegionBoundaries, CaseError> {
    let mut fields = RegionBoundaries::new();
    for entry in std::fs::read_dir(dir)?.flatten() {
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(field) = FieldKind::from_name(&name) else {
            continue;
        };
        fields.insert(field, BoundaryFile::open(case_dir, field, region)?);
    }
    Ok(fields)
}

fn region_mut<'a>(
    boundaries: &'a mut IndexMap<String, RegionBoundaries>,
    region: &str,
) -> Result<&'a mut RegionBoundaries, CaseError> {
    boundaries.get_mut(region).ok_or_else(|| CaseError::BadState {
        reason: format!("no boundary state for region '{region}'"),
    })
}

/// The fluid region's stores: the background region in a multi-region
/// layout, the unnamed entry otherwise.
fn fluid_region<'a>(
    boundaries: &'a mut IndexMap<String, RegionBoundaries>,
    bg: &str,
) -> Result<&'a mut RegionBoundaries, CaseError> {
    if boundaries.contains_key(bg) {
        return region_mut(boundaries, bg);
    }
    region_mut(boundaries, "")
}

/// Apply the heater recipe across the solid and fluid regions, which
/// both live in the same map.
fn set_heater_regions(
    boundaries: &mut IndexMap<String, RegionBoundaries>,
    name: &str,
    bg: &str,
    temperature: f64,
    time: &str,
) -> Result<(), CaseError> {
    if name == bg {
        return Err(CaseError::BadState {
            reason: format!("heater '{name}' cannot share the background region's name"),
        });
    }
    let Some(mut solid) = boundaries.shift_remove(name) else {
        return Err(CaseError::BadState {
            reason: format!("no boundary state for region '{name}'"),
        });
    };
    let result = match boundaries.get_mut(bg) {
        Some(fluid) => behavior::set_heater(&mut solid, fluid, name, bg, temperature, time)
            .and_then(|()| save_region(fluid)),
        None => Err(CaseError::BadState {
            reason: format!("no boundary state for region '{bg}'"),
        }),
    };
    let result = result.and_then(|()| save_region(&mut solid));
    boundaries.insert(name.to_string(), solid);
    result
}

fn save_region(fields: &mut RegionBoundaries) -> Result<(), CaseError> {
    for file in fields.values_mut() {
        file.save()?;
    }
    Ok(())
}

fn set_boundary_value(
    fields: &mut RegionBoundaries,
    field: FieldKind,
    name: &str,
    value: impl Into<Value>,
) -> Result<(), CaseError> {
    let file = fields.get_mut(&field).ok_or_else(|| CaseError::BadState {
        reason: format!("region has no boundary file for field {}", field.name()),
    })?;
    let variant = file.boundary_mut(name).ok_or_else(|| CaseError::BadState {
        reason: format!("no boundary named '{name}' in field {}", field.name()),
    })?;
    variant.set("value", value)?;
    file.save()
}

fn set_retimed_value(
    fields: &mut RegionBoundaries,
    field: FieldKind,
    name: &str,
    value: impl Into<Value>,
    time: &str,
) -> Result<(), CaseError> {
    let file = fields.get_mut(&field).ok_or_else(|| CaseError::BadState {
        reason: format!("region has no boundary file for field {}", field.name()),
    })?;
    file.retime(time)?;
    let variant = file.boundary_mut(name).ok_or_else(|| CaseError::BadState {
        reason: format!("no boundary named '{name}' in field {}", field.name()),
    })?;
    variant.set("value", value)?;
    file.save()
}
