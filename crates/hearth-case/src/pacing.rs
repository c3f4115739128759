//! Realtime pacing: keep the simulated clock tracking the wall clock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

/// Poll period of the monitor thread.
pub const POLL_PERIOD: Duration = Duration::from_millis(10);

/// When the difference drops by at least this much between polls the
/// solver is racing ahead; the monitor backs off for the same span.
const DELAY_WAIT: Duration = Duration::from_secs(1);

const DELAY_WAIT_SECS: f64 = 1.0;

/// The case operations the monitor drives.
///
/// `time_difference` is simulated minus wall time in seconds: positive
/// when the simulation is ahead of the wall clock.
pub trait CaseClock: Send + 'static {
    /// Resume solving.
    fn start(&self);
    /// Pause solving.
    fn stop(&self);
    /// Simulated minus wall time, in seconds.
    fn time_difference(&self) -> f64;
    /// Whether the run has reached its end time.
    fn solved(&self) -> bool;
}

/// What the monitor does with one time-difference reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacingDecision {
    /// The simulation is far enough ahead to pause.
    Stop,
    /// The simulation fell behind the wall clock.
    Start,
    /// Within tolerance, leave the case alone.
    Hold,
}

/// The pacing rule: pause once `tolerance` seconds ahead, resume once
/// level with (or behind) the wall clock, otherwise hold.
pub fn decide(time_difference: f64, tolerance: f64) -> PacingDecision {
    if time_difference >= tolerance {
        PacingDecision::Stop
    } else if time_difference <= 0.0 {
        PacingDecision::Start
    } else {
        PacingDecision::Hold
    }
}

/// Background thread that starts and stops a case to hold its simulated
/// clock near realtime.
///
/// The monitor only ever resumes a case it (or the user) already set up;
/// it never initializes one. Disabling it stops the thread.
#[derive(Debug)]
pub struct PacingMonitor {
    enabled: Arc<AtomicBool>,
    tolerance: f64,
    running: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PacingMonitor {
    /// A monitor with the given tolerance in seconds.
    pub fn new(enabled: bool, tolerance: f64) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
            tolerance,
            running: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
        }
    }

    /// Whether realtime pacing is switched on.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Switch pacing on or off. Switching off stops a live monitor.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        if !enabled {
            self.stop();
        }
    }

    /// Whether the monitor thread is live.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start the monitor over `clock`. A disabled or already running
    /// monitor makes this a no-op.
    pub fn start<C: CaseClock>(&self, clock: C) {
        if !self.is_enabled() || self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let enabled = Arc::clone(&self.enabled);
        let running = Arc::clone(&self.running);
        let tolerance = self.tolerance;
        let handle = thread::Builder::new()
            .name("pacing-monitor".into())
            .spawn(move || {
                debug!(tolerance, "pacing monitor started");
                let mut previous = 0.0f64;
                while running.load(Ordering::SeqCst)
                    && enabled.load(Ordering::SeqCst)
                    && !clock.solved()
                {
                    let difference = clock.time_difference();
                    if previous - difference >= DELAY_WAIT_SECS {
                        thread::sleep(DELAY_WAIT);
                    }
                    previous = difference;
                    match decide(difference, tolerance) {
                        PacingDecision::Stop => {
                            debug!(difference, "pacing monitor pauses the case");
                            clock.stop();
                        }
                        PacingDecision::Start => {
                            debug!(difference, "pacing monitor resumes the case");
                            clock.start();
                        }
                        PacingDecision::Hold => {}
                    }
                    thread::sleep(POLL_PERIOD);
                }
                running.store(false, Ordering::SeqCst);
                debug!("pacing monitor stopped");
            });
        match handle {
            Ok(handle) => {
                *self.handle.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
            }
            Err(_) => self.running.store(false, Ordering::SeqCst),
        }
    }

    /// Stop and join the monitor thread.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        let handle = self.handle.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

impl Drop for PacingMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn ahead_of_tolerance_stops() {
        assert_eq!(decide(12.0, 5.0), PacingDecision::Stop);
    }

    #[test]
    fn behind_the_wall_clock_starts() {
        assert_eq!(decide(-1.0, 5.0), PacingDecision::Start);
        assert_eq!(decide(0.0, 5.0), PacingDecision::Start);
    }

    #[test]
    fn within_tolerance_holds() {
        assert_eq!(decide(2.0, 5.0), PacingDecision::Hold);
    }

    #[derive(Clone, Default)]
    struct FakeClock {
        starts: Arc<AtomicUsize>,
        stops: Arc<AtomicUsize>,
        difference: Arc<Mutex<f64>>,
        solved: Arc<AtomicBool>,
    }

    impl CaseClock for FakeClock {
        fn start(&self) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
        fn time_difference(&self) -> f64 {
            *self.difference.lock().unwrap()
        }
        fn solved(&self) -> bool {
            self.solved.load(Ordering::SeqCst)
        }
    }

    fn settle() {
        thread::sleep(Duration::from_millis(60));
    }

    #[test]
    fn monitor_pauses_a_racing_case() {
        let clock = FakeClock::default();
        *clock.difference.lock().unwrap() = 12.0;
        let monitor = PacingMonitor::new(true, 5.0);
        monitor.start(clock.clone());
        settle();
        monitor.stop();
        assert!(clock.stops.load(Ordering::SeqCst) > 0);
        assert_eq!(clock.starts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn monitor_resumes_a_lagging_case() {
        let clock = FakeClock::default();
        *clock.difference.lock().unwrap() = -1.0;
        let monitor = PacingMonitor::new(true, 5.0);
        monitor.start(clock.clone());
        settle();
        monitor.stop();
        assert!(clock.starts.load(Ordering::SeqCst) > 0);
        assert_eq!(clock.stops.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn monitor_holds_within_tolerance() {
        let clock = FakeClock::default();
        *clock.difference.lock().unwrap() = 2.0;
        let monitor = PacingMonitor::new(true, 5.0);
        monitor.start(clock.clone());
        settle();
        monitor.stop();
        assert_eq!(clock.starts.load(Ordering::SeqCst), 0);
        assert_eq!(clock.stops.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn disabled_monitor_never_runs() {
        let clock = FakeClock::default();
        let monitor = PacingMonitor::new(false, 5.0);
        monitor.start(clock.clone());
        assert!(!monitor.is_running());
    }

    #[test]
    fn disabling_stops_a_live_monitor() {
        let clock = FakeClock::default();
        *clock.difference.lock().unwrap() = 2.0;
        let monitor = PacingMonitor::new(true, 5.0);
        monitor.start(clock.clone());
        assert!(monitor.is_running());
        monitor.set_enabled(false);
        assert!(!monitor.is_running());
    }

    #[test]
    fn solved_case_winds_the_monitor_down() {
        let clock = FakeClock::default();
        clock.solved.store(true, Ordering::SeqCst);
        let monitor = PacingMonitor::new(true, 5.0);
        monitor.start(clock.clone());
        settle();
        assert!(!monitor.is_running());
        assert_eq!(clock.starts.load(Ordering::SeqCst), 0);
    }
}
