//! Background pruning of old results during long runs.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::fs;

const POLL_PERIOD: Duration = Duration::from_millis(10);

/// Pause between spotting a fresh result and deleting around it, so the
/// solver finishes writing the directory first.
const SETTLE: Duration = Duration::from_millis(50);

/// What the cleaner needs to know about the run it prunes.
#[derive(Clone, Debug)]
pub(crate) struct CleanerConfig {
    pub case_dir: PathBuf,
    pub parallel: bool,
    pub cores: usize,
    pub clean_limit: f64,
    pub write_interval: f64,
}

/// Spawn the cleaner thread, or nothing when cleaning is disabled.
///
/// The thread polls the latest result time and, whenever it crosses a
/// fresh multiple of the clean limit, deletes every numbered directory
/// outside the retention window. It exits when `running` clears.
pub(crate) fn spawn(
    config: CleanerConfig,
    running: Arc<AtomicBool>,
) -> Option<JoinHandle<()>> {
    if config.clean_limit <= 0.0 {
        return None;
    }
    let handle = thread::Builder::new()
        .name("result-cleaner".into())
        .spawn(move || {
            debug!(case = %config.case_dir.display(), "result cleaner started");
            let mut deletion_time = 0.0f64;
            while running.load(Ordering::SeqCst) {
                let latest = latest_of(&config);
                if latest != deletion_time && latest % config.clean_limit == 0.0 {
                    thread::sleep(SETTLE);
                    sweep(&config, latest);
                    deletion_time = latest;
                }
                thread::sleep(POLL_PERIOD);
            }
            debug!("result cleaner stopped");
        })
        .ok()?;
    Some(handle)
}

fn latest_of(config: &CleanerConfig) -> f64 {
    let name = if config.parallel {
        fs::latest_time_parallel(&config.case_dir)
    } else {
        fs::latest_time(&config.case_dir)
    };
    name.parse().unwrap_or(0.0)
}

/// One deletion pass around `latest`.
pub(crate) fn sweep(config: &CleanerConfig, latest: f64) {
    let keep = fs::retention_window(latest, config.clean_limit, config.write_interval);
    debug!(latest, kept = keep.len(), "pruning results");
    if config.parallel {
        for core in 0..config.cores {
            let dir = config.case_dir.join(format!("processor{core}"));
            prune(&dir, &keep);
        }
    } else {
        prune(&config.case_dir, &keep);
    }
}

fn prune(dir: &Path, keep: &[String]) {
    if let Err(e) = fs::remove_numbered_dirs_except(dir, keep) {
        warn!(dir = %dir.display(), error = %e, "result pruning failed");
    }
}
