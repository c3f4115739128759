//! Long-running solver supervision.

use std::fs::File;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use hearth_core::{FailureKind, RunError};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tracing::{debug, info, warn};

use crate::command::{classify, failure_detail, CaseCommand};

/// How long a graceful stop waits before escalating to SIGKILL.
pub const STOP_BOUND: Duration = Duration::from_secs(1);

/// How long the supervisor is given to reap a SIGKILLed solver.
const KILL_BOUND: Duration = Duration::from_secs(10);

/// A spawned solver process and its supervisor thread.
///
/// The solver runs in its own process group so that an interrupt reaches
/// the MPI children too. The supervisor waits for the process, classifies
/// the outcome from the solver's log, and reports it once on a bounded
/// completion channel; [`SolverHandle::wait`] and [`SolverHandle::stop`]
/// both consume that single report.
#[derive(Debug)]
pub struct SolverHandle {
    command: String,
    pgid: Pid,
    done: Arc<AtomicBool>,
    completion: Receiver<Result<(), RunError>>,
    reported: bool,
}

impl SolverHandle {
    /// Spawn the solver command with its output teed to
    /// `<case>/<program>.log`.
    pub fn spawn(command: &CaseCommand, case: &Path) -> Result<Self, RunError> {
        let log_path = case.join(format!("{}.log", command.program()));
        let log = File::create(&log_path)?;
        let log_err = log.try_clone()?;

        let mut process = command.build();
        process.stdout(log).stderr(log_err).process_group(0);
        let mut child = process.spawn().map_err(|source| RunError::Spawn {
            command: command.program().to_string(),
            source,
        })?;
        let pgid = Pid::from_raw(child.id() as i32);
        info!(command = command.program(), pid = child.id(), "solver started");

        let (tx, rx) = bounded(1);
        let done = Arc::new(AtomicBool::new(false));
        let done_flag = Arc::clone(&done);
        let name = command.program().to_string();
        thread::Builder::new()
            .name("solver-supervisor".into())
            .spawn(move || {
                let result = match child.wait() {
                    Ok(status) => {
                        let log_text = std::fs::read_to_string(&log_path).unwrap_or_default();
                        let tail = tail_of(&log_text);
                        if let Some(kind) = classify(tail, "") {
                            Err(RunError::Failed {
                                command: name.clone(),
                                kind,
                                detail: failure_detail(tail, ""),
                            })
                        } else if status.success() || interrupted(&status) {
                            Ok(())
                        } else {
                            Err(RunError::Failed {
                                command: name.clone(),
                                kind: FailureKind::Unknown,
                                detail: failure_detail(tail, ""),
                            })
                        }
                    }
                    Err(e) => Err(RunError::Io(e)),
                };
                debug!(command = %name, ok = result.is_ok(), "solver exited");
                done_flag.store(true, Ordering::SeqCst);
                let _ = tx.send(result);
            })
            .map_err(RunError::Io)?;

        Ok(Self {
            command: command.program().to_string(),
            pgid,
            done,
            completion: rx,
            reported: false,
        })
    }

    /// Whether the solver process is still alive.
    pub fn is_running(&self) -> bool {
        !self.done.load(Ordering::SeqCst)
    }

    /// Block until the solver exits and surface its classified outcome.
    ///
    /// The outcome is reported once; after it has been consumed further
    /// calls return `Ok(())`.
    pub fn wait(&mut self) -> Result<(), RunError> {
        if self.reported {
            return Ok(());
        }
        self.reported = true;
        self.completion.recv().unwrap_or(Ok(()))
    }

    /// Two-phase stop: interrupt the process group, wait up to `bound`
    /// for a clean exit, then kill the group.
    ///
    /// A kill escalation reports [`RunError::ForceKillRequired`].
    pub fn stop(&mut self, bound: Duration) -> Result<(), RunError> {
        if self.reported {
            return Ok(());
        }
        info!(command = %self.command, "interrupting solver");
        let _ = killpg(self.pgid, Signal::SIGINT);
        match self.completion.recv_timeout(bound) {
            Ok(result) => {
                self.reported = true;
                result
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(command = %self.command, "solver ignored the interrupt, killing it");
                let _ = killpg(self.pgid, Signal::SIGKILL);
                let _ = self.completion.recv_timeout(KILL_BOUND);
                self.reported = true;
                Err(RunError::ForceKillRequired {
                    command: self.command.clone(),
                })
            }
            Err(RecvTimeoutError::Disconnected) => {
                self.reported = true;
                Ok(())
            }
        }
    }
}

fn interrupted(status: &std::process::ExitStatus) -> bool {
    status.signal() == Some(Signal::SIGINT as i32)
}

/// The last few kilobytes of the log, where the fatal banner lands.
fn tail_of(text: &str) -> &str {
    const TAIL: usize = 16 * 1024;
    if text.len() <= TAIL {
        return text;
    }
    let mut at = text.len() - TAIL;
    while !text.is_char_boundary(at) {
        at += 1;
    }
    &text[at..]
}
