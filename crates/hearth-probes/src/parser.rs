//! Background tailing of the solver's probe output files.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use hearth_core::{CaseError, Value};
use tracing::warn;

use crate::registry::ProbeRegistry;

/// Default sampling period of the parser thread.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(10);

/// Tails `<case>/postProcessing/probes/<region>/<time>/<field>` files and
/// pushes the last line's columns into the registered probes.
///
/// Columns are positional: the n-th registered probe reads the n-th value
/// column of its field's file.
#[derive(Debug)]
pub struct ProbeParser {
    registry: Arc<ProbeRegistry>,
    period: Duration,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ProbeParser {
    /// A parser over the given registry with the default period.
    pub fn new(registry: Arc<ProbeRegistry>) -> Self {
        Self::with_period(registry, DEFAULT_PERIOD)
    }

    /// A parser polling at a custom period.
    pub fn with_period(registry: Arc<ProbeRegistry>, period: Duration) -> Self {
        Self {
            registry,
            period,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Whether the parsing thread is live.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Prune the dictionary and start the parsing thread.
    ///
    /// A registry without probes makes this a no-op.
    pub fn start(&mut self) -> Result<(), CaseError> {
        if self.is_running() || self.registry.is_empty() {
            return Ok(());
        }
        self.registry.remove_unused()?;
        self.running.store(true, Ordering::SeqCst);

        let registry = Arc::clone(&self.registry);
        let running = Arc::clone(&self.running);
        let period = self.period;
        let handle = thread::Builder::new()
            .name("probe-parser".into())
            .spawn(move || {
                while running.load(Ordering::SeqCst) {
                    for region in registry.regions() {
                        parse_region(&registry, &region);
                    }
                    thread::sleep(period);
                }
            })
            .map_err(io::Error::from)?;
        self.handle = Some(handle);
        Ok(())
    }

    /// Stop and join the parsing thread.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// One synchronous parse of a single probe's region, used to pick up
    /// existing results before a run starts.
    pub fn parse_probe(&self, probe: &Arc<crate::probe::Probe>) {
        let region_dir = self
            .registry
            .case_dir()
            .join("postProcessing/probes")
            .join(probe.region());
        if region_dir.exists() {
            parse_region(&self.registry, probe.region());
        }
    }
}

impl Drop for ProbeParser {
    fn drop(&mut self) {
        self.stop();
    }
}

fn parse_region(registry: &ProbeRegistry, region: &str) {
    let data_dir = registry
        .case_dir()
        .join("postProcessing/probes")
        .join(region);
    let latest = latest_numeric_dir(&data_dir).unwrap_or_else(|| "0".to_string());
    let probes = registry.snapshot();
    for field in registry.fields() {
        let path = data_dir.join(&latest).join(field.name());
        if !path.exists() {
            continue;
        }
        let line = match last_line(&path) {
            Ok(Some(line)) => line,
            Ok(None) => continue,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to tail probe output");
                continue;
            }
        };
        let Some((time, columns)) = parse_sample_line(&line) else {
            continue;
        };
        for (idx, probe) in probes.iter().enumerate() {
            if probe.region() != region || probe.field() != field {
                continue;
            }
            if let Some(value) = columns.get(idx) {
                probe.set_sample(value.clone(), time);
            }
        }
    }
}

/// The numbered subdirectory with the highest numeric value.
fn latest_numeric_dir(dir: &Path) -> Option<String> {
    let entries = fs::read_dir(dir).ok()?;
    let mut best: Option<(f64, String)> = None;
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Ok(value) = name.parse::<f64>() {
            if best.as_ref().is_none_or(|(b, _)| value > *b) {
                best = Some((value, name));
            }
        }
    }
    best.map(|(_, name)| name)
}

/// Read the final line of a file by seeking back from the end.
fn last_line(path: &Path) -> io::Result<Option<String>> {
    let mut file = File::open(path)?;
    let len = file.seek(SeekFrom::End(0))?;
    if len == 0 {
        return Ok(None);
    }
    // Walk back to the newline preceding the last line, skipping a
    // trailing newline if the file ends with one.
    let mut pos = len.saturating_sub(2);
    let mut byte = [0u8; 1];
    loop {
        file.seek(SeekFrom::Start(pos))?;
        file.read_exact(&mut byte)?;
        if byte[0] == b'\n' {
            pos += 1;
            break;
        }
        if pos == 0 {
            break;
        }
        pos -= 1;
    }
    file.seek(SeekFrom::Start(pos))?;
    let mut line = String::new();
    file.read_to_string(&mut line)?;
    Ok(Some(line.trim_end().to_string()))
}

/// Split a probe output line into the time column and the value columns.
///
/// Scalar files carry `time v0 v1 ...`; vector files carry
/// `time (x y z) (x y z) ...`.
fn parse_sample_line(line: &str) -> Option<(f64, Vec<Value>)> {
    let line = line.trim();
    if line.starts_with('#') || line.is_empty() {
        return None;
    }
    let mut rest = line;
    let (time_tok, tail) = rest.split_once(char::is_whitespace)?;
    let time: f64 = time_tok.parse().ok()?;
    rest = tail.trim_start();

    let mut columns = Vec::new();
    while !rest.is_empty() {
        if let Some(stripped) = rest.strip_prefix('(') {
            let end = stripped.find(')')?;
            let mut vec = [0.0f64; 3];
            let mut parts = stripped[..end].split_whitespace();
            for slot in &mut vec {
                *slot = parts.next()?.parse().ok()?;
            }
            columns.push(Value::Vector(vec));
            rest = stripped[end + 1..].trim_start();
        } else {
            let (tok, tail) = match rest.split_once(char::is_whitespace) {
                Some((tok, tail)) => (tok, tail.trim_start()),
                None => (rest, ""),
            };
            columns.push(Value::Scalar(tok.parse().ok()?));
            rest = tail;
        }
    }
    Some((time, columns))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_line_parses_positionally() {
        let (time, cols) = parse_sample_line("0.5   293.15   291.2").unwrap();
        assert_eq!(time, 0.5);
        assert_eq!(cols, [Value::Scalar(293.15), Value::Scalar(291.2)]);
    }

    #[test]
    fn vector_line_parses_positionally() {
        let (time, cols) = parse_sample_line("1.25 (0 1.5 0)  (-0.1 0 0)").unwrap();
        assert_eq!(time, 1.25);
        assert_eq!(
            cols,
            [
                Value::Vector([0.0, 1.5, 0.0]),
                Value::Vector([-0.1, 0.0, 0.0])
            ]
        );
    }

    #[test]
    fn comment_lines_are_skipped() {
        assert!(parse_sample_line("# Probe 0 (1 2 1)").is_none());
    }

    #[test]
    fn last_line_seeks_from_the_end() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("T");
        fs::write(&path, "# header\n0.1 290\n0.2 291\n0.3 292.5\n").unwrap();
        assert_eq!(last_line(&path).unwrap().unwrap(), "0.3 292.5");
    }

    #[test]
    fn single_line_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("T");
        fs::write(&path, "0.1 290\n").unwrap();
        assert_eq!(last_line(&path).unwrap().unwrap(), "0.1 290");
    }
}
