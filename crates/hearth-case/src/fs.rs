//! Filesystem helpers over the case directory's numbered result layout.
//!
//! Solver results land in directories named after the simulated time
//! (`0`, `10`, `250.5`, ...), one per write interval, optionally nested
//! under `processor<n>` in decomposed runs. Everything here works on
//! those names.

use std::fs;
use std::io;
use std::path::Path;

/// Render a simulated time the way the solver names its directories:
/// integral values without a decimal point.
pub fn time_name(time: f64) -> String {
    if time.fract() == 0.0 {
        format!("{}", time as i64)
    } else {
        format!("{time}")
    }
}

/// Names of the numbered directories directly under `dir`, unsorted.
pub fn numbered_dirs(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            name.parse::<f64>().is_ok().then_some(name)
        })
        .collect()
}

/// The latest result time of a serial run: the numbered directory with the
/// highest value, excluding `0`. Falls back to `"0"` when there are no
/// results yet.
pub fn latest_time(case_dir: &Path) -> String {
    latest_in(case_dir)
}

/// The latest result time of a decomposed run, read from `processor0`.
pub fn latest_time_parallel(case_dir: &Path) -> String {
    latest_in(&case_dir.join("processor0"))
}

fn latest_in(dir: &Path) -> String {
    numbered_dirs(dir)
        .into_iter()
        .filter(|name| name != "0")
        .max_by(|a, b| {
            let (a, b) = (parse_time(a), parse_time(b));
            a.total_cmp(&b)
        })
        .unwrap_or_else(|| "0".to_string())
}

fn parse_time(name: &str) -> f64 {
    name.parse().unwrap_or(0.0)
}

/// The set of result times to keep when cleaning around `latest`.
///
/// The window spans `latest ± limit/2`, snapped down to a multiple of the
/// write interval and inclusive at both edges; `0` is always retained so
/// the case can restart from its initial state.
pub fn retention_window(latest: f64, clean_limit: f64, write_interval: f64) -> Vec<String> {
    let mut keep = vec!["0".to_string()];
    if write_interval <= 0.0 {
        return keep;
    }
    let margin = (clean_limit / 2.0 / write_interval).floor() * write_interval;
    let mut t = latest - margin;
    while t <= latest + margin {
        let name = time_name(t);
        if t > 0.0 && !keep.contains(&name) {
            keep.push(name);
        }
        t += write_interval;
    }
    keep
}

/// Delete every numbered directory under `dir` whose name is not in
/// `keep`.
pub fn remove_numbered_dirs_except(dir: &Path, keep: &[String]) -> io::Result<()> {
    for name in numbered_dirs(dir) {
        if !keep.iter().any(|k| *k == name) {
            fs::remove_dir_all(dir.join(name))?;
        }
    }
    Ok(())
}

/// Delete every `<prefix><n>` directory under `dir` (e.g. `processor0`,
/// `processor1`, ...).
pub fn remove_indexed_dirs(dir: &Path, prefix: &str) -> io::Result<()> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Ok(());
    };
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(rest) = name.strip_prefix(prefix) else {
            continue;
        };
        if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) && entry.path().is_dir() {
            fs::remove_dir_all(entry.path())?;
        }
    }
    Ok(())
}

/// Delete the directory and everything under it, ignoring a missing path.
pub fn remove_dir_forced(dir: &Path) {
    let _ = fs::remove_dir_all(dir);
}

/// Delete files directly under `dir` whose name starts with `prefix` or
/// ends with `suffix` (either may be empty).
pub fn remove_files_matching(dir: &Path, prefix: &str, suffix: &str) -> io::Result<()> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Ok(());
    };
    for entry in entries.flatten() {
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let hit = (!prefix.is_empty() && name.starts_with(prefix))
            || (!suffix.is_empty() && name.ends_with(suffix));
        if hit {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}
