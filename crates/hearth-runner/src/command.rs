//! Deterministic argv builders for the solver family's utilities.

use std::path::Path;
use std::process::Command;

use hearth_core::{FailureKind, RunError};
use tracing::{debug, info};

/// Which zone split `splitMeshRegions` performs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ZoneSplit {
    /// Split by connected region only.
    #[default]
    None,
    /// Split cell zones off into separate regions.
    CellZones,
    /// Split only the cell zones, leaving the rest as one region.
    CellZonesOnly,
}

/// One fully built utility invocation.
///
/// The case path is always explicit in the argv, so commands do not
/// depend on the working directory they are spawned from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseCommand {
    program: String,
    args: Vec<String>,
    /// Treat any stderr output as a failure (`foamDictionary` reports
    /// errors without a non-zero exit).
    strict_stderr: bool,
}

impl CaseCommand {
    fn new(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
            strict_stderr: false,
        }
    }

    /// An arbitrary invocation, for tools without a dedicated builder.
    pub fn custom(program: &str, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new(program, args.into_iter().map(Into::into).collect())
    }

    /// `blockMesh -case <case>`.
    pub fn block_mesh(case: &Path) -> Self {
        Self::new("blockMesh", vec!["-case".into(), path_arg(case)])
    }

    /// `snappyHexMesh -case <case> -overwrite`.
    pub fn snappy_hex_mesh(case: &Path) -> Self {
        Self::new(
            "snappyHexMesh",
            vec!["-case".into(), path_arg(case), "-overwrite".into()],
        )
    }

    /// `splitMeshRegions [-cellZones|-cellZonesOnly] -case <case> -overwrite`.
    pub fn split_mesh_regions(case: &Path, zones: ZoneSplit) -> Self {
        let mut args = Vec::new();
        match zones {
            ZoneSplit::None => {}
            ZoneSplit::CellZones => args.push("-cellZones".into()),
            ZoneSplit::CellZonesOnly => args.push("-cellZonesOnly".into()),
        }
        args.extend(["-case".into(), path_arg(case), "-overwrite".into()]);
        Self::new("splitMeshRegions", args)
    }

    /// `decomposePar` with the given flags.
    pub fn decompose(
        case: &Path,
        all_regions: bool,
        copy_zero: bool,
        latest_time: bool,
        force: bool,
    ) -> Self {
        let mut args = Vec::new();
        if all_regions {
            args.push("-allRegions".into());
        }
        if copy_zero {
            args.push("-copyZero".into());
        }
        if latest_time {
            args.push("-latestTime".into());
        }
        if force {
            args.push("-force".into());
        }
        args.extend(["-case".into(), path_arg(case)]);
        Self::new("decomposePar", args)
    }

    /// `reconstructPar -newTimes` with the given flags. `all_regions` and
    /// `region` are mutually exclusive; `region` wins when both are set.
    pub fn reconstruct(
        case: &Path,
        all_regions: bool,
        region: Option<&str>,
        latest_time: bool,
        fields: Option<&[&str]>,
    ) -> Self {
        let mut args = Vec::new();
        match region {
            Some(region) => args.extend(["-region".into(), region.to_string()]),
            None if all_regions => args.push("-allRegions".into()),
            None => {}
        }
        if latest_time {
            args.push("-latestTime".into());
        }
        if let Some(fields) = fields {
            args.extend(["-fields".into(), format!("({})", fields.join(" "))]);
        }
        args.extend(["-newTimes".into(), "-case".into(), path_arg(case)]);
        Self::new("reconstructPar", args)
    }

    /// `foamSetupCHT -case <case>`.
    pub fn setup_cht(case: &Path) -> Self {
        Self::new("foamSetupCHT", vec!["-case".into(), path_arg(case)])
    }

    /// `foamDictionary <case>/<dict> -entry <entry> -set <value>`.
    pub fn foam_dictionary(case: &Path, dict: &str, entry: &str, value: &str) -> Self {
        let mut cmd = Self::new(
            "foamDictionary",
            vec![
                path_arg(&case.join(dict)),
                "-entry".into(),
                entry.to_string(),
                "-set".into(),
                value.to_string(),
            ],
        );
        cmd.strict_stderr = true;
        cmd
    }

    /// `foamDictionary <case>/<dict> -entry <entry> -value`, reading one
    /// entry. The value comes back on stdout.
    pub fn foam_dictionary_read(case: &Path, dict: &str, entry: &str) -> Self {
        let mut cmd = Self::new(
            "foamDictionary",
            vec![
                path_arg(&case.join(dict)),
                "-entry".into(),
                entry.to_string(),
                "-value".into(),
            ],
        );
        cmd.strict_stderr = true;
        cmd
    }

    /// `<solver> -case <case>`.
    pub fn solver(solver: &str, case: &Path) -> Self {
        Self::new(solver, vec!["-case".into(), path_arg(case)])
    }

    /// Wrap the invocation in `mpirun -np <cores> ... -parallel`.
    pub fn parallel(self, cores: usize) -> Self {
        let mut args = vec!["-np".to_string(), cores.to_string(), self.program];
        args.extend(self.args);
        args.push("-parallel".into());
        Self {
            program: "mpirun".to_string(),
            args,
            strict_stderr: self.strict_stderr,
        }
    }

    /// The program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The arguments, without the program.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Build the `std::process` command.
    pub(crate) fn build(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    /// Run to completion, capturing output, and classify any failure.
    pub fn run(&self) -> Result<String, RunError> {
        info!(command = %self.program, "running");
        debug!(args = ?self.args);
        let output = self.build().output().map_err(|source| RunError::Spawn {
            command: self.program.clone(),
            source,
        })?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if let Some(kind) = classify(&stdout, &stderr) {
            return Err(RunError::Failed {
                command: self.program.clone(),
                kind,
                detail: failure_detail(&stdout, &stderr),
            });
        }
        if !output.status.success() {
            return Err(RunError::Failed {
                command: self.program.clone(),
                kind: FailureKind::Unknown,
                detail: failure_detail(&stdout, &stderr),
            });
        }
        if self.strict_stderr && (!stderr.trim().is_empty() || stdout.contains("ERROR")) {
            return Err(RunError::Failed {
                command: self.program.clone(),
                kind: FailureKind::Unknown,
                detail: failure_detail(&stdout, &stderr),
            });
        }
        Ok(stdout)
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Classify a fatal condition from the tool's own output markers.
pub(crate) fn classify(stdout: &str, stderr: &str) -> Option<FailureKind> {
    let all = [stdout, stderr];
    if all.iter().any(|s| s.contains("sigFpe")) {
        return Some(FailureKind::FatalFpe);
    }
    if all
        .iter()
        .any(|s| s.contains("sigSegv") || s.contains("printStack") || s.contains("Stack dump"))
    {
        return Some(FailureKind::FatalStackdump);
    }
    if all.iter().any(|s| s.contains("FOAM FATAL")) {
        return Some(FailureKind::FatalError);
    }
    None
}

/// A short diagnostic excerpt for the error value.
pub(crate) fn failure_detail(stdout: &str, stderr: &str) -> String {
    let text = if let Some(at) = stdout.find("FOAM FATAL") {
        &stdout[at..]
    } else if !stderr.trim().is_empty() {
        stderr
    } else {
        stdout
    };
    let mut detail: String = text.trim().chars().take(400).collect();
    if detail.len() < text.trim().len() {
        detail.push_str("...");
    }
    detail
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconstruct_argv_shape() {
        let cmd = CaseCommand::reconstruct(
            Path::new("/case"),
            false,
            Some("fluid"),
            true,
            Some(&["T", "U"]),
        );
        assert_eq!(cmd.program(), "reconstructPar");
        assert_eq!(
            cmd.args(),
            [
                "-region", "fluid", "-latestTime", "-fields", "(T U)", "-newTimes", "-case",
                "/case"
            ]
        );
    }

    #[test]
    fn parallel_wraps_in_mpirun() {
        let cmd = CaseCommand::solver("chtMultiRegionFoam", Path::new("/case")).parallel(4);
        assert_eq!(cmd.program(), "mpirun");
        assert_eq!(
            cmd.args(),
            ["-np", "4", "chtMultiRegionFoam", "-case", "/case", "-parallel"]
        );
    }

    #[test]
    fn decompose_flags_in_order() {
        let cmd = CaseCommand::decompose(Path::new("/case"), true, false, true, true);
        assert_eq!(
            cmd.args(),
            ["-allRegions", "-latestTime", "-force", "-case", "/case"]
        );
    }

    #[test]
    fn dictionary_read_argv_shape() {
        let cmd = CaseCommand::foam_dictionary_read(
            Path::new("/case"),
            "system/controlDict",
            "endTime",
        );
        assert_eq!(cmd.program(), "foamDictionary");
        assert_eq!(
            cmd.args(),
            ["/case/system/controlDict", "-entry", "endTime", "-value"]
        );
    }

    #[test]
    fn classification_markers() {
        assert_eq!(
            classify("--> FOAM FATAL ERROR:", ""),
            Some(FailureKind::FatalError)
        );
        assert_eq!(
            classify("Foam::sigFpe::sigHandler", ""),
            Some(FailureKind::FatalFpe)
        );
        assert_eq!(
            classify("", "Foam::error::printStack(Foam::Ostream&)"),
            Some(FailureKind::FatalStackdump)
        );
        assert_eq!(classify("all good", ""), None);
    }

    #[test]
    fn running_a_missing_binary_is_a_spawn_error() {
        let cmd = CaseCommand::new("definitely-not-a-foam-tool", vec![]);
        assert!(matches!(cmd.run(), Err(RunError::Spawn { .. })));
    }
}
