//! On-disk tests for the boundary dictionary store.

use std::fs;
use std::path::Path;

use hearth_boundary::{BoundaryFile, BoundaryVariant};
use hearth_core::{CaseError, FieldKind, Value};
use tempfile::TempDir;

const T_FILE: &str = "\
/*--------------------------------*- C++ -*----------------------------------*\\
  =========                 |
\\*---------------------------------------------------------------------------*/
FoamFile
{
    version     2.0;
    format      ascii;
    class       volScalarField;
    object      T;
}
// * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * //

dimensions      [0 0 0 1 0 0 0];

internalField   uniform 293.15;

boundaryField
{
    #includeEtc \"caseDicts/setConstraintTypes\"

    heater
    {
        type            fixedValue;
        value           uniform 293.15;
    }

    walls
    {
        type            zeroGradient;
    }
}

// ************************************************************************* //
";

fn case_with_t(dir: &TempDir, time: &str) -> std::path::PathBuf {
    let case = dir.path().to_path_buf();
    let time_dir = case.join(time);
    fs::create_dir_all(&time_dir).unwrap();
    fs::write(time_dir.join("T"), T_FILE).unwrap();
    case
}

fn read_t(case: &Path, time: &str) -> String {
    fs::read_to_string(case.join(time).join("T")).unwrap()
}

#[test]
fn open_parses_existing_file() {
    let dir = TempDir::new().unwrap();
    let case = case_with_t(&dir, "0");
    let file = BoundaryFile::open(&case, FieldKind::T, None).unwrap();
    assert_eq!(file.internal(), Some((&Value::Scalar(293.15), true)));
    assert_eq!(file.boundary("heater").unwrap().kind(), "fixedValue");
    assert_eq!(file.boundary("walls").unwrap().kind(), "zeroGradient");
    let names: Vec<&str> = file.boundaries().map(|(n, _)| n).collect();
    assert_eq!(names, ["heater", "walls"]);
}

#[test]
fn open_creates_a_fresh_file_from_the_template() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("0")).unwrap();
    let mut file = BoundaryFile::open(dir.path(), FieldKind::U, None).unwrap();
    assert!(dir.path().join("0/U").exists());
    assert!(file.internal().is_none());
    file.set_internal([0.0, 0.0, 0.0], true).unwrap();
    let written = fs::read_to_string(dir.path().join("0/U")).unwrap();
    assert!(written.contains("class       volVectorField;"));
    assert!(written.contains("internalField uniform (0 0 0);"));

    // A reopened store sees the same state.
    let reopened = BoundaryFile::open(dir.path(), FieldKind::U, None).unwrap();
    assert_eq!(
        reopened.internal(),
        Some((&Value::Vector([0.0, 0.0, 0.0]), true))
    );
}

#[test]
fn untouched_text_survives_every_patch() {
    let dir = TempDir::new().unwrap();
    let case = case_with_t(&dir, "0");
    let mut file = BoundaryFile::open(&case, FieldKind::T, None).unwrap();

    file.set_internal(300.0, true).unwrap();
    let mut v = BoundaryVariant::new("fixedValue").unwrap();
    v.set("value", 310.0).unwrap();
    v.set_uniform("value", true).unwrap();
    file.set_boundary("window", v).unwrap();

    let text = read_t(&case, "0");
    assert!(text.contains("#includeEtc \"caseDicts/setConstraintTypes\""));
    assert!(text.contains("// * * *"));
    assert!(text.contains("dimensions      [0 0 0 1 0 0 0];"));
    assert!(text.contains("type            zeroGradient;"));
}

#[test]
fn save_without_changes_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let case = case_with_t(&dir, "0");
    let mut file = BoundaryFile::open(&case, FieldKind::T, None).unwrap();
    let before = read_t(&case, "0");
    file.save().unwrap();
    assert_eq!(read_t(&case, "0"), before);
}

#[test]
fn dirty_values_flush_exactly_once() {
    let dir = TempDir::new().unwrap();
    let case = case_with_t(&dir, "0");
    let mut file = BoundaryFile::open(&case, FieldKind::T, None).unwrap();

    file.boundary_mut("heater")
        .unwrap()
        .set("value", 305.0)
        .unwrap();
    file.save().unwrap();
    let after_first = read_t(&case, "0");
    assert!(after_first.contains("value           uniform 305;"));

    // Second save has nothing dirty left.
    fs::write(case.join("0/T"), after_first.replace("305", "999")).unwrap();
    file.save().unwrap();
    assert!(read_t(&case, "0").contains("999"));
}

#[test]
fn same_kind_update_patches_values_in_place() {
    let dir = TempDir::new().unwrap();
    let case = case_with_t(&dir, "0");
    let mut file = BoundaryFile::open(&case, FieldKind::T, None).unwrap();

    let mut v = BoundaryVariant::new("fixedValue").unwrap();
    v.set("value", 310.0).unwrap();
    file.set_boundary("heater", v).unwrap();
    file.save().unwrap();

    let text = read_t(&case, "0");
    assert!(text.contains("value           uniform 310;"));
    assert_eq!(text.matches("heater").count(), 1);
}

#[test]
fn different_kind_replaces_the_block() {
    let dir = TempDir::new().unwrap();
    let case = case_with_t(&dir, "0");
    let mut file = BoundaryFile::open(&case, FieldKind::T, None).unwrap();

    let v = BoundaryVariant::new("zeroGradient").unwrap();
    file.set_boundary("heater", v).unwrap();

    let text = read_t(&case, "0");
    assert_eq!(text.matches("heater").count(), 1);
    assert!(!text.contains("fixedValue"));
    assert_eq!(file.boundary("heater").unwrap().kind(), "zeroGradient");
}

#[test]
fn new_boundaries_only_at_time_zero() {
    let dir = TempDir::new().unwrap();
    let case = case_with_t(&dir, "0");
    fs::create_dir_all(case.join("0.5")).unwrap();
    fs::write(case.join("0.5/T"), T_FILE).unwrap();

    let mut file = BoundaryFile::open(&case, FieldKind::T, None).unwrap();
    file.retime("0.5").unwrap();

    let mut v = BoundaryVariant::new("fixedValue").unwrap();
    v.set("value", 300.0).unwrap();
    let err = file.set_boundary("window", v).unwrap_err();
    assert!(matches!(err, CaseError::Mutation(_)));

    // Known names still update fine after the retime.
    let mut v = BoundaryVariant::new("fixedValue").unwrap();
    v.set("value", 300.0).unwrap();
    file.set_boundary("heater", v).unwrap();
}

#[test]
fn nonuniform_internal_keeps_only_the_last_value() {
    let dir = TempDir::new().unwrap();
    let case = dir.path().to_path_buf();
    fs::create_dir_all(case.join("0")).unwrap();
    fs::write(
        case.join("0/T"),
        "\
internalField   nonuniform List<scalar>
3
(
291.0
292.0
293.0
)
;

boundaryField
{
}
",
    )
    .unwrap();

    let file = BoundaryFile::open(&case, FieldKind::T, None).unwrap();
    assert_eq!(file.internal(), Some((&Value::Scalar(293.0), false)));
}

#[test]
fn remove_boundary_deletes_the_block() {
    let dir = TempDir::new().unwrap();
    let case = case_with_t(&dir, "0");
    let mut file = BoundaryFile::open(&case, FieldKind::T, None).unwrap();

    file.remove_boundary("heater").unwrap();
    assert!(file.boundary("heater").is_none());
    let text = read_t(&case, "0");
    assert!(!text.contains("heater"));
    assert!(text.contains("walls"));
}

#[test]
fn region_paths_nest_under_the_timestep() {
    let dir = TempDir::new().unwrap();
    let case = dir.path().to_path_buf();
    fs::create_dir_all(case.join("0/fluid")).unwrap();
    fs::write(case.join("0/fluid/T"), T_FILE).unwrap();

    let file = BoundaryFile::open(&case, FieldKind::T, Some("fluid")).unwrap();
    assert_eq!(file.path(), case.join("0/fluid/T"));
    assert_eq!(file.region(), Some("fluid"));
    assert!(file.boundary("heater").is_some());
}
