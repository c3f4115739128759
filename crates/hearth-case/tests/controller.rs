//! On-disk controller tests that need no solver binaries.

use std::fs;
use std::path::{Path, PathBuf};

use hearth_case::{Case, CaseConfig, Phyng};
use hearth_core::{CaseError, FieldKind, MIN_TEMP, ROOM_TEMP};
use tempfile::TempDir;

fn field_file(field: FieldKind, boundaries: &[&str]) -> String {
    let internal = if field.is_vector() {
        "uniform (0 0 0)"
    } else {
        "uniform 293.15"
    };
    let mut text = format!(
        "\
FoamFile
{{
    version     2.0;
    format      ascii;
    class       {};
    object      {};
}}

dimensions      [0 0 0 0 0 0 0];

internalField   {internal};

boundaryField
{{
    walls
    {{
        type            zeroGradient;
    }}
",
        field.class(),
        field.name(),
    );
    for name in boundaries {
        text.push_str(&format!(
            "
    {name}
    {{
        type            zeroGradient;
    }}
"
        ));
    }
    text.push_str("}\n");
    text
}

/// A two-region `0/` layout: the full fluid field set plus a solid
/// region carrying T and p.
fn two_region_case(dir: &TempDir, solid: &str, extra_boundaries: &[&str]) -> PathBuf {
    let case = dir.path().to_path_buf();
    let fluid = case.join("0/fluid");
    fs::create_dir_all(&fluid).unwrap();
    for field in FieldKind::ALL {
        fs::write(fluid.join(field.name()), field_file(field, extra_boundaries)).unwrap();
    }
    let solid_dir = case.join("0").join(solid);
    fs::create_dir_all(&solid_dir).unwrap();
    for field in [FieldKind::T, FieldKind::P] {
        fs::write(solid_dir.join(field.name()), field_file(field, &[])).unwrap();
    }
    fs::create_dir_all(case.join("system")).unwrap();
    case
}

fn read_field(case: &Path, region: &str, field: FieldKind) -> String {
    fs::read_to_string(case.join("0").join(region).join(field.name())).unwrap()
}

#[test]
fn heater_mutation_patches_both_regions_at_time_zero() {
    let dir = TempDir::new().unwrap();
    let case_dir = two_region_case(&dir, "heater", &[]);
    let case = Case::new(CaseConfig::new(&case_dir));
    case.add_heater("heater").unwrap();
    case.extract_boundary_conditions().unwrap();

    case.set_heater_temperature("heater", 323.15).unwrap();

    let solid_t = read_field(&case_dir, "heater", FieldKind::T);
    assert!(solid_t.contains("heater_to_fluid"));
    assert!(solid_t.contains("compressible::turbulentTemperatureCoupledBaffleMixed"));
    assert!(solid_t.contains("uniform 323.15"));

    let fluid_t = read_field(&case_dir, "fluid", FieldKind::T);
    assert!(fluid_t.contains("fluid_to_heater"));
    let fluid_u = read_field(&case_dir, "fluid", FieldKind::U);
    assert!(fluid_u.contains("noSlip"));

    match case.phyng("heater") {
        Some(Phyng::Heater(heater)) => assert_eq!(heater.temperature(), 323.15),
        other => panic!("unexpected phyng: {other:?}"),
    }
}

#[test]
fn heater_temperature_below_the_floor_is_rejected() {
    let dir = TempDir::new().unwrap();
    let case_dir = two_region_case(&dir, "heater", &[]);
    let case = Case::new(CaseConfig::new(&case_dir));
    case.add_heater("heater").unwrap();
    case.extract_boundary_conditions().unwrap();

    let err = case.set_heater_temperature("heater", MIN_TEMP - 5.0).unwrap_err();
    assert!(matches!(err, CaseError::PhyngMutation { .. }));
    // The record keeps its old temperature.
    match case.phyng("heater") {
        Some(Phyng::Heater(heater)) => assert_eq!(heater.temperature(), ROOM_TEMP),
        other => panic!("unexpected phyng: {other:?}"),
    }
}

#[test]
fn opening_a_window_turns_it_into_an_inlet_and_back() {
    let dir = TempDir::new().unwrap();
    let case_dir = two_region_case(&dir, "heater", &["window"]);
    let case = Case::new(CaseConfig::new(&case_dir));
    case.add_window("window", 0).unwrap();
    case.extract_boundary_conditions().unwrap();

    case.set_opening("window", true).unwrap();
    let fluid_u = read_field(&case_dir, "fluid", FieldKind::U);
    assert!(fluid_u.contains("(0.01 0 0)"));
    let fluid_t = read_field(&case_dir, "fluid", FieldKind::T);
    assert!(fluid_t.contains("fixedValue"));

    case.set_opening_velocity("window", [2.0, 0.0, 0.0]).unwrap();
    let fluid_u = read_field(&case_dir, "fluid", FieldKind::U);
    assert!(fluid_u.contains("(2 0 0)"));

    case.set_opening("window", false).unwrap();
    let fluid_u = read_field(&case_dir, "fluid", FieldKind::U);
    assert!(fluid_u.contains("noSlip"));
    match case.phyng("window") {
        Some(Phyng::Window(window)) => {
            assert!(!window.is_open());
            assert_eq!(window.temperature(), ROOM_TEMP);
        }
        other => panic!("unexpected phyng: {other:?}"),
    }
}

#[test]
fn closed_window_keeps_velocity_off_the_boundary() {
    let dir = TempDir::new().unwrap();
    let case_dir = two_region_case(&dir, "heater", &["window"]);
    let case = Case::new(CaseConfig::new(&case_dir));
    case.add_window("window", 0).unwrap();
    case.extract_boundary_conditions().unwrap();

    let before = read_field(&case_dir, "fluid", FieldKind::U);
    case.set_opening_velocity("window", [3.0, 0.0, 0.0]).unwrap();
    // The record changes; the boundary file does not.
    assert_eq!(read_field(&case_dir, "fluid", FieldKind::U), before);
    match case.phyng("window") {
        Some(Phyng::Window(window)) => assert_eq!(window.velocity(), [3.0, 0.0, 0.0]),
        other => panic!("unexpected phyng: {other:?}"),
    }
}

#[test]
fn enabling_an_ac_drives_its_face_pair() {
    let dir = TempDir::new().unwrap();
    let case_dir = two_region_case(&dir, "heater", &["ac_in", "ac_out"]);
    let case = Case::new(CaseConfig::new(&case_dir));
    case.add_ac("ac", false).unwrap();
    case.extract_boundary_conditions().unwrap();

    case.set_ac_enabled("ac", true).unwrap();
    let fluid_u = read_field(&case_dir, "fluid", FieldKind::U);
    assert!(fluid_u.contains("pressureInletOutletVelocity"));
    let fluid_p_rgh = read_field(&case_dir, "fluid", FieldKind::PRgh);
    assert!(fluid_p_rgh.contains("fixedValue"));

    case.set_ac_speed("ac", 2.0).unwrap();
    let fluid_u = read_field(&case_dir, "fluid", FieldKind::U);
    assert!(fluid_u.contains("(0 0 -2)"));

    case.set_ac_enabled("ac", false).unwrap();
    let fluid_u = read_field(&case_dir, "fluid", FieldKind::U);
    assert!(fluid_u.contains("noSlip"));
}

#[test]
fn sensors_register_probes_and_release_them() {
    let dir = TempDir::new().unwrap();
    let case_dir = dir.path().to_path_buf();
    fs::create_dir_all(case_dir.join("system")).unwrap();
    let case = Case::new(CaseConfig::new(&case_dir));

    case.add_sensor("temp", FieldKind::T, [1.0, 1.0, 1.0]).unwrap();
    assert!(case.sensor_value("temp").is_ok());
    assert!(case_dir.join("system/probes").exists());

    let dump = case.dump_case();
    assert!(dump.get("sensors").unwrap().get("temp").is_some());

    case.remove_phyng("temp").unwrap();
    assert!(case.phyng("temp").is_none());
    assert!(case.sensor_value("temp").is_err());
}

#[test]
fn dump_lists_parameters_and_phyng_sections() {
    let dir = TempDir::new().unwrap();
    let case_dir = dir.path().to_path_buf();
    let mut config = CaseConfig::new(&case_dir);
    config.end_time = 500.0;
    let case = Case::new(config);
    case.add_heater("heater").unwrap();
    case.add_door("door", 1).unwrap();

    let dump = case.dump_case();
    assert_eq!(dump.get("type").unwrap().as_text(), Some("cht"));
    assert_eq!(dump.get("end_time").unwrap().as_number(), Some(500.0));
    assert_eq!(dump.get("parallel").unwrap().as_bool(), Some(false));
    assert_eq!(dump.get("initialized").unwrap().as_bool(), Some(false));
    assert!(dump.get("heaters").unwrap().get("heater").is_some());
    assert!(dump.get("doors").unwrap().get("door").is_some());
    assert_eq!(
        dump.get("doors")
            .unwrap()
            .get("door")
            .unwrap()
            .get("open")
            .unwrap()
            .as_bool(),
        Some(false)
    );
}

#[test]
fn clean_case_wipes_results_logs_and_processor_dirs() {
    let dir = TempDir::new().unwrap();
    let case_dir = dir.path().to_path_buf();
    for sub in ["0", "10", "20", "processor0", "processor1", "postProcessing", "constant"] {
        fs::create_dir_all(case_dir.join(sub)).unwrap();
    }
    for file in ["log.blockMesh", "run.foam", "case.OpenFOAM", "notes.txt"] {
        fs::write(case_dir.join(file), "").unwrap();
    }
    let case = Case::new(CaseConfig::new(&case_dir));

    case.clean_case().unwrap();

    assert!(case_dir.join("0").exists());
    assert!(case_dir.join("constant").exists());
    assert!(case_dir.join("notes.txt").exists());
    for gone in ["10", "20", "processor0", "processor1", "postProcessing"] {
        assert!(!case_dir.join(gone).exists(), "{gone} should be removed");
    }
    assert!(!case_dir.join("log.blockMesh").exists());
    assert!(!case_dir.join("run.foam").exists());
    assert!(!case_dir.join("case.OpenFOAM").exists());
    assert!(!case.is_decomposed());
}

#[test]
fn structural_edits_clear_initialization() {
    let dir = TempDir::new().unwrap();
    let case = Case::new(CaseConfig::new(dir.path()));
    assert!(!case.is_initialized());

    case.set_parallel(true, 2).unwrap();
    let dump = case.dump_case();
    assert_eq!(dump.get("initialized").unwrap().as_bool(), Some(false));

    // Non-structural edits leave the flag alone.
    case.set_clean_limit(60.0);
    case.set_end_time(900.0).unwrap();
    assert_eq!(
        case.dump_case().get("end_time").unwrap().as_number(),
        Some(900.0)
    );
}

#[test]
fn time_is_flat_before_the_first_run() {
    let dir = TempDir::new().unwrap();
    let case = Case::new(CaseConfig::new(dir.path()));
    let time = case.get_time();
    assert_eq!(time.simulation_ms, 0.0);
    assert_eq!(time.difference, 0.0);
    assert!(time.real_ms > 0.0);
    assert_eq!(case.time_difference(), 0.0);
}

#[test]
fn duplicate_and_unknown_phyngs_are_rejected() {
    let dir = TempDir::new().unwrap();
    let case = Case::new(CaseConfig::new(dir.path()));
    case.add_heater("heater").unwrap();
    assert!(case.add_heater("heater").is_err());
    assert!(case.remove_phyng("missing").is_err());
    assert!(case.set_heater_temperature("missing", 300.0).is_err());
    assert!(case.set_opening("heater", true).is_err());
}

#[test]
fn solved_follows_the_latest_result_time() {
    let dir = TempDir::new().unwrap();
    let case_dir = dir.path().to_path_buf();
    fs::create_dir_all(case_dir.join("0")).unwrap();
    let mut config = CaseConfig::new(&case_dir);
    config.end_time = 100.0;
    let case = Case::new(config);
    assert!(!case.solved());

    fs::create_dir_all(case_dir.join("100")).unwrap();
    assert!(case.solved());
    assert_eq!(case.latest_time(), "100");
}
