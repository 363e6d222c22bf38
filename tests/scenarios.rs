//! End-to-end scenarios against the built-in catalog

use feedsmith::calc::chipload::lookup_chipload_range;
use feedsmith::calc::deflection::static_deflection;
use feedsmith::calc::power::power_limit;
use feedsmith::calc::{suggest_tools_for_target_deflection, DeflectionTargetRequest, SearchRange};
use feedsmith::job::parse_job;
use feedsmith::rigidity::MachineClass;
use feedsmith::*;
use pretty_assertions::assert_eq;

fn catalog() -> Catalog {
    Catalog::builtin().expect("builtin catalog parses")
}

fn inputs(machine: &str, spindle: &str, tool: &str, material: &str) -> Inputs {
    Inputs::new(machine, spindle, tool, material, CutType::Profile)
}

#[test]
fn holder_compliance_at_300_newtons() {
    let cfg = CalcConfig::default();
    let s = static_deflection(300.0, 25.0, 8.0, "carbide", cfg.holder_compliance);
    assert!((s.holder - 0.6).abs() < 1e-12);
}

#[test]
fn chipload_interpolated_between_3_and_12_mm() {
    let mut material = catalog().material("aluminum-6061").cloned().unwrap();
    material.chipload_table = vec![
        ChiploadEntry {
            diameter: 3.0,
            min: 0.01,
            max: 0.02,
        },
        ChiploadEntry {
            diameter: 12.0,
            min: 0.04,
            max: 0.08,
        },
    ];
    let (min, max) = lookup_chipload_range(&material, 6.0).unwrap();
    assert!((min - 0.02).abs() < 1e-12);
    assert!((max - 0.04).abs() < 1e-12);
}

#[test]
fn equal_required_and_available_power_is_limited() {
    let limit = power_limit(1000.0, 1000.0, &CalcConfig::default());
    assert!(limit.limited);
    assert!((limit.scaling_factor.unwrap() - 0.85).abs() < 1e-12);
}

#[test]
fn rpm_stays_within_spindle_range_for_every_tool_and_material() {
    let catalog = catalog();
    let cfg = CalcConfig::default();
    let spindle = catalog.spindle("vfd-2.2kw").unwrap();

    for tool in catalog.tools() {
        for material in catalog.materials() {
            let inputs = inputs("haas-mini-mill", "vfd-2.2kw", &tool.id, &material.id);
            let out = compute(&inputs, &catalog, &cfg)
                .unwrap_or_else(|e| panic!("{} in {}: {}", tool.id, material.id, e));
            assert!(
                out.rpm >= spindle.rpm_min && out.rpm <= spindle.rpm_max,
                "{} in {}: {} RPM",
                tool.id,
                material.id,
                out.rpm
            );
            assert!(out.feed_rate <= catalog.machine("haas-mini-mill").unwrap().max_feed + 1e-9);
        }
    }
}

#[test]
fn weak_spindle_is_power_limited_and_scaled_once() {
    let mut catalog = catalog();
    catalog.merge(
        Catalog::from_json_str(
            r#"{ "spindles": [{
                "id": "weak",
                "rated_power_kw": 0.05,
                "rpm_min": 1000,
                "rpm_max": 24000,
                "base_rpm": 1000,
                "power_curve": [{ "rpm": 1000, "power_kw": 0.05 }]
            }] }"#,
        )
        .unwrap(),
    );

    let inputs = inputs("tormach-440", "weak", "em-12-4fl", "mild-steel-1018");
    let out = compute(&inputs, &catalog, &CalcConfig::default()).unwrap();
    assert!(out.power_limited);
    let factor = out.power_scaling_factor.unwrap();
    assert!((factor - out.available_power * 0.85 / out.required_power).abs() < 1e-12);
    assert!(out
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::Power && w.severity == Severity::Danger));

    let scaled = out.apply_power_scaling();
    assert!((scaled.feed_rate - out.feed_rate * factor).abs() < 1e-9);
    assert!((scaled.mrr - out.mrr * factor).abs() < 1e-6);
    assert_eq!(scaled.apply_power_scaling(), scaled);
}

#[test]
fn vbit_width_follows_depth() {
    let catalog = catalog();
    let mut shallow = inputs("shapeoko-4", "vfd-1.5kw", "vbit-90", "mdf");
    shallow.doc = Some(1.0);
    let mut deep = shallow.clone();
    deep.doc = Some(3.0);

    let cfg = CalcConfig::default();
    let a = compute(&shallow, &catalog, &cfg).unwrap();
    let b = compute(&deep, &catalog, &cfg).unwrap();
    assert!((a.metadata.effective_diameter - 2.2).abs() < 1e-9);
    assert!((b.metadata.effective_diameter - 6.2).abs() < 1e-9);
}

#[test]
fn boring_bar_cuts_with_one_edge() {
    let inputs = inputs("tormach-440", "tormach-440-spindle", "boring-bar-8", "mild-steel-1018");
    let out = compute(&inputs, &catalog(), &CalcConfig::default()).unwrap();
    assert_eq!(out.metadata.effective_flutes, 1);
    assert_eq!(out.metadata.effective_diameter, 20.0);
}

#[test]
fn every_unknown_reference_is_reported() {
    let inputs = inputs("nope", "vfd-1.5kw", "missing", "aluminum-6061");
    match compute(&inputs, &catalog(), &CalcConfig::default()) {
        Err(CalcError::Validation(errors)) => assert_eq!(errors.len(), 2),
        other => panic!("expected validation errors, got {:?}", other),
    }
}

#[test]
fn suggestions_are_sorted_by_error() {
    let request = DeflectionTargetRequest {
        target_deflection: 0.08,
        force: 40.0,
        rpm: 12000.0,
        flutes: 2,
        tool_material: ToolMaterial::Carbide,
        diameter_range: SearchRange::new(2.0, 10.0),
        stickout_range: SearchRange::new(8.0, 45.0),
        steps: 10,
        top_n: 8,
    };
    let results = suggest_tools_for_target_deflection(&request, &CalcConfig::default()).unwrap();
    assert_eq!(results.len(), 8);
    for pair in results.windows(2) {
        assert!(pair[0].error <= pair[1].error);
    }
}

#[test]
fn hobby_job_on_desktop_router() {
    let job = "\
machine 3018-pro
spindle makita-rt0701
tool em-3-2fl
material aluminum-6061
cut slot
hobby on
";
    let inputs = parse_job(job).unwrap();
    let catalog = catalog();
    let cfg = CalcConfig::default();
    let out = compute(&inputs, &catalog, &cfg).unwrap();
    assert_eq!(out.machine_class, MachineClass::UltraLight);
    assert!(out.hobby_adjusted);

    let mut standard = inputs.clone();
    standard.hobby_mode = false;
    let baseline = compute(&standard, &catalog, &cfg).unwrap();
    assert!(out.radial_engagement <= baseline.radial_engagement);
    assert!(out.chipload < baseline.chipload || out.feed_rate <= baseline.feed_rate);
}

#[test]
fn rounded_output_is_stable() {
    let calc = Calculator::new(catalog(), CalcConfig::default());
    let inputs = inputs("onefinity-woodworker", "vfd-2.2kw", "em-6-4fl-altin", "aluminum-7075");
    let out = calc.compute_rounded(&inputs).unwrap();
    assert_eq!(apply_output_rounding(&out), out);
}

#[test]
fn demo_job_file_computes() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/shapeoko-aluminum-slot.job");
    let (_, parsed) = feedsmith::job::load_job(path).unwrap();
    let inputs = parsed.unwrap();
    assert_eq!(inputs.cut_type, CutType::Slot);
    assert_eq!(inputs.doc, Some(1.5));
    assert!(inputs.hobby_mode);

    let out = compute(&inputs, &catalog(), &CalcConfig::default()).unwrap();
    assert_eq!(out.machine_class, MachineClass::Medium);
    assert!(out.hobby_adjusted);
    assert!(out.axial_engagement <= 1.5 + 1e-9);
}

#[test]
fn boring_bar_suggestions_bracket_cutting_diameter() {
    let config = CalcConfig {
        optimizer_top_n: 1000,
        ..CalcConfig::default()
    };
    let calc = Calculator::new(catalog(), config);
    let inputs = inputs("tormach-440", "tormach-440-spindle", "boring-bar-8", "mild-steel-1018");
    let cut = calc.compute(&inputs).unwrap();
    assert_eq!(cut.metadata.effective_diameter, 20.0);

    let suggestions = calc.suggest_tools(&inputs, cut.total_deflection).unwrap();
    let largest = suggestions.iter().map(|s| s.diameter).fold(0.0, f64::max);
    let smallest = suggestions.iter().map(|s| s.diameter).fold(f64::INFINITY, f64::min);
    assert!(smallest <= 20.0 && largest >= 20.0);
    assert!((largest - 40.0).abs() < 1e-9);
}
