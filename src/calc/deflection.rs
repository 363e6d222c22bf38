//! Tool deflection: cantilever bending and shear, holder compliance, and
//! dynamic amplification near the tool's first bending mode.
//!
//! Units: N, mm, GPa (converted to N/mm^2), g/cm^3.

use super::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::f64::consts::PI;

const POISSON_RATIO: f64 = 0.3;
/// Timoshenko shear coefficient for a solid round section
const SHEAR_COEFFICIENT: f64 = 0.9;
/// Fraction of cantilever mass that participates in the first mode (33/140)
const MODAL_MASS_FRACTION: f64 = 0.2357;
const MAX_AMPLIFICATION: f64 = 50.0;

const DEFAULT_MODULUS_GPA: f64 = 400.0;
const DEFAULT_DENSITY: f64 = 11.0;

static YOUNGS_MODULUS_GPA: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("carbide", 600.0),
        ("hss", 210.0),
        ("high-speed-steel", 210.0),
        ("high speed steel", 210.0),
        ("steel", 210.0),
    ])
});

static DENSITY_G_CM3: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("carbide", 14.5),
        ("hss", 8.1),
        ("high-speed-steel", 8.1),
        ("high speed steel", 8.1),
        ("steel", 8.1),
    ])
});

/// Young's modulus in GPa, case-insensitive. Unknown materials get 400 GPa.
pub fn youngs_modulus_gpa(tool_material: &str) -> f64 {
    YOUNGS_MODULUS_GPA
        .get(tool_material.trim().to_lowercase().as_str())
        .copied()
        .unwrap_or(DEFAULT_MODULUS_GPA)
}

pub fn density_g_cm3(tool_material: &str) -> f64 {
    DENSITY_G_CM3
        .get(tool_material.trim().to_lowercase().as_str())
        .copied()
        .unwrap_or(DEFAULT_DENSITY)
}

/// Chipload derating for long tools, by stickout/diameter band.
/// Upper bounds are inclusive: exactly 3x is still the stiff band.
pub fn stickout_penalty(ld_ratio: f64) -> f64 {
    match ld_ratio {
        r if r <= 3.0 => 1.0,
        r if r <= 5.0 => 0.9,
        r if r <= 8.0 => 0.75,
        _ => 0.5,
    }
}

fn second_moment(d: f64) -> f64 {
    PI * d.powi(4) / 64.0
}

fn section_area(d: f64) -> f64 {
    PI * d.powi(2) / 4.0
}

/// Static components, each linear in force
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticDeflection {
    pub bending: f64,
    pub shear: f64,
    pub holder: f64,
    pub total: f64,
}

pub fn static_deflection(
    force: f64,
    stickout: f64,
    diameter: f64,
    tool_material: &str,
    holder_compliance: f64,
) -> StaticDeflection {
    let e = youngs_modulus_gpa(tool_material) * 1000.0; // N/mm^2
    let g = e / (2.0 * (1.0 + POISSON_RATIO));

    let bending = force * stickout.powi(3) / (3.0 * e * second_moment(diameter));
    let shear = force * stickout / (SHEAR_COEFFICIENT * g * section_area(diameter));
    let holder = force * holder_compliance;

    StaticDeflection {
        bending,
        shear,
        holder,
        total: bending + shear + holder,
    }
}

/// First bending-mode natural frequency of the tool as a cantilever, Hz
pub fn natural_frequency(stickout: f64, diameter: f64, tool_material: &str) -> f64 {
    let e = youngs_modulus_gpa(tool_material) * 1e9; // Pa
    let d = diameter / 1000.0;
    let l = stickout / 1000.0;

    let stiffness = 3.0 * e * second_moment(d) / l.powi(3); // N/m
    let mass = density_g_cm3(tool_material) * 1000.0 * section_area(d) * l; // kg
    let modal_mass = MODAL_MASS_FRACTION * mass;

    (stiffness / modal_mass).sqrt() / (2.0 * PI)
}

/// Dynamic amplification for a frequency ratio.
///
/// Below 0.7 the response is quasi-static, above 1.3 the tool is isolated.
/// The band [0.7, 1.3] (inclusive) uses the damped single-mode response and
/// does not join the outer branches continuously.
pub fn amplification_factor(ratio: f64, damping_ratio: f64) -> f64 {
    if ratio < 0.7 {
        1.0 + 0.1 * ratio
    } else if ratio > 1.3 {
        (1.0 / ratio.powi(2)).min(MAX_AMPLIFICATION)
    } else {
        let r2 = ratio * ratio;
        let response = 1.0 / ((1.0 - r2).powi(2) + (2.0 * damping_ratio * ratio).powi(2)).sqrt();
        response.clamp(1.0, MAX_AMPLIFICATION)
    }
}

pub struct DeflectionParams<'a> {
    pub force: f64,
    pub stickout: f64,
    pub effective_diameter: f64,
    pub tool_material: &'a str,
    pub rpm: f64,
    pub effective_flutes: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeflectionResult {
    pub static_deflection: StaticDeflection,
    pub natural_frequency: f64,
    pub operating_frequency: f64,
    pub frequency_ratio: f64,
    pub amplification: f64,
    /// static * amplification, mm
    pub total: f64,
    pub ld_ratio: f64,
}

pub fn calculate_deflection(
    params: &DeflectionParams<'_>,
    config: &CalcConfig,
) -> Result<DeflectionResult, CalcError> {
    if params.effective_diameter <= 0.0 {
        return Err(CalcError::NonPositive {
            quantity: "effective diameter",
            value: params.effective_diameter,
        });
    }
    if params.stickout <= 0.0 {
        return Err(CalcError::NonPositive {
            quantity: "stickout",
            value: params.stickout,
        });
    }

    let static_deflection = static_deflection(
        params.force,
        params.stickout,
        params.effective_diameter,
        params.tool_material,
        config.holder_compliance,
    );
    let natural_frequency =
        natural_frequency(params.stickout, params.effective_diameter, params.tool_material);
    let operating_frequency = params.rpm / 60.0 * params.effective_flutes as f64;
    let frequency_ratio = operating_frequency / natural_frequency;
    let amplification = amplification_factor(frequency_ratio, config.damping_ratio);

    Ok(DeflectionResult {
        static_deflection,
        natural_frequency,
        operating_frequency,
        frequency_ratio,
        amplification,
        total: static_deflection.total * amplification,
        ld_ratio: params.stickout / params.effective_diameter,
    })
}

/// Deflection warnings against (warning, danger) thresholds in mm
pub fn deflection_warnings(total: f64, thresholds: (f64, f64)) -> Vec<Warning> {
    let (warning, danger) = thresholds;
    if total > danger {
        vec![Warning::new(
            WarningKind::Deflection,
            Severity::Danger,
            format!(
                "Tool deflection {:.3} mm exceeds {:.3} mm; expect poor finish or breakage",
                total, danger
            ),
        )]
    } else if total > warning {
        vec![Warning::new(
            WarningKind::Deflection,
            Severity::Warning,
            format!("Tool deflection {:.3} mm exceeds {:.3} mm", total, warning),
        )]
    } else {
        Vec::new()
    }
}
