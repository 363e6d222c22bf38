//! Surface speed and spindle RPM

use super::*;
use std::f64::consts::PI;

/// Surface speed factor per operation
pub fn cut_type_speed_factor(cut_type: CutType) -> f64 {
    match cut_type {
        CutType::Slot => 0.8,
        CutType::Profile => 1.0,
        CutType::Adaptive => 1.2,
        CutType::Facing => 0.9,
        CutType::Drilling => 0.7,
        CutType::Boring => 0.8,
    }
}

/// Speed multiplier for a tool substrate cutting a material category.
///
/// Catalog speed ranges assume uncoated carbide.
pub fn compatibility_multiplier(tool_material: ToolMaterial, category: MaterialCategory) -> f64 {
    use MaterialCategory::*;

    match tool_material {
        ToolMaterial::Carbide => 1.0,
        ToolMaterial::Hss => match category {
            Plastic | Wood => 1.0,
            Aluminum | NonFerrous => 0.7,
            _ => 0.5,
        },
        ToolMaterial::Cobalt => match category {
            Steel | Stainless | CastIron | Titanium => 0.6,
            Aluminum | NonFerrous => 0.8,
            _ => 1.0,
        },
        ToolMaterial::Ceramic => match category {
            CastIron => 1.5,
            _ => 1.0,
        },
        ToolMaterial::Diamond => match category {
            Aluminum | NonFerrous | Composite => 1.2,
            Plastic | Wood => 1.0,
            Steel | Stainless | CastIron | Titanium => 0.5,
        },
    }
}

/// Spindle speed derived from the material's surface speed
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedResult {
    /// Target surface speed, m/min
    pub target_surface_speed: f64,
    pub theoretical_rpm: f64,
    /// RPM after clamping to the spindle range
    pub rpm: f64,
    /// Surface speed at the actual RPM, m/min
    pub surface_speed: f64,
    pub warnings: Vec<Warning>,
}

pub struct SpeedParams<'a> {
    pub material: &'a Material,
    pub spindle: &'a Spindle,
    pub tool_material: ToolMaterial,
    pub cut_type: CutType,
    pub aggressiveness: f64,
    pub effective_diameter: f64,
    /// Extra derating from a machine-class adjustment
    pub speed_multiplier: f64,
}

pub fn rpm_for_surface_speed(surface_speed: f64, diameter: f64) -> f64 {
    surface_speed * 1000.0 / (PI * diameter)
}

pub fn surface_speed_for_rpm(rpm: f64, diameter: f64) -> f64 {
    PI * diameter * rpm / 1000.0
}

pub fn calculate_speed(params: &SpeedParams<'_>) -> Result<SpeedResult, CalcError> {
    if params.effective_diameter <= 0.0 {
        return Err(CalcError::NonPositive {
            quantity: "effective diameter",
            value: params.effective_diameter,
        });
    }

    let mut warnings = Vec::new();
    let (vc_min, vc_max) = params.material.surface_speed;
    let compat = compatibility_multiplier(params.tool_material, params.material.category);

    if params.tool_material == ToolMaterial::Diamond
        && (params.material.category.is_ferrous()
            || params.material.category == MaterialCategory::Titanium)
    {
        warnings.push(Warning::new(
            WarningKind::Speed,
            Severity::Warning,
            format!(
                "PCD tooling is not suited to {}; surface speed halved",
                params.material.category
            ),
        ));
    }

    let target_surface_speed = (vc_min + vc_max) / 2.0
        * cut_type_speed_factor(params.cut_type)
        * params.aggressiveness
        * compat
        * params.speed_multiplier;

    let theoretical_rpm = rpm_for_surface_speed(target_surface_speed, params.effective_diameter);

    let spindle = params.spindle;
    let rpm = if theoretical_rpm > spindle.rpm_max {
        warnings.push(Warning::new(
            WarningKind::Speed,
            Severity::Warning,
            format!(
                "Target {:.0} RPM exceeds spindle maximum; clamped to {:.0} RPM",
                theoretical_rpm, spindle.rpm_max
            ),
        ));
        spindle.rpm_max
    } else if theoretical_rpm < spindle.rpm_min {
        warnings.push(Warning::new(
            WarningKind::Speed,
            Severity::Warning,
            format!(
                "Target {:.0} RPM is below spindle minimum; clamped to {:.0} RPM",
                theoretical_rpm, spindle.rpm_min
            ),
        ));
        spindle.rpm_min
    } else {
        theoretical_rpm
    };

    let surface_speed = surface_speed_for_rpm(rpm, params.effective_diameter);

    tracing::debug!(
        target_surface_speed,
        theoretical_rpm,
        rpm,
        "speed resolved"
    );

    Ok(SpeedResult {
        target_surface_speed,
        theoretical_rpm,
        rpm,
        surface_speed,
        warnings,
    })
}
