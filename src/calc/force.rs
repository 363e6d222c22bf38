//! Cutting force estimate

use super::*;

pub fn tool_type_force_multiplier(tool_type: ToolType) -> f64 {
    match tool_type {
        ToolType::FlatEndMill => 1.0,
        ToolType::Drill => 1.5,
        ToolType::VBit => 0.8,
        ToolType::FaceMill => 0.6,
        ToolType::Boring => 1.2,
        ToolType::SlittingSaw => 1.3,
    }
}

/// Sharper, slicker edges cut with less force
pub fn tool_force_factor(tool_material: ToolMaterial, coating: Coating) -> f64 {
    let substrate = match tool_material {
        ToolMaterial::Carbide => 1.0,
        ToolMaterial::Hss => 1.1,
        ToolMaterial::Cobalt => 1.05,
        ToolMaterial::Ceramic => 0.95,
        ToolMaterial::Diamond => 0.9,
    };
    let coating = match coating {
        Coating::None => 1.0,
        Coating::TiN => 0.97,
        Coating::TiCN => 0.96,
        Coating::ZrN => 0.95,
        Coating::TiAlN | Coating::AlTiN => 0.93,
        Coating::Dlc => 0.9,
        Coating::Diamond => 0.88,
    };
    substrate * coating
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForceResult {
    /// mm^2
    pub chip_area: f64,
    /// N
    pub base_force: f64,
    pub total_force: f64,
    /// N per mm of effective diameter
    pub force_per_diameter: f64,
    pub warnings: Vec<Warning>,
}

pub fn calculate_force(
    material: &Material,
    tool: &Tool,
    effective_diameter: f64,
    radial: f64,
    chipload: f64,
    config: &CalcConfig,
) -> Result<ForceResult, CalcError> {
    if effective_diameter <= 0.0 {
        return Err(CalcError::NonPositive {
            quantity: "effective diameter",
            value: effective_diameter,
        });
    }

    let chip_area = radial * chipload;
    // kN/mm^2 * mm^2 -> N
    let base_force = material.force_coefficient * chip_area * 1000.0;
    let total_force = base_force
        * tool_type_force_multiplier(tool.tool_type)
        * tool_force_factor(tool.tool_material, tool.coating);
    let force_per_diameter = total_force / effective_diameter;

    let mut warnings = Vec::new();
    if force_per_diameter > config.force_danger {
        warnings.push(Warning::new(
            WarningKind::Force,
            Severity::Danger,
            format!(
                "Cutting force {:.0} N ({:.0} N/mm) risks tool breakage",
                total_force, force_per_diameter
            ),
        ));
    } else if force_per_diameter > config.force_warning {
        warnings.push(Warning::new(
            WarningKind::Force,
            Severity::Warning,
            format!(
                "High cutting force {:.0} N ({:.0} N/mm)",
                total_force, force_per_diameter
            ),
        ));
    }

    Ok(ForceResult {
        chip_area,
        base_force,
        total_force,
        force_per_diameter,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{test_material, test_tool};

    #[test]
    fn test_base_force() {
        let material = test_material();
        let tool = test_tool();
        let result = calculate_force(&material, &tool, 6.0, 1.5, 0.05, &CalcConfig::default()).unwrap();
        assert!((result.chip_area - 0.075).abs() < 1e-12);
        let expected = material.force_coefficient * 0.075 * 1000.0;
        assert!((result.base_force - expected).abs() < 1e-9);
        // uncoated carbide flat end mill: no multipliers
        assert!((result.total_force - expected).abs() < 1e-9);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_drill_multiplier() {
        let material = test_material();
        let tool = Tool {
            tool_type: ToolType::Drill,
            ..test_tool()
        };
        let result = calculate_force(&material, &tool, 6.0, 1.5, 0.05, &CalcConfig::default()).unwrap();
        assert!((result.total_force - result.base_force * 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_coating_reduces_force() {
        assert!(tool_force_factor(ToolMaterial::Carbide, Coating::TiAlN) < 1.0);
        assert!(tool_force_factor(ToolMaterial::Hss, Coating::None) > 1.0);
    }

    #[test]
    fn test_force_thresholds() {
        let material = test_material();
        let tool = test_tool();
        let cfg = CalcConfig::default();

        // force_coefficient 0.8: 6 mm * 0.5 mm/tooth -> 2400 N, 400 N/mm
        let warn = calculate_force(&material, &tool, 6.0, 6.0, 0.5, &cfg).unwrap();
        assert_eq!(warn.warnings[0].severity, Severity::Warning);

        // 6 mm * 1.0 -> 4800 N, 800 N/mm
        let danger = calculate_force(&material, &tool, 6.0, 6.0, 1.0, &cfg).unwrap();
        assert_eq!(danger.warnings[0].severity, Severity::Danger);
    }
}
