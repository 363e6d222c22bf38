//! Chipload lookup, chip thinning and feed rate

use super::*;

/// Chipload range for a diameter, interpolated between table rows.
///
/// Rows need not be sorted. Diameters outside the table clamp to the
/// nearest row.
pub fn lookup_chipload_range(material: &Material, diameter: f64) -> Result<(f64, f64), CalcError> {
    let mut rows = material.chipload_table.clone();
    if rows.is_empty() {
        return Err(CalcError::EmptyChiploadTable(material.id.clone()));
    }
    rows.sort_by(|a, b| a.diameter.total_cmp(&b.diameter));

    if let Some(exact) = rows.iter().find(|r| r.diameter == diameter) {
        return Ok((exact.min, exact.max));
    }

    let first = rows[0];
    let last = rows[rows.len() - 1];
    if diameter <= first.diameter {
        return Ok((first.min, first.max));
    }
    if diameter >= last.diameter {
        return Ok((last.min, last.max));
    }

    let upper_idx = rows
        .iter()
        .position(|r| r.diameter > diameter)
        .unwrap_or(rows.len() - 1);
    let lo = rows[upper_idx - 1];
    let hi = rows[upper_idx];
    let pct = (diameter - lo.diameter) / (hi.diameter - lo.diameter);

    Ok((
        lo.min + (hi.min - lo.min) * pct,
        lo.max + (hi.max - lo.max) * pct,
    ))
}

pub fn tool_type_chipload_factor(tool_type: ToolType) -> f64 {
    match tool_type {
        ToolType::FlatEndMill => 1.0,
        ToolType::Drill => 0.8,
        ToolType::VBit => 0.5,
        ToolType::FaceMill => 1.2,
        ToolType::Boring => 0.6,
        ToolType::SlittingSaw => 0.4,
    }
}

pub fn coating_chipload_factor(coating: Coating) -> f64 {
    match coating {
        Coating::None => 1.0,
        Coating::TiN | Coating::TiCN | Coating::ZrN => 1.05,
        Coating::TiAlN | Coating::AlTiN | Coating::Dlc => 1.1,
        Coating::Diamond => 1.15,
    }
}

/// Chipload multiplier that keeps the real chip thickness when the radial
/// engagement is small. Returns 1.0 when thinning does not apply.
pub fn chip_thinning_factor(diameter: f64, woc: f64, thinning: &ChipThinning) -> f64 {
    if woc <= 0.0 || woc >= diameter * thinning.engage_below {
        return 1.0;
    }
    (diameter / woc)
        .sqrt()
        .clamp(1.0, thinning.limit_factor.max(1.0))
}

pub struct ChiploadParams<'a> {
    pub material: &'a Material,
    pub tool: &'a Tool,
    pub machine: &'a Machine,
    pub effective_diameter: f64,
    pub effective_flutes: u32,
    pub rpm: f64,
    /// Resolved radial engagement
    pub woc: f64,
    pub aggressiveness: f64,
    /// Extra derating from a machine-class adjustment
    pub chipload_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChiploadResult {
    /// Table range at the effective diameter, before any adjustment
    pub range: (f64, f64),
    pub base_chipload: f64,
    pub thinning_factor: f64,
    /// Final feed per tooth, back-solved when the feed was clamped
    pub chipload: f64,
    /// mm/min
    pub feed_rate: f64,
    pub feed_clamped: bool,
    pub warnings: Vec<Warning>,
}

pub fn calculate_chipload(
    params: &ChiploadParams<'_>,
    config: &CalcConfig,
) -> Result<ChiploadResult, CalcError> {
    if params.rpm <= 0.0 {
        return Err(CalcError::NonPositive {
            quantity: "RPM",
            value: params.rpm,
        });
    }
    if params.effective_flutes == 0 {
        return Err(CalcError::NonPositive {
            quantity: "flute count",
            value: 0.0,
        });
    }

    let mut warnings = Vec::new();
    let range = lookup_chipload_range(params.material, params.effective_diameter)?;
    let midpoint = (range.0 + range.1) / 2.0;

    let base_chipload = midpoint
        * params.aggressiveness
        * params.machine.aggressiveness.feed
        * tool_type_chipload_factor(params.tool.tool_type)
        * coating_chipload_factor(params.tool.coating)
        * params.chipload_multiplier;

    let thinning_factor = chip_thinning_factor(
        params.effective_diameter,
        params.woc,
        &params.material.chip_thinning,
    );
    let mut chipload = base_chipload * thinning_factor;

    let flutes = params.effective_flutes as f64;
    let mut feed_rate = params.rpm * flutes * chipload;
    let mut feed_clamped = false;

    if feed_rate > params.machine.max_feed {
        warnings.push(Warning::new(
            WarningKind::Chipload,
            Severity::Warning,
            format!(
                "Feed {:.0} mm/min exceeds machine limit; clamped to {:.0} mm/min",
                feed_rate, params.machine.max_feed
            ),
        ));
        feed_rate = params.machine.max_feed;
        chipload = feed_rate / (params.rpm * flutes);
        feed_clamped = true;
    }

    if chipload < range.0 * config.chipload_low_factor {
        warnings.push(Warning::new(
            WarningKind::Chipload,
            Severity::Danger,
            format!(
                "Chipload {:.4} mm is far below the {:.4} mm minimum; the tool will rub",
                chipload, range.0
            ),
        ));
    } else if chipload > range.1 * config.chipload_high_factor {
        warnings.push(Warning::new(
            WarningKind::Chipload,
            Severity::Warning,
            format!(
                "Chipload {:.4} mm is well above the {:.4} mm maximum",
                chipload, range.1
            ),
        ));
    }

    tracing::debug!(
        base_chipload,
        thinning_factor,
        chipload,
        feed_rate,
        "chipload resolved"
    );

    Ok(ChiploadResult {
        range,
        base_chipload,
        thinning_factor,
        chipload,
        feed_rate,
        feed_clamped,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{test_machine, test_material, test_tool};

    fn two_row_material() -> Material {
        Material {
            chipload_table: vec![
                ChiploadEntry {
                    diameter: 12.0,
                    min: 0.08,
                    max: 0.12,
                },
                ChiploadEntry {
                    diameter: 3.0,
                    min: 0.02,
                    max: 0.04,
                },
            ],
            ..test_material()
        }
    }

    #[test]
    fn test_exact_row() {
        let m = two_row_material();
        assert_eq!(lookup_chipload_range(&m, 3.0).unwrap(), (0.02, 0.04));
        assert_eq!(lookup_chipload_range(&m, 12.0).unwrap(), (0.08, 0.12));
    }

    #[test]
    fn test_interpolates_between_rows() {
        let m = two_row_material();
        // 6 mm is a third of the way from 3 to 12
        let (min, max) = lookup_chipload_range(&m, 6.0).unwrap();
        assert!((min - 0.04).abs() < 1e-12, "min {}", min);
        assert!((max - (0.04 + 0.08 / 3.0)).abs() < 1e-12, "max {}", max);
    }

    #[test]
    fn test_clamps_outside_table() {
        let m = two_row_material();
        assert_eq!(lookup_chipload_range(&m, 1.0).unwrap(), (0.02, 0.04));
        assert_eq!(lookup_chipload_range(&m, 25.0).unwrap(), (0.08, 0.12));
    }

    #[test]
    fn test_empty_table_fails() {
        let m = Material {
            chipload_table: vec![],
            ..test_material()
        };
        assert!(matches!(
            lookup_chipload_range(&m, 6.0),
            Err(CalcError::EmptyChiploadTable(_))
        ));
    }

    #[test]
    fn test_chip_thinning() {
        let thinning = ChipThinning {
            engage_below: 0.5,
            limit_factor: 2.0,
        };
        // Full slot: no thinning
        assert_eq!(chip_thinning_factor(6.0, 6.0, &thinning), 1.0);
        // 1.5 mm on 6 mm: sqrt(4) = 2
        assert!((chip_thinning_factor(6.0, 1.5, &thinning) - 2.0).abs() < 1e-12);
        // 0.6 mm: sqrt(10) capped at 2
        assert_eq!(chip_thinning_factor(6.0, 0.6, &thinning), 2.0);
        // 2.5 mm: sqrt(2.4)
        assert!((chip_thinning_factor(6.0, 2.5, &thinning) - 2.4_f64.sqrt()).abs() < 1e-12);
        // zero width disables thinning
        assert_eq!(chip_thinning_factor(6.0, 0.0, &thinning), 1.0);
    }

    fn params<'a>(
        material: &'a Material,
        tool: &'a Tool,
        machine: &'a Machine,
        rpm: f64,
        woc: f64,
    ) -> ChiploadParams<'a> {
        ChiploadParams {
            material,
            tool,
            machine,
            effective_diameter: 6.0,
            effective_flutes: 3,
            rpm,
            woc,
            aggressiveness: 1.0,
            chipload_multiplier: 1.0,
        }
    }

    #[test]
    fn test_feed_from_chipload() {
        let material = test_material();
        let tool = test_tool();
        let machine = test_machine();
        let result = calculate_chipload(&params(&material, &tool, &machine, 10000.0, 6.0), &CalcConfig::default())
            .unwrap();

        let (min, max) = result.range;
        assert!((result.base_chipload - (min + max) / 2.0).abs() < 1e-12);
        assert_eq!(result.thinning_factor, 1.0);
        assert!((result.feed_rate - 10000.0 * 3.0 * result.chipload).abs() < 1e-9);
        assert!(!result.feed_clamped);
    }

    #[test]
    fn test_feed_clamped_to_machine() {
        let material = test_material();
        let tool = test_tool();
        let machine = Machine {
            max_feed: 500.0,
            ..test_machine()
        };
        let result = calculate_chipload(&params(&material, &tool, &machine, 20000.0, 6.0), &CalcConfig::default())
            .unwrap();
        assert!(result.feed_clamped);
        assert_eq!(result.feed_rate, 500.0);
        assert!((result.chipload - 500.0 / (20000.0 * 3.0)).abs() < 1e-12);
        assert!(result.warnings.iter().any(|w| w.message.contains("clamped")));
        // 0.0083 mm/tooth is rubbing territory for the fixture material
        assert!(result
            .warnings
            .iter()
            .any(|w| w.severity == Severity::Danger));
    }

    #[test]
    fn test_thinning_raises_feed() {
        let material = test_material();
        let tool = test_tool();
        let machine = test_machine();
        let cfg = CalcConfig::default();
        let slot = calculate_chipload(&params(&material, &tool, &machine, 10000.0, 6.0), &cfg).unwrap();
        let light = calculate_chipload(&params(&material, &tool, &machine, 10000.0, 0.6), &cfg).unwrap();
        assert!(light.feed_rate > slot.feed_rate);
    }

    #[test]
    fn test_high_chipload_warning() {
        let material = test_material();
        let tool = test_tool();
        let machine = test_machine();
        let mut p = params(&material, &tool, &machine, 10000.0, 6.0);
        p.aggressiveness = 3.0;
        let result = calculate_chipload(&p, &CalcConfig::default()).unwrap();
        assert!(result
            .warnings
            .iter()
            .any(|w| w.severity == Severity::Warning && w.message.contains("above")));
    }
}
