//! Result record, display rounding and power rescaling

use super::*;
use crate::rigidity::MachineClass;
use crate::units;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputMetadata {
    pub tool_type: ToolType,
    pub effective_diameter: f64,
    pub effective_flutes: u32,
    pub doc_overridden: bool,
}

/// Everything one calculation produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationOutput {
    pub rpm: f64,
    pub theoretical_rpm: f64,
    /// m/min
    pub surface_speed: f64,
    /// ft/min
    pub surface_speed_ft_min: f64,
    /// mm/min
    pub feed_rate: f64,
    /// mm/tooth
    pub chipload: f64,
    pub chipload_range: (f64, f64),
    pub chip_thinning_factor: f64,
    pub radial_engagement: f64,
    pub axial_engagement: f64,
    /// mm^3/min
    pub mrr: f64,
    /// W
    pub cutting_power: f64,
    pub required_power: f64,
    pub available_power: f64,
    pub power_limited: bool,
    pub power_scaling_factor: Option<f64>,
    pub power_scaling_applied: bool,
    /// N
    pub cutting_force: f64,
    /// mm; static = bending + shear + holder
    pub bending_deflection: f64,
    pub shear_deflection: f64,
    pub holder_deflection: f64,
    pub static_deflection: f64,
    pub total_deflection: f64,
    pub amplification_factor: f64,
    pub frequency_ratio: f64,
    pub natural_frequency: f64,
    pub stickout: f64,
    pub machine_class: MachineClass,
    pub hobby_adjusted: bool,
    pub warnings: Vec<Warning>,
    pub metadata: OutputMetadata,
}

/// Stage results gathered by `compute`
pub struct StageResults {
    pub geometry: (f64, u32),
    pub stickout: f64,
    pub speed: SpeedResult,
    pub engagement: Engagement,
    pub chipload: ChiploadResult,
    pub mrr: f64,
    pub force: ForceResult,
    pub power: PowerResult,
    pub deflection: DeflectionResult,
    pub machine_class: MachineClass,
    pub hobby_adjusted: bool,
}

/// Merge stage results and warnings into one record. Warnings keep the
/// order they were raised in, grouped by stage: `leading` (validation and
/// machine class) first, deflection last.
pub fn assemble_output(
    tool_type: ToolType,
    results: StageResults,
    leading: Vec<Warning>,
    deflection_warnings: Vec<Warning>,
) -> CalculationOutput {
    let StageResults {
        geometry: (effective_diameter, effective_flutes),
        stickout,
        speed,
        engagement,
        chipload,
        mrr,
        force,
        power,
        deflection,
        machine_class,
        hobby_adjusted,
    } = results;

    let mut warnings = leading;
    warnings.extend(speed.warnings);
    warnings.extend(engagement.warnings);
    warnings.extend(chipload.warnings);
    warnings.extend(force.warnings);
    warnings.extend(power.warnings);
    warnings.extend(deflection_warnings);

    CalculationOutput {
        rpm: speed.rpm,
        theoretical_rpm: speed.theoretical_rpm,
        surface_speed: speed.surface_speed,
        surface_speed_ft_min: units::m_min_to_ft_min(speed.surface_speed),
        feed_rate: chipload.feed_rate,
        chipload: chipload.chipload,
        chipload_range: chipload.range,
        chip_thinning_factor: chipload.thinning_factor,
        radial_engagement: engagement.radial,
        axial_engagement: engagement.axial,
        mrr,
        cutting_power: power.cutting_power,
        required_power: power.required_power,
        available_power: power.available_power,
        power_limited: power.limit.limited,
        power_scaling_factor: power.limit.scaling_factor,
        power_scaling_applied: false,
        cutting_force: force.total_force,
        bending_deflection: deflection.static_deflection.bending,
        shear_deflection: deflection.static_deflection.shear,
        holder_deflection: deflection.static_deflection.holder,
        static_deflection: deflection.static_deflection.total,
        total_deflection: deflection.total,
        amplification_factor: deflection.amplification,
        frequency_ratio: deflection.frequency_ratio,
        natural_frequency: deflection.natural_frequency,
        stickout,
        machine_class,
        hobby_adjusted,
        warnings,
        metadata: OutputMetadata {
            tool_type,
            effective_diameter,
            effective_flutes,
            doc_overridden: engagement.doc_overridden,
        },
    }
}

impl CalculationOutput {
    /// Second phase of power limiting: scale feed, MRR and feed per tooth by
    /// the reported factor. Calling it again is a no-op.
    pub fn apply_power_scaling(&self) -> CalculationOutput {
        let mut out = self.clone();
        if let (Some(factor), false) = (self.power_scaling_factor, self.power_scaling_applied) {
            out.feed_rate *= factor;
            out.mrr *= factor;
            out.chipload *= factor;
            out.power_scaling_applied = true;
        }
        out
    }

    /// MRR in cm^3/min
    pub fn mrr_cm3(&self) -> f64 {
        units::mm3_to_cm3(self.mrr)
    }

    pub fn worst_severity(&self) -> Option<Severity> {
        self.warnings.iter().map(|w| w.severity).max()
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Fixed-precision copy for display. Idempotent.
pub fn apply_output_rounding(output: &CalculationOutput) -> CalculationOutput {
    let mut out = output.clone();

    out.rpm = output.rpm.round();
    out.theoretical_rpm = output.theoretical_rpm.round();
    out.feed_rate = output.feed_rate.round();
    out.surface_speed = output.surface_speed.round();
    out.surface_speed_ft_min = output.surface_speed_ft_min.round();

    out.chipload = round_to(output.chipload, 4);
    out.chipload_range = (
        round_to(output.chipload_range.0, 4),
        round_to(output.chipload_range.1, 4),
    );

    out.radial_engagement = round_to(output.radial_engagement, 2);
    out.axial_engagement = round_to(output.axial_engagement, 2);
    out.stickout = round_to(output.stickout, 2);
    out.metadata.effective_diameter = round_to(output.metadata.effective_diameter, 2);

    out.mrr = round_to(output.mrr, 1);
    out.cutting_power = round_to(output.cutting_power, 1);
    out.required_power = round_to(output.required_power, 1);
    out.available_power = round_to(output.available_power, 1);
    out.cutting_force = round_to(output.cutting_force, 1);
    out.natural_frequency = round_to(output.natural_frequency, 1);

    out.bending_deflection = round_to(output.bending_deflection, 4);
    out.shear_deflection = round_to(output.shear_deflection, 4);
    out.holder_deflection = round_to(output.holder_deflection, 4);
    out.static_deflection = round_to(output.static_deflection, 4);
    out.total_deflection = round_to(output.total_deflection, 4);

    out.chip_thinning_factor = round_to(output.chip_thinning_factor, 3);
    out.amplification_factor = round_to(output.amplification_factor, 3);
    out.frequency_ratio = round_to(output.frequency_ratio, 3);
    out.power_scaling_factor = output.power_scaling_factor.map(|f| round_to(f, 3));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::compute;
    use crate::catalog::fixtures::{test_catalog, test_inputs};
    use pretty_assertions::assert_eq;

    fn sample() -> CalculationOutput {
        compute(&test_inputs(), &test_catalog(), &CalcConfig::default()).unwrap()
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(2.34, 1), 2.3);
        assert_eq!(round_to(-1.25, 1), -1.3);
    }

    #[test]
    fn test_rounding_precisions() {
        let rounded = apply_output_rounding(&sample());
        assert_eq!(rounded.rpm, rounded.rpm.trunc());
        assert_eq!(rounded.feed_rate, rounded.feed_rate.trunc());
        assert_eq!(rounded.surface_speed_ft_min, rounded.surface_speed_ft_min.trunc());
        assert_eq!(rounded.chipload, round_to(rounded.chipload, 4));
        assert_eq!(rounded.mrr, round_to(rounded.mrr, 1));
    }

    #[test]
    fn test_rounding_idempotent() {
        let once = apply_output_rounding(&sample());
        let twice = apply_output_rounding(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_deflection_breakdown_sums_to_static() {
        let out = sample();
        let sum = out.bending_deflection + out.shear_deflection + out.holder_deflection;
        assert!((sum - out.static_deflection).abs() < 1e-12);
        assert!((out.holder_deflection - out.cutting_force * 0.002).abs() < 1e-12);
        assert!(out.bending_deflection > 0.0 && out.shear_deflection > 0.0);

        let rounded = apply_output_rounding(&out);
        assert_eq!(rounded.bending_deflection, round_to(out.bending_deflection, 4));
        assert_eq!(rounded.holder_deflection, round_to(out.holder_deflection, 4));
    }

    #[test]
    fn test_worst_severity() {
        let mut out = sample();
        out.warnings.clear();
        assert_eq!(out.worst_severity(), None);

        out.warnings.push(Warning::new(WarningKind::Force, Severity::Info, "a".to_string()));
        out.warnings.push(Warning::new(WarningKind::Power, Severity::Danger, "b".to_string()));
        out.warnings.push(Warning::new(WarningKind::Speed, Severity::Warning, "c".to_string()));
        assert_eq!(out.worst_severity(), Some(Severity::Danger));
    }

    #[test]
    fn test_surface_speed_imperial() {
        let out = sample();
        assert!((out.surface_speed_ft_min - out.surface_speed * 3.28084).abs() < 1e-3);
    }

    #[test]
    fn test_power_scaling_applied_once() {
        let mut out = sample();
        out.power_limited = true;
        out.power_scaling_factor = Some(0.5);

        let scaled = out.apply_power_scaling();
        assert!((scaled.feed_rate - out.feed_rate * 0.5).abs() < 1e-9);
        assert!((scaled.mrr - out.mrr * 0.5).abs() < 1e-9);
        assert!(scaled.power_scaling_applied);

        let again = scaled.apply_power_scaling();
        assert_eq!(again, scaled);
    }

    #[test]
    fn test_scaling_without_limit_is_noop() {
        let out = sample();
        assert_eq!(out.power_scaling_factor, None);
        assert_eq!(out.apply_power_scaling(), out);
    }
}
