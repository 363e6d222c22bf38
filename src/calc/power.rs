//! Required power, available spindle power and power limiting

use super::*;
use crate::units;

pub fn tool_power_factor(tool_type: ToolType) -> f64 {
    match tool_type {
        ToolType::FlatEndMill => 1.0,
        ToolType::Drill => 1.3,
        ToolType::VBit => 0.9,
        ToolType::FaceMill => 0.8,
        ToolType::Boring => 1.1,
        ToolType::SlittingSaw => 1.2,
    }
}

/// Interpolate a power curve (kW) at `rpm`.
///
/// The curve is sorted first; RPM outside the sampled span takes the
/// nearest endpoint's power. Returns `None` for an empty curve.
pub fn interpolate_power_curve(curve: &[PowerPoint], rpm: f64) -> Option<f64> {
    let mut points = curve.to_vec();
    points.sort_by(|a, b| a.rpm.total_cmp(&b.rpm));

    let first = *points.first()?;
    let last = *points.last()?;
    if rpm <= first.rpm {
        return Some(first.power_kw);
    }
    if rpm >= last.rpm {
        return Some(last.power_kw);
    }

    if let Some(sample) = points.iter().find(|p| p.rpm == rpm) {
        return Some(sample.power_kw);
    }

    points.windows(2).find_map(|w| {
        let (lo, hi) = (w[0], w[1]);
        if rpm >= lo.rpm && rpm <= hi.rpm {
            if hi.rpm == lo.rpm {
                return Some(lo.power_kw);
            }
            let pct = (rpm - lo.rpm) / (hi.rpm - lo.rpm);
            Some(lo.power_kw * (1.0 - pct) + hi.power_kw * pct)
        } else {
            None
        }
    })
}

/// Spindle power available at `rpm`, in watts
pub fn spindle_power_at_rpm(spindle: &Spindle, rpm: f64) -> Result<f64, CalcError> {
    interpolate_power_curve(&spindle.power_curve, rpm)
        .map(units::kw_to_w)
        .ok_or_else(|| CalcError::EmptyPowerCurve(spindle.id.clone()))
}

/// Outcome of the power-limiting decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLimit {
    pub limited: bool,
    /// (available * safety) / required, present only when limited
    pub scaling_factor: Option<f64>,
}

pub fn power_limit(required: f64, available: f64, config: &CalcConfig) -> PowerLimit {
    if required > 0.0 && required > available * config.power_limit_threshold {
        PowerLimit {
            limited: true,
            scaling_factor: Some(available * config.power_safety_factor / required),
        }
    } else {
        PowerLimit {
            limited: false,
            scaling_factor: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PowerResult {
    /// All in watts
    pub cutting_power: f64,
    pub power_with_tool: f64,
    pub spindle_losses: f64,
    pub required_power: f64,
    pub available_power: f64,
    pub limit: PowerLimit,
    pub warnings: Vec<Warning>,
}

pub struct PowerParams<'a> {
    pub material: &'a Material,
    pub tool: &'a Tool,
    pub machine: &'a Machine,
    pub spindle: &'a Spindle,
    /// mm^3/min
    pub mrr: f64,
    pub rpm: f64,
    /// Early-warning fraction of available power from a machine-class adjustment
    pub early_warning: Option<f64>,
}

pub fn calculate_power(params: &PowerParams<'_>, config: &CalcConfig) -> Result<PowerResult, CalcError> {
    // mm^3/min * J/mm^3 / 60 -> W
    let cutting_power = params.mrr * params.material.specific_energy / 60.0;
    let power_with_tool =
        cutting_power * tool_power_factor(params.tool.tool_type) * params.machine.rigidity;
    let spindle_losses = power_with_tool * config.spindle_loss_fraction;
    let required_power = power_with_tool + spindle_losses;
    let available_power = spindle_power_at_rpm(params.spindle, params.rpm)?;

    let limit = power_limit(required_power, available_power, config);
    let mut warnings = Vec::new();

    if let Some(factor) = limit.scaling_factor {
        tracing::warn!(
            required_power,
            available_power,
            factor,
            "cut is power-limited"
        );
        warnings.push(Warning::new(
            WarningKind::Power,
            Severity::Danger,
            format!(
                "Requires {:.0} W but spindle delivers {:.0} W at {:.0} RPM; scale feed by {:.2}",
                required_power, available_power, params.rpm, factor
            ),
        ));
    } else if let Some(fraction) = params.early_warning {
        if required_power > available_power * fraction {
            warnings.push(Warning::new(
                WarningKind::Power,
                Severity::Info,
                format!(
                    "Using {:.0}% of available spindle power",
                    required_power / available_power * 100.0
                ),
            ));
        }
    }

    Ok(PowerResult {
        cutting_power,
        power_with_tool,
        spindle_losses,
        required_power,
        available_power,
        limit,
        warnings,
    })
}
