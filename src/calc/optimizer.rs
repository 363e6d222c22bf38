//! Grid search over tool diameter and stickout for a target deflection

use super::deflection::{amplification_factor, natural_frequency, static_deflection};
use super::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Inclusive search interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchRange {
    pub min: f64,
    pub max: f64,
}

impl SearchRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `steps` evenly spaced values, endpoints included
    fn samples(&self, steps: usize) -> Vec<f64> {
        if steps <= 1 || self.min == self.max {
            return vec![self.min];
        }
        let step = (self.max - self.min) / (steps - 1) as f64;
        (0..steps).map(|i| self.min + step * i as f64).collect()
    }

    fn check(&self, what: &'static str) -> Result<(), CalcError> {
        if self.min <= 0.0 {
            return Err(CalcError::NonPositive {
                quantity: what,
                value: self.min,
            });
        }
        if self.min > self.max {
            return Err(CalcError::InvalidRange {
                what,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeflectionTargetRequest {
    /// mm
    pub target_deflection: f64,
    /// N
    pub force: f64,
    pub rpm: f64,
    pub flutes: u32,
    pub tool_material: ToolMaterial,
    pub diameter_range: SearchRange,
    pub stickout_range: SearchRange,
    /// Samples per axis
    pub steps: usize,
    pub top_n: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSuggestion {
    pub diameter: f64,
    pub stickout: f64,
    pub predicted_deflection: f64,
    /// |predicted - target|, mm
    pub error: f64,
    pub relative_error: f64,
    /// N per mm of predicted deflection
    pub rigidity_score: f64,
}

fn evaluate(
    request: &DeflectionTargetRequest,
    diameter: f64,
    stickout: f64,
    config: &CalcConfig,
) -> ToolSuggestion {
    let material = request.tool_material.name();
    let s = static_deflection(
        request.force,
        stickout,
        diameter,
        material,
        config.holder_compliance,
    );
    let operating = request.rpm / 60.0 * request.flutes as f64;
    let ratio = operating / natural_frequency(stickout, diameter, material);
    let predicted = s.total * amplification_factor(ratio, config.damping_ratio);
    let error = (predicted - request.target_deflection).abs();

    ToolSuggestion {
        diameter,
        stickout,
        predicted_deflection: predicted,
        error,
        relative_error: error / request.target_deflection,
        rigidity_score: if predicted > 0.0 {
            request.force / predicted
        } else {
            f64::INFINITY
        },
    }
}

/// Rank (diameter, stickout) candidates by how closely they hit the target.
///
/// Unreachable targets still return the closest candidates.
pub fn suggest_tools_for_target_deflection(
    request: &DeflectionTargetRequest,
    config: &CalcConfig,
) -> Result<Vec<ToolSuggestion>, CalcError> {
    if request.target_deflection <= 0.0 {
        return Err(CalcError::NonPositive {
            quantity: "target deflection",
            value: request.target_deflection,
        });
    }
    if request.flutes == 0 {
        return Err(CalcError::NonPositive {
            quantity: "flute count",
            value: 0.0,
        });
    }
    request.diameter_range.check("diameter range")?;
    request.stickout_range.check("stickout range")?;

    let diameters = request.diameter_range.samples(request.steps);
    let stickouts = request.stickout_range.samples(request.steps);
    let grid: Vec<(f64, f64)> = diameters
        .iter()
        .flat_map(|&d| stickouts.iter().map(move |&l| (d, l)))
        .collect();

    #[cfg(feature = "parallel")]
    let mut suggestions: Vec<ToolSuggestion> = grid
        .par_iter()
        .map(|&(d, l)| evaluate(request, d, l, config))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let mut suggestions: Vec<ToolSuggestion> = grid
        .iter()
        .map(|&(d, l)| evaluate(request, d, l, config))
        .collect();

    // stable: ties keep grid order
    suggestions.sort_by(|a, b| a.error.total_cmp(&b.error));
    suggestions.truncate(request.top_n.max(1));

    tracing::debug!(
        candidates = grid.len(),
        best_error = suggestions.first().map(|s| s.error),
        "deflection search complete"
    );

    Ok(suggestions)
}

/// Search around the geometry a computed cut actually used: half to double
/// its effective diameter, and stickouts from half to one and a half times
/// the cut's stickout. Force, RPM and flute count come from the cut.
pub fn suggest_tools_for_tool(
    tool: &Tool,
    cut: &CalculationOutput,
    target_deflection: f64,
    config: &CalcConfig,
) -> Result<Vec<ToolSuggestion>, CalcError> {
    let diameter = cut.metadata.effective_diameter;
    let diameter_range = SearchRange::new(diameter * 0.5, diameter * 2.0);
    let stickout_min = (diameter_range.min * 1.5).max(cut.stickout * 0.5);
    let stickout_max = (cut.stickout * 1.5).max(stickout_min);

    let request = DeflectionTargetRequest {
        target_deflection,
        force: cut.cutting_force,
        rpm: cut.rpm,
        flutes: cut.metadata.effective_flutes,
        tool_material: tool.tool_material,
        diameter_range,
        stickout_range: SearchRange::new(stickout_min, stickout_max),
        steps: config.optimizer_steps,
        top_n: config.optimizer_top_n,
    };
    suggest_tools_for_target_deflection(&request, config)
}
