//! Radial/axial engagement and material removal rate

use super::*;
use std::f64::consts::PI;

/// Workpiece engagement for one pass
#[derive(Debug, Clone, PartialEq)]
pub struct Engagement {
    /// Width of cut (ae), mm
    pub radial: f64,
    /// Depth of cut (ap), mm
    pub axial: f64,
    pub doc_overridden: bool,
    pub woc_overridden: bool,
    pub warnings: Vec<Warning>,
}

pub struct EngagementParams<'a> {
    pub tool: &'a Tool,
    pub machine: &'a Machine,
    pub material: &'a Material,
    pub effective_diameter: f64,
    pub doc: Option<f64>,
    pub woc: Option<f64>,
    /// Machine-class caps as fractions of diameter (radial, axial)
    pub class_caps: Option<(f64, f64)>,
}

/// Resolve engagement: user override, else the tool default scaled by the
/// machine's axis aggressiveness, then clamp to the material limit.
pub fn resolve_engagement(params: &EngagementParams<'_>) -> Result<Engagement, CalcError> {
    let d = params.effective_diameter;
    if d <= 0.0 {
        return Err(CalcError::NonPositive {
            quantity: "effective diameter",
            value: d,
        });
    }

    let mut warnings = Vec::new();
    let mut radial = params
        .woc
        .unwrap_or(params.tool.default_woc * params.machine.aggressiveness.radial);
    let mut axial = params
        .doc
        .unwrap_or(params.tool.default_doc * params.machine.aggressiveness.axial);

    let limit = params.material.max_engagement * d;
    if radial > limit {
        warnings.push(Warning::new(
            WarningKind::Engagement,
            Severity::Warning,
            format!(
                "Radial engagement {:.2} mm exceeds {} limit; clamped to {:.2} mm",
                radial, params.material.id, limit
            ),
        ));
        radial = limit;
    }
    if axial > limit {
        warnings.push(Warning::new(
            WarningKind::Engagement,
            Severity::Warning,
            format!(
                "Axial engagement {:.2} mm exceeds {} limit; clamped to {:.2} mm",
                axial, params.material.id, limit
            ),
        ));
        axial = limit;
    }

    if let Some((radial_frac, axial_frac)) = params.class_caps {
        let radial_cap = radial_frac * d;
        let axial_cap = axial_frac * d;
        if radial > radial_cap {
            warnings.push(Warning::new(
                WarningKind::Rigidity,
                Severity::Info,
                format!(
                    "Radial engagement capped at {:.2} mm for this machine class",
                    radial_cap
                ),
            ));
            radial = radial_cap;
        }
        if axial > axial_cap {
            warnings.push(Warning::new(
                WarningKind::Rigidity,
                Severity::Info,
                format!(
                    "Axial engagement capped at {:.2} mm for this machine class",
                    axial_cap
                ),
            ));
            axial = axial_cap;
        }
    }

    Ok(Engagement {
        radial,
        axial,
        doc_overridden: params.doc.is_some(),
        woc_overridden: params.woc.is_some(),
        warnings,
    })
}

/// Material removal rate in mm^3/min
pub fn material_removal_rate(
    tool_type: ToolType,
    effective_diameter: f64,
    radial: f64,
    axial: f64,
    feed_rate: f64,
) -> Result<f64, CalcError> {
    if effective_diameter <= 0.0 {
        return Err(CalcError::NonPositive {
            quantity: "effective diameter",
            value: effective_diameter,
        });
    }
    if feed_rate < 0.0 {
        return Err(CalcError::NegativeFeed(feed_rate));
    }

    Ok(match tool_type {
        ToolType::Drill => PI * effective_diameter.powi(2) / 4.0 * feed_rate,
        ToolType::FlatEndMill
        | ToolType::VBit
        | ToolType::FaceMill
        | ToolType::Boring
        | ToolType::SlittingSaw => radial * axial * feed_rate,
    })
}
