//! Feeds and speeds pipeline
//!
//! A calculation resolves the catalog records named by [`Inputs`], then runs
//! the stages in order:
//! - effective geometry (diameter, flutes)
//! - surface speed and RPM
//! - engagement (WOC/DOC)
//! - chipload, chip thinning and feed
//! - MRR, cutting force, power
//! - deflection
//!
//! Every stage reports its own warnings; [`compute`] merges them into one
//! [`CalculationOutput`]. Power limiting is two-phase: `compute` reports the
//! scaling factor and [`CalculationOutput::apply_power_scaling`] applies it.

pub use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod chipload;
pub mod deflection;
pub mod engagement;
pub mod force;
pub mod geometry;
pub mod optimizer;
pub mod output;
pub mod power;
pub mod speed;
pub mod validators;

pub use chipload::{calculate_chipload, lookup_chipload_range, ChiploadParams, ChiploadResult};
pub use deflection::{calculate_deflection, DeflectionParams, DeflectionResult, StaticDeflection};
pub use engagement::{material_removal_rate, resolve_engagement, Engagement, EngagementParams};
pub use force::{calculate_force, ForceResult};
pub use geometry::{effective_diameter, effective_flutes};
pub use optimizer::{
    suggest_tools_for_target_deflection, suggest_tools_for_tool, DeflectionTargetRequest,
    SearchRange, ToolSuggestion,
};
pub use output::{apply_output_rounding, assemble_output, CalculationOutput, OutputMetadata, StageResults};
pub use power::{calculate_power, interpolate_power_curve, spindle_power_at_rpm, PowerLimit, PowerParams, PowerResult};
pub use speed::{calculate_speed, SpeedParams, SpeedResult};
pub use validators::{validate_inputs, Validated, ValidationErrors};

pub use crate::catalog::Catalog;
pub use crate::config::CalcConfig;
pub use crate::model::*;

use crate::rigidity::{self, MachineClass};

/// How bad a warning is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Danger,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Danger => write!(f, "danger"),
        }
    }
}

/// Stage that raised a warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    Validation,
    Rigidity,
    Speed,
    Engagement,
    Chipload,
    Force,
    Power,
    Deflection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub severity: Severity,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

/// Calculation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("unknown {kind} '{id}'")]
    UnknownReference { kind: &'static str, id: String },

    #[error("{quantity} must be positive, got {value}")]
    NonPositive { quantity: &'static str, value: f64 },

    #[error("tool '{tool_id}' ({tool_type}) is missing metadata field '{field}'")]
    MissingMetadata {
        tool_id: String,
        tool_type: ToolType,
        field: &'static str,
    },

    #[error("tool '{tool_id}' ({tool_type}) needs a depth of cut to size its cut")]
    MissingDepth { tool_id: String, tool_type: ToolType },

    #[error("unknown tool type '{0}'")]
    UnknownToolType(String),

    #[error("unknown cut type '{0}'")]
    UnknownCutType(String),

    #[error("invalid {what} range: min {min} > max {max}")]
    InvalidRange { what: &'static str, min: f64, max: f64 },

    #[error("material '{0}' has an empty chipload table")]
    EmptyChiploadTable(String),

    #[error("spindle '{0}' has an empty power curve")]
    EmptyPowerCurve(String),

    #[error("feed rate cannot be negative, got {0}")]
    NegativeFeed(f64),

    #[error("{0}")]
    Validation(ValidationErrors),
}

impl From<ValidationErrors> for CalcError {
    fn from(errors: ValidationErrors) -> Self {
        CalcError::Validation(errors)
    }
}

/// Run the full pipeline for one request.
pub fn compute(
    inputs: &Inputs,
    catalog: &Catalog,
    config: &CalcConfig,
) -> Result<CalculationOutput, CalcError> {
    let Validated {
        machine,
        spindle,
        tool,
        material,
        warnings: mut leading,
    } = validate_inputs(inputs, catalog, config)?;

    let machine_class = MachineClass::from_rigidity(machine.rigidity);
    let hobby = if inputs.hobby_mode {
        let adjustment = rigidity::hobby_adjustment(&material.id, machine_class);
        if adjustment.is_none() {
            leading.push(Warning::new(
                WarningKind::Rigidity,
                Severity::Info,
                format!(
                    "No {} adjustments for {}; using standard values",
                    machine_class, material.id
                ),
            ));
        }
        adjustment
    } else {
        None
    };

    let depth = inputs.doc.or(Some(tool.default_doc));
    let diameter = effective_diameter(tool, depth)?;
    let flutes = effective_flutes(tool, inputs.flutes)?;
    let stickout = inputs.stickout.unwrap_or(tool.stickout);

    let speed = calculate_speed(&SpeedParams {
        material,
        spindle,
        tool_material: tool.tool_material,
        cut_type: inputs.cut_type,
        aggressiveness: inputs.aggressiveness,
        effective_diameter: diameter,
        speed_multiplier: hobby.map_or(1.0, |h| h.speed_multiplier),
    })?;

    let engagement = resolve_engagement(&EngagementParams {
        tool,
        machine,
        material,
        effective_diameter: diameter,
        doc: inputs.doc,
        woc: inputs.woc,
        class_caps: hobby.map(|h| (h.max_radial_fraction, h.max_axial_fraction)),
    })?;

    let chipload_multiplier = hobby.map_or(1.0, |h| {
        h.chipload_multiplier * deflection::stickout_penalty(stickout / diameter)
    });
    let chipload = calculate_chipload(
        &ChiploadParams {
            material,
            tool,
            machine,
            effective_diameter: diameter,
            effective_flutes: flutes,
            rpm: speed.rpm,
            woc: engagement.radial,
            aggressiveness: inputs.aggressiveness,
            chipload_multiplier,
        },
        config,
    )?;

    let mrr = material_removal_rate(
        tool.tool_type,
        diameter,
        engagement.radial,
        engagement.axial,
        chipload.feed_rate,
    )?;

    let force = calculate_force(
        material,
        tool,
        diameter,
        engagement.radial,
        chipload.chipload,
        config,
    )?;

    let power = calculate_power(
        &PowerParams {
            material,
            tool,
            machine,
            spindle,
            mrr,
            rpm: speed.rpm,
            early_warning: hobby.map(|h| h.power_warning_fraction),
        },
        config,
    )?;

    let deflection = calculate_deflection(
        &DeflectionParams {
            force: force.total_force,
            stickout,
            effective_diameter: diameter,
            tool_material: tool.tool_material.name(),
            rpm: speed.rpm,
            effective_flutes: flutes,
        },
        config,
    )?;
    let thresholds = hobby.map_or(
        (config.deflection_warning, config.deflection_danger),
        |h| (h.deflection_warning, h.deflection_danger),
    );
    let deflection_warnings = deflection::deflection_warnings(deflection.total, thresholds);

    let output = assemble_output(
        tool.tool_type,
        StageResults {
            geometry: (diameter, flutes),
            stickout,
            speed,
            engagement,
            chipload,
            mrr,
            force,
            power,
            deflection,
            machine_class,
            hobby_adjusted: hobby.is_some(),
        },
        leading,
        deflection_warnings,
    );

    tracing::debug!(
        tool = %tool.id,
        material = %material.id,
        rpm = output.rpm,
        feed = output.feed_rate,
        warnings = output.warnings.len(),
        "calculation complete"
    );

    Ok(output)
}

/// Catalog and settings bundled for repeated calculations
pub struct Calculator {
    catalog: Catalog,
    config: CalcConfig,
}

impl Calculator {
    pub fn new(catalog: Catalog, config: CalcConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &CalcConfig {
        &self.config
    }

    pub fn compute(&self, inputs: &Inputs) -> Result<CalculationOutput, CalcError> {
        compute(inputs, &self.catalog, &self.config)
    }

    /// Compute, then apply power scaling and display rounding
    pub fn compute_rounded(&self, inputs: &Inputs) -> Result<CalculationOutput, CalcError> {
        let output = self.compute(inputs)?.apply_power_scaling();
        Ok(apply_output_rounding(&output))
    }

    /// Diameter/stickout alternatives for a catalog tool that land near
    /// `target_deflection` under the force and RPM of a computed cut.
    pub fn suggest_tools(
        &self,
        inputs: &Inputs,
        target_deflection: f64,
    ) -> Result<Vec<ToolSuggestion>, CalcError> {
        let output = self.compute(inputs)?;
        let tool = self
            .catalog
            .tool(&inputs.tool_id)
            .ok_or_else(|| CalcError::UnknownReference {
                kind: "tool",
                id: inputs.tool_id.clone(),
            })?;
        suggest_tools_for_tool(tool, &output, target_deflection, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{test_catalog, test_inputs};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pipeline_end_to_end() {
        let out = compute(&test_inputs(), &test_catalog(), &CalcConfig::default()).unwrap();

        // 300 m/min on 6 mm, inside the spindle range
        assert!((out.rpm - 300_000.0 / (std::f64::consts::PI * 6.0)).abs() < 1e-6);
        assert_eq!(out.radial_engagement, 1.5);
        assert_eq!(out.axial_engagement, 3.0);
        // WOC 1.5 on 6 mm doubles the chipload
        assert!((out.chip_thinning_factor - 2.0).abs() < 1e-12);
        assert!((out.chipload - 0.1).abs() < 1e-12);
        assert!((out.feed_rate - out.rpm * 3.0 * out.chipload).abs() < 1e-9);
        assert!((out.mrr - 1.5 * 3.0 * out.feed_rate).abs() < 1e-6);
        assert!(!out.power_limited);
        assert_eq!(out.machine_class, MachineClass::Medium);
        assert!(!out.hobby_adjusted);
        assert_eq!(out.metadata.effective_flutes, 3);
    }

    #[test]
    fn test_warnings_grouped_by_stage() {
        let mut inputs = test_inputs();
        inputs.aggressiveness = 3.5;
        let out = compute(&inputs, &test_catalog(), &CalcConfig::default()).unwrap();

        assert_eq!(out.warnings[0].kind, WarningKind::Validation);
        let order = |k: WarningKind| match k {
            WarningKind::Validation => 0,
            WarningKind::Rigidity => 1,
            WarningKind::Speed => 2,
            WarningKind::Engagement => 3,
            WarningKind::Chipload => 4,
            WarningKind::Force => 5,
            WarningKind::Power => 6,
            WarningKind::Deflection => 7,
        };
        for pair in out.warnings.windows(2) {
            assert!(order(pair[0].kind) <= order(pair[1].kind), "{:?}", out.warnings);
        }
    }

    #[test]
    fn test_validation_errors_abort() {
        let mut inputs = test_inputs();
        inputs.tool_id = "missing".to_string();
        let err = compute(&inputs, &test_catalog(), &CalcConfig::default()).unwrap_err();
        match err {
            CalcError::Validation(errors) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_hobby_mode_derates() {
        let catalog = test_catalog();
        let cfg = CalcConfig::default();
        let standard = compute(&test_inputs(), &catalog, &cfg).unwrap();

        let mut inputs = test_inputs();
        inputs.hobby_mode = true;
        let hobby = compute(&inputs, &catalog, &cfg).unwrap();

        assert!(hobby.hobby_adjusted);
        assert!(hobby.rpm < standard.rpm);
        assert!(hobby.feed_rate < standard.feed_rate);
    }

    #[test]
    fn test_hobby_mode_unknown_material_falls_back() {
        let mut catalog = test_catalog();
        let material = Material {
            id: "unobtainium".to_string(),
            ..crate::catalog::fixtures::test_material()
        };
        catalog.insert_material(material);

        let mut inputs = test_inputs();
        inputs.material_id = "unobtainium".to_string();
        inputs.hobby_mode = true;
        let out = compute(&inputs, &catalog, &CalcConfig::default()).unwrap();

        assert!(!out.hobby_adjusted);
        assert!(out
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::Rigidity && w.severity == Severity::Info));
    }

    #[test]
    fn test_doc_override_reported() {
        let mut inputs = test_inputs();
        inputs.doc = Some(2.0);
        let out = compute(&inputs, &test_catalog(), &CalcConfig::default()).unwrap();
        assert!(out.metadata.doc_overridden);
        assert_eq!(out.axial_engagement, 2.0);
    }

    #[test]
    fn test_calculator_rounded() {
        let calc = Calculator::new(test_catalog(), CalcConfig::default());
        let out = calc.compute_rounded(&test_inputs()).unwrap();
        assert_eq!(out.rpm, out.rpm.round());
        assert_eq!(out.feed_rate, out.feed_rate.round());
    }

    #[test]
    fn test_calculator_suggestions() {
        let calc = Calculator::new(test_catalog(), CalcConfig::default());
        let suggestions = calc.suggest_tools(&test_inputs(), 0.05).unwrap();
        assert_eq!(suggestions.len(), calc.config().optimizer_top_n);
        for pair in suggestions.windows(2) {
            assert!(pair[0].error <= pair[1].error);
        }
    }

    #[test]
    fn test_error_messages() {
        let err = CalcError::UnknownReference {
            kind: "tool",
            id: "x".to_string(),
        };
        assert_eq!(err.to_string(), "unknown tool 'x'");
    }
}
