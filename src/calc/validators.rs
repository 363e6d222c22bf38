//! Input validation and safety checks
//!
//! Structural problems (unknown ids, impossible geometry) are collected into
//! [`ValidationErrors`] and abort the calculation. Everything that is merely
//! risky becomes a [`Warning`].

use super::*;

/// Every fatal problem found in one request
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(pub Vec<CalcError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[CalcError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} validation error(s)", self.0.len())?;
        for err in &self.0 {
            write!(f, "; {}", err)?;
        }
        Ok(())
    }
}

/// Catalog records resolved for one request
#[derive(Debug)]
pub struct Validated<'a> {
    pub machine: &'a Machine,
    pub spindle: &'a Spindle,
    pub tool: &'a Tool,
    pub material: &'a Material,
    pub warnings: Vec<Warning>,
}

fn check_tool(tool: &Tool, errors: &mut Vec<CalcError>) {
    if tool.diameter <= 0.0 {
        errors.push(CalcError::NonPositive {
            quantity: "tool diameter",
            value: tool.diameter,
        });
    }
    if tool.flutes == 0 {
        errors.push(CalcError::NonPositive {
            quantity: "tool flute count",
            value: 0.0,
        });
    }
    if tool.stickout <= 0.0 {
        errors.push(CalcError::NonPositive {
            quantity: "tool stickout",
            value: tool.stickout,
        });
    }
}

fn check_spindle(spindle: &Spindle, errors: &mut Vec<CalcError>) {
    if spindle.rpm_min <= 0.0 {
        errors.push(CalcError::NonPositive {
            quantity: "spindle minimum RPM",
            value: spindle.rpm_min,
        });
    }
    if spindle.rpm_min > spindle.rpm_max {
        errors.push(CalcError::InvalidRange {
            what: "spindle RPM",
            min: spindle.rpm_min,
            max: spindle.rpm_max,
        });
    }
    if spindle.power_curve.is_empty() {
        errors.push(CalcError::EmptyPowerCurve(spindle.id.clone()));
    }
}

fn check_material(material: &Material, errors: &mut Vec<CalcError>) {
    let (min, max) = material.surface_speed;
    if min > max {
        errors.push(CalcError::InvalidRange {
            what: "surface speed",
            min,
            max,
        });
    }
    if material.chipload_table.is_empty() {
        errors.push(CalcError::EmptyChiploadTable(material.id.clone()));
    }
    for row in &material.chipload_table {
        if row.min > row.max {
            errors.push(CalcError::InvalidRange {
                what: "chipload",
                min: row.min,
                max: row.max,
            });
        }
    }
}

fn check_machine(machine: &Machine, errors: &mut Vec<CalcError>) {
    if machine.rigidity <= 0.0 {
        errors.push(CalcError::NonPositive {
            quantity: "machine rigidity",
            value: machine.rigidity,
        });
    }
    if machine.max_feed <= 0.0 {
        errors.push(CalcError::NonPositive {
            quantity: "machine max feed",
            value: machine.max_feed,
        });
    }
}

fn check_overrides(
    inputs: &Inputs,
    tool: &Tool,
    material: &Material,
    config: &CalcConfig,
    errors: &mut Vec<CalcError>,
    warnings: &mut Vec<Warning>,
) {
    let warn = |severity, message: String| Warning::new(WarningKind::Validation, severity, message);
    // cutting diameter as the geometry stage resolves it; nominal if that fails
    let diameter = effective_diameter(tool, inputs.doc.or(Some(tool.default_doc)))
        .unwrap_or(tool.diameter);
    let engagement_limit = material.max_engagement * diameter;

    for (label, value) in [("depth of cut", inputs.doc), ("width of cut", inputs.woc)] {
        let Some(value) = value else { continue };
        if value <= 0.0 {
            errors.push(CalcError::NonPositive {
                quantity: label,
                value,
            });
        } else if value > diameter {
            warnings.push(warn(
                Severity::Danger,
                format!(
                    "{} {:.2} mm exceeds the {:.2} mm cutting diameter",
                    label, value, diameter
                ),
            ));
        } else if value > engagement_limit {
            warnings.push(warn(
                Severity::Warning,
                format!(
                    "{} {:.2} mm exceeds the {:.2} mm limit for {}",
                    label, value, engagement_limit, material.id
                ),
            ));
        }
    }

    if let Some(flutes) = inputs.flutes {
        if flutes == 0 {
            errors.push(CalcError::NonPositive {
                quantity: "flute override",
                value: 0.0,
            });
        } else if flutes > tool.flutes {
            warnings.push(warn(
                Severity::Warning,
                format!(
                    "Flute override {} exceeds the tool's {} flutes",
                    flutes, tool.flutes
                ),
            ));
        }
    }

    if let Some(stickout) = inputs.stickout {
        if stickout <= 0.0 {
            errors.push(CalcError::NonPositive {
                quantity: "stickout override",
                value: stickout,
            });
        }
    }

    let stickout = inputs.stickout.unwrap_or(tool.stickout);
    if stickout > 0.0 && diameter > 0.0 {
        let ratio = stickout / diameter;
        if ratio > config.stickout_danger_ratio {
            warnings.push(warn(
                Severity::Danger,
                format!("Stickout is {:.1}x diameter; high risk of chatter and breakage", ratio),
            ));
        } else if ratio > config.stickout_warning_ratio {
            warnings.push(warn(
                Severity::Warning,
                format!("Stickout is {:.1}x diameter; reduce depth or use a shorter tool", ratio),
            ));
        }
    }
}

/// Resolve catalog references and check the request.
pub fn validate_inputs<'a>(
    inputs: &Inputs,
    catalog: &'a Catalog,
    config: &CalcConfig,
) -> Result<Validated<'a>, ValidationErrors> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let machine = catalog.machine(&inputs.machine_id);
    let spindle = catalog.spindle(&inputs.spindle_id);
    let tool = catalog.tool(&inputs.tool_id);
    let material = catalog.material(&inputs.material_id);

    for (kind, id, found) in [
        ("machine", &inputs.machine_id, machine.is_some()),
        ("spindle", &inputs.spindle_id, spindle.is_some()),
        ("tool", &inputs.tool_id, tool.is_some()),
        ("material", &inputs.material_id, material.is_some()),
    ] {
        if !found {
            errors.push(CalcError::UnknownReference {
                kind,
                id: id.clone(),
            });
        }
    }

    let (Some(machine), Some(spindle), Some(tool), Some(material)) =
        (machine, spindle, tool, material)
    else {
        return Err(ValidationErrors(errors));
    };

    check_machine(machine, &mut errors);
    check_spindle(spindle, &mut errors);
    check_tool(tool, &mut errors);
    check_material(material, &mut errors);

    if !(config.aggressiveness_min..=config.aggressiveness_max).contains(&inputs.aggressiveness) {
        warnings.push(Warning::new(
            WarningKind::Validation,
            Severity::Warning,
            format!(
                "Aggressiveness {:.2} is outside the recommended {:.1}-{:.1} range",
                inputs.aggressiveness, config.aggressiveness_min, config.aggressiveness_max
            ),
        ));
    }
    if inputs.aggressiveness <= 0.0 {
        errors.push(CalcError::NonPositive {
            quantity: "aggressiveness",
            value: inputs.aggressiveness,
        });
    }

    check_overrides(inputs, tool, material, config, &mut errors, &mut warnings);

    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }

    Ok(Validated {
        machine,
        spindle,
        tool,
        material,
        warnings,
    })
}
