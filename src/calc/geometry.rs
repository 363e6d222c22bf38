//! Effective cutting geometry by tool type

use super::*;

/// Diameter the cutting edge actually sweeps.
///
/// `depth` is only consulted for V-bits, whose cutting width grows with
/// depth of cut.
pub fn effective_diameter(tool: &Tool, depth: Option<f64>) -> Result<f64, CalcError> {
    let missing = |field: &'static str| CalcError::MissingMetadata {
        tool_id: tool.id.clone(),
        tool_type: tool.tool_type,
        field,
    };

    let diameter = match tool.tool_type {
        ToolType::FlatEndMill | ToolType::Drill | ToolType::SlittingSaw => tool.diameter,
        ToolType::VBit => {
            let half_angle = tool
                .metadata
                .half_angle_deg
                .ok_or_else(|| missing("half_angle_deg"))?;
            let depth = depth
                .filter(|d| *d > 0.0)
                .ok_or_else(|| CalcError::MissingDepth {
                    tool_id: tool.id.clone(),
                    tool_type: tool.tool_type,
                })?;
            let tip = tool.metadata.tip_diameter.unwrap_or(0.0);
            tip + 2.0 * half_angle.to_radians().tan() * depth
        }
        ToolType::FaceMill => tool
            .metadata
            .body_diameter
            .ok_or_else(|| missing("body_diameter"))?,
        ToolType::Boring => {
            let bit = tool
                .metadata
                .bit_diameter
                .ok_or_else(|| missing("bit_diameter"))?;
            // `diameter` holds the bar's radial offset
            2.0 * (tool.diameter + bit / 2.0)
        }
    };

    if diameter <= 0.0 || !diameter.is_finite() {
        return Err(CalcError::NonPositive {
            quantity: "effective diameter",
            value: diameter,
        });
    }
    Ok(diameter)
}

/// Number of edges engaged per revolution
pub fn effective_flutes(tool: &Tool, flute_override: Option<u32>) -> Result<u32, CalcError> {
    let flutes = flute_override.unwrap_or(tool.flutes);
    if flutes == 0 {
        return Err(CalcError::NonPositive {
            quantity: "flute count",
            value: 0.0,
        });
    }
    Ok(match tool.tool_type {
        // single-point cutting
        ToolType::Boring => 1,
        // Face mills and slitting saws keep the full insert/tooth count.
        ToolType::FlatEndMill
        | ToolType::Drill
        | ToolType::VBit
        | ToolType::FaceMill
        | ToolType::SlittingSaw => flutes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::test_tool;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_tools_use_nominal_diameter() {
        for tool_type in [ToolType::FlatEndMill, ToolType::Drill, ToolType::SlittingSaw] {
            let tool = Tool {
                tool_type,
                ..test_tool()
            };
            assert_eq!(effective_diameter(&tool, None).unwrap(), 6.0);
        }
    }

    #[test]
    fn test_vbit_diameter_grows_with_depth() {
        let tool = Tool {
            tool_type: ToolType::VBit,
            metadata: ToolMetadata {
                half_angle_deg: Some(45.0),
                tip_diameter: Some(0.2),
                ..Default::default()
            },
            ..test_tool()
        };
        let d = effective_diameter(&tool, Some(1.0)).unwrap();
        assert!((d - 2.2).abs() < 1e-9, "got {}", d);

        let deeper = effective_diameter(&tool, Some(2.0)).unwrap();
        assert!(deeper > d);
    }

    #[test]
    fn test_vbit_requires_angle_and_depth() {
        let mut tool = Tool {
            tool_type: ToolType::VBit,
            ..test_tool()
        };
        assert!(matches!(
            effective_diameter(&tool, Some(1.0)),
            Err(CalcError::MissingMetadata { field: "half_angle_deg", .. })
        ));

        tool.metadata.half_angle_deg = Some(30.0);
        assert!(matches!(
            effective_diameter(&tool, None),
            Err(CalcError::MissingDepth { .. })
        ));
        assert!(matches!(
            effective_diameter(&tool, Some(0.0)),
            Err(CalcError::MissingDepth { .. })
        ));
    }

    #[test]
    fn test_facemill_uses_body_diameter() {
        let mut tool = Tool {
            tool_type: ToolType::FaceMill,
            ..test_tool()
        };
        assert!(effective_diameter(&tool, None).is_err());

        tool.metadata.body_diameter = Some(50.0);
        assert_eq!(effective_diameter(&tool, None).unwrap(), 50.0);
    }

    #[test]
    fn test_boring_diameter_and_single_flute() {
        let tool = Tool {
            tool_type: ToolType::Boring,
            diameter: 10.0,
            flutes: 2,
            metadata: ToolMetadata {
                bit_diameter: Some(4.0),
                ..Default::default()
            },
            ..test_tool()
        };
        assert_eq!(effective_diameter(&tool, None).unwrap(), 24.0);
        assert_eq!(effective_flutes(&tool, None).unwrap(), 1);
        assert_eq!(effective_flutes(&tool, Some(3)).unwrap(), 1);
    }

    #[test]
    fn test_flute_override() {
        let tool = test_tool();
        assert_eq!(effective_flutes(&tool, None).unwrap(), 3);
        assert_eq!(effective_flutes(&tool, Some(2)).unwrap(), 2);
        assert!(effective_flutes(&tool, Some(0)).is_err());
    }

    #[test]
    fn test_non_positive_diameter_fails() {
        let tool = Tool {
            diameter: 0.0,
            ..test_tool()
        };
        assert!(matches!(
            effective_diameter(&tool, None),
            Err(CalcError::NonPositive { .. })
        ));
    }
}
