//! Per-material, per-class derating for low-rigidity machines

use super::MachineClass;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Multipliers and caps applied in hobby mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HobbyAdjustment {
    pub speed_multiplier: f64,
    pub chipload_multiplier: f64,
    /// Fractions of tool diameter
    pub max_radial_fraction: f64,
    pub max_axial_fraction: f64,
    /// mm
    pub deflection_warning: f64,
    pub deflection_danger: f64,
    /// Fraction of available power that raises an Info warning
    pub power_warning_fraction: f64,
}

/// How hard a material group can be pushed relative to aluminum
#[derive(Clone, Copy)]
struct MaterialGroup {
    speed: f64,
    chipload: f64,
    engagement: f64,
}

const SOFT_METAL: MaterialGroup = MaterialGroup {
    speed: 1.0,
    chipload: 1.0,
    engagement: 1.0,
};
const STEEL: MaterialGroup = MaterialGroup {
    speed: 0.85,
    chipload: 0.7,
    engagement: 0.5,
};
const PLASTIC: MaterialGroup = MaterialGroup {
    speed: 1.0,
    chipload: 1.1,
    engagement: 1.5,
};
const WOOD: MaterialGroup = MaterialGroup {
    speed: 1.0,
    chipload: 1.2,
    engagement: 2.0,
};

fn class_row(class: MachineClass) -> HobbyAdjustment {
    match class {
        MachineClass::UltraLight => HobbyAdjustment {
            speed_multiplier: 0.7,
            chipload_multiplier: 0.5,
            max_radial_fraction: 0.15,
            max_axial_fraction: 0.25,
            deflection_warning: 0.01,
            deflection_danger: 0.025,
            power_warning_fraction: 0.6,
        },
        MachineClass::Medium => HobbyAdjustment {
            speed_multiplier: 0.8,
            chipload_multiplier: 0.7,
            max_radial_fraction: 0.25,
            max_axial_fraction: 0.5,
            deflection_warning: 0.015,
            deflection_danger: 0.035,
            power_warning_fraction: 0.7,
        },
        MachineClass::Heavy => HobbyAdjustment {
            speed_multiplier: 0.9,
            chipload_multiplier: 0.85,
            max_radial_fraction: 0.4,
            max_axial_fraction: 0.75,
            deflection_warning: 0.02,
            deflection_danger: 0.045,
            power_warning_fraction: 0.75,
        },
        MachineClass::EntryCommercial => HobbyAdjustment {
            speed_multiplier: 1.0,
            chipload_multiplier: 1.0,
            max_radial_fraction: 0.5,
            max_axial_fraction: 1.0,
            deflection_warning: 0.02,
            deflection_danger: 0.05,
            power_warning_fraction: 0.8,
        },
    }
}

fn adjust(group: MaterialGroup, class: MachineClass) -> HobbyAdjustment {
    let row = class_row(class);
    HobbyAdjustment {
        speed_multiplier: row.speed_multiplier * group.speed,
        chipload_multiplier: row.chipload_multiplier * group.chipload,
        max_radial_fraction: (row.max_radial_fraction * group.engagement).min(1.0),
        max_axial_fraction: (row.max_axial_fraction * group.engagement).min(1.0),
        ..row
    }
}

static MATERIAL_GROUPS: Lazy<HashMap<&'static str, MaterialGroup>> = Lazy::new(|| {
    HashMap::from([
        ("aluminum-6061", SOFT_METAL),
        ("aluminum-7075", SOFT_METAL),
        ("brass-360", SOFT_METAL),
        ("mild-steel-1018", STEEL),
        ("acrylic", PLASTIC),
        ("hdpe", PLASTIC),
        ("hardwood-oak", WOOD),
        ("mdf", WOOD),
    ])
});

/// Derating for a material on a machine class, if the matrix covers it.
pub fn hobby_adjustment(material_id: &str, class: MachineClass) -> Option<HobbyAdjustment> {
    MATERIAL_GROUPS
        .get(material_id)
        .map(|group| adjust(*group, class))
}
