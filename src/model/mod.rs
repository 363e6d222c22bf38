//! Catalog records and calculation inputs
//!
//! Everything here is a plain value. Lengths are millimetres, feeds are
//! mm/min, surface speeds m/min, spindle power in kW as entered in the
//! catalog (converted to watts in the power stage).

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::calc::CalcError;

/// Tool type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolType {
    #[serde(rename = "flat_endmill", alias = "endmill", alias = "end_mill")]
    FlatEndMill,
    #[serde(rename = "drill")]
    Drill,
    #[serde(rename = "vbit", alias = "v_bit")]
    VBit,
    #[serde(rename = "facemill", alias = "face_mill")]
    FaceMill,
    #[serde(rename = "boring", alias = "boring_bar")]
    Boring,
    #[serde(rename = "slitting_saw", alias = "slitting")]
    SlittingSaw,
}

impl ToolType {
    pub fn all() -> &'static [ToolType] {
        &[
            ToolType::FlatEndMill,
            ToolType::Drill,
            ToolType::VBit,
            ToolType::FaceMill,
            ToolType::Boring,
            ToolType::SlittingSaw,
        ]
    }
}

impl std::fmt::Display for ToolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolType::FlatEndMill => write!(f, "flat end mill"),
            ToolType::Drill => write!(f, "drill"),
            ToolType::VBit => write!(f, "V-bit"),
            ToolType::FaceMill => write!(f, "face mill"),
            ToolType::Boring => write!(f, "boring bar"),
            ToolType::SlittingSaw => write!(f, "slitting saw"),
        }
    }
}

impl FromStr for ToolType {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "flat_endmill" | "endmill" | "end_mill" | "flat_end_mill" => Ok(ToolType::FlatEndMill),
            "drill" => Ok(ToolType::Drill),
            "vbit" | "v_bit" => Ok(ToolType::VBit),
            "facemill" | "face_mill" => Ok(ToolType::FaceMill),
            "boring" | "boring_bar" => Ok(ToolType::Boring),
            "slitting_saw" | "slitting" => Ok(ToolType::SlittingSaw),
            _ => Err(CalcError::UnknownToolType(s.to_string())),
        }
    }
}

/// Cutting tool substrate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolMaterial {
    #[serde(rename = "carbide", alias = "CARBIDE")]
    #[default]
    Carbide,
    #[serde(rename = "hss", alias = "HSS")]
    Hss,
    #[serde(rename = "cobalt", alias = "COBALT")]
    Cobalt,
    #[serde(rename = "ceramic", alias = "CERAMIC")]
    Ceramic,
    #[serde(rename = "diamond", alias = "pcd")]
    Diamond,
}

impl ToolMaterial {
    /// Name used for the modulus and density lookups
    pub fn name(self) -> &'static str {
        match self {
            ToolMaterial::Carbide => "carbide",
            ToolMaterial::Hss => "hss",
            ToolMaterial::Cobalt => "cobalt",
            ToolMaterial::Ceramic => "ceramic",
            ToolMaterial::Diamond => "diamond",
        }
    }
}

impl std::fmt::Display for ToolMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolMaterial::Carbide => write!(f, "Carbide"),
            ToolMaterial::Hss => write!(f, "HSS"),
            ToolMaterial::Cobalt => write!(f, "Cobalt"),
            ToolMaterial::Ceramic => write!(f, "Ceramic"),
            ToolMaterial::Diamond => write!(f, "PCD"),
        }
    }
}

/// Tool coating types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Coating {
    #[serde(rename = "none", alias = "NONE", alias = "uncoated")]
    #[default]
    None,
    #[serde(rename = "TiN", alias = "TIN", alias = "tin")]
    TiN,
    #[serde(rename = "TiCN", alias = "TICN", alias = "ticn")]
    TiCN,
    #[serde(rename = "TiAlN", alias = "TIALN", alias = "tialn")]
    TiAlN,
    #[serde(rename = "AlTiN", alias = "ALTIN", alias = "altin")]
    AlTiN,
    #[serde(rename = "ZrN", alias = "ZRN", alias = "zrn")]
    ZrN,
    #[serde(rename = "DLC", alias = "dlc")]
    Dlc,
    #[serde(rename = "diamond", alias = "DIAMOND")]
    Diamond,
}

/// Type-specific geometry. Which fields are required depends on the tool
/// type and is only checked when a calculation needs them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolMetadata {
    /// V-bit half angle in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_angle_deg: Option<f64>,
    /// V-bit flat tip width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip_diameter: Option<f64>,
    /// Face mill cutter body diameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_diameter: Option<f64>,
    /// Boring bar insert/bit diameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_diameter: Option<f64>,
}

/// Tool definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub tool_type: ToolType,
    /// Nominal diameter. For boring bars this is the radial offset of the bit.
    pub diameter: f64,
    pub flutes: u32,
    #[serde(default)]
    pub coating: Coating,
    pub stickout: f64,
    #[serde(default)]
    pub tool_material: ToolMaterial,
    pub default_doc: f64,
    pub default_woc: f64,
    #[serde(default)]
    pub metadata: ToolMetadata,
}

/// Material category for grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialCategory {
    Aluminum,
    NonFerrous,
    Steel,
    Stainless,
    CastIron,
    Titanium,
    Plastic,
    Wood,
    Composite,
}

impl MaterialCategory {
    pub fn is_ferrous(self) -> bool {
        matches!(
            self,
            MaterialCategory::Steel | MaterialCategory::Stainless | MaterialCategory::CastIron
        )
    }
}

impl std::fmt::Display for MaterialCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaterialCategory::Aluminum => write!(f, "Aluminum"),
            MaterialCategory::NonFerrous => write!(f, "Non-ferrous"),
            MaterialCategory::Steel => write!(f, "Steel"),
            MaterialCategory::Stainless => write!(f, "Stainless"),
            MaterialCategory::CastIron => write!(f, "Cast iron"),
            MaterialCategory::Titanium => write!(f, "Titanium"),
            MaterialCategory::Plastic => write!(f, "Plastic"),
            MaterialCategory::Wood => write!(f, "Wood"),
            MaterialCategory::Composite => write!(f, "Composite"),
        }
    }
}

/// One row of a material's chipload table, keyed by tool diameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChiploadEntry {
    pub diameter: f64,
    pub min: f64, // mm/tooth
    pub max: f64,
}

impl ChiploadEntry {
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Chip thinning behaviour for a material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChipThinning {
    /// Thinning kicks in when WOC < D * engage_below
    pub engage_below: f64,
    /// Upper bound on the chipload multiplier
    pub limit_factor: f64,
}

impl Default for ChipThinning {
    fn default() -> Self {
        Self {
            engage_below: 0.5,
            limit_factor: 2.0,
        }
    }
}

/// Workpiece material cutting data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub category: MaterialCategory,
    /// Surface speed range (min, max) in m/min
    pub surface_speed: (f64, f64),
    pub chipload_table: Vec<ChiploadEntry>,
    /// Specific cutting force, kN/mm^2
    pub force_coefficient: f64,
    /// Specific cutting energy, J/mm^3
    pub specific_energy: f64,
    #[serde(default)]
    pub chip_thinning: ChipThinning,
    /// Max engagement as a fraction of tool diameter
    pub max_engagement: f64,
}

/// Per-axis machine aggressiveness multipliers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisAggressiveness {
    pub axial: f64,
    pub radial: f64,
    pub feed: f64,
}

impl Default for AxisAggressiveness {
    fn default() -> Self {
        Self {
            axial: 1.0,
            radial: 1.0,
            feed: 1.0,
        }
    }
}

/// CNC machine frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Maximum per-axis feed, mm/min
    pub max_feed: f64,
    /// Dimensionless stiffness multiplier
    pub rigidity: f64,
    #[serde(default)]
    pub aggressiveness: AxisAggressiveness,
}

/// One sample of a spindle power curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerPoint {
    pub rpm: f64,
    pub power_kw: f64,
}

/// Spindle motor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spindle {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub rated_power_kw: f64,
    pub rpm_min: f64,
    pub rpm_max: f64,
    pub base_rpm: f64,
    /// Samples need not be sorted
    pub power_curve: Vec<PowerPoint>,
}

/// Operation being performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CutType {
    Slot,
    #[default]
    Profile,
    Adaptive,
    Facing,
    Drilling,
    Boring,
}

impl std::fmt::Display for CutType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CutType::Slot => write!(f, "slot"),
            CutType::Profile => write!(f, "profile"),
            CutType::Adaptive => write!(f, "adaptive"),
            CutType::Facing => write!(f, "facing"),
            CutType::Drilling => write!(f, "drilling"),
            CutType::Boring => write!(f, "boring"),
        }
    }
}

impl FromStr for CutType {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slot" | "slotting" => Ok(CutType::Slot),
            "profile" => Ok(CutType::Profile),
            "adaptive" | "hem" => Ok(CutType::Adaptive),
            "facing" | "face" => Ok(CutType::Facing),
            "drilling" | "drill" => Ok(CutType::Drilling),
            "boring" | "bore" => Ok(CutType::Boring),
            _ => Err(CalcError::UnknownCutType(s.to_string())),
        }
    }
}

fn default_aggressiveness() -> f64 {
    1.0
}

/// One calculation request. Ids reference catalog entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inputs {
    pub machine_id: String,
    pub spindle_id: String,
    pub tool_id: String,
    pub material_id: String,
    #[serde(default)]
    pub cut_type: CutType,
    #[serde(default = "default_aggressiveness")]
    pub aggressiveness: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub woc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stickout: Option<f64>,
    /// Apply machine-class derating for low-rigidity machines
    #[serde(default)]
    pub hobby_mode: bool,
}

impl Inputs {
    pub fn new(
        machine_id: impl Into<String>,
        spindle_id: impl Into<String>,
        tool_id: impl Into<String>,
        material_id: impl Into<String>,
        cut_type: CutType,
    ) -> Self {
        Self {
            machine_id: machine_id.into(),
            spindle_id: spindle_id.into(),
            tool_id: tool_id.into(),
            material_id: material_id.into(),
            cut_type,
            aggressiveness: 1.0,
            doc: None,
            woc: None,
            flutes: None,
            stickout: None,
            hobby_mode: false,
        }
    }
}
