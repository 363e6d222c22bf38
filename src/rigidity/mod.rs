//! Machine rigidity: classification, hobby-mode derating and estimation
//!
//! Rigidity is a dimensionless stiffness multiplier in (0, 1]. Stiff cast
//! iron VMCs sit near 1.0; belt-driven extrusion routers near 0.1-0.2.

use serde::{Deserialize, Serialize};

pub mod estimator;
pub mod hobby;

pub use estimator::{
    estimate_rigidity, reference_machines, FrameType, MachineSpec, MotionSystem,
    ReferenceMachine, ReferenceMatch, RigidityEstimate, RigidityFactors, SpindleMount,
};
pub use hobby::{hobby_adjustment, HobbyAdjustment};

/// Rigidity band a machine falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineClass {
    /// 3018-style desktop routers
    UltraLight,
    /// Belt/leadscrew hobby routers
    Medium,
    /// Rigid hobby machines and benchtop mills
    Heavy,
    EntryCommercial,
}

impl MachineClass {
    pub fn from_rigidity(rigidity: f64) -> Self {
        match rigidity {
            r if r < 0.2 => MachineClass::UltraLight,
            r if r < 0.4 => MachineClass::Medium,
            r if r < 0.7 => MachineClass::Heavy,
            _ => MachineClass::EntryCommercial,
        }
    }

    pub fn all() -> &'static [MachineClass] {
        &[
            MachineClass::UltraLight,
            MachineClass::Medium,
            MachineClass::Heavy,
            MachineClass::EntryCommercial,
        ]
    }
}

impl std::fmt::Display for MachineClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MachineClass::UltraLight => write!(f, "ultra-light"),
            MachineClass::Medium => write!(f, "medium"),
            MachineClass::Heavy => write!(f, "heavy"),
            MachineClass::EntryCommercial => write!(f, "entry commercial"),
        }
    }
}
