//! Rigidity estimate from a machine's construction
//!
//! The estimate multiplies per-component factors (frame, motion system,
//! spindle mount) and then penalises light, long-span and tall machines.
//! Reference machines with known rigidity are ranked by similarity so the
//! user can sanity-check the number.

use super::MachineClass;
use serde::{Deserialize, Serialize};

use crate::calc::CalcError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameType {
    Wood,
    AluminumExtrusion,
    AluminumPlate,
    SteelTube,
    SteelWelded,
    EpoxyGranite,
    CastIron,
}

impl FrameType {
    pub fn factor(self) -> f64 {
        match self {
            FrameType::Wood => 0.6,
            FrameType::AluminumExtrusion => 0.8,
            FrameType::AluminumPlate => 0.85,
            FrameType::SteelTube => 0.9,
            FrameType::SteelWelded => 0.95,
            FrameType::EpoxyGranite | FrameType::CastIron => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionSystem {
    VWheelBelt,
    VWheelLeadscrew,
    SupportedRods,
    LinearRailBelt,
    LinearRailLeadscrew,
    LinearRailBallscrew,
    BoxWays,
}

impl MotionSystem {
    pub fn factor(self) -> f64 {
        match self {
            MotionSystem::VWheelBelt => 0.6,
            MotionSystem::VWheelLeadscrew | MotionSystem::SupportedRods => 0.7,
            MotionSystem::LinearRailBelt => 0.8,
            MotionSystem::LinearRailLeadscrew => 0.85,
            MotionSystem::LinearRailBallscrew => 0.95,
            MotionSystem::BoxWays => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpindleMount {
    RouterClamp,
    Bracket,
    Integrated,
    CastHead,
}

impl SpindleMount {
    pub fn factor(self) -> f64 {
        match self {
            SpindleMount::RouterClamp => 0.75,
            SpindleMount::Bracket => 0.85,
            SpindleMount::Integrated => 0.95,
            SpindleMount::CastHead => 1.0,
        }
    }
}

/// Construction details of a machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSpec {
    pub frame: FrameType,
    pub motion: MotionSystem,
    pub mount: SpindleMount,
    pub weight_kg: f64,
    /// Travels in mm
    pub travel_x: f64,
    pub travel_y: f64,
    pub travel_z: f64,
}

impl MachineSpec {
    /// Work envelope in litres
    pub fn volume_l(&self) -> f64 {
        self.travel_x * self.travel_y * self.travel_z / 1e6
    }

    fn check(&self) -> Result<(), CalcError> {
        for (quantity, value) in [
            ("machine weight", self.weight_kg),
            ("X travel", self.travel_x),
            ("Y travel", self.travel_y),
            ("Z travel", self.travel_z),
        ] {
            if value <= 0.0 {
                return Err(CalcError::NonPositive { quantity, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidityFactors {
    pub frame: f64,
    pub motion: f64,
    pub mount: f64,
    pub weight_density: f64,
    pub span: f64,
    pub aspect: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceMatch {
    pub name: String,
    pub rigidity: f64,
    /// 0..1, 1 = identical construction and size
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidityEstimate {
    pub rigidity: f64,
    pub class: MachineClass,
    pub factors: RigidityFactors,
    pub nearest: Vec<ReferenceMatch>,
}

/// Known machine with a calibrated rigidity value
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceMachine {
    pub name: &'static str,
    pub spec: MachineSpec,
    pub rigidity: f64,
}

/// Built-in reference machines
pub fn reference_machines() -> Vec<ReferenceMachine> {
    let machine = |name, frame, motion, mount, weight_kg, x, y, z, rigidity| ReferenceMachine {
        name,
        spec: MachineSpec {
            frame,
            motion,
            mount,
            weight_kg,
            travel_x: x,
            travel_y: y,
            travel_z: z,
        },
        rigidity,
    };
    use FrameType::*;
    use MotionSystem::*;
    use SpindleMount::*;

    vec![
        machine("Generic 3018", AluminumExtrusion, SupportedRods, Bracket, 6.0, 300.0, 180.0, 45.0, 0.1),
        machine("Shapeoko 4 XXL", AluminumExtrusion, VWheelBelt, RouterClamp, 30.0, 838.0, 838.0, 95.0, 0.2),
        machine("X-Carve", AluminumExtrusion, VWheelBelt, RouterClamp, 25.0, 750.0, 750.0, 65.0, 0.15),
        machine("Onefinity Woodworker", SteelTube, LinearRailBallscrew, RouterClamp, 45.0, 816.0, 816.0, 133.0, 0.3),
        machine("Shapeoko Pro", AluminumExtrusion, LinearRailBelt, RouterClamp, 40.0, 838.0, 838.0, 95.0, 0.25),
        machine("Avid Benchtop Pro", SteelWelded, LinearRailBallscrew, Bracket, 90.0, 610.0, 610.0, 150.0, 0.45),
        machine("Tormach 440", CastIron, LinearRailBallscrew, CastHead, 350.0, 254.0, 159.0, 254.0, 0.65),
        machine("Haas Mini Mill", CastIron, BoxWays, CastHead, 1600.0, 406.0, 305.0, 254.0, 0.9),
    ]
}

fn similarity(a: &MachineSpec, b: &MachineSpec) -> f64 {
    let ratio = |x: f64, y: f64| if x <= 0.0 || y <= 0.0 { 0.0 } else { x.min(y) / x.max(y) };
    let same = |eq: bool| if eq { 1.0 } else { 0.0 };

    0.3 * same(a.frame == b.frame)
        + 0.3 * same(a.motion == b.motion)
        + 0.2 * same(a.mount == b.mount)
        + 0.1 * ratio(a.weight_kg, b.weight_kg)
        + 0.1 * ratio(a.volume_l(), b.volume_l())
}

/// Estimate rigidity in [0.1, 1.0] from construction details.
pub fn estimate_rigidity(spec: &MachineSpec) -> Result<RigidityEstimate, CalcError> {
    spec.check()?;

    let density = spec.weight_kg / spec.volume_l();
    let weight_density = (0.7 + 0.15 * density.log10()).clamp(0.4, 1.0);

    let longest = spec.travel_x.max(spec.travel_y);
    let span = if longest > 600.0 {
        (600.0 / longest).sqrt().max(0.6)
    } else {
        1.0
    };

    let shortest = spec.travel_x.min(spec.travel_y);
    let aspect = if spec.travel_z > 0.3 * shortest { 0.9 } else { 1.0 };

    let factors = RigidityFactors {
        frame: spec.frame.factor(),
        motion: spec.motion.factor(),
        mount: spec.mount.factor(),
        weight_density,
        span,
        aspect,
    };
    let rigidity = (factors.frame
        * factors.motion
        * factors.mount
        * factors.weight_density
        * factors.span
        * factors.aspect)
        .clamp(0.1, 1.0);

    let mut nearest: Vec<ReferenceMatch> = reference_machines()
        .into_iter()
        .map(|r| ReferenceMatch {
            name: r.name.to_string(),
            rigidity: r.rigidity,
            similarity: similarity(spec, &r.spec),
        })
        .collect();
    nearest.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    nearest.truncate(3);

    tracing::debug!(rigidity, density, "rigidity estimated");

    Ok(RigidityEstimate {
        rigidity,
        class: MachineClass::from_rigidity(rigidity),
        factors,
        nearest,
    })
}
