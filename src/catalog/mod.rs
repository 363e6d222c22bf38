//! Catalog - JSON machine, spindle, tool and material definitions
//!
//! A catalog file holds four arrays keyed by record id. The built-in catalog
//! covers common hobby and entry-level commercial setups; user catalogs are
//! merged on top of it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::{Machine, Material, MaterialCategory, Spindle, Tool, ToolType};

const BUILTIN_CATALOG: &str = include_str!("builtin.json");

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },
}

/// On-disk layout
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    machines: Vec<Machine>,
    #[serde(default)]
    spindles: Vec<Spindle>,
    #[serde(default)]
    tools: Vec<Tool>,
    #[serde(default)]
    materials: Vec<Material>,
}

/// Records indexed by id
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    machines: HashMap<String, Machine>,
    spindles: HashMap<String, Spindle>,
    tools: HashMap<String, Tool>,
    materials: HashMap<String, Material>,
}

fn index<T>(
    records: Vec<T>,
    kind: &'static str,
    id: impl Fn(&T) -> &str,
) -> Result<HashMap<String, T>, CatalogError> {
    let mut map = HashMap::with_capacity(records.len());
    for record in records {
        let key = id(&record).to_string();
        if map.contains_key(&key) {
            return Err(CatalogError::DuplicateId { kind, id: key });
        }
        map.insert(key, record);
    }
    Ok(map)
}

fn sorted<T>(map: &HashMap<String, T>) -> Vec<&T> {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    keys.into_iter().filter_map(|k| map.get(k)).collect()
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog document. Ids must be unique within each section.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Ok(Self {
            machines: index(file.machines, "machine", |m| &m.id)?,
            spindles: index(file.spindles, "spindle", |s| &s.id)?,
            tools: index(file.tools, "tool", |t| &t.id)?,
            materials: index(file.materials, "material", |m| &m.id)?,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Built-in reference catalog
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    /// Add every record of `other`, replacing records with the same id.
    pub fn merge(&mut self, other: Catalog) {
        self.machines.extend(other.machines);
        self.spindles.extend(other.spindles);
        self.tools.extend(other.tools);
        self.materials.extend(other.materials);
    }

    pub fn machine(&self, id: &str) -> Option<&Machine> {
        self.machines.get(id)
    }

    pub fn spindle(&self, id: &str) -> Option<&Spindle> {
        self.spindles.get(id)
    }

    pub fn tool(&self, id: &str) -> Option<&Tool> {
        self.tools.get(id)
    }

    pub fn material(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn insert_machine(&mut self, machine: Machine) -> Option<Machine> {
        self.machines.insert(machine.id.clone(), machine)
    }

    pub fn insert_spindle(&mut self, spindle: Spindle) -> Option<Spindle> {
        self.spindles.insert(spindle.id.clone(), spindle)
    }

    pub fn insert_tool(&mut self, tool: Tool) -> Option<Tool> {
        self.tools.insert(tool.id.clone(), tool)
    }

    pub fn insert_material(&mut self, material: Material) -> Option<Material> {
        self.materials.insert(material.id.clone(), material)
    }

    /// All machines, sorted by id
    pub fn machines(&self) -> Vec<&Machine> {
        sorted(&self.machines)
    }

    pub fn spindles(&self) -> Vec<&Spindle> {
        sorted(&self.spindles)
    }

    pub fn tools(&self) -> Vec<&Tool> {
        sorted(&self.tools)
    }

    pub fn materials(&self) -> Vec<&Material> {
        sorted(&self.materials)
    }

    pub fn tools_by_type(&self, tool_type: ToolType) -> Vec<&Tool> {
        self.tools()
            .into_iter()
            .filter(|t| t.tool_type == tool_type)
            .collect()
    }

    pub fn materials_by_category(&self, category: MaterialCategory) -> Vec<&Material> {
        self.materials()
            .into_iter()
            .filter(|m| m.category == category)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
            && self.spindles.is_empty()
            && self.tools.is_empty()
            && self.materials.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::model::*;

    pub fn test_tool() -> Tool {
        Tool {
            id: "em-6-3fl".to_string(),
            name: "6 mm 3-flute end mill".to_string(),
            tool_type: ToolType::FlatEndMill,
            diameter: 6.0,
            flutes: 3,
            coating: Coating::None,
            stickout: 20.0,
            tool_material: ToolMaterial::Carbide,
            default_doc: 3.0,
            default_woc: 1.5,
            metadata: ToolMetadata::default(),
        }
    }

    pub fn test_material() -> Material {
        Material {
            id: "aluminum-6061".to_string(),
            name: "Aluminum 6061-T6".to_string(),
            category: MaterialCategory::Aluminum,
            surface_speed: (200.0, 400.0),
            chipload_table: vec![
                ChiploadEntry {
                    diameter: 3.0,
                    min: 0.02,
                    max: 0.04,
                },
                ChiploadEntry {
                    diameter: 6.0,
                    min: 0.04,
                    max: 0.06,
                },
                ChiploadEntry {
                    diameter: 12.0,
                    min: 0.08,
                    max: 0.12,
                },
            ],
            force_coefficient: 0.8,
            specific_energy: 0.7,
            chip_thinning: ChipThinning::default(),
            max_engagement: 1.0,
        }
    }

    pub fn test_machine() -> Machine {
        Machine {
            id: "test-router".to_string(),
            name: "Test router".to_string(),
            max_feed: 5000.0,
            rigidity: 0.3,
            aggressiveness: AxisAggressiveness::default(),
        }
    }

    pub fn test_spindle() -> Spindle {
        Spindle {
            id: "test-spindle".to_string(),
            name: "Test 1 kW spindle".to_string(),
            rated_power_kw: 1.0,
            rpm_min: 5000.0,
            rpm_max: 24000.0,
            base_rpm: 12000.0,
            power_curve: vec![
                PowerPoint {
                    rpm: 5000.0,
                    power_kw: 0.5,
                },
                PowerPoint {
                    rpm: 12000.0,
                    power_kw: 1.0,
                },
                PowerPoint {
                    rpm: 24000.0,
                    power_kw: 1.0,
                },
            ],
        }
    }

    pub fn test_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert_machine(test_machine());
        catalog.insert_spindle(test_spindle());
        catalog.insert_tool(test_tool());
        catalog.insert_material(test_material());
        catalog
    }

    pub fn test_inputs() -> Inputs {
        Inputs::new(
            "test-router",
            "test-spindle",
            "em-6-3fl",
            "aluminum-6061",
            CutType::Profile,
        )
    }
}
