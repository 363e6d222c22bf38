//! feedsmith - feeds, speeds, force, power and deflection for CNC milling
//!
//! ```no_run
//! use feedsmith::{compute, CalcConfig, Catalog, CutType, Inputs};
//!
//! let catalog = Catalog::builtin()?;
//! let inputs = Inputs::new("shapeoko-4", "vfd-1.5kw", "em-6-3fl", "aluminum-6061", CutType::Adaptive);
//! let output = compute(&inputs, &catalog, &CalcConfig::default())?.apply_power_scaling();
//! println!("{:.0} RPM at {:.0} mm/min", output.rpm, output.feed_rate);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod calc;
pub mod catalog;
pub mod config;
pub mod job;
pub mod model;
pub mod rigidity;
pub mod units;

pub use calc::{
    apply_output_rounding, compute, CalcError, CalculationOutput, Calculator, Severity, Warning,
    WarningKind,
};
pub use catalog::{Catalog, CatalogError};
pub use config::{CalcConfig, ConfigError};
pub use model::*;
