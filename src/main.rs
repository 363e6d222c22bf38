use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::OnceLock;
use thiserror::Error;

use feedsmith::calc::ToolSuggestion;
use feedsmith::job;
use feedsmith::rigidity::{self, FrameType, MachineSpec, MotionSystem, SpindleMount};
use feedsmith::{
    CalcConfig, CalcError, CalculationOutput, Calculator, Catalog, CatalogError, ConfigError,
    CutType, Inputs, MaterialCategory,
};
use feedsmith::units;

/// Whether the user asked for JSON output
static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "feedsmith", version, about = "Feeds and speeds for CNC milling")]
struct Cli {
    /// Calculation settings (TOML)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Extra catalog merged over the built-in one (JSON)
    #[arg(long, value_name = "FILE", global = true)]
    catalog: Option<PathBuf>,

    /// JSON output and JSON log lines
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    json: bool,

    /// Log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Args, Debug)]
struct CutArgs {
    /// Job file; explicit flags override its values
    #[arg(long, value_name = "FILE")]
    job: Option<PathBuf>,
    #[arg(long)]
    machine: Option<String>,
    #[arg(long)]
    spindle: Option<String>,
    #[arg(long)]
    tool: Option<String>,
    #[arg(long)]
    material: Option<String>,
    #[arg(long, value_parser = parse_cut_type)]
    cut: Option<CutType>,
    #[arg(long)]
    aggressiveness: Option<f64>,
    /// Depth of cut, mm
    #[arg(long)]
    doc: Option<f64>,
    /// Width of cut, mm
    #[arg(long)]
    woc: Option<f64>,
    #[arg(long)]
    flutes: Option<u32>,
    /// Stickout, mm
    #[arg(long)]
    stickout: Option<f64>,
    /// Derate for low-rigidity machines
    #[arg(long, action = ArgAction::SetTrue)]
    hobby: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ListKind {
    Machines,
    Spindles,
    Tools,
    Materials,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Calculate RPM, feed, power and deflection for one cut
    Calc {
        #[command(flatten)]
        cut: CutArgs,
        /// Print unrounded values
        #[arg(long, action = ArgAction::SetTrue)]
        raw: bool,
        /// Report the power scaling factor without applying it
        #[arg(long, action = ArgAction::SetTrue)]
        no_scale: bool,
    },
    /// Suggest tool diameter/stickout for a target deflection
    Suggest {
        #[command(flatten)]
        cut: CutArgs,
        /// Target deflection, mm
        #[arg(long)]
        target: f64,
    },
    /// Estimate machine rigidity from its construction
    Rigidity {
        #[arg(long, value_parser = parse_snake::<FrameType>)]
        frame: FrameType,
        #[arg(long, value_parser = parse_snake::<MotionSystem>)]
        motion: MotionSystem,
        #[arg(long, value_parser = parse_snake::<SpindleMount>)]
        mount: SpindleMount,
        /// Machine weight, kg
        #[arg(long)]
        weight: f64,
        /// Travels, mm
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
        #[arg(long)]
        z: f64,
    },
    /// List catalog entries
    List {
        #[arg(value_enum)]
        kind: ListKind,
        /// Only materials in this category (e.g. non_ferrous)
        #[arg(long, value_parser = parse_snake::<MaterialCategory>)]
        category: Option<MaterialCategory>,
    },
}

#[derive(Error, Debug)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Calc(#[from] CalcError),

    /// Already rendered with source context
    #[error("{0}")]
    Job(String),

    #[error("missing --{0} (or a job file that sets it)")]
    MissingArg(&'static str),

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

fn parse_cut_type(s: &str) -> Result<CutType, String> {
    s.parse::<CutType>().map_err(|e| e.to_string())
}

/// Parse a snake_case enum name the way the catalog spells it
fn parse_snake<T: DeserializeOwned>(s: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(s.replace('-', "_")))
        .map_err(|e| e.to_string())
}

fn init_logging(level: &str, json: bool) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .init();
    }
}

fn load_settings(cli: &Cli) -> Result<(Catalog, CalcConfig), CliError> {
    let config = match &cli.config {
        Some(path) => CalcConfig::from_file(path)?,
        None => CalcConfig::default(),
    };
    config.validate()?;

    let mut catalog = Catalog::builtin()?;
    if let Some(path) = &cli.catalog {
        catalog.merge(Catalog::from_file(path)?);
        tracing::info!(path = %path.display(), "merged user catalog");
    }
    Ok((catalog, config))
}

fn resolve_inputs(args: &CutArgs) -> Result<Inputs, CliError> {
    let base = match &args.job {
        Some(path) => {
            let (source, result) = job::load_job(path).map_err(|source| CliError::Io {
                path: path.clone(),
                source,
            })?;
            let name = path.display().to_string();
            let color = std::io::stderr().is_terminal();
            Some(result.map_err(|e| CliError::Job(job::render(&name, &source, &e, color)))?)
        }
        None => None,
    };

    let pick = |flag: &Option<String>, from_job: Option<&String>, name: &'static str| {
        flag.clone()
            .or_else(|| from_job.cloned())
            .ok_or(CliError::MissingArg(name))
    };
    let mut inputs = Inputs::new(
        pick(&args.machine, base.as_ref().map(|b| &b.machine_id), "machine")?,
        pick(&args.spindle, base.as_ref().map(|b| &b.spindle_id), "spindle")?,
        pick(&args.tool, base.as_ref().map(|b| &b.tool_id), "tool")?,
        pick(&args.material, base.as_ref().map(|b| &b.material_id), "material")?,
        args.cut
            .or(base.as_ref().map(|b| b.cut_type))
            .unwrap_or_default(),
    );
    if let Some(base) = &base {
        inputs.aggressiveness = base.aggressiveness;
        inputs.doc = base.doc;
        inputs.woc = base.woc;
        inputs.flutes = base.flutes;
        inputs.stickout = base.stickout;
        inputs.hobby_mode = base.hobby_mode;
    }
    if let Some(a) = args.aggressiveness {
        inputs.aggressiveness = a;
    }
    inputs.doc = args.doc.or(inputs.doc);
    inputs.woc = args.woc.or(inputs.woc);
    inputs.flutes = args.flutes.or(inputs.flutes);
    inputs.stickout = args.stickout.or(inputs.stickout);
    inputs.hobby_mode |= args.hobby;
    Ok(inputs)
}

fn print_output(out: &CalculationOutput) {
    println!("Spindle    {:>8.0} RPM  (target {:.0})", out.rpm, out.theoretical_rpm);
    println!(
        "Surface    {:>8.0} m/min  ({:.0} ft/min)",
        out.surface_speed, out.surface_speed_ft_min
    );
    println!(
        "Feed       {:>8.0} mm/min  ({:.4} mm/tooth, range {:.4}-{:.4})",
        out.feed_rate, out.chipload, out.chipload_range.0, out.chipload_range.1
    );
    println!(
        "Engagement {:>8.2} mm WOC x {:.2} mm DOC  ({:.3} in x {:.3} in)",
        out.radial_engagement,
        out.axial_engagement,
        units::mm_to_in(out.radial_engagement),
        units::mm_to_in(out.axial_engagement)
    );
    println!("MRR        {:>8.2} cm^3/min", out.mrr_cm3());
    println!(
        "Power      {:>8.0} W of {:.2} kW available",
        out.required_power,
        units::w_to_kw(out.available_power)
    );
    if let Some(factor) = out.power_scaling_factor {
        let state = if out.power_scaling_applied { "applied" } else { "not applied" };
        println!("           power-limited, feed scale {:.3} ({})", factor, state);
    }
    println!("Force      {:>8.1} N", out.cutting_force);
    println!(
        "Deflection {:>8.4} mm  (static {:.4}, x{:.2} dynamic)",
        out.total_deflection, out.static_deflection, out.amplification_factor
    );
    println!(
        "           bending {:.4}, shear {:.4}, holder {:.4}",
        out.bending_deflection, out.shear_deflection, out.holder_deflection
    );
    println!("Machine    {}", out.machine_class);
    match out.worst_severity() {
        Some(severity) => println!("Status     {} ({} warnings)", severity, out.warnings.len()),
        None => println!("Status     ok"),
    }
    for warning in &out.warnings {
        println!("  {}", warning);
    }
}

fn print_suggestions(suggestions: &[ToolSuggestion]) {
    println!("{:>8} {:>9} {:>11} {:>8}", "dia mm", "stick mm", "defl mm", "err %");
    for s in suggestions {
        println!(
            "{:>8.2} {:>9.1} {:>11.4} {:>8.1}",
            s.diameter,
            s.stickout,
            s.predicted_deflection,
            s.relative_error * 100.0
        );
    }
}

fn emit<T: serde::Serialize>(value: &T, text: impl FnOnce(&T)) -> Result<(), CliError> {
    if JSON_MODE.get().copied().unwrap_or(false) {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text(value);
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match &cli.cmd {
        Commands::Calc { cut, raw, no_scale } => {
            let (catalog, config) = load_settings(&cli)?;
            let inputs = resolve_inputs(cut)?;
            let calculator = Calculator::new(catalog, config);

            let mut output = calculator.compute(&inputs)?;
            if !no_scale {
                output = output.apply_power_scaling();
            }
            if !raw {
                output = feedsmith::apply_output_rounding(&output);
            }
            emit(&output, print_output)
        }
        Commands::Suggest { cut, target } => {
            let (catalog, config) = load_settings(&cli)?;
            let inputs = resolve_inputs(cut)?;
            let calculator = Calculator::new(catalog, config);
            let suggestions = calculator.suggest_tools(&inputs, *target)?;
            emit(&suggestions, |s| print_suggestions(s))
        }
        Commands::Rigidity {
            frame,
            motion,
            mount,
            weight,
            x,
            y,
            z,
        } => {
            let spec = MachineSpec {
                frame: *frame,
                motion: *motion,
                mount: *mount,
                weight_kg: *weight,
                travel_x: *x,
                travel_y: *y,
                travel_z: *z,
            };
            let estimate = rigidity::estimate_rigidity(&spec)?;
            emit(&estimate, |e| {
                println!("Rigidity {:.2} ({})", e.rigidity, e.class);
                for r in &e.nearest {
                    println!(
                        "  {:<22} rigidity {:.2}  similarity {:.0}%",
                        r.name,
                        r.rigidity,
                        r.similarity * 100.0
                    );
                }
            })
        }
        Commands::List { kind, category } => {
            let (catalog, _) = load_settings(&cli)?;
            let rows: Vec<(String, String)> = match kind {
                ListKind::Machines => catalog
                    .machines()
                    .into_iter()
                    .map(|m| (m.id.clone(), format!("{} (rigidity {:.2})", m.name, m.rigidity)))
                    .collect(),
                ListKind::Spindles => catalog
                    .spindles()
                    .into_iter()
                    .map(|s| (s.id.clone(), format!("{} ({:.2} kW)", s.name, s.rated_power_kw)))
                    .collect(),
                ListKind::Tools => catalog
                    .tools()
                    .into_iter()
                    .map(|t| (t.id.clone(), format!("{} [{}]", t.name, t.tool_type)))
                    .collect(),
                ListKind::Materials => match category {
                    Some(category) => catalog.materials_by_category(*category),
                    None => catalog.materials(),
                }
                .into_iter()
                .map(|m| (m.id.clone(), format!("{} [{}]", m.name, m.category)))
                .collect(),
            };
            emit(&rows, |rows| {
                for (id, desc) in rows {
                    println!("{:<24} {}", id, desc);
                }
            })
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    init_logging(&cli.log_level, cli.json);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            if JSON_MODE.get().copied().unwrap_or(false) {
                println!("{}", serde_json::json!({ "error": e.to_string() }));
            } else {
                eprintln!("error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}
