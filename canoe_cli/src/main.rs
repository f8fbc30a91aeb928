//! # Canoe CLI
//!
//! Terminal front end for the canoe analysis engine.
//!
//! ```text
//! canoe_cli [MODEL.canoe] [--stands | --floating] [--save PATH] [--json]
//! ```
//!
//! Without a model path the reference hull is loaded with two paddlers and
//! some gear. Both solves run unless one is picked. `RUST_LOG=debug` shows the
//! solver at work.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use canoe_core::calculations::{analyze, AnalysisResult};
use canoe_core::canoe::{Canoe, SolveType};
use canoe_core::file_io::{load_model, save_model};
use canoe_core::hull::library;
use canoe_core::loads::{PointLoad, UniformLoadDistribution};
use canoe_core::model::CanoeModel;
use canoe_core::CanoeResult;
use log::{info, warn};
use serde::Serialize;

/// Summary printed as JSON; the full diagrams are left out.
#[derive(Serialize)]
struct Report<'a> {
    model: &'a str,
    solve_type: SolveType,
    reactions: Vec<(f64, f64)>,
    waterline: Option<f64>,
    net_applied_force: f64,
    max_shear: f64,
    max_shear_position: f64,
    max_moment: f64,
    max_moment_position: f64,
    shear_points: usize,
    moment_points: usize,
    shear_residual: f64,
    moment_residual: f64,
}

impl<'a> Report<'a> {
    fn new(model: &'a str, result: &AnalysisResult) -> Self {
        Report {
            model,
            solve_type: result.solve_type,
            reactions: result.reactions.iter().map(|r| (r.x(), r.force())).collect(),
            waterline: result.waterline,
            net_applied_force: result.net_applied_force,
            max_shear: result.max_shear,
            max_shear_position: result.max_shear_position,
            max_moment: result.max_moment,
            max_moment_position: result.max_moment_position,
            shear_points: result.shear_diagram.len(),
            moment_points: result.moment_diagram.len(),
            shear_residual: result.shear_residual,
            moment_residual: result.moment_residual,
        }
    }
}

#[derive(Default)]
struct Args {
    model_path: Option<PathBuf>,
    solve_types: Vec<SolveType>,
    save_path: Option<PathBuf>,
    json: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--stands" => args.solve_types.push(SolveType::Stands),
            "--floating" => args.solve_types.push(SolveType::Floating),
            "--json" => args.json = true,
            "--save" => {
                let path = iter.next().ok_or("--save needs a path")?;
                args.save_path = Some(PathBuf::from(path));
            }
            flag if flag.starts_with("--") => return Err(format!("Unknown option {}", flag)),
            path => args.model_path = Some(PathBuf::from(path)),
        }
    }
    if args.solve_types.is_empty() {
        args.solve_types = vec![SolveType::Stands, SolveType::Floating];
    }
    Ok(args)
}

/// The reference hull with two paddlers and a cooler amidships.
fn sample_model() -> CanoeResult<CanoeModel> {
    let mut canoe = Canoe::new(library::shark_bait(6.0)?);
    canoe.add_load(PointLoad::new(-0.8, 1.5, false)?)?;
    canoe.add_load(PointLoad::new(-0.8, 4.5, false)?)?;
    canoe.add_load(UniformLoadDistribution::new(-0.2, 2.5, 3.5)?)?;
    Ok(CanoeModel::new("canoe_cli", "Shark Bait (sample)", canoe))
}

fn open_model(path: Option<&Path>) -> CanoeResult<CanoeModel> {
    match path {
        Some(path) => {
            info!("Loading {}", path.display());
            load_model(path)
        }
        None => sample_model(),
    }
}

fn print_result(result: &AnalysisResult) {
    println!("═══════════════════════════════════════");
    println!("  {} ", result.solve_type.to_string().to_uppercase());
    println!("═══════════════════════════════════════");
    println!();
    println!("  Net applied force: {:.4} kN", result.net_applied_force);
    for reaction in &result.reactions {
        println!("  Support at {:.3} m: {:+.4} kN", reaction.x(), reaction.force());
    }
    if let Some(waterline) = result.waterline {
        println!("  Waterline:         {:.4} m below the gunwale", -waterline);
    }
    if let Some(peak) = result.peak_buoyancy {
        println!("  Peak buoyancy:     {:.4} kN/m", peak);
    }
    println!();
    println!("  V_max = {:+.4} kN   at x = {:.3} m", result.max_shear, result.max_shear_position);
    println!("  M_max = {:+.4} kN·m at x = {:.3} m", result.max_moment, result.max_moment_position);
    println!(
        "  ({} SFD points, {} BMD points)",
        result.shear_diagram.len(),
        result.moment_diagram.len()
    );
    println!(
        "  Closure: {:.2e} kN shear, {:.2e} kN·m moment left at the end",
        result.shear_residual, result.moment_residual
    );
    println!();
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Usage: canoe_cli [MODEL.canoe] [--stands | --floating] [--save PATH] [--json]");
            return ExitCode::from(2);
        }
    };

    println!("Canoe Analysis CLI");
    println!("==================");
    println!();

    let model = match open_model(args.model_path.as_deref()) {
        Ok(model) => model,
        Err(e) => return report_error(&e),
    };
    println!("Model: {} by {}", model.meta.name, model.meta.author);
    if let Ok(hull) = model.canoe.hull() {
        println!(
            "Hull:  {:.2} m long, {:.3} m deep, {:.1} kg",
            hull.length(),
            hull.max_height().unwrap_or(0.0),
            hull.mass()
        );
    }
    println!("Loads: {}", model.canoe.loads().len());
    println!();

    let mut failed = false;
    for solve_type in &args.solve_types {
        match analyze(&model.canoe, &model.settings, *solve_type) {
            Ok(result) => {
                print_result(&result);
                if args.json {
                    println!("JSON Output:");
                    if let Ok(json) = serde_json::to_string_pretty(&Report::new(&model.meta.name, &result)) {
                        println!("{}", json);
                    }
                    println!();
                }
            }
            Err(e) if e.is_precondition() => {
                warn!("{} solve refused: {}", solve_type, e);
                println!("{}: not solved ({})", solve_type, e);
                println!();
            }
            Err(e) => {
                report_error(&e);
                failed = true;
            }
        }
    }

    if let Some(path) = &args.save_path {
        match save_model(&model, path) {
            Ok(()) => println!("Saved model to {}", path.display()),
            Err(e) => {
                report_error(&e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn report_error(e: &canoe_core::CanoeError) -> ExitCode {
    eprintln!("Error: {}", e);
    if let Ok(json) = serde_json::to_string_pretty(e) {
        eprintln!();
        eprintln!("Error JSON:");
        eprintln!("{}", json);
    }
    ExitCode::FAILURE
}
