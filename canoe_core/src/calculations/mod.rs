//! # Calculations
//!
//! Everything that turns a loaded canoe into answers:
//!
//! - [`stand`] - reactions with the canoe resting on two stands
//! - [`floating`] - equilibrium waterline and buoyancy distribution
//! - [`diagrams`] - shear force and bending moment diagrams
//!
//! [`analyze`] runs a solve and both diagrams in one go and collects the
//! numbers worth reporting. The canoe passed in is never modified; the solved
//! copy is returned inside the result.
//!
//! ## Example
//!
//! ```rust
//! use canoe_core::calculations::analyze;
//! use canoe_core::canoe::{Canoe, SolveType};
//! use canoe_core::hull::Hull;
//! use canoe_core::loads::PointLoad;
//! use canoe_core::model::SolverSettings;
//!
//! let mut canoe = Canoe::new(Hull::flat(6.0).unwrap());
//! canoe.add_load(PointLoad::new(-1.0, 3.0, false).unwrap()).unwrap();
//!
//! let result = analyze(&canoe, &SolverSettings::default(), SolveType::Stands).unwrap();
//! assert_eq!(result.reactions.len(), 2);
//! assert!((result.max_moment - 1.5).abs() < 1e-9);
//! assert!((result.max_moment_position - 3.0).abs() < 1e-9);
//! ```

pub mod diagrams;
pub mod floating;
pub mod stand;

use log::info;
use serde::{Deserialize, Serialize};

use crate::canoe::{Canoe, SolveType};
use crate::errors::CanoeResult;
use crate::functions::{BoundedFunction, ExtremumSearch};
use crate::loads::{PiecewiseContinuousLoadDistribution, PointLoad};
use crate::model::SolverSettings;

pub use diagrams::{bending_moment_diagram, shear_force_diagram, DiagramPoint};
pub use floating::{solve_floating_system, FloatingSolution};
pub use stand::solve_stand_system;

/// Everything one analysis produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub solve_type: SolveType,

    /// Stand supports (empty unless solved on stands)
    pub reactions: Vec<PointLoad>,

    /// Buoyancy intensity (floating only)
    pub buoyancy: Option<PiecewiseContinuousLoadDistribution>,
    /// Equilibrium waterline below the top of the hull (m, floating only)
    pub waterline: Option<f64>,
    /// Largest buoyancy intensity (kN/m, floating only)
    pub peak_buoyancy: Option<f64>,

    /// Net force of the applied loads and hull weight (kN)
    pub net_applied_force: f64,

    /// Largest shear magnitude (kN), keeping its sign
    pub max_shear: f64,
    pub max_shear_position: f64,

    /// Largest moment magnitude (kN·m), keeping its sign
    pub max_moment: f64,
    pub max_moment_position: f64,

    pub shear_diagram: Vec<DiagramPoint>,
    pub moment_diagram: Vec<DiagramPoint>,

    /// Shear (kN) and moment (kN·m) left at the free end before closing;
    /// near zero when the canoe is in equilibrium
    pub shear_residual: f64,
    pub moment_residual: f64,

    /// The canoe with its reactions added
    pub canoe: Canoe,
}

/// Copy of `canoe` with the reactions for `solve_type` added.
///
/// Earlier reactions are dropped first. `Unsolved` returns the applied loads
/// only.
pub fn solve(canoe: &Canoe, settings: &SolverSettings, solve_type: SolveType) -> CanoeResult<(Canoe, Option<FloatingSolution>)> {
    settings.validate()?;
    let mut solved = canoe.without_reactions();
    let mut floating = None;

    match solve_type {
        SolveType::Unsolved => {}
        SolveType::Stands => {
            for reaction in solve_stand_system(&solved, settings.stand_offset)? {
                solved.add_load(reaction)?;
            }
        }
        SolveType::Floating => {
            let solution = solve_floating_system(&solved, settings.waterline_tolerance)?;
            solved.add_load(solution.buoyancy.clone())?;
            floating = Some(solution);
        }
    }

    solved.set_solve_type(solve_type);
    Ok((solved, floating))
}

/// Solve, draw both diagrams and pick out the extremes.
pub fn analyze(canoe: &Canoe, settings: &SolverSettings, solve_type: SolveType) -> CanoeResult<AnalysisResult> {
    let net_applied_force = canoe.without_reactions().net_force()?;
    let (solved, floating) = solve(canoe, settings, solve_type)?;

    let (shear_diagram, shear_residual) = diagrams::shear_force_diagram_with_residual(&solved, settings)?;
    let (moment_diagram, moment_residual) =
        diagrams::bending_moment_diagram_with_residual(&solved, &shear_diagram, settings)?;
    let origin = DiagramPoint::new(0.0, 0.0);
    let shear_peak = diagrams::max_abs(&shear_diagram).unwrap_or(origin);
    let moment_peak = diagrams::max_abs(&moment_diagram).unwrap_or(origin);

    let reactions = solved
        .point_loads()
        .into_iter()
        .filter(|p| p.is_support())
        .cloned()
        .collect();

    let peak_buoyancy = match &floating {
        Some(solution) => {
            let search = ExtremumSearch::Sampled {
                samples: settings.extremum_samples,
            };
            Some(solution.buoyancy.extremum(&solution.buoyancy.section(), search)?.max)
        }
        None => None,
    };

    info!(
        "{} analysis: max shear {:.4} kN at {:.3} m, max moment {:.4} kN·m at {:.3} m",
        solve_type, shear_peak.y, shear_peak.x, moment_peak.y, moment_peak.x
    );

    Ok(AnalysisResult {
        solve_type,
        reactions,
        waterline: floating.as_ref().map(|s| s.waterline),
        buoyancy: floating.map(|s| s.buoyancy),
        peak_buoyancy,
        net_applied_force,
        max_shear: shear_peak.y,
        max_shear_position: shear_peak.x,
        max_moment: moment_peak.y,
        max_moment_position: moment_peak.x,
        shear_diagram,
        moment_diagram,
        shear_residual,
        moment_residual,
        canoe: solved,
    })
}
