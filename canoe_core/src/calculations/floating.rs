//! Floating Equilibrium
//!
//! The canoe floating level in still water. Buoyancy at a trial waterline is
//! the weight of the displaced water:
//!
//! ```text
//! buoyancy(w) = ρ · g / 1000 · Σ ∫ width · (w - min(profile(x), w)) dx
//! ```
//!
//! which never decreases as `w` rises toward the top of the hull (`w = 0`).
//! The equilibrium waterline, where buoyancy matches the magnitude of the net
//! downward force, is found by bisection on `[-max_height, 0]`. The lower bound
//! assumes the hull's lowest profile point is the first thing to touch water.
//!
//! At that waterline the buoyancy intensity is rebuilt as a piecewise
//! continuous distribution over the canoe's section endpoints, so the diagram
//! generator sees a smooth curve rather than one block per hull section.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::canoe::Canoe;
use crate::constants::{DENSITY_OF_WATER, GRAVITY, NEWTONS_PER_KN};
use crate::errors::{CanoeError, CanoeResult};
use crate::functions::calculus::simpson;
use crate::functions::{Curve, Section};
use crate::hull::Hull;
use crate::loads::{LoadType, Piece, PiecewiseContinuousLoadDistribution};

/// Upper bound on bisection steps; 1e-15 of a 1 m hull takes about 50.
const MAX_BISECTION_ITERATIONS: usize = 200;

/// Weight of one cubic metre of water (kN/m³)
pub fn water_specific_weight() -> f64 {
    DENSITY_OF_WATER * GRAVITY / NEWTONS_PER_KN
}

/// Result of a floating solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingSolution {
    /// Upward buoyancy intensity along the canoe (kN/m)
    pub buoyancy: PiecewiseContinuousLoadDistribution,
    /// Equilibrium waterline, measured from the top of the hull (m, ≤ 0)
    pub waterline: f64,
    /// Bisection steps taken
    pub iterations: usize,
}

/// Total buoyant force (kN) with the waterline at `waterline`.
///
/// # Example
///
/// ```rust
/// use canoe_core::calculations::floating::{total_buoyancy, water_specific_weight};
/// use canoe_core::hull::Hull;
///
/// // 4 m x 0.7 m box, 0.4 m deep, submerged to half its depth
/// let hull = Hull::rectangular(4.0, 0.4, 0.7).unwrap();
/// let buoyancy = total_buoyancy(&hull, -0.2);
/// assert!((buoyancy - 4.0 * 0.7 * 0.2 * water_specific_weight()).abs() < 1e-9);
/// ```
pub fn total_buoyancy(hull: &Hull, waterline: f64) -> f64 {
    hull.sections()
        .iter()
        .map(|s| {
            let submerged = Curve::submerged(s.profile().clone(), s.width(), waterline, water_specific_weight());
            simpson(&submerged, s.x(), s.rx())
        })
        .sum()
}

/// Waterline at which buoyancy balances the canoe's net downward force.
///
/// Returns the waterline and the number of bisection steps. Reactions from an
/// earlier solve are ignored.
pub fn equilibrium_waterline(canoe: &Canoe, tolerance: f64) -> CanoeResult<(f64, usize)> {
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return Err(CanoeError::invalid_input(
            "waterline_tolerance",
            tolerance.to_string(),
            "Tolerance must be positive",
        ));
    }

    let applied = canoe.without_reactions();
    let hull = applied.hull()?;
    let target = -applied.net_force()?;
    if target < 0.0 {
        return Err(CanoeError::UpwardNetForce { net_force: -target });
    }

    let max_buoyancy = total_buoyancy(hull, 0.0);
    if target > max_buoyancy {
        return Err(CanoeError::CanoeSinks {
            net_force: -target,
            max_buoyancy,
        });
    }

    let (mut low, mut high) = (-hull.max_height()?, 0.0);
    let mut iterations = 0;
    while high - low > tolerance {
        if iterations >= MAX_BISECTION_ITERATIONS {
            return Err(CanoeError::non_convergence(
                "waterline bisection",
                format!("bracket [{}, {}] still wider than {}", low, high, tolerance),
            ));
        }
        let waterline = 0.5 * (low + high);
        if total_buoyancy(hull, waterline) < target {
            low = waterline;
        } else {
            high = waterline;
        }
        iterations += 1;
    }

    let waterline = 0.5 * (low + high);
    debug!(
        "Waterline {:.8} m after {} steps, target buoyancy {:.6} kN",
        waterline, iterations, target
    );
    Ok((waterline, iterations))
}

/// Buoyancy intensity with the water at `waterline`, one piece per interval
/// between the canoe's section endpoints.
pub fn buoyancy_distribution(canoe: &Canoe, waterline: f64) -> CanoeResult<PiecewiseContinuousLoadDistribution> {
    let hull = canoe.hull()?;
    let endpoints = canoe.section_endpoints()?;

    let pieces = endpoints
        .windows(2)
        .map(|pair| -> CanoeResult<Piece> {
            let section = Section::new(pair[0], pair[1])?;
            let hull_section = hull.section_at(section.midpoint()).ok_or_else(|| CanoeError::Internal {
                message: format!("no hull section under x = {}", section.midpoint()),
            })?;
            let function = Curve::submerged(
                hull_section.profile().clone(),
                hull_section.width(),
                waterline,
                water_specific_weight(),
            );
            Ok(Piece::new(section, function))
        })
        .collect::<CanoeResult<Vec<_>>>()?;

    PiecewiseContinuousLoadDistribution::new(LoadType::Buoyancy, pieces)
}

/// Solve the floating case.
///
/// Checked in order:
/// 1. no net force: zero buoyancy, waterline at the bottom of the hull
/// 2. a hull with no weight or volume is refused (`ZeroWeightHull`)
/// 3. an upward net force is refused (`UpwardNetForce`)
/// 4. asymmetric loading is refused (`AsymmetricLoading`)
/// 5. more load than the fully submerged hull carries (`CanoeSinks`)
///
/// # Example
///
/// ```rust
/// use canoe_core::calculations::floating::solve_floating_system;
/// use canoe_core::canoe::Canoe;
/// use canoe_core::hull::library;
///
/// let canoe = Canoe::new(library::shark_bait(6.0).unwrap());
/// let solution = solve_floating_system(&canoe, 1e-6).unwrap();
/// assert!(solution.waterline < 0.0);
/// assert!((solution.buoyancy.force() + canoe.net_force().unwrap()).abs() < 1e-3);
/// ```
pub fn solve_floating_system(canoe: &Canoe, tolerance: f64) -> CanoeResult<FloatingSolution> {
    let applied = canoe.without_reactions();
    let hull = applied.hull()?;
    let net_force = applied.net_force()?;

    if net_force == 0.0 {
        debug!("Floating solve: no net force, buoyancy is zero");
        let endpoints = applied.section_endpoints()?;
        let sections = endpoints
            .windows(2)
            .map(|pair| Section::new(pair[0], pair[1]))
            .collect::<CanoeResult<Vec<_>>>()?;
        return Ok(FloatingSolution {
            buoyancy: PiecewiseContinuousLoadDistribution::zero(LoadType::Buoyancy, &sections)?,
            waterline: -hull.max_height()?,
            iterations: 0,
        });
    }

    if hull.self_weight() == 0.0 || hull.total_volume() == 0.0 {
        warn!("Floating solve refused, the hull has no weight");
        return Err(CanoeError::ZeroWeightHull);
    }
    if net_force > 0.0 {
        warn!("Floating solve refused, net force {:.4} kN is upward", net_force);
        return Err(CanoeError::UpwardNetForce { net_force });
    }
    if !applied.is_symmetrically_loaded()? {
        warn!("Floating solve refused, loads are not symmetric");
        return Err(CanoeError::AsymmetricLoading);
    }

    let (waterline, iterations) = equilibrium_waterline(&applied, tolerance)?;
    let buoyancy = buoyancy_distribution(&applied, waterline)?;
    info!(
        "Floating at waterline {:.6} m, buoyancy {:.4} kN against {:.4} kN",
        waterline,
        buoyancy.force(),
        net_force
    );

    Ok(FloatingSolution {
        buoyancy,
        waterline,
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hull::library;
    use crate::loads::{PointLoad, UniformLoadDistribution};
    use approx::assert_abs_diff_eq;

    fn paddled_canoe() -> Canoe {
        let mut canoe = Canoe::new(library::shark_bait(6.0).unwrap());
        canoe.add_load(PointLoad::new(-0.8, 1.5, false).unwrap()).unwrap();
        canoe.add_load(PointLoad::new(-0.8, 4.5, false).unwrap()).unwrap();
        canoe
    }

    #[test]
    fn test_buoyancy_is_monotonic() {
        let hull = library::shark_bait(6.0).unwrap();
        let mut previous = total_buoyancy(&hull, -0.4);
        assert_abs_diff_eq!(previous, 0.0, epsilon = 1e-9);
        for i in 1..=40 {
            let waterline = -0.4 + i as f64 * 0.01;
            let current = total_buoyancy(&hull, waterline);
            assert!(current >= previous, "buoyancy fell at waterline {}", waterline);
            previous = current;
        }
    }

    #[test]
    fn test_box_buoyancy() {
        let hull = Hull::rectangular(4.0, 0.4, 0.7).unwrap();
        assert_abs_diff_eq!(
            total_buoyancy(&hull, 0.0),
            hull.total_volume() * water_specific_weight(),
            epsilon = 1e-9
        );
        assert_eq!(total_buoyancy(&hull, -0.5), 0.0);
    }

    #[test]
    fn test_equilibrium_balances_weight() {
        let canoe = paddled_canoe();
        let solution = solve_floating_system(&canoe, 1e-6).unwrap();
        let net_force = canoe.net_force().unwrap();

        assert!(solution.waterline < 0.0 && solution.waterline > -0.4);
        assert!(solution.iterations > 0 && solution.iterations <= MAX_BISECTION_ITERATIONS);
        assert_eq!(solution.buoyancy.load_type(), LoadType::Buoyancy);
        assert_abs_diff_eq!(solution.buoyancy.force(), -net_force, epsilon = 1e-3);
        assert_abs_diff_eq!(
            total_buoyancy(canoe.hull().unwrap(), solution.waterline),
            -net_force,
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_buoyancy_follows_section_endpoints() {
        let canoe = paddled_canoe();
        let (waterline, _) = equilibrium_waterline(&canoe, 1e-6).unwrap();
        let buoyancy = buoyancy_distribution(&canoe, waterline).unwrap();

        let endpoints = canoe.section_endpoints().unwrap();
        assert_eq!(buoyancy.pieces().len(), endpoints.len() - 1);
        assert_eq!(buoyancy.x(), 0.0);
        assert_eq!(buoyancy.rx(), 6.0);
        assert!(buoyancy.max_signed_value() > 0.0);
    }

    #[test]
    fn test_heavier_canoe_sits_lower() {
        let light = paddled_canoe();
        let mut heavy = paddled_canoe();
        heavy.add_load(UniformLoadDistribution::new(-0.5, 2.0, 4.0).unwrap()).unwrap();

        let (light_line, _) = equilibrium_waterline(&light, 1e-6).unwrap();
        let (heavy_line, _) = equilibrium_waterline(&heavy, 1e-6).unwrap();
        assert!(heavy_line > light_line);
    }

    #[test]
    fn test_zero_weight_hull_is_refused() {
        let mut canoe = Canoe::new(Hull::rectangular(6.0, 0.4, 0.7).unwrap());
        canoe.add_load(PointLoad::new(-1.0, 3.0, false).unwrap()).unwrap();
        let err = solve_floating_system(&canoe, 1e-6).unwrap_err();
        assert_eq!(err, CanoeError::ZeroWeightHull);
    }

    #[test]
    fn test_asymmetric_loading_is_refused() {
        let mut canoe = Canoe::new(library::shark_bait(6.0).unwrap());
        canoe.add_load(PointLoad::new(-0.8, 1.5, false).unwrap()).unwrap();
        let err = solve_floating_system(&canoe, 1e-6).unwrap_err();
        assert_eq!(err, CanoeError::AsymmetricLoading);
    }

    #[test]
    fn test_overloaded_canoe_sinks() {
        let mut canoe = Canoe::new(library::shark_bait(6.0).unwrap());
        canoe.add_load(PointLoad::new(-100.0, 3.0, false).unwrap()).unwrap();
        let err = solve_floating_system(&canoe, 1e-6).unwrap_err();
        assert_eq!(err.error_code(), "CANOE_SINKS");
        assert!(err.is_precondition());
    }

    #[test]
    fn test_no_net_force() {
        let canoe = Canoe::new(Hull::flat(6.0).unwrap());
        let solution = solve_floating_system(&canoe, 1e-6).unwrap();
        assert_eq!(solution.iterations, 0);
        assert_eq!(solution.buoyancy.force(), 0.0);
        assert_eq!(solution.buoyancy.rx(), 6.0);
    }

    #[test]
    fn test_rejects_bad_tolerance() {
        let canoe = paddled_canoe();
        assert!(equilibrium_waterline(&canoe, 0.0).is_err());
        assert!(equilibrium_waterline(&canoe, f64::NAN).is_err());
    }
}
