//! Rigid Stand System
//!
//! The canoe resting on two solid stands placed `offset` metres in from each
//! end. With every load reduced to its resultant, the two reactions follow
//! from ΣF = 0 and ΣM = 0 about `x = 0`:
//!
//! ```text
//! F  = Σ forces (hull weight included)
//! M  = Σ force · x
//! Rb = (F · a - M) / (b - a)
//! Ra = -F - Rb
//! ```
//!
//! with supports at `a = offset` and `b = length - offset`. For `offset = 0`
//! this is the familiar `Rb = -M / L`.
//!
//! ## Example
//!
//! ```rust
//! use canoe_core::calculations::stand::solve_stand_system;
//! use canoe_core::canoe::Canoe;
//! use canoe_core::hull::Hull;
//! use canoe_core::loads::PointLoad;
//!
//! let mut canoe = Canoe::new(Hull::flat(6.0).unwrap());
//! canoe.add_load(PointLoad::new(-1.0, 3.0, false).unwrap()).unwrap();
//!
//! let reactions = solve_stand_system(&canoe, 0.0).unwrap();
//! assert_eq!(reactions[0].x(), 0.0);
//! assert_eq!(reactions[1].x(), 6.0);
//! assert!((reactions[0].force() - 0.5).abs() < 1e-12);
//! assert!((reactions[1].force() - 0.5).abs() < 1e-12);
//! ```

use log::{debug, info, warn};

use crate::canoe::Canoe;
use crate::errors::{CanoeError, CanoeResult};
use crate::loads::{LoadType, PointLoad};

/// Support reactions for the canoe on two stands.
///
/// Returns the start support followed by the end support. Supports or
/// buoyancy already on the canoe from an earlier solve are ignored.
///
/// # Errors
///
/// - `UpwardNetForce` when the loads already push the canoe up
/// - `InvalidInput` when `offset` is negative or reaches the middle
/// - `NoHull` when the canoe has no hull
pub fn solve_stand_system(canoe: &Canoe, offset: f64) -> CanoeResult<Vec<PointLoad>> {
    let applied = canoe.without_reactions();
    let length = applied.length()?;

    if !offset.is_finite() || offset < 0.0 || offset >= length / 2.0 {
        return Err(CanoeError::invalid_input(
            "stand_offset",
            offset.to_string(),
            format!("Stands must sit in [0, {}) from each end", length / 2.0),
        ));
    }

    let net_force = applied.net_force()?;
    if net_force > 0.0 {
        warn!("Stand solve refused, net force {:.4} kN is upward", net_force);
        return Err(CanoeError::UpwardNetForce { net_force });
    }
    let moment = applied.net_moment_about(0.0)?;
    debug!("Stand solve: net force {:.6} kN, moment about 0 {:.6} kN·m", net_force, moment);

    let (start, end) = (offset, length - offset);
    let end_force = (net_force * start - moment) / (end - start);
    let start_force = -net_force - end_force;

    info!(
        "Stand reactions: {:.4} kN at x = {}, {:.4} kN at x = {}",
        start_force, start, end_force, end
    );

    Ok(vec![
        PointLoad::typed(LoadType::PointLoadSupport, start_force, start, true)?,
        PointLoad::typed(LoadType::PointLoadSupport, end_force, end, true)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hull::{library, Hull};
    use crate::loads::UniformLoadDistribution;
    use approx::assert_abs_diff_eq;

    fn balance(canoe: &Canoe, reactions: &[PointLoad]) -> (f64, f64) {
        let force = canoe.net_force().unwrap() + reactions.iter().map(|r| r.force()).sum::<f64>();
        let moment = canoe.net_moment_about(0.0).unwrap() + reactions.iter().map(|r| r.moment_about(0.0)).sum::<f64>();
        (force, moment)
    }

    #[test]
    fn test_point_load_at_midspan() {
        let mut canoe = Canoe::new(Hull::flat(6.0).unwrap());
        canoe.add_load(PointLoad::new(-1.0, 3.0, false).unwrap()).unwrap();

        let reactions = solve_stand_system(&canoe, 0.0).unwrap();
        assert_eq!(reactions.len(), 2);
        assert!(reactions.iter().all(|r| r.is_support()));
        assert_eq!(reactions[0].load_type(), LoadType::PointLoadSupport);
        assert_abs_diff_eq!(reactions[0].force(), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(reactions[1].force(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_uniform_load_on_weightless_hull() {
        let mut canoe = Canoe::new(Hull::rectangular(4.0, 0.4, 0.7).unwrap());
        canoe.add_load(UniformLoadDistribution::new(-2.0, 1.0, 3.0).unwrap()).unwrap();

        let reactions = solve_stand_system(&canoe, 0.0).unwrap();
        let total: f64 = reactions.iter().map(|r| r.force()).sum();
        assert_abs_diff_eq!(total, 4.0, epsilon = 1e-12);

        let (force, moment) = balance(&canoe, &reactions);
        assert_abs_diff_eq!(force, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(moment, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_balances_hull_weight() {
        let mut canoe = Canoe::new(library::shark_bait(6.0).unwrap());
        canoe.add_load(PointLoad::new(-0.8, 1.5, false).unwrap()).unwrap();
        canoe.add_load(UniformLoadDistribution::new(-0.3, 2.0, 5.0).unwrap()).unwrap();

        let reactions = solve_stand_system(&canoe, 0.0).unwrap();
        let (force, moment) = balance(&canoe, &reactions);
        assert_abs_diff_eq!(force, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(moment, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_offset_stands() {
        let mut canoe = Canoe::new(Hull::flat(6.0).unwrap());
        canoe.add_load(PointLoad::new(-1.0, 2.0, false).unwrap()).unwrap();

        let reactions = solve_stand_system(&canoe, 1.0).unwrap();
        assert_eq!(reactions[0].x(), 1.0);
        assert_eq!(reactions[1].x(), 5.0);
        assert_abs_diff_eq!(reactions[0].force(), 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(reactions[1].force(), 0.25, epsilon = 1e-12);

        assert!(solve_stand_system(&canoe, 3.0).is_err());
        assert!(solve_stand_system(&canoe, -0.1).is_err());
    }

    #[test]
    fn test_upward_net_force_is_refused() {
        let mut canoe = Canoe::new(Hull::flat(6.0).unwrap());
        canoe.add_load(PointLoad::new(2.0, 3.0, false).unwrap()).unwrap();

        let err = solve_stand_system(&canoe, 0.0).unwrap_err();
        assert_eq!(err.error_code(), "UPWARD_NET_FORCE");
        assert!(err.is_precondition());
    }

    #[test]
    fn test_earlier_reactions_are_ignored() {
        let mut canoe = Canoe::new(Hull::flat(6.0).unwrap());
        canoe.add_load(PointLoad::new(-1.0, 3.0, false).unwrap()).unwrap();
        let first = solve_stand_system(&canoe, 0.0).unwrap();
        for reaction in first.clone() {
            canoe.add_load(reaction).unwrap();
        }

        let second = solve_stand_system(&canoe, 0.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unloaded_flat_hull() {
        let canoe = Canoe::new(Hull::flat(6.0).unwrap());
        let reactions = solve_stand_system(&canoe, 0.0).unwrap();
        assert_eq!(reactions[0].force(), 0.0);
        assert_eq!(reactions[1].force(), 0.0);
    }
}
