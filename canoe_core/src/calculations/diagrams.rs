//! Shear Force and Bending Moment Diagrams
//!
//! Both diagrams are returned as point lists ready to plot. A vertical jump
//! in the shear diagram (a point load) shows up as two points with the same
//! `x`; those are kept, not merged.
//!
//! ## Shear
//!
//! Every load on the canoe is reduced to events on a fixed grid of
//! `diagram_step` metres: point loads, and the starts and ends of uniform
//! pieces. Piecewise continuous loads are first chopped into uniform pieces
//! (`piecewise_samples_per_metre`). Walking the events in order gives a run of
//! intervals `(x, rx, jump, slope)`, which are then turned into points.
//!
//! ## Moment
//!
//! The moment diagram integrates consecutive shear points. Flat shear gives a
//! straight moment segment; sloped shear gives a parabola, traced every
//! `bmd_step` metres by summing rectangle plus triangle areas.
//!
//! Both diagrams start at `(0, 0)` and are closed at `(length, 0)`.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::canoe::Canoe;
use crate::constants::ENDPOINT_DIGITS;
use crate::errors::CanoeResult;
use crate::functions::calculus::round_digits;
use crate::loads::{DiscreteLoadDistribution, Load, UniformLoadDistribution};
use crate::model::SolverSettings;

/// Residual at the free end above which the closure is logged.
const CLOSURE_TOLERANCE: f64 = 1e-3;

/// One point of a diagram: position (m) and shear (kN) or moment (kN·m).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagramPoint {
    pub x: f64,
    pub y: f64,
}

impl DiagramPoint {
    pub fn new(x: f64, y: f64) -> Self {
        DiagramPoint { x, y }
    }
}

/// A stretch of the shear diagram: a jump of `magnitude` at `x`, then a
/// straight line of `slope` up to `rx`.
#[derive(Debug, Clone, Copy)]
struct DiagramInterval {
    x: f64,
    rx: f64,
    magnitude: f64,
    slope: f64,
}

impl DiagramInterval {
    fn length(&self) -> f64 {
        self.rx - self.x
    }
}

/// Loads keyed by grid index along the canoe.
#[derive(Default)]
struct LoadEvents {
    points: BTreeMap<i64, f64>,
    starts: BTreeMap<i64, f64>,
    ends: BTreeMap<i64, f64>,
}

impl LoadEvents {
    fn collect(loads: &[Load], settings: &SolverSettings) -> CanoeResult<Self> {
        let key = |x: f64| (x / settings.diagram_step).round() as i64;
        let mut events = LoadEvents::default();
        let add_uniform = |events: &mut LoadEvents, load: &UniformLoadDistribution| {
            *events.starts.entry(key(load.x())).or_insert(0.0) += load.magnitude();
            *events.ends.entry(key(load.rx())).or_insert(0.0) += load.magnitude();
        };

        for load in loads {
            match load {
                // Coincident supports and applied loads are summed here
                Load::PointLoad(p) => *events.points.entry(key(p.x())).or_insert(0.0) += p.force(),
                Load::UniformLoadDistribution(u) => add_uniform(&mut events, u),
                Load::DiscreteLoadDistribution(d) => {
                    for piece in d.loads() {
                        add_uniform(&mut events, piece);
                    }
                }
                Load::PiecewiseContinuousLoadDistribution(p) => {
                    let pieces = (p.section().length() * settings.piecewise_samples_per_metre as f64)
                        .round()
                        .max(1.0) as usize;
                    let discrete = DiscreteLoadDistribution::from_piecewise(p, pieces)?;
                    for piece in discrete.loads() {
                        add_uniform(&mut events, piece);
                    }
                }
            }
        }
        Ok(events)
    }

    /// Sweep the grid up to (not including) `end_key`, closing an interval at
    /// every event.
    ///
    /// Point loads that snap onto the free end are left to the closing point;
    /// their sum is returned alongside the intervals.
    fn intervals(&self, length: f64, step: f64) -> (Vec<DiagramInterval>, f64) {
        let end_key = (length / step).round() as i64;
        let at_end: f64 = self.points.range(end_key..).map(|(_, force)| force).sum();
        if at_end != 0.0 {
            debug!("{:.6} kN of point load at the free end x = {} folded into the closure", at_end, length);
        }
        let mut keys: Vec<i64> = self
            .points
            .keys()
            .chain(self.starts.keys())
            .chain(self.ends.keys())
            .copied()
            .filter(|k| *k < end_key)
            .collect();
        keys.sort_unstable();
        keys.dedup();

        let mut intervals = Vec::new();
        let (mut prev_x, mut slope, mut magnitude) = (0.0, 0.0, 0.0);
        for k in keys {
            let x = round_digits(k as f64 * step, ENDPOINT_DIGITS);
            if let Some(start) = self.starts.get(&k) {
                intervals.push(DiagramInterval { x: prev_x, rx: x, magnitude, slope });
                slope += start;
                prev_x = x;
                magnitude = 0.0;
            }
            if let Some(end) = self.ends.get(&k) {
                intervals.push(DiagramInterval { x: prev_x, rx: x, magnitude, slope });
                slope -= end;
                prev_x = x;
                magnitude = 0.0;
            }
            if let Some(force) = self.points.get(&k) {
                intervals.push(DiagramInterval { x: prev_x, rx: x, magnitude, slope });
                magnitude = *force;
                prev_x = x;
            }
        }
        intervals.push(DiagramInterval {
            x: prev_x,
            rx: length,
            magnitude,
            slope,
        });
        (intervals, at_end)
    }
}

/// Append unless it repeats the last point. Diagram x never decreases and
/// each x carries at most one jump, so a repeat can only be the last point.
fn push_distinct(points: &mut Vec<DiagramPoint>, point: DiagramPoint) {
    if points.last() != Some(&point) {
        points.push(point);
    }
}

/// Shear force diagram of the canoe with all its loads, reactions included.
///
/// # Example
///
/// ```rust
/// use canoe_core::calculations::diagrams::{shear_force_diagram, DiagramPoint};
/// use canoe_core::canoe::Canoe;
/// use canoe_core::hull::Hull;
/// use canoe_core::loads::PointLoad;
/// use canoe_core::model::SolverSettings;
///
/// let mut canoe = Canoe::new(Hull::flat(6.0).unwrap());
/// canoe.add_load(PointLoad::new(0.5, 0.0, true).unwrap()).unwrap();
/// canoe.add_load(PointLoad::new(-1.0, 3.0, false).unwrap()).unwrap();
/// canoe.add_load(PointLoad::new(0.5, 6.0, true).unwrap()).unwrap();
///
/// let sfd = shear_force_diagram(&canoe, &SolverSettings::default()).unwrap();
/// assert_eq!(sfd.first(), Some(&DiagramPoint::new(0.0, 0.0)));
/// assert_eq!(sfd.last(), Some(&DiagramPoint::new(6.0, 0.0)));
/// ```
pub fn shear_force_diagram(canoe: &Canoe, settings: &SolverSettings) -> CanoeResult<Vec<DiagramPoint>> {
    shear_force_diagram_with_residual(canoe, settings).map(|(points, _)| points)
}

/// [`shear_force_diagram`] plus the shear left over at the free end once
/// every load, end loads included, is counted. Near zero for a balanced canoe.
pub fn shear_force_diagram_with_residual(
    canoe: &Canoe,
    settings: &SolverSettings,
) -> CanoeResult<(Vec<DiagramPoint>, f64)> {
    settings.validate()?;
    let length = canoe.length()?;
    let loads = canoe.resolved_loads()?;

    let events = LoadEvents::collect(&loads, settings)?;
    let (intervals, at_end) = events.intervals(length, settings.diagram_step);

    let mut points = Vec::with_capacity(2 * intervals.len() + 1);
    let mut rolling = 0.0;
    for interval in &intervals {
        rolling += interval.magnitude;
        push_distinct(&mut points, DiagramPoint::new(interval.x, rolling));
        rolling += interval.slope * interval.length();
        push_distinct(&mut points, DiagramPoint::new(interval.rx, rolling));
    }

    let residual = rolling + at_end;
    if residual.abs() > CLOSURE_TOLERANCE {
        warn!("SFD does not close: {:.6} kN left at x = {}", residual, length);
    }
    push_distinct(&mut points, DiagramPoint::new(length, 0.0));

    debug!("SFD: {} intervals, {} points", intervals.len(), points.len());
    Ok((points, residual))
}

/// Area under a straight line from `y_low` to `y_high` over `dx`: a rectangle
/// plus the triangle on top.
fn strip_area(dx: f64, y_low: f64, y_high: f64) -> f64 {
    dx * y_low + dx * 0.5 * (y_high - y_low)
}

/// Moment points along a sloped shear segment from `start` to `end`, with the
/// moment at `start` equal to `moment`.
fn parabolic_points(start: DiagramPoint, end: DiagramPoint, moment: f64, step: f64) -> Vec<DiagramPoint> {
    let slope = (end.y - start.y) / (end.x - start.x);
    let steps = ((end.x - start.x) / step - 1e-9).ceil().max(1.0) as usize;

    let mut points = Vec::with_capacity(steps);
    let (mut prev_x, mut prev_y, mut area) = (start.x, start.y, 0.0);
    for i in 1..=steps {
        let x = if i == steps { end.x } else { start.x + i as f64 * step };
        let y = start.y + slope * (x - start.x);
        area += strip_area(x - prev_x, prev_y.min(y), prev_y.max(y));
        points.push(DiagramPoint::new(x, moment + area));
        prev_x = x;
        prev_y = y;
    }
    points
}

/// Bending moment diagram from a shear force diagram of the same canoe.
pub fn bending_moment_diagram(
    canoe: &Canoe,
    sfd: &[DiagramPoint],
    settings: &SolverSettings,
) -> CanoeResult<Vec<DiagramPoint>> {
    bending_moment_diagram_with_residual(canoe, sfd, settings).map(|(points, _)| points)
}

/// [`bending_moment_diagram`] plus the moment left at the free end before the
/// diagram is closed.
pub fn bending_moment_diagram_with_residual(
    canoe: &Canoe,
    sfd: &[DiagramPoint],
    settings: &SolverSettings,
) -> CanoeResult<(Vec<DiagramPoint>, f64)> {
    settings.validate()?;
    let length = canoe.length()?;

    let mut points = vec![DiagramPoint::new(0.0, 0.0)];
    let mut moment = 0.0;
    for pair in sfd.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        if curr.x == prev.x {
            // Jump in shear, no moment change
            continue;
        }
        if curr.y == prev.y {
            moment += prev.y * (curr.x - prev.x);
            push_distinct(&mut points, DiagramPoint::new(curr.x, moment));
        } else {
            let parabola = parabolic_points(prev, curr, moment, settings.bmd_step);
            if let Some(last) = parabola.last() {
                moment = last.y;
            }
            points.extend(parabola);
        }
    }

    if moment.abs() > CLOSURE_TOLERANCE {
        warn!("BMD does not close: {:.6} kN·m left at x = {}", moment, length);
    }
    push_distinct(&mut points, DiagramPoint::new(length, 0.0));

    debug!("BMD: {} points from {} shear points", points.len(), sfd.len());
    Ok((points, moment))
}

/// The point with the largest `|y|`, first one on ties.
pub fn max_abs(points: &[DiagramPoint]) -> Option<DiagramPoint> {
    points
        .iter()
        .copied()
        .fold(None, |best: Option<DiagramPoint>, p| match best {
            Some(b) if b.y.abs() >= p.y.abs() => Some(b),
            _ => Some(p),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::floating::solve_floating_system;
    use crate::calculations::stand::solve_stand_system;
    use crate::hull::{library, Hull};
    use crate::loads::{PointLoad, UniformLoadDistribution};
    use approx::assert_abs_diff_eq;

    fn on_stands(mut canoe: Canoe) -> Canoe {
        for reaction in solve_stand_system(&canoe, 0.0).unwrap() {
            canoe.add_load(reaction).unwrap();
        }
        canoe
    }

    fn closing_values(points: &[DiagramPoint], length: f64) -> Vec<f64> {
        points.iter().filter(|p| p.x == length).map(|p| p.y).collect()
    }

    #[test]
    fn test_point_load_on_stands() {
        let mut canoe = Canoe::new(Hull::flat(6.0).unwrap());
        canoe.add_load(PointLoad::new(-1.0, 3.0, false).unwrap()).unwrap();
        let canoe = on_stands(canoe);
        let settings = SolverSettings::default();

        let sfd = shear_force_diagram(&canoe, &settings).unwrap();
        let expected = [(0.0, 0.0), (0.0, 0.5), (3.0, 0.5), (3.0, -0.5), (6.0, -0.5), (6.0, 0.0)];
        assert_eq!(sfd.len(), expected.len());
        for (point, (x, y)) in sfd.iter().zip(expected) {
            assert_abs_diff_eq!(point.x, x, epsilon = 1e-12);
            assert_abs_diff_eq!(point.y, y, epsilon = 1e-12);
        }

        let bmd = bending_moment_diagram(&canoe, &sfd, &settings).unwrap();
        assert_eq!(bmd.len(), 3);
        let peak = max_abs(&bmd).unwrap();
        assert_abs_diff_eq!(peak.x, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(peak.y, 1.5, epsilon = 1e-12);
        assert_eq!(bmd.last(), Some(&DiagramPoint::new(6.0, 0.0)));
    }

    #[test]
    fn test_uniform_load_gives_parabola() {
        let mut canoe = Canoe::new(Hull::rectangular(4.0, 0.4, 0.7).unwrap());
        canoe.add_load(UniformLoadDistribution::new(-2.0, 1.0, 3.0).unwrap()).unwrap();
        let canoe = on_stands(canoe);
        let settings = SolverSettings::default();

        let sfd = shear_force_diagram(&canoe, &settings).unwrap();
        assert_eq!(sfd.first(), Some(&DiagramPoint::new(0.0, 0.0)));
        assert_eq!(sfd.last(), Some(&DiagramPoint::new(4.0, 0.0)));

        // Shear crosses zero at midspan; moment there is 2·2 - 2·1²/2 = 3
        let bmd = bending_moment_diagram(&canoe, &sfd, &settings).unwrap();
        let peak = max_abs(&bmd).unwrap();
        assert_abs_diff_eq!(peak.x, 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(peak.y, 3.0, epsilon = 1e-9);
        for y in closing_values(&bmd, 4.0) {
            assert_abs_diff_eq!(y, 0.0, epsilon = 1e-9);
        }
        // Dense points along the loaded stretch
        assert!(bmd.len() > 1000);
    }

    #[test]
    fn test_stands_with_hull_weight_close() {
        let mut canoe = Canoe::new(library::shark_bait(6.0).unwrap());
        canoe.add_load(PointLoad::new(-0.8, 1.5, false).unwrap()).unwrap();
        canoe.add_load(UniformLoadDistribution::new(-0.3, 2.0, 5.0).unwrap()).unwrap();
        let canoe = on_stands(canoe);
        let settings = SolverSettings::default();

        let sfd = shear_force_diagram(&canoe, &settings).unwrap();
        assert_eq!(sfd[0], DiagramPoint::new(0.0, 0.0));
        assert_eq!(sfd[sfd.len() - 1], DiagramPoint::new(6.0, 0.0));

        // Just before the end support the shear equals minus its reaction
        let end_reaction = canoe.point_loads().iter().find(|p| p.is_support() && p.x() == 6.0).unwrap().force();
        assert_abs_diff_eq!(sfd[sfd.len() - 2].y, -end_reaction, epsilon = 1e-9);

        let bmd = bending_moment_diagram(&canoe, &sfd, &settings).unwrap();
        for y in closing_values(&bmd, 6.0) {
            assert_abs_diff_eq!(y, 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_floating_canoe_closes() {
        let mut canoe = Canoe::new(library::shark_bait(6.0).unwrap());
        canoe.add_load(PointLoad::new(-0.8, 1.5, false).unwrap()).unwrap();
        canoe.add_load(PointLoad::new(-0.8, 4.5, false).unwrap()).unwrap();
        let solution = solve_floating_system(&canoe, 1e-6).unwrap();
        canoe.add_load(solution.buoyancy).unwrap();
        let settings = SolverSettings::default();

        let sfd = shear_force_diagram(&canoe, &settings).unwrap();
        for y in closing_values(&sfd, 6.0) {
            assert_abs_diff_eq!(y, 0.0, epsilon = 1e-3);
        }
        let bmd = bending_moment_diagram(&canoe, &sfd, &settings).unwrap();
        for y in closing_values(&bmd, 6.0) {
            assert_abs_diff_eq!(y, 0.0, epsilon = 1e-3);
        }
        assert_eq!(bmd[0], DiagramPoint::new(0.0, 0.0));
    }

    #[test]
    fn test_coincident_support_and_load_sum() {
        let mut canoe = Canoe::new(Hull::flat(2.0).unwrap());
        canoe.add_load(PointLoad::new(-1.0, 0.0, false).unwrap()).unwrap();
        canoe.add_load(PointLoad::new(1.0, 0.0, true).unwrap()).unwrap();

        let sfd = shear_force_diagram(&canoe, &SolverSettings::default()).unwrap();
        assert_eq!(sfd, vec![DiagramPoint::new(0.0, 0.0), DiagramPoint::new(2.0, 0.0)]);
    }

    #[test]
    fn test_shear_residual() {
        let mut canoe = Canoe::new(Hull::flat(6.0).unwrap());
        canoe.add_load(PointLoad::new(-1.0, 3.0, false).unwrap()).unwrap();
        let settings = SolverSettings::default();

        let (_, residual) = shear_force_diagram_with_residual(&canoe, &settings).unwrap();
        assert_abs_diff_eq!(residual, -1.0, epsilon = 1e-12);

        // The end support is counted even though it sits on the closing point
        let (sfd, residual) = shear_force_diagram_with_residual(&on_stands(canoe.clone()), &settings).unwrap();
        assert_abs_diff_eq!(residual, 0.0, epsilon = 1e-12);
        let (_, moment) = bending_moment_diagram_with_residual(&on_stands(canoe), &sfd, &settings).unwrap();
        assert_abs_diff_eq!(moment, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_load_snapping_to_free_end_goes_to_closure() {
        let settings = SolverSettings::default();
        let diagram_for = |x: f64| {
            let mut canoe = Canoe::new(Hull::flat(6.0).unwrap());
            canoe.add_load(PointLoad::new(-0.5, x, false).unwrap()).unwrap();
            shear_force_diagram_with_residual(&canoe, &settings).unwrap()
        };

        // Within half a grid step of the end, the load lands on the end
        let (at_end, residual_at_end) = diagram_for(6.0);
        let (near_end, residual_near_end) = diagram_for(5.996);
        assert_eq!(at_end, vec![DiagramPoint::new(0.0, 0.0), DiagramPoint::new(6.0, 0.0)]);
        assert_eq!(near_end, at_end);
        assert_abs_diff_eq!(residual_at_end, -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(residual_near_end, -0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_diagram_x_never_decreases() {
        let mut canoe = Canoe::new(library::shark_bait(6.0).unwrap());
        canoe.add_load(PointLoad::new(-0.8, 1.5, false).unwrap()).unwrap();
        canoe.add_load(PointLoad::new(-0.8, 4.5, false).unwrap()).unwrap();
        let solution = solve_floating_system(&canoe, 1e-6).unwrap();
        canoe.add_load(solution.buoyancy).unwrap();
        let settings = SolverSettings::default();

        let sfd = shear_force_diagram(&canoe, &settings).unwrap();
        let bmd = bending_moment_diagram(&canoe, &sfd, &settings).unwrap();
        for points in [&sfd, &bmd] {
            assert!(points.windows(2).all(|pair| pair[0].x <= pair[1].x));
        }

        // So skipping only consecutive repeats leaves no repeat anywhere
        for (i, point) in sfd.iter().enumerate() {
            assert!(!sfd[i + 1..].contains(point), "{:?} repeated", point);
        }
    }

    #[test]
    fn test_strip_area() {
        assert_eq!(strip_area(2.0, 1.0, 3.0), 4.0);
        assert_eq!(strip_area(1.0, -1.0, -1.0), -1.0);
    }

    #[test]
    fn test_max_abs() {
        let points = [DiagramPoint::new(0.0, 1.0), DiagramPoint::new(1.0, -2.0), DiagramPoint::new(2.0, 2.0)];
        assert_eq!(max_abs(&points), Some(DiagramPoint::new(1.0, -2.0)));
        assert_eq!(max_abs(&[]), None);
    }
}
