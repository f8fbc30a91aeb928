//! # Canoe
//!
//! The aggregate the solvers work on: a hull plus the loads placed on it.
//!
//! Loads are kept sorted (see [`sort_loads`]) and follow the combination
//! rules when added:
//!
//! - two applied point loads at the same `x` are summed into one
//! - two user distributed loads over exactly the same interval are summed into one
//! - a sum of zero removes the existing load
//! - supports never combine with anything
//!
//! ## Example
//!
//! ```rust
//! use canoe_core::canoe::Canoe;
//! use canoe_core::hull::Hull;
//! use canoe_core::loads::{AddLoadResult, PointLoad};
//!
//! let mut canoe = Canoe::new(Hull::flat(6.0).unwrap());
//! canoe.add_load(PointLoad::new(-1.0, 3.0, false).unwrap()).unwrap();
//!
//! let result = canoe.add_load(PointLoad::new(1.0, 3.0, false).unwrap()).unwrap();
//! assert_eq!(result, AddLoadResult::Removed);
//! assert!(canoe.loads().is_empty());
//! ```

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::{ENDPOINT_DIGITS, SYMMETRY_STEP, SYMMETRY_TOLERANCE};
use crate::errors::{CanoeError, CanoeResult};
use crate::functions::calculus::round_digits;
use crate::functions::BoundedFunction;
use crate::hull::Hull;
use crate::loads::{sort_loads, AddLoadResult, Load, LoadType, PointLoad, UniformLoadDistribution};

/// Which equilibrium the canoe's reactions were last solved for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveType {
    #[default]
    Unsolved,
    /// Resting on two stands
    Stands,
    /// Floating freely
    Floating,
}

impl fmt::Display for SolveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SolveType::Unsolved => "Unsolved",
            SolveType::Stands => "Solid Stands",
            SolveType::Floating => "Floating",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCanoe")]
pub struct Canoe {
    hull: Option<Hull>,
    loads: Vec<Load>,
    solve_type: SolveType,
}

#[derive(Deserialize)]
struct RawCanoe {
    hull: Option<Hull>,
    #[serde(default)]
    loads: Vec<Load>,
    #[serde(default)]
    solve_type: SolveType,
}

impl TryFrom<RawCanoe> for Canoe {
    type Error = CanoeError;

    fn try_from(raw: RawCanoe) -> CanoeResult<Self> {
        let mut canoe = Canoe {
            hull: raw.hull,
            loads: raw.loads,
            solve_type: raw.solve_type,
        };
        sort_loads(&mut canoe.loads);
        canoe.validate()?;
        Ok(canoe)
    }
}

impl Canoe {
    pub fn new(hull: Hull) -> Self {
        Canoe {
            hull: Some(hull),
            loads: Vec::new(),
            solve_type: SolveType::Unsolved,
        }
    }

    // ========================================================================
    // Hull
    // ========================================================================

    pub fn hull(&self) -> CanoeResult<&Hull> {
        self.hull.as_ref().ok_or_else(|| CanoeError::no_hull("hull"))
    }

    pub fn has_hull(&self) -> bool {
        self.hull.is_some()
    }

    pub fn length(&self) -> CanoeResult<f64> {
        Ok(self.hull()?.length())
    }

    /// Replace the hull. Refused if an existing load would hang off the end.
    pub fn set_hull(&mut self, hull: Hull) -> CanoeResult<()> {
        let length = hull.length();
        if let Some(load) = self.loads.iter().find(|l| l.rx() > length) {
            return Err(CanoeError::invalid_input(
                "hull",
                length.to_string(),
                format!("A {} extends to x = {}, past the end of the new hull", load.load_type(), load.rx()),
            ));
        }
        self.hull = Some(hull);
        self.solve_type = SolveType::Unsolved;
        Ok(())
    }

    // ========================================================================
    // Loads
    // ========================================================================

    pub fn loads(&self) -> &[Load] {
        &self.loads
    }

    pub fn loads_of_type(&self, load_type: LoadType) -> Vec<&Load> {
        self.loads.iter().filter(|l| l.load_type() == load_type).collect()
    }

    pub fn point_loads(&self) -> Vec<&PointLoad> {
        self.loads.iter().filter_map(Load::as_point).collect()
    }

    pub fn uniform_loads(&self) -> Vec<&UniformLoadDistribution> {
        self.loads
            .iter()
            .filter_map(|l| match l {
                Load::UniformLoadDistribution(u) => Some(u),
                _ => None,
            })
            .collect()
    }

    /// Add a load, combining it with a coincident one where the rules allow.
    pub fn add_load(&mut self, load: impl Into<Load>) -> CanoeResult<AddLoadResult> {
        let load = load.into();
        self.check_within_hull(&load)?;

        let coincident = self.loads.iter().position(|existing| match (existing, &load) {
            (Load::PointLoad(a), Load::PointLoad(b)) => !a.is_support() && !b.is_support() && a.x() == b.x(),
            (Load::UniformLoadDistribution(a), Load::UniformLoadDistribution(b)) => {
                a.load_type() == LoadType::UniformLoadDistribution
                    && b.load_type() == LoadType::UniformLoadDistribution
                    && a.section() == b.section()
            }
            _ => false,
        });

        let result = match coincident {
            Some(index) => {
                let combined = match (&self.loads[index], &load) {
                    (Load::PointLoad(a), Load::PointLoad(b)) => Load::from(a.combined_with(b.force())),
                    (Load::UniformLoadDistribution(a), Load::UniformLoadDistribution(b)) => {
                        Load::from(a.combined_with(b.magnitude()))
                    }
                    _ => {
                        return Err(CanoeError::Internal {
                            message: "coincident loads of different kinds".to_string(),
                        })
                    }
                };
                if combined.max_signed_value() == 0.0 {
                    self.loads.remove(index);
                    AddLoadResult::Removed
                } else {
                    self.loads[index] = combined;
                    AddLoadResult::Combined
                }
            }
            None => {
                self.loads.push(load);
                AddLoadResult::Added
            }
        };

        sort_loads(&mut self.loads);
        self.solve_type = SolveType::Unsolved;
        debug!("add_load: {:?}, {} loads on canoe", result, self.loads.len());
        Ok(result)
    }

    pub fn remove_load(&mut self, index: usize) -> CanoeResult<Load> {
        if index >= self.loads.len() {
            return Err(CanoeError::invalid_input(
                "index",
                index.to_string(),
                format!("Canoe has {} loads", self.loads.len()),
            ));
        }
        self.solve_type = SolveType::Unsolved;
        Ok(self.loads.remove(index))
    }

    pub fn clear_loads(&mut self) {
        self.loads.clear();
        self.solve_type = SolveType::Unsolved;
    }

    fn check_within_hull(&self, load: &Load) -> CanoeResult<()> {
        let length = self.length()?;
        if load.x() < 0.0 || load.rx() > length {
            return Err(CanoeError::invalid_input(
                "load",
                format!("[{}, {}]", load.x(), load.rx()),
                format!("Load must be contained inside the canoe's length {}", length),
            ));
        }
        Ok(())
    }

    pub fn solve_type(&self) -> SolveType {
        self.solve_type
    }

    pub fn set_solve_type(&mut self, solve_type: SolveType) {
        self.solve_type = solve_type;
    }

    // ========================================================================
    // Derived Quantities
    // ========================================================================

    /// Copy of this canoe with solver output (supports and buoyancy) removed.
    pub fn without_reactions(&self) -> Canoe {
        let loads = self
            .loads
            .iter()
            .filter(|l| !l.load_type().is_reaction())
            .cloned()
            .collect();
        Canoe {
            hull: self.hull.clone(),
            loads,
            solve_type: SolveType::Unsolved,
        }
    }

    /// Loads on the canoe plus the hull's self-weight, class-sorted.
    pub fn resolved_loads(&self) -> CanoeResult<Vec<Load>> {
        let mut loads = self.loads.clone();
        if let Some(weight) = self.hull()?.self_weight_distribution()? {
            loads.push(Load::from(weight));
        }
        sort_loads(&mut loads);
        Ok(loads)
    }

    /// Every `x` where the combined load changes form: load ends, hull section
    /// boundaries and both ends of the canoe. Sorted, rounded, no duplicates.
    pub fn section_endpoints(&self) -> CanoeResult<Vec<f64>> {
        let hull = self.hull()?;
        let mut endpoints = hull.section_endpoints();
        for load in &self.loads {
            endpoints.push(load.x());
            endpoints.push(load.rx());
        }

        let mut endpoints: Vec<f64> = endpoints
            .into_iter()
            .map(|x| round_digits(x, ENDPOINT_DIGITS))
            .collect();
        endpoints.sort_by(|a, b| a.total_cmp(b));
        endpoints.dedup();
        Ok(endpoints)
    }

    /// Sum of every force on the canoe including hull weight (kN)
    pub fn net_force(&self) -> CanoeResult<f64> {
        Ok(self.resolved_loads()?.iter().map(|l| l.force()).sum())
    }

    /// Sum of every moment about `pivot`, including hull weight (kN·m)
    pub fn net_moment_about(&self, pivot: f64) -> CanoeResult<f64> {
        Ok(self.resolved_loads()?.iter().map(|l| l.moment_about(pivot)).sum())
    }

    /// Largest absolute load value, or `-1.0` when there is nothing on the canoe.
    pub fn max_load_value(&self) -> CanoeResult<f64> {
        let loads = self.resolved_loads()?;
        if loads.is_empty() {
            return Ok(-1.0);
        }
        Ok(loads.iter().map(|l| l.max_signed_value().abs()).fold(0.0, f64::max))
    }

    /// Whether every load, hull weight included, mirrors about the middle.
    pub fn is_symmetrically_loaded(&self) -> CanoeResult<bool> {
        let length = self.length()?;
        let loads = self.resolved_loads()?;

        let points: Vec<&PointLoad> = loads.iter().filter_map(Load::as_point).collect();
        let points_mirror = points.iter().all(|p| {
            points.iter().any(|q| {
                (q.x() - (length - p.x())).abs() <= SYMMETRY_TOLERANCE
                    && (q.force() - p.force()).abs() <= SYMMETRY_TOLERANCE
            })
        });
        if !points_mirror {
            return Ok(false);
        }

        // Sample between grid points so piece boundaries are never hit exactly
        let intensity = |x: f64| -> f64 { loads.iter().map(|l| intensity_at(l, x)).sum() };
        let steps = ((length / 2.0) / SYMMETRY_STEP).floor() as usize;
        Ok((0..steps).all(|i| {
            let x = (i as f64 + 0.5) * SYMMETRY_STEP;
            (intensity(x) - intensity(length - x)).abs() <= SYMMETRY_TOLERANCE
        }))
    }

    /// Re-check every invariant; used after deserialization.
    pub fn validate(&self) -> CanoeResult<()> {
        if self.hull.is_none() {
            if self.loads.is_empty() {
                return Ok(());
            }
            return Err(CanoeError::no_hull("validate"));
        }

        for load in &self.loads {
            self.check_within_hull(load)?;
        }

        let applied: Vec<&PointLoad> = self.point_loads().into_iter().filter(|p| !p.is_support()).collect();
        for (i, a) in applied.iter().enumerate() {
            if applied[i + 1..].iter().any(|b| b.x() == a.x()) {
                return Err(CanoeError::invalid_input(
                    "loads",
                    a.x().to_string(),
                    "Applied point loads at the same position must be combined",
                ));
            }
        }
        Ok(())
    }
}

/// Distributed intensity of a load at `x`; zero for point loads.
fn intensity_at(load: &Load, x: f64) -> f64 {
    match load {
        Load::PointLoad(_) => 0.0,
        Load::UniformLoadDistribution(u) => {
            if u.section().contains(x) {
                u.magnitude()
            } else {
                0.0
            }
        }
        Load::PiecewiseContinuousLoadDistribution(p) => p.value(x),
        Load::DiscreteLoadDistribution(d) => d.value_at(x),
    }
}
