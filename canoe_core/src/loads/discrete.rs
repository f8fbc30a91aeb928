//! Discrete Load Distributions
//!
//! A run of [`UniformLoadDistribution`] pieces that tile an interval exactly.
//! Produced by discretizing the hull's self-weight section by section, or by
//! chopping a piecewise continuous distribution into equal pieces.

use serde::{Deserialize, Serialize};

use crate::errors::{CanoeError, CanoeResult};
use crate::functions::{BoundedFunction, Section};
use crate::hull::Hull;

use super::piecewise::PiecewiseContinuousLoadDistribution;
use super::uniform::UniformLoadDistribution;
use super::LoadType;

/// Consecutive uniform pieces with no gaps or overlaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDiscrete")]
pub struct DiscreteLoadDistribution {
    load_type: LoadType,
    loads: Vec<UniformLoadDistribution>,
}

#[derive(Deserialize)]
struct RawDiscrete {
    load_type: LoadType,
    loads: Vec<UniformLoadDistribution>,
}

impl TryFrom<RawDiscrete> for DiscreteLoadDistribution {
    type Error = CanoeError;

    fn try_from(raw: RawDiscrete) -> CanoeResult<Self> {
        DiscreteLoadDistribution::new(raw.load_type, raw.loads)
    }
}

impl DiscreteLoadDistribution {
    /// Build from pieces ordered by position.
    ///
    /// Fails when the list is empty or a piece does not start exactly where the
    /// previous one ends.
    pub fn new(load_type: LoadType, loads: Vec<UniformLoadDistribution>) -> CanoeResult<Self> {
        if loads.is_empty() {
            return Err(CanoeError::invalid_input(
                "loads",
                "[]",
                "A discrete distribution needs at least one piece",
            ));
        }
        for pair in loads.windows(2) {
            if pair[0].rx() != pair[1].x() {
                return Err(CanoeError::invalid_input(
                    "loads",
                    format!("[{}, {}] then [{}, {}]", pair[0].x(), pair[0].rx(), pair[1].x(), pair[1].rx()),
                    "Pieces must tile the interval with no gaps or overlaps",
                ));
            }
        }
        Ok(DiscreteLoadDistribution { load_type, loads })
    }

    /// Self-weight of the hull, one piece per hull section.
    ///
    /// Each piece's intensity is the section's weight spread over its length.
    /// Sections filled with bulkhead material are typed
    /// [`LoadType::DiscreteSectionBulkhead`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use canoe_core::hull::library;
    /// use canoe_core::loads::{DiscreteLoadDistribution, LoadType};
    ///
    /// let hull = library::shark_bait(6.0).unwrap();
    /// let weight = DiscreteLoadDistribution::from_hull(&hull).unwrap();
    /// assert_eq!(weight.loads().len(), 3);
    /// assert_eq!(weight.loads()[0].load_type(), LoadType::DiscreteSectionBulkhead);
    /// assert!((weight.force() - hull.self_weight()).abs() < 1e-9);
    /// ```
    pub fn from_hull(hull: &Hull) -> CanoeResult<Self> {
        let loads = hull
            .sections()
            .iter()
            .map(|hull_section| {
                let section = hull_section.section();
                let magnitude = hull.section_weight(hull_section) / section.length();
                let load_type = if hull_section.fill_bulkhead() {
                    LoadType::DiscreteSectionBulkhead
                } else {
                    LoadType::DiscreteSection
                };
                UniformLoadDistribution::typed(load_type, magnitude, section)
            })
            .collect::<CanoeResult<Vec<_>>>()?;
        DiscreteLoadDistribution::new(LoadType::Hull, loads)
    }

    /// `n` equal-width pieces, each with the parent's value at its midpoint.
    pub fn from_piecewise(piecewise: &PiecewiseContinuousLoadDistribution, n: usize) -> CanoeResult<Self> {
        if n == 0 {
            return Err(CanoeError::invalid_input(
                "n",
                "0",
                "At least one piece is needed to discretize a distribution",
            ));
        }

        let parent = piecewise.section();
        let step = parent.length() / n as f64;
        let endpoint = |i: usize| {
            if i == n {
                parent.rx()
            } else {
                parent.x() + i as f64 * step
            }
        };

        let loads = (0..n)
            .map(|i| {
                let section = Section::new(endpoint(i), endpoint(i + 1))?;
                let magnitude = piecewise.value(section.midpoint());
                UniformLoadDistribution::typed(LoadType::DiscreteSection, magnitude, section)
            })
            .collect::<CanoeResult<Vec<_>>>()?;

        let discrete = DiscreteLoadDistribution::new(piecewise.load_type(), loads)?;
        discrete.ensure_tiles(&parent)?;
        Ok(discrete)
    }

    /// One piece per piece of the parent, valued at each piece's midpoint.
    pub fn from_piecewise_per_section(piecewise: &PiecewiseContinuousLoadDistribution) -> CanoeResult<Self> {
        let loads = piecewise
            .pieces()
            .iter()
            .map(|piece| {
                let magnitude = piece.function.evaluate(piece.section.midpoint());
                UniformLoadDistribution::typed(LoadType::DiscreteSection, magnitude, piece.section)
            })
            .collect::<CanoeResult<Vec<_>>>()?;
        DiscreteLoadDistribution::new(piecewise.load_type(), loads)
    }

    fn ensure_tiles(&self, parent: &Section) -> CanoeResult<()> {
        let covered = self.section();
        if covered.x() != parent.x() || covered.rx() != parent.rx() {
            return Err(CanoeError::Internal {
                message: format!(
                    "discretized pieces cover [{}, {}], expected [{}, {}]",
                    covered.x(),
                    covered.rx(),
                    parent.x(),
                    parent.rx()
                ),
            });
        }
        Ok(())
    }

    pub fn load_type(&self) -> LoadType {
        self.load_type
    }

    pub fn loads(&self) -> &[UniformLoadDistribution] {
        &self.loads
    }

    pub fn section(&self) -> Section {
        let first = self.loads[0].section();
        let last = self.loads[self.loads.len() - 1].section();
        Section::new(first.x(), last.rx()).unwrap_or(first)
    }

    pub fn x(&self) -> f64 {
        self.loads[0].x()
    }

    pub fn rx(&self) -> f64 {
        self.loads[self.loads.len() - 1].rx()
    }

    /// Sum of the piece forces (kN)
    pub fn force(&self) -> f64 {
        self.loads.iter().map(|l| l.force()).sum()
    }

    pub fn moment_about(&self, pivot: f64) -> f64 {
        self.loads.iter().map(|l| l.moment_about(pivot)).sum()
    }

    /// Intensity of largest magnitude, keeping its sign.
    pub fn max_signed_value(&self) -> f64 {
        self.loads
            .iter()
            .map(|l| l.magnitude())
            .fold(0.0, |best, m| if m.abs() > best.abs() { m } else { best })
    }

    /// Intensity at `x`, or zero outside the covered interval.
    pub fn value_at(&self, x: f64) -> f64 {
        self.loads
            .iter()
            .find(|l| l.section().contains(x))
            .map(|l| l.magnitude())
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::Curve;
    use crate::loads::Piece;
    use approx::assert_abs_diff_eq;

    fn uniform(magnitude: f64, x: f64, rx: f64) -> UniformLoadDistribution {
        UniformLoadDistribution::typed(LoadType::DiscreteSection, magnitude, Section::new(x, rx).unwrap()).unwrap()
    }

    #[test]
    fn test_requires_exact_tiling() {
        let tiled = vec![uniform(-1.0, 0.0, 1.0), uniform(-2.0, 1.0, 3.0)];
        let discrete = DiscreteLoadDistribution::new(LoadType::Hull, tiled).unwrap();
        assert_eq!(discrete.force(), -5.0);
        assert_eq!(discrete.section(), Section::new(0.0, 3.0).unwrap());

        let overlap = vec![uniform(-1.0, 0.0, 1.5), uniform(-2.0, 1.0, 3.0)];
        assert!(DiscreteLoadDistribution::new(LoadType::Hull, overlap).is_err());
        assert!(DiscreteLoadDistribution::new(LoadType::Hull, vec![]).is_err());
    }

    #[test]
    fn test_max_signed_value_uses_magnitude() {
        let loads = vec![uniform(0.5, 0.0, 1.0), uniform(-3.0, 1.0, 2.0), uniform(1.0, 2.0, 3.0)];
        let discrete = DiscreteLoadDistribution::new(LoadType::Hull, loads).unwrap();
        assert_eq!(discrete.max_signed_value(), -3.0);
    }

    #[test]
    fn test_moment_about() {
        let loads = vec![uniform(-1.0, 0.0, 2.0), uniform(-1.0, 2.0, 4.0)];
        let discrete = DiscreteLoadDistribution::new(LoadType::Hull, loads).unwrap();
        assert_abs_diff_eq!(discrete.moment_about(2.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(discrete.moment_about(0.0), -8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_from_piecewise_tiles_parent() {
        let piecewise = PiecewiseContinuousLoadDistribution::new(
            LoadType::Buoyancy,
            vec![Piece::new(Section::new(0.0, 1.0).unwrap(), Curve::parabola(1.0, 0.0, 0.0))],
        )
        .unwrap();

        let discrete = DiscreteLoadDistribution::from_piecewise(&piecewise, 3).unwrap();
        assert_eq!(discrete.loads().len(), 3);
        assert_eq!(discrete.x(), 0.0);
        assert_eq!(discrete.rx(), 1.0);
        assert_eq!(discrete.load_type(), LoadType::Buoyancy);
        // Midpoint of [0, 1/3] is 1/6
        assert_abs_diff_eq!(discrete.loads()[0].magnitude(), 1.0 / 36.0, epsilon = 1e-12);

        assert!(DiscreteLoadDistribution::from_piecewise(&piecewise, 0).is_err());
    }

    #[test]
    fn test_from_piecewise_per_section() {
        let piecewise = PiecewiseContinuousLoadDistribution::new(
            LoadType::Buoyancy,
            vec![
                Piece::new(Section::new(0.0, 1.0).unwrap(), Curve::constant(2.0)),
                Piece::new(Section::new(1.0, 4.0).unwrap(), Curve::constant(2.0)),
            ],
        )
        .unwrap();
        let discrete = DiscreteLoadDistribution::from_piecewise_per_section(&piecewise).unwrap();
        assert_eq!(discrete.loads().len(), 2);
        assert_abs_diff_eq!(discrete.force(), piecewise.force(), epsilon = 1e-9);
    }

    #[test]
    fn test_value_at() {
        let loads = vec![uniform(-1.0, 0.0, 1.0), uniform(-2.0, 1.0, 3.0)];
        let discrete = DiscreteLoadDistribution::new(LoadType::Hull, loads).unwrap();
        assert_eq!(discrete.value_at(2.0), -2.0);
        assert_eq!(discrete.value_at(5.0), 0.0);
    }
}
