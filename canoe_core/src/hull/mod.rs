//! # Hull
//!
//! The canoe's hull as an ordered run of [`HullSection`]s starting at `x = 0`.
//! The hull owns the material densities; each section owns its geometry.
//!
//! Edits never happen in place. `with_section_replaced`, `with_densities` and
//! `scaled_to_length` clone the hull, change the clone and validate it before
//! handing it back, so a half-edited hull is never observable.
//!
//! ## Example
//!
//! ```rust
//! use canoe_core::hull::{library, Hull};
//!
//! let hull = library::shark_bait(6.0).unwrap();
//! assert_eq!(hull.length(), 6.0);
//! assert!((hull.max_height().unwrap() - 0.4).abs() < 1e-9);
//! assert!(hull.self_weight() < 0.0);
//!
//! let lighter = hull.with_densities(900.0, 28.82).unwrap();
//! assert!(lighter.self_weight() > hull.self_weight());
//! ```

pub mod library;
pub mod section;

pub use section::HullSection;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::{HULL_CONTINUITY_TOLERANCE, MIN_HULL_LENGTH, SYMMETRY_STEP, SYMMETRY_TOLERANCE};
use crate::errors::{CanoeError, CanoeResult};
use crate::functions::calculus::{self, round_digits};
use crate::functions::{Curve, Section};
use crate::loads::DiscreteLoadDistribution;

/// Digits kept when reporting the maximum height
const HEIGHT_DIGITS: i32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHull")]
pub struct Hull {
    /// kg/m³
    concrete_density: f64,
    /// kg/m³
    bulkhead_density: f64,
    sections: Vec<HullSection>,
}

#[derive(Deserialize)]
struct RawHull {
    concrete_density: f64,
    bulkhead_density: f64,
    sections: Vec<HullSection>,
}

impl TryFrom<RawHull> for Hull {
    type Error = CanoeError;

    fn try_from(raw: RawHull) -> CanoeResult<Self> {
        Hull::new(raw.concrete_density, raw.bulkhead_density, raw.sections)
    }
}

impl Hull {
    /// Assemble a hull and check its shape and thickness bounds.
    pub fn new(concrete_density: f64, bulkhead_density: f64, sections: Vec<HullSection>) -> CanoeResult<Self> {
        let hull = Hull {
            concrete_density,
            bulkhead_density,
            sections,
        };
        hull.validate()?;
        Ok(hull)
    }

    /// A weightless hull with a flat profile at `y = 0`.
    pub fn flat(length: f64) -> CanoeResult<Self> {
        let section = HullSection::new(Curve::constant(0.0), 0.0, length, 0.0, 0.0, 0.0, false)?;
        Hull::new(0.0, 0.0, vec![section])
    }

    /// A weightless box hull.
    pub fn rectangular(length: f64, height: f64, width: f64) -> CanoeResult<Self> {
        let section = HullSection::new(Curve::constant(-height), 0.0, length, width, 0.0, 0.0, false)?;
        Hull::new(0.0, 0.0, vec![section])
    }

    fn validate(&self) -> CanoeResult<()> {
        let (first, last) = match (self.sections.first(), self.sections.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(CanoeError::invalid_input(
                    "sections",
                    "[]",
                    "A hull needs at least one section",
                ))
            }
        };

        for (field, density) in [
            ("concrete_density", self.concrete_density),
            ("bulkhead_density", self.bulkhead_density),
        ] {
            if !density.is_finite() || density < 0.0 {
                return Err(CanoeError::invalid_input(
                    field,
                    density.to_string(),
                    "Density must be finite and non-negative",
                ));
            }
        }

        if first.x().abs() > HULL_CONTINUITY_TOLERANCE {
            return Err(CanoeError::invalid_input(
                "sections",
                first.x().to_string(),
                "The hull must start at x = 0",
            ));
        }

        let spans: Vec<Section> = self.sections.iter().map(|s| s.section()).collect();
        calculus::validate_contiguous(&spans)?;

        for pair in self.sections.windows(2) {
            let boundary = pair[0].rx();
            let left = pair[0].profile().evaluate(boundary);
            let right = pair[1].profile().evaluate(boundary);
            if (left - right).abs() > HULL_CONTINUITY_TOLERANCE {
                return Err(CanoeError::invalid_input(
                    "sections",
                    format!("x = {}: {} vs {}", boundary, left, right),
                    "Hull profile is not continuous between sections",
                ));
            }
            let left_slope = pair[0].profile().slope_at(boundary);
            let right_slope = pair[1].profile().slope_at(boundary);
            if (left_slope - right_slope).abs() > HULL_CONTINUITY_TOLERANCE {
                return Err(CanoeError::invalid_input(
                    "sections",
                    format!("x = {}: slope {} vs {}", boundary, left_slope, right_slope),
                    "Hull profile is not smooth between sections (slopes differ)",
                ));
            }
            if (pair[0].width() - pair[1].width()).abs() > HULL_CONTINUITY_TOLERANCE {
                return Err(CanoeError::invalid_input(
                    "sections",
                    format!("x = {}: {} vs {}", boundary, pair[0].width(), pair[1].width()),
                    "Hull width is not continuous between sections",
                ));
            }
        }

        let length = last.rx() - first.x();
        if length < MIN_HULL_LENGTH {
            return Err(CanoeError::invalid_input(
                "length",
                length.to_string(),
                format!("Hull must be at least {}m long", MIN_HULL_LENGTH),
            ));
        }

        let max_height = self.max_height()?;
        for section in &self.sections {
            if section.floor_thickness() > max_height / 4.0 + HULL_CONTINUITY_TOLERANCE {
                return Err(CanoeError::invalid_input(
                    "floor_thickness",
                    section.floor_thickness().to_string(),
                    format!("Hull floor thickness must not exceed 1/4 of the max height {}", max_height),
                ));
            }
            if section.wall_thickness() > section.width() / 2.0 + HULL_CONTINUITY_TOLERANCE {
                return Err(CanoeError::invalid_input(
                    "wall_thickness",
                    section.wall_thickness().to_string(),
                    format!("Hull walls would be wider than the section ({}m)", section.width()),
                ));
            }
        }

        Ok(())
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    pub fn sections(&self) -> &[HullSection] {
        &self.sections
    }

    pub fn concrete_density(&self) -> f64 {
        self.concrete_density
    }

    pub fn bulkhead_density(&self) -> f64 {
        self.bulkhead_density
    }

    pub fn length(&self) -> f64 {
        self.rx() - self.sections[0].x()
    }

    fn rx(&self) -> f64 {
        self.sections[self.sections.len() - 1].rx()
    }

    /// `[0, length]`
    pub fn section(&self) -> Section {
        let first = self.sections[0].section();
        Section::new(first.x(), self.rx()).unwrap_or(first)
    }

    /// Boundaries between hull sections, both ends included
    pub fn section_endpoints(&self) -> Vec<f64> {
        let mut endpoints: Vec<f64> = self.sections.iter().map(|s| s.x()).collect();
        endpoints.push(self.rx());
        endpoints
    }

    /// The section containing `x`; the left one at a shared boundary.
    pub fn section_at(&self, x: f64) -> Option<&HullSection> {
        self.sections.iter().find(|s| s.section().contains(x))
    }

    /// Profile height at `x`, zero outside the hull
    pub fn profile_at(&self, x: f64) -> f64 {
        self.section_at(x).map(|s| s.profile().evaluate(x)).unwrap_or(0.0)
    }

    /// Depth of the lowest point of the hull below its top (m).
    ///
    /// Brent minimisation of each section's profile, so every profile is
    /// assumed unimodal on its section.
    pub fn max_height(&self) -> CanoeResult<f64> {
        let mut deepest: f64 = 0.0;
        for section in &self.sections {
            deepest = deepest.max(section.height()?);
        }
        Ok(round_digits(deepest, HEIGHT_DIGITS))
    }

    pub fn max_width(&self) -> f64 {
        self.sections.iter().map(|s| s.width()).fold(0.0, f64::max)
    }

    /// Whether the profile and widths mirror about the middle of the hull.
    pub fn is_symmetric(&self) -> bool {
        let length = self.length();
        let steps = ((length / 2.0) / SYMMETRY_STEP).ceil() as usize;
        (0..=steps).all(|i| {
            let x = (i as f64 * SYMMETRY_STEP).min(length / 2.0);
            let mirrored = length - x;
            let width = |x: f64| self.section_at(x).map(|s| s.width()).unwrap_or(0.0);
            (self.profile_at(x) - self.profile_at(mirrored)).abs() <= SYMMETRY_TOLERANCE
                && (width(x) - width(mirrored)).abs() <= SYMMETRY_TOLERANCE
        })
    }

    // ========================================================================
    // Volume and Weight
    // ========================================================================

    pub fn total_volume(&self) -> f64 {
        self.sections.iter().map(|s| s.volume()).sum()
    }

    pub fn concrete_volume(&self) -> f64 {
        self.sections.iter().map(|s| s.concrete_volume()).sum()
    }

    pub fn bulkhead_volume(&self) -> f64 {
        self.sections.iter().map(|s| s.bulkhead_volume()).sum()
    }

    /// Total mass (kg)
    pub fn mass(&self) -> f64 {
        self.sections
            .iter()
            .map(|s| s.mass(self.concrete_density, self.bulkhead_density))
            .sum()
    }

    /// Weight of one of this hull's sections using the hull's densities (kN)
    pub fn section_weight(&self, section: &HullSection) -> f64 {
        section.weight(self.concrete_density, self.bulkhead_density)
    }

    /// Total weight (kN, negative)
    pub fn self_weight(&self) -> f64 {
        self.sections.iter().map(|s| self.section_weight(s)).sum()
    }

    /// Self-weight as one uniform piece per section, or `None` for a hull
    /// with no volume.
    pub fn self_weight_distribution(&self) -> CanoeResult<Option<DiscreteLoadDistribution>> {
        if self.total_volume() == 0.0 {
            debug!("Hull has no volume, so no self-weight distribution");
            return Ok(None);
        }
        DiscreteLoadDistribution::from_hull(self).map(Some)
    }

    // ========================================================================
    // Snapshot Editing
    // ========================================================================

    /// Copy of this hull with section `index` replaced.
    pub fn with_section_replaced(&self, index: usize, section: HullSection) -> CanoeResult<Hull> {
        if index >= self.sections.len() {
            return Err(CanoeError::invalid_input(
                "index",
                index.to_string(),
                format!("Hull has {} sections", self.sections.len()),
            ));
        }
        let mut edited = self.clone();
        edited.sections[index] = section;
        edited.validate()?;
        Ok(edited)
    }

    /// Copy of this hull with new material densities.
    pub fn with_densities(&self, concrete_density: f64, bulkhead_density: f64) -> CanoeResult<Hull> {
        let mut edited = self.clone();
        edited.concrete_density = concrete_density;
        edited.bulkhead_density = bulkhead_density;
        edited.validate()?;
        Ok(edited)
    }

    /// Copy of this hull stretched uniformly to `length`.
    pub fn scaled_to_length(&self, length: f64) -> CanoeResult<Hull> {
        if !length.is_finite() || length < MIN_HULL_LENGTH {
            return Err(CanoeError::invalid_input(
                "length",
                length.to_string(),
                format!("Hull must be at least {}m long", MIN_HULL_LENGTH),
            ));
        }
        let factor = length / self.length();
        let sections = self
            .sections
            .iter()
            .map(|s| s.scaled(factor))
            .collect::<CanoeResult<Vec<_>>>()?;
        Hull::new(self.concrete_density, self.bulkhead_density, sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn two_piece(second_depth: f64) -> CanoeResult<Hull> {
        Hull::new(
            1000.0,
            0.0,
            vec![
                HullSection::new(Curve::constant(-0.4), 0.0, 1.0, 0.7, 0.01, 0.01, false)?,
                HullSection::new(Curve::constant(second_depth), 1.0, 3.0, 0.7, 0.01, 0.01, false)?,
            ],
        )
    }

    #[test]
    fn test_rectangular_hull() {
        let hull = Hull::rectangular(4.0, 0.4, 0.7).unwrap();
        assert_eq!(hull.length(), 4.0);
        assert_abs_diff_eq!(hull.max_height().unwrap(), 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(hull.total_volume(), 4.0 * 0.4 * 0.7, epsilon = 1e-9);
        assert_eq!(hull.self_weight(), 0.0);
        assert!(hull.is_symmetric());
    }

    #[test]
    fn test_flat_hull_has_no_weight_distribution() {
        let hull = Hull::flat(5.0).unwrap();
        assert_eq!(hull.max_height().unwrap(), 0.0);
        assert!(hull.self_weight_distribution().unwrap().is_none());
    }

    #[test]
    fn test_discontinuous_profile_is_rejected() {
        assert!(two_piece(-0.4).is_ok());
        assert!(two_piece(-0.3).is_err());
    }

    #[test]
    fn test_kinked_profile_is_rejected() {
        // Both parabolas pass through -0.3 at x = 1, with slopes -0.2 and -0.1
        let sections = vec![
            HullSection::new(Curve::parabola(0.1, 2.0, -0.4), 0.0, 1.0, 0.7, 0.01, 0.01, false).unwrap(),
            HullSection::new(Curve::parabola(0.05, 2.0, -0.35), 1.0, 3.0, 0.7, 0.01, 0.01, false).unwrap(),
        ];
        let err = Hull::new(1000.0, 30.0, sections).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(err.to_string().contains("slopes differ"));

        // Same value and slope at the knot is accepted
        let smooth = vec![
            HullSection::new(Curve::parabola(0.1, 2.0, -0.4), 0.0, 1.0, 0.7, 0.01, 0.01, false).unwrap(),
            HullSection::new(Curve::parabola(0.1, 2.0, -0.4), 1.0, 3.0, 0.7, 0.01, 0.01, false).unwrap(),
        ];
        assert!(Hull::new(1000.0, 30.0, smooth).is_ok());
    }

    #[test]
    fn test_must_start_at_zero() {
        let section = HullSection::new(Curve::constant(-0.4), 1.0, 2.0, 0.7, 0.0, 0.0, false).unwrap();
        assert!(Hull::new(0.0, 0.0, vec![section]).is_err());
    }

    #[test]
    fn test_thickness_bounds() {
        let thick_floor = HullSection::new(Curve::constant(-0.4), 0.0, 2.0, 0.7, 0.01, 0.2, false).unwrap();
        assert!(Hull::new(0.0, 0.0, vec![thick_floor]).is_err());

        let thick_walls = HullSection::new(Curve::constant(-0.4), 0.0, 2.0, 0.7, 0.4, 0.01, false).unwrap();
        assert!(Hull::new(0.0, 0.0, vec![thick_walls]).is_err());
    }

    #[test]
    fn test_weight_distribution_matches_weight() {
        let hull = two_piece(-0.4).unwrap();
        let distribution = hull.self_weight_distribution().unwrap().unwrap();
        assert_abs_diff_eq!(distribution.force(), hull.self_weight(), epsilon = 1e-9);
        assert_eq!(distribution.loads().len(), 2);
    }

    #[test]
    fn test_snapshot_edits_leave_original() {
        let hull = two_piece(-0.4).unwrap();
        let replacement = HullSection::new(Curve::constant(-0.3), 1.0, 3.0, 0.7, 0.01, 0.01, false).unwrap();

        // Would break continuity, so the edit is refused
        assert!(hull.with_section_replaced(1, replacement).is_err());
        assert_eq!(hull.sections()[1].profile(), &Curve::constant(-0.4));

        let heavier = hull.with_densities(2000.0, 0.0).unwrap();
        assert_abs_diff_eq!(heavier.self_weight(), 2.0 * hull.self_weight(), epsilon = 1e-9);
        assert_eq!(hull.concrete_density(), 1000.0);
    }

    #[test]
    fn test_scaled_to_length() {
        let hull = Hull::rectangular(2.0, 0.2, 0.3).unwrap();
        let scaled = hull.scaled_to_length(4.0).unwrap();
        assert_eq!(scaled.length(), 4.0);
        assert_abs_diff_eq!(scaled.max_height().unwrap(), 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(scaled.max_width(), 0.6, epsilon = 1e-12);
        assert_eq!(hull.length(), 2.0);
    }

    #[test]
    fn test_asymmetric_hull() {
        let hull = Hull::new(
            0.0,
            0.0,
            vec![
                HullSection::new(Curve::parabola(0.1, 1.0, -0.3), 0.0, 1.0, 0.7, 0.0, 0.0, false).unwrap(),
                HullSection::new(Curve::constant(-0.3), 1.0, 3.0, 0.7, 0.0, 0.0, false).unwrap(),
            ],
        )
        .unwrap();
        assert!(!hull.is_symmetric());
    }

    #[test]
    fn test_deserialize_runs_validation() {
        let hull = two_piece(-0.4).unwrap();
        let json = serde_json::to_string(&hull).unwrap();
        let parsed: Hull = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, hull);

        let broken = json.replace(r#"{"x":1.0,"rx":3.0}"#, r#"{"x":1.5,"rx":3.0}"#);
        assert_ne!(broken, json);
        assert!(serde_json::from_str::<Hull>(&broken).is_err());
    }
}
