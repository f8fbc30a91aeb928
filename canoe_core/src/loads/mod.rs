//! # Loads
//!
//! Forces acting on the canoe, all in kN and kN/m with up positive.
//!
//! - [`PointLoad`] - a force at a single position, applied or a support reaction
//! - [`UniformLoadDistribution`] - constant intensity over an interval
//! - [`PiecewiseContinuousLoadDistribution`] - smooth intensity over consecutive sections
//! - [`DiscreteLoadDistribution`] - uniform pieces tiling an interval
//! - [`Load`] - the sum type stored on a canoe
//!
//! ## Example
//!
//! ```rust
//! use canoe_core::loads::{sort_loads, Load, PointLoad, UniformLoadDistribution};
//!
//! let mut loads = vec![
//!     Load::from(UniformLoadDistribution::new(-1.0, 0.0, 2.0).unwrap()),
//!     Load::from(PointLoad::new(-0.5, 4.0, false).unwrap()),
//!     Load::from(PointLoad::new(0.8, 5.0, true).unwrap()),
//! ];
//! sort_loads(&mut loads);
//!
//! // Supports first, then applied point loads, then distributions
//! assert!(loads[0].is_support());
//! assert_eq!(loads[1].x(), 4.0);
//! assert_eq!(loads[2].force(), -2.0);
//! ```

pub mod discrete;
pub mod load_types;
pub mod piecewise;
pub mod point;
pub mod uniform;

pub use discrete::DiscreteLoadDistribution;
pub use load_types::LoadType;
pub use piecewise::{Piece, PiecewiseContinuousLoadDistribution};
pub use point::PointLoad;
pub use uniform::UniformLoadDistribution;

use serde::{Deserialize, Serialize};

use crate::functions::Section;

/// Outcome of adding a load to a canoe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddLoadResult {
    /// Stored as a new load
    Added,
    /// Summed into an existing point load at the same position
    Combined,
    /// Summed into an existing point load and the result was zero, so both are gone
    Removed,
}

/// Any load that can be placed on a canoe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Load {
    PointLoad(PointLoad),
    UniformLoadDistribution(UniformLoadDistribution),
    PiecewiseContinuousLoadDistribution(PiecewiseContinuousLoadDistribution),
    DiscreteLoadDistribution(DiscreteLoadDistribution),
}

impl Load {
    pub fn load_type(&self) -> LoadType {
        match self {
            Load::PointLoad(p) => p.load_type(),
            Load::UniformLoadDistribution(u) => u.load_type(),
            Load::PiecewiseContinuousLoadDistribution(p) => p.load_type(),
            Load::DiscreteLoadDistribution(d) => d.load_type(),
        }
    }

    /// Left end (the position for point loads)
    pub fn x(&self) -> f64 {
        match self {
            Load::PointLoad(p) => p.x(),
            Load::UniformLoadDistribution(u) => u.x(),
            Load::PiecewiseContinuousLoadDistribution(p) => p.x(),
            Load::DiscreteLoadDistribution(d) => d.x(),
        }
    }

    /// Right end (the position for point loads)
    pub fn rx(&self) -> f64 {
        match self {
            Load::PointLoad(p) => p.x(),
            Load::UniformLoadDistribution(u) => u.rx(),
            Load::PiecewiseContinuousLoadDistribution(p) => p.rx(),
            Load::DiscreteLoadDistribution(d) => d.rx(),
        }
    }

    /// Interval covered by a distribution; `None` for point loads.
    pub fn section(&self) -> Option<Section> {
        match self {
            Load::PointLoad(_) => None,
            Load::UniformLoadDistribution(u) => Some(u.section()),
            Load::PiecewiseContinuousLoadDistribution(p) => Some(p.section()),
            Load::DiscreteLoadDistribution(d) => Some(d.section()),
        }
    }

    /// Resultant force (kN)
    pub fn force(&self) -> f64 {
        match self {
            Load::PointLoad(p) => p.force(),
            Load::UniformLoadDistribution(u) => u.force(),
            Load::PiecewiseContinuousLoadDistribution(p) => p.force(),
            Load::DiscreteLoadDistribution(d) => d.force(),
        }
    }

    pub fn moment_about(&self, pivot: f64) -> f64 {
        match self {
            Load::PointLoad(p) => p.moment_about(pivot),
            Load::UniformLoadDistribution(u) => u.moment_about(pivot),
            Load::PiecewiseContinuousLoadDistribution(p) => p.moment_about(pivot),
            Load::DiscreteLoadDistribution(d) => d.moment_about(pivot),
        }
    }

    /// Force for point loads, intensity of largest magnitude for distributions.
    pub fn max_signed_value(&self) -> f64 {
        match self {
            Load::PointLoad(p) => p.force(),
            Load::UniformLoadDistribution(u) => u.magnitude(),
            Load::PiecewiseContinuousLoadDistribution(p) => p.max_signed_value(),
            Load::DiscreteLoadDistribution(d) => d.max_signed_value(),
        }
    }

    pub fn is_support(&self) -> bool {
        matches!(self, Load::PointLoad(p) if p.is_support())
    }

    pub fn as_point(&self) -> Option<&PointLoad> {
        match self {
            Load::PointLoad(p) => Some(p),
            _ => None,
        }
    }

    /// Rank used when ordering loads of different kinds.
    pub fn class_order(&self) -> u8 {
        match self {
            Load::PiecewiseContinuousLoadDistribution(_) => 0,
            Load::DiscreteLoadDistribution(_) => 1,
            Load::PointLoad(_) => 2,
            Load::UniformLoadDistribution(_) => 3,
        }
    }
}

impl From<PointLoad> for Load {
    fn from(load: PointLoad) -> Self {
        Load::PointLoad(load)
    }
}

impl From<UniformLoadDistribution> for Load {
    fn from(load: UniformLoadDistribution) -> Self {
        Load::UniformLoadDistribution(load)
    }
}

impl From<PiecewiseContinuousLoadDistribution> for Load {
    fn from(load: PiecewiseContinuousLoadDistribution) -> Self {
        Load::PiecewiseContinuousLoadDistribution(load)
    }
}

impl From<DiscreteLoadDistribution> for Load {
    fn from(load: DiscreteLoadDistribution) -> Self {
        Load::DiscreteLoadDistribution(load)
    }
}

/// Order loads by kind (piecewise, discrete, point, uniform), supports ahead of
/// applied point loads, then by position. Stable for equal keys.
pub fn sort_loads(loads: &mut [Load]) {
    loads.sort_by(|a, b| {
        a.class_order()
            .cmp(&b.class_order())
            .then_with(|| b.is_support().cmp(&a.is_support()))
            .then_with(|| a.x().total_cmp(&b.x()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::Curve;

    fn piecewise() -> PiecewiseContinuousLoadDistribution {
        PiecewiseContinuousLoadDistribution::new(
            LoadType::Buoyancy,
            vec![Piece::new(Section::new(0.0, 4.0).unwrap(), Curve::constant(0.5))],
        )
        .unwrap()
    }

    #[test]
    fn test_class_order_and_supports() {
        let mut loads = vec![
            Load::from(UniformLoadDistribution::new(-1.0, 0.0, 1.0).unwrap()),
            Load::from(PointLoad::new(-1.0, 1.0, false).unwrap()),
            Load::from(PointLoad::new(1.0, 3.0, true).unwrap()),
            Load::from(piecewise()),
            Load::from(PointLoad::new(-2.0, 0.5, false).unwrap()),
        ];
        sort_loads(&mut loads);

        assert_eq!(loads[0].class_order(), 0);
        assert!(loads[1].is_support());
        assert_eq!(loads[2].x(), 0.5);
        assert_eq!(loads[3].x(), 1.0);
        assert_eq!(loads[4].load_type(), LoadType::UniformLoadDistribution);
    }

    #[test]
    fn test_section_and_extent() {
        let point = Load::from(PointLoad::new(-1.0, 2.0, false).unwrap());
        assert!(point.section().is_none());
        assert_eq!(point.x(), point.rx());

        let uniform = Load::from(UniformLoadDistribution::new(-1.0, 1.0, 3.0).unwrap());
        assert_eq!(uniform.section(), Some(Section::new(1.0, 3.0).unwrap()));
        assert_eq!(uniform.moment_about(0.0), -4.0);
    }

    #[test]
    fn test_max_signed_value() {
        let point = Load::from(PointLoad::new(-1.5, 2.0, false).unwrap());
        assert_eq!(point.max_signed_value(), -1.5);
        assert_eq!(Load::from(piecewise()).max_signed_value(), 0.5);
    }

    #[test]
    fn test_tagged_serialization() {
        let load = Load::from(UniformLoadDistribution::new(-2.0, 1.0, 3.0).unwrap());
        let json = serde_json::to_string(&load).unwrap();
        assert!(json.contains("\"type\":\"UniformLoadDistribution\""));
        let parsed: Load = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, load);
    }

    #[test]
    fn test_tagged_deserialization_validates() {
        let json = r#"{"type": "UniformLoadDistribution", "load_type": "UniformLoadDistribution",
                       "magnitude": -2.0, "section": {"x": 3.0, "rx": 3.0}}"#;
        assert!(serde_json::from_str::<Load>(json).is_err());
    }
}
