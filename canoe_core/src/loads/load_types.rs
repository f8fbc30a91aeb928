//! Load type definitions
//!
//! Every load on a canoe carries a [`LoadType`] that says where it came from:
//! something a user placed, a support reaction, a piece of the hull, or the
//! water pushing back.

use serde::{Deserialize, Serialize};

/// Origin and role of a load.
///
/// # Example
/// ```
/// use canoe_core::loads::LoadType;
///
/// let support = LoadType::PointLoadSupport;
/// assert_eq!(support.description(), "Point Support");
/// assert_eq!(support.variable(), 'p');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadType {
    /// Force applied by the user at a single point
    PointLoad,
    /// Reaction from a stand, added by the solver
    PointLoadSupport,
    /// Constant intensity over an interval
    UniformLoadDistribution,
    /// One piece of a discretized distribution
    DiscreteSection,
    /// One piece of a discretized hull whose section is filled with bulkhead material
    DiscreteSectionBulkhead,
    /// Self-weight of the hull
    Hull,
    /// Buoyant reaction of the water
    Buoyancy,
}

impl LoadType {
    /// All load types in display order
    pub const ALL: [LoadType; 7] = [
        LoadType::PointLoad,
        LoadType::PointLoadSupport,
        LoadType::UniformLoadDistribution,
        LoadType::DiscreteSection,
        LoadType::DiscreteSectionBulkhead,
        LoadType::Hull,
        LoadType::Buoyancy,
    ];

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            LoadType::PointLoad => "Point Load",
            LoadType::PointLoadSupport => "Point Support",
            LoadType::UniformLoadDistribution => "Distributed Load",
            LoadType::DiscreteSection => "Section",
            LoadType::DiscreteSectionBulkhead => "Bulkhead Section",
            LoadType::Hull => "Hull Weight",
            LoadType::Buoyancy => "Buoyancy",
        }
    }

    /// Symbol used when labelling the load's magnitude: `p` for forces,
    /// `d` for distributed intensities, `w` for whole-hull distributions.
    pub fn variable(&self) -> char {
        match self {
            LoadType::PointLoad | LoadType::PointLoadSupport => 'p',
            LoadType::UniformLoadDistribution
            | LoadType::DiscreteSection
            | LoadType::DiscreteSectionBulkhead => 'd',
            LoadType::Hull | LoadType::Buoyancy => 'w',
        }
    }

    /// Whether this type marks a reaction introduced by a solver
    pub fn is_reaction(&self) -> bool {
        matches!(self, LoadType::PointLoadSupport | LoadType::Buoyancy)
    }

    /// Whether a load of this type acts at a single point
    pub fn is_point(&self) -> bool {
        self.variable() == 'p'
    }
}

impl std::fmt::Display for LoadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}
