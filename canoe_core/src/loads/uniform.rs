//! Uniform load distributions: constant intensity over an interval.

use serde::{Deserialize, Serialize};

use crate::errors::{CanoeError, CanoeResult};
use crate::functions::Section;

use super::LoadType;

/// Constant intensity `magnitude` (kN/m, + up) over `section`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawUniformLoad")]
pub struct UniformLoadDistribution {
    load_type: LoadType,
    magnitude: f64,
    section: Section,
}

#[derive(Deserialize)]
struct RawUniformLoad {
    load_type: LoadType,
    magnitude: f64,
    section: Section,
}

impl TryFrom<RawUniformLoad> for UniformLoadDistribution {
    type Error = CanoeError;

    fn try_from(raw: RawUniformLoad) -> CanoeResult<Self> {
        UniformLoadDistribution::typed(raw.load_type, raw.magnitude, raw.section)
    }
}

impl UniformLoadDistribution {
    /// Create a user distributed load over `[x, rx]`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use canoe_core::loads::UniformLoadDistribution;
    ///
    /// let gear = UniformLoadDistribution::new(-2.0, 1.0, 3.0).unwrap();
    /// assert_eq!(gear.force(), -4.0);
    /// assert!(UniformLoadDistribution::new(-2.0, 3.0, 1.0).is_err());
    /// ```
    pub fn new(magnitude: f64, x: f64, rx: f64) -> CanoeResult<Self> {
        UniformLoadDistribution::typed(LoadType::UniformLoadDistribution, magnitude, Section::new(x, rx)?)
    }

    /// Create a uniform load of a specific type over an existing section.
    pub fn typed(load_type: LoadType, magnitude: f64, section: Section) -> CanoeResult<Self> {
        if !magnitude.is_finite() {
            return Err(CanoeError::invalid_input(
                "magnitude",
                magnitude.to_string(),
                "Magnitude must be finite",
            ));
        }
        Ok(UniformLoadDistribution {
            load_type,
            magnitude,
            section,
        })
    }

    pub fn load_type(&self) -> LoadType {
        self.load_type
    }

    /// Intensity (kN/m)
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn x(&self) -> f64 {
        self.section.x()
    }

    pub fn rx(&self) -> f64 {
        self.section.rx()
    }

    /// Resultant force (kN)
    pub fn force(&self) -> f64 {
        self.magnitude * self.section.length()
    }

    /// Position of the resultant
    pub fn centroid(&self) -> f64 {
        self.section.midpoint()
    }

    /// Moment of the resultant about `pivot` (kN·m).
    pub fn moment_about(&self, pivot: f64) -> f64 {
        self.force() * (self.centroid() - pivot)
    }

    pub(crate) fn combined_with(&self, other: f64) -> UniformLoadDistribution {
        UniformLoadDistribution {
            magnitude: self.magnitude + other,
            ..self.clone()
        }
    }

    /// Same load reflected about `length / 2`.
    pub fn mirrored(&self, length: f64) -> CanoeResult<UniformLoadDistribution> {
        let section = Section::new(length - self.rx(), length - self.x())?;
        UniformLoadDistribution::typed(self.load_type, self.magnitude, section)
    }
}
