//! Point loads: a force at a single position.

use serde::{Deserialize, Serialize};

use crate::errors::{CanoeError, CanoeResult};

use super::LoadType;

/// A concentrated force (kN, + up) at position `x` (m).
///
/// Supports are reaction loads added by a solver; they never merge with
/// coincident applied loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPointLoad")]
pub struct PointLoad {
    load_type: LoadType,
    force: f64,
    x: f64,
    is_support: bool,
}

#[derive(Deserialize)]
struct RawPointLoad {
    load_type: LoadType,
    force: f64,
    x: f64,
    #[serde(default)]
    is_support: bool,
}

impl TryFrom<RawPointLoad> for PointLoad {
    type Error = CanoeError;

    fn try_from(raw: RawPointLoad) -> CanoeResult<Self> {
        PointLoad::typed(raw.load_type, raw.force, raw.x, raw.is_support)
    }
}

impl PointLoad {
    /// Create an applied point load or a support.
    ///
    /// # Example
    ///
    /// ```rust
    /// use canoe_core::loads::{LoadType, PointLoad};
    ///
    /// let paddler = PointLoad::new(-0.8, 1.5, false).unwrap();
    /// assert_eq!(paddler.load_type(), LoadType::PointLoad);
    ///
    /// let stand = PointLoad::new(0.4, 0.0, true).unwrap();
    /// assert_eq!(stand.load_type(), LoadType::PointLoadSupport);
    /// ```
    pub fn new(force: f64, x: f64, is_support: bool) -> CanoeResult<Self> {
        let load_type = if is_support {
            LoadType::PointLoadSupport
        } else {
            LoadType::PointLoad
        };
        PointLoad::typed(load_type, force, x, is_support)
    }

    /// Create a point load with an explicit type.
    pub fn typed(load_type: LoadType, force: f64, x: f64, is_support: bool) -> CanoeResult<Self> {
        if !force.is_finite() {
            return Err(CanoeError::invalid_input("force", force.to_string(), "Force must be finite"));
        }
        if !x.is_finite() || x < 0.0 {
            return Err(CanoeError::invalid_input(
                "x",
                x.to_string(),
                "Point load position must be a finite, non-negative distance",
            ));
        }
        // A zero support is stored as +0.0 so it never displays as -0.00
        let force = if is_support && force == 0.0 { 0.0 } else { force };
        Ok(PointLoad {
            load_type,
            force,
            x,
            is_support,
        })
    }

    pub fn load_type(&self) -> LoadType {
        self.load_type
    }

    pub fn force(&self) -> f64 {
        self.force
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn is_support(&self) -> bool {
        self.is_support
    }

    /// Moment of this force about `pivot` (kN·m, counter-clockwise positive).
    pub fn moment_about(&self, pivot: f64) -> f64 {
        self.force * (self.x - pivot)
    }

    /// Same load with `other` added to its force.
    pub(crate) fn combined_with(&self, other: f64) -> PointLoad {
        PointLoad {
            force: self.force + other,
            ..self.clone()
        }
    }

    /// Same load reflected about `length / 2`.
    pub fn mirrored(&self, length: f64) -> PointLoad {
        PointLoad {
            x: length - self.x,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_support_is_positive_zero() {
        let support = PointLoad::new(-0.0, 2.0, true).unwrap();
        assert!(support.force().is_sign_positive());

        let applied = PointLoad::new(-0.0, 2.0, false).unwrap();
        assert!(applied.force().is_sign_negative());
    }

    #[test]
    fn test_rejects_negative_position() {
        assert!(PointLoad::new(1.0, -0.1, false).is_err());
        assert!(PointLoad::new(f64::INFINITY, 1.0, false).is_err());
    }

    #[test]
    fn test_moment_about() {
        let load = PointLoad::new(-2.0, 3.0, false).unwrap();
        assert_eq!(load.moment_about(0.0), -6.0);
        assert_eq!(load.moment_about(3.0), 0.0);
    }

    #[test]
    fn test_deserialize_defaults_support_flag() {
        let json = r#"{"load_type": "PointLoad", "force": -1.0, "x": 3.0}"#;
        let load: PointLoad = serde_json::from_str(json).unwrap();
        assert!(!load.is_support());

        let bad = r#"{"load_type": "PointLoad", "force": -1.0, "x": -3.0}"#;
        assert!(serde_json::from_str::<PointLoad>(bad).is_err());
    }
}
