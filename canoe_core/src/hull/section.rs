//! Hull sections: one stretch of hull with a single profile curve.
//!
//! The cross-section is modelled as a box of constant `width` whose depth at
//! `x` is `-profile(x)`. The profile sits at or below `y = 0`, the top of the
//! hull. Concrete fills both side walls and the floor; an optional bulkhead
//! fills the rest of the enclosed volume.

use serde::{Deserialize, Serialize};

use crate::constants::{GRAVITY, NEWTONS_PER_KN};
use crate::errors::{CanoeError, CanoeResult};
use crate::functions::calculus::{self, simpson};
use crate::functions::{Curve, Section};

/// Profile above `y = 0` tolerated before a section is rejected.
const PROFILE_SLACK: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHullSection")]
pub struct HullSection {
    section: Section,
    profile: Curve,
    width: f64,
    wall_thickness: f64,
    floor_thickness: f64,
    fill_bulkhead: bool,
}

#[derive(Deserialize)]
struct RawHullSection {
    section: Section,
    profile: Curve,
    width: f64,
    wall_thickness: f64,
    floor_thickness: f64,
    #[serde(default)]
    fill_bulkhead: bool,
}

impl TryFrom<RawHullSection> for HullSection {
    type Error = CanoeError;

    fn try_from(raw: RawHullSection) -> CanoeResult<Self> {
        HullSection::new(
            raw.profile,
            raw.section.x(),
            raw.section.rx(),
            raw.width,
            raw.wall_thickness,
            raw.floor_thickness,
            raw.fill_bulkhead,
        )
    }
}

impl HullSection {
    /// Create a section over `[x, rx]`.
    ///
    /// Fails when the profile rises above `y = 0`, when the width or a
    /// thickness is negative, or when the section itself is malformed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use canoe_core::functions::Curve;
    /// use canoe_core::hull::HullSection;
    ///
    /// // 2 m long box, 0.4 m deep, 0.7 m wide, 1 cm walls
    /// let section = HullSection::new(Curve::constant(-0.4), 0.0, 2.0, 0.7, 0.01, 0.01, false).unwrap();
    /// assert!((section.volume() - 0.56).abs() < 1e-9);
    ///
    /// assert!(HullSection::new(Curve::constant(0.1), 0.0, 2.0, 0.7, 0.01, 0.01, false).is_err());
    /// ```
    pub fn new(
        profile: Curve,
        x: f64,
        rx: f64,
        width: f64,
        wall_thickness: f64,
        floor_thickness: f64,
        fill_bulkhead: bool,
    ) -> CanoeResult<Self> {
        let section = Section::new(x, rx)?;
        profile.validate()?;

        for (field, value) in [
            ("width", width),
            ("wall_thickness", wall_thickness),
            ("floor_thickness", floor_thickness),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CanoeError::invalid_input(
                    field,
                    value.to_string(),
                    "Must be a finite, non-negative length",
                ));
            }
        }

        let (_, highest) = calculus::brent_maximize(&profile, x, rx)?;
        if highest > PROFILE_SLACK {
            return Err(CanoeError::invalid_input(
                "profile",
                highest.to_string(),
                "Hull profile must be non-positive on its section",
            ));
        }

        Ok(HullSection {
            section,
            profile,
            width,
            wall_thickness,
            floor_thickness,
            fill_bulkhead,
        })
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

    pub fn profile(&self) -> &Curve {
        &self.profile
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn wall_thickness(&self) -> f64 {
        self.wall_thickness
    }

    pub fn floor_thickness(&self) -> f64 {
        self.floor_thickness
    }

    pub fn fill_bulkhead(&self) -> bool {
        self.fill_bulkhead
    }

    /// Depth of the hull below its top at `x` (m)
    pub fn depth_at(&self, x: f64) -> f64 {
        -self.profile.evaluate(x).min(0.0)
    }

    /// Height of the deepest point of this section (m)
    pub fn height(&self) -> CanoeResult<f64> {
        let (_, lowest) = calculus::brent_minimize(&self.profile, self.x(), self.rx())?;
        Ok(-lowest.min(0.0))
    }

    /// Enclosed cross-sectional area at `x` (m²)
    pub fn enclosed_area_at(&self, x: f64) -> f64 {
        self.width * self.depth_at(x)
    }

    /// Enclosed volume (m³)
    pub fn volume(&self) -> f64 {
        let area = |x: f64| self.enclosed_area_at(x);
        simpson(&area, self.x(), self.rx())
    }

    /// Concrete in the two side walls plus the floor (m³).
    ///
    /// The floor follows the profile, so its length is the arc length of the
    /// profile curve over the section.
    pub fn concrete_volume(&self) -> f64 {
        let depth = |x: f64| self.depth_at(x);
        let walls = 2.0 * self.wall_thickness * simpson(&depth, self.x(), self.rx());
        let floor_width = (self.width - 2.0 * self.wall_thickness).max(0.0);
        let floor = self.floor_thickness * floor_width * calculus::arc_length(&self.profile, self.x(), self.rx());
        walls + floor
    }

    /// Enclosed volume not taken by concrete, if this section is filled (m³)
    pub fn bulkhead_volume(&self) -> f64 {
        if self.fill_bulkhead {
            (self.volume() - self.concrete_volume()).max(0.0)
        } else {
            0.0
        }
    }

    /// Mass (kg) for the given densities (kg/m³)
    pub fn mass(&self, concrete_density: f64, bulkhead_density: f64) -> f64 {
        self.concrete_volume() * concrete_density + self.bulkhead_volume() * bulkhead_density
    }

    /// Weight (kN, negative as it acts downward)
    pub fn weight(&self, concrete_density: f64, bulkhead_density: f64) -> f64 {
        -self.mass(concrete_density, bulkhead_density) * GRAVITY / NEWTONS_PER_KN
    }

    /// Same section restricted to `sub`, which must lie inside it.
    pub fn restricted_to(&self, sub: &Section) -> CanoeResult<HullSection> {
        match self.section.intersection(sub) {
            Some(overlap) if overlap == *sub => Ok(HullSection {
                section: overlap,
                ..self.clone()
            }),
            _ => Err(CanoeError::invalid_input(
                "section",
                format!("[{}, {}]", sub.x(), sub.rx()),
                format!("Not inside hull section [{}, {}]", self.x(), self.rx()),
            )),
        }
    }

    /// Same section with its profile and extent stretched by `factor` and
    /// thicknesses scaled with it.
    pub(crate) fn scaled(&self, factor: f64) -> CanoeResult<HullSection> {
        HullSection::new(
            self.profile.scaled(factor),
            self.x() * factor,
            self.rx() * factor,
            self.width * factor,
            self.wall_thickness * factor,
            self.floor_thickness * factor,
            self.fill_bulkhead,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn box_section(fill: bool) -> HullSection {
        HullSection::new(Curve::constant(-0.4), 0.0, 2.0, 0.7, 0.01, 0.02, fill).unwrap()
    }

    #[test]
    fn test_box_volumes() {
        let section = box_section(false);
        assert_abs_diff_eq!(section.volume(), 0.7 * 0.4 * 2.0, epsilon = 1e-9);

        // Walls: 2 * 0.01 * (0.4 * 2); floor: 0.02 * (0.7 - 0.02) * 2
        let concrete = 2.0 * 0.01 * 0.8 + 0.02 * 0.68 * 2.0;
        assert_abs_diff_eq!(section.concrete_volume(), concrete, epsilon = 1e-9);
        assert_eq!(section.bulkhead_volume(), 0.0);

        let filled = box_section(true);
        assert_abs_diff_eq!(filled.bulkhead_volume(), 0.56 - concrete, epsilon = 1e-9);
    }

    #[test]
    fn test_weight_is_downward() {
        let section = box_section(true);
        let mass = section.mass(1056.0, 28.82);
        assert!(mass > 0.0);
        assert_abs_diff_eq!(section.weight(1056.0, 28.82), -mass * GRAVITY / 1000.0, epsilon = 1e-12);
        assert_eq!(section.weight(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_rejects_positive_profile() {
        let bump = Curve::parabola(-1.0, 1.0, 0.1);
        assert!(HullSection::new(bump, 0.0, 2.0, 0.7, 0.01, 0.01, false).is_err());
    }

    #[test]
    fn test_rejects_negative_thickness() {
        assert!(HullSection::new(Curve::constant(-0.4), 0.0, 2.0, 0.7, -0.01, 0.01, false).is_err());
        assert!(HullSection::new(Curve::constant(-0.4), 0.0, 2.0, -0.7, 0.01, 0.01, false).is_err());
    }

    #[test]
    fn test_height_of_parabola() {
        let section = HullSection::new(Curve::parabola(0.1, 1.0, -0.3), 0.0, 2.0, 0.7, 0.0, 0.0, false).unwrap();
        assert_abs_diff_eq!(section.height().unwrap(), 0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_restricted_to() {
        let section = box_section(false);
        let half = section.restricted_to(&Section::new(0.5, 1.5).unwrap()).unwrap();
        assert_abs_diff_eq!(half.volume(), 0.28, epsilon = 1e-9);
        assert!(section.restricted_to(&Section::new(1.5, 2.5).unwrap()).is_err());
    }

    #[test]
    fn test_deserialize_validates_profile() {
        let json = r#"{
            "section": {"x": 0.0, "rx": 1.0},
            "profile": {"type": "Constant", "value": 0.2},
            "width": 0.7, "wall_thickness": 0.01, "floor_thickness": 0.01
        }"#;
        assert!(serde_json::from_str::<HullSection>(json).is_err());
    }
}
