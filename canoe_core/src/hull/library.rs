//! Preset hulls.
//!
//! `shark_bait` is the reference design: three vertex-form parabolas joined
//! with matching value and slope, bow and stern sections filled with bulkhead
//! foam. Every dimension scales with `length / 6`.

use crate::errors::CanoeResult;
use crate::functions::Curve;

use super::{Hull, HullSection};

/// Length the reference design was drawn at (m)
pub const SHARK_BAIT_LENGTH: f64 = 6.0;

/// kg/m³
pub const SHARK_BAIT_CONCRETE_DENSITY: f64 = 1056.0;

/// kg/m³
pub const SHARK_BAIT_BULKHEAD_DENSITY: f64 = 28.82;

/// The reference hull scaled to `length`.
///
/// # Example
///
/// ```rust
/// use canoe_core::hull::library;
///
/// let hull = library::shark_bait(6.0).unwrap();
/// assert_eq!(hull.sections().len(), 3);
/// assert!(hull.sections()[0].fill_bulkhead());
/// assert!(!hull.sections()[1].fill_bulkhead());
/// assert!(hull.is_symmetric());
/// ```
pub fn shark_bait(length: f64) -> CanoeResult<Hull> {
    let s = length / SHARK_BAIT_LENGTH;

    let edge_a = 361.0 / (335.0 * s);
    let edge_k = -(37249.0 / 120935.0) * s;
    let bow = Curve::parabola(edge_a, (193.0 / 361.0) * s, edge_k);
    let middle = Curve::parabola(1.0 / (67.0 * s), 3.0 * s, -0.4 * s);
    let stern = Curve::parabola(edge_a, (1973.0 / 361.0) * s, edge_k);

    let width = 0.7 * s;
    let thickness = 0.013 * s;
    let (knot_left, knot_right) = (0.5 * s, 5.5 * s);

    let sections = vec![
        HullSection::new(bow, 0.0, knot_left, width, thickness, thickness, true)?,
        HullSection::new(middle, knot_left, knot_right, width, thickness, thickness, false)?,
        HullSection::new(stern, knot_right, length, width, thickness, thickness, true)?,
    ];
    Hull::new(SHARK_BAIT_CONCRETE_DENSITY, SHARK_BAIT_BULKHEAD_DENSITY, sections)
}

/// A weightless box that bounds the reference hull at `length`.
pub fn default_hull(length: f64) -> CanoeResult<Hull> {
    let s = length / SHARK_BAIT_LENGTH;
    Hull::rectangular(length, 0.4 * s, 0.7 * s)
}
