//! Cubic Bézier curves that pass the vertical line test, usable as `y = f(x)`.

use serde::{Deserialize, Serialize};

use crate::errors::{CanoeError, CanoeResult};

use super::calculus::brent_root;

/// Steps used when checking that x is monotone in t
const MONOTONE_CHECK_STEPS: usize = 500;

/// How far outside `[x, rx]` an input may fall before it is rejected
const OUT_OF_BOUNDS_SLACK: f64 = 1e-3;

/// A cubic Bézier curve from `(x1, y1)` to `(x2, y2)` with two control points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub x1: f64,
    pub y1: f64,
    pub control_x1: f64,
    pub control_y1: f64,
    pub control_x2: f64,
    pub control_y2: f64,
    pub x2: f64,
    pub y2: f64,
}

impl CubicBezier {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        x1: f64,
        y1: f64,
        control_x1: f64,
        control_y1: f64,
        control_x2: f64,
        control_y2: f64,
        x2: f64,
        y2: f64,
    ) -> Self {
        CubicBezier {
            x1,
            y1,
            control_x1,
            control_y1,
            control_x2,
            control_y2,
            x2,
            y2,
        }
    }

    /// Point on the curve at parameter `t` in `[0, 1]`.
    pub fn point(&self, t: f64) -> (f64, f64) {
        let u = 1.0 - t;
        let b0 = u * u * u;
        let b1 = 3.0 * u * u * t;
        let b2 = 3.0 * u * t * t;
        let b3 = t * t * t;
        (
            b0 * self.x1 + b1 * self.control_x1 + b2 * self.control_x2 + b3 * self.x2,
            b0 * self.y1 + b1 * self.control_y1 + b2 * self.control_y2 + b3 * self.y2,
        )
    }

    /// dx/dt at parameter `t`
    pub fn derivative_x(&self, t: f64) -> f64 {
        let u = 1.0 - t;
        3.0 * u * u * (self.control_x1 - self.x1)
            + 6.0 * u * t * (self.control_x2 - self.control_x1)
            + 3.0 * t * t * (self.x2 - self.control_x2)
    }

    /// dy/dt at parameter `t`
    pub fn derivative_y(&self, t: f64) -> f64 {
        let u = 1.0 - t;
        3.0 * u * u * (self.control_y1 - self.y1)
            + 6.0 * u * t * (self.control_y2 - self.control_y1)
            + 3.0 * t * t * (self.y2 - self.control_y2)
    }

    /// Left end of the x-range covered by the curve
    pub fn x(&self) -> f64 {
        self.x1.min(self.x2)
    }

    /// Right end of the x-range covered by the curve
    pub fn rx(&self) -> f64 {
        self.x1.max(self.x2)
    }

    /// Solve `X(t) = x` for the curve parameter.
    ///
    /// Inputs slightly outside the curve's range are clamped; anything further
    /// than 1e-3 out is rejected.
    pub fn t_at(&self, x: f64) -> CanoeResult<f64> {
        if x < self.x() - OUT_OF_BOUNDS_SLACK || x > self.rx() + OUT_OF_BOUNDS_SLACK {
            return Err(CanoeError::invalid_input(
                "x",
                x.to_string(),
                format!("Out of bounds for this Bézier curve [{}, {}]", self.x(), self.rx()),
            ));
        }
        let target = x.clamp(self.x(), self.rx());
        let offset = |t: f64| self.point(t).0 - target;
        brent_root(&offset, 0.0, 1.0)
    }

    /// y on the curve at `x`, clamping `x` into the curve's range.
    pub fn value(&self, x: f64) -> f64 {
        self.point(self.t_clamped(x)).1
    }

    /// dy/dx at `x`, clamping `x` into the curve's range.
    ///
    /// Taken from the tangent at the matching parameter, so the slope at an
    /// end point is exactly the slope of its control arm.
    pub fn slope_at(&self, x: f64) -> f64 {
        let t = self.t_clamped(x);
        self.derivative_y(t) / self.derivative_x(t)
    }

    fn t_clamped(&self, x: f64) -> f64 {
        let target = x.clamp(self.x(), self.rx());
        self.t_at(target)
            .unwrap_or_else(|_| self.t_by_bisection(target))
    }

    /// Fallback parameter search for an x already inside the curve's range.
    fn t_by_bisection(&self, x: f64) -> f64 {
        let increasing = self.x2 >= self.x1;
        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        for _ in 0..64 {
            let mid = 0.5 * (lo + hi);
            let below = self.point(mid).0 < x;
            if below == increasing {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }

    /// Check the curve is a function of x: x strictly monotone in t.
    pub fn validate(&self) -> CanoeResult<()> {
        let values = [
            self.x1,
            self.y1,
            self.control_x1,
            self.control_y1,
            self.control_x2,
            self.control_y2,
            self.x2,
            self.y2,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(CanoeError::invalid_input(
                "cubic_bezier",
                format!("{:?}", values),
                "Bézier coordinates must be finite",
            ));
        }

        let mut previous = self.point(0.0).0;
        let mut increasing = true;
        let mut decreasing = true;
        for i in 1..=MONOTONE_CHECK_STEPS {
            let t = i as f64 / MONOTONE_CHECK_STEPS as f64;
            let current = self.point(t).0;
            if current <= previous {
                increasing = false;
            }
            if current >= previous {
                decreasing = false;
            }
            previous = current;
        }

        if increasing || decreasing {
            Ok(())
        } else {
            Err(CanoeError::invalid_input(
                "cubic_bezier",
                format!("x from {} to {}", self.x1, self.x2),
                "Bézier curve does not pass the vertical line test",
            ))
        }
    }
}
