//! Serializable univariate functions used for hull profiles and load intensities.

use serde::{Deserialize, Serialize};

use crate::errors::{CanoeError, CanoeResult};

use super::bezier::CubicBezier;
use super::calculus::derivative_at;
use super::BoundedFunction;

/// A function `y = f(x)` that can be stored in a model file.
///
/// Serialized with a `type` discriminator, e.g.
/// `{"type": "VertexFormParabola", "a": 1.0, "h": 3.0, "k": -0.4}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Curve {
    /// `a(x - h)² + k`
    VertexFormParabola { a: f64, h: f64, k: f64 },

    /// Bézier curve evaluated as a function of x
    CubicBezier(CubicBezier),

    /// `0` for `x <= c`, `a` afterwards
    Step { a: f64, c: f64 },

    /// `a` strictly inside `(b, c)`, `0` elsewhere
    Rect { a: f64, b: f64, c: f64 },

    Constant { value: f64 },

    /// Submerged cross-sectional area of a box section below a waterline, times `scale`.
    ///
    /// `scale * width * (waterline - min(profile(x), waterline))`
    Submerged {
        profile: Box<Curve>,
        width: f64,
        waterline: f64,
        scale: f64,
    },
}

impl Curve {
    pub fn parabola(a: f64, h: f64, k: f64) -> Self {
        Curve::VertexFormParabola { a, h, k }
    }

    pub fn constant(value: f64) -> Self {
        Curve::Constant { value }
    }

    pub fn step(a: f64, c: f64) -> Self {
        Curve::Step { a, c }
    }

    pub fn rect(a: f64, b: f64, c: f64) -> Self {
        Curve::Rect { a, b, c }
    }

    pub fn submerged(profile: Curve, width: f64, waterline: f64, scale: f64) -> Self {
        Curve::Submerged {
            profile: Box::new(profile),
            width,
            waterline,
            scale,
        }
    }

    /// Evaluate the function at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        match self {
            Curve::VertexFormParabola { a, h, k } => a * (x - h).powi(2) + k,
            Curve::CubicBezier(bezier) => bezier.value(x),
            Curve::Step { a, c } => {
                if x <= *c {
                    0.0
                } else {
                    *a
                }
            }
            Curve::Rect { a, b, c } => {
                if *b < x && x < *c {
                    *a
                } else {
                    0.0
                }
            }
            Curve::Constant { value } => *value,
            Curve::Submerged {
                profile,
                width,
                waterline,
                scale,
            } => {
                let depth = waterline - profile.evaluate(x).min(*waterline);
                scale * width * depth
            }
        }
    }

    /// Slope `dy/dx` at `x`. Exact for parabolas and Bézier curves; flat
    /// pieces of steps and rects report 0.
    pub fn slope_at(&self, x: f64) -> f64 {
        match self {
            Curve::VertexFormParabola { a, h, .. } => 2.0 * a * (x - h),
            Curve::CubicBezier(bezier) => bezier.slope_at(x),
            Curve::Step { .. } | Curve::Rect { .. } | Curve::Constant { .. } => 0.0,
            Curve::Submerged { .. } => derivative_at(self, x),
        }
    }

    /// Name of the variant, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Curve::VertexFormParabola { .. } => "VertexFormParabola",
            Curve::CubicBezier(_) => "CubicBezier",
            Curve::Step { .. } => "Step",
            Curve::Rect { .. } => "Rect",
            Curve::Constant { .. } => "Constant",
            Curve::Submerged { .. } => "Submerged",
        }
    }

    /// Reject non-finite parameters and Bézier curves that are not functions of x.
    pub fn validate(&self) -> CanoeResult<()> {
        let parameters: Vec<f64> = match self {
            Curve::VertexFormParabola { a, h, k } => vec![*a, *h, *k],
            Curve::CubicBezier(bezier) => return bezier.validate(),
            Curve::Step { a, c } => vec![*a, *c],
            Curve::Rect { a, b, c } => vec![*a, *b, *c],
            Curve::Constant { value } => vec![*value],
            Curve::Submerged {
                profile,
                width,
                waterline,
                scale,
            } => {
                profile.validate()?;
                vec![*width, *waterline, *scale]
            }
        };

        if parameters.iter().all(|p| p.is_finite()) {
            Ok(())
        } else {
            Err(CanoeError::invalid_input(
                self.kind(),
                format!("{:?}", parameters),
                "Function parameters must be finite",
            ))
        }
    }

    /// Same curve shifted `dx` along the x axis: `g(x) = f(x - dx)`.
    pub fn shifted(&self, dx: f64) -> Curve {
        match self {
            Curve::VertexFormParabola { a, h, k } => Curve::parabola(*a, h + dx, *k),
            Curve::CubicBezier(b) => Curve::CubicBezier(CubicBezier::new(
                b.x1 + dx,
                b.y1,
                b.control_x1 + dx,
                b.control_y1,
                b.control_x2 + dx,
                b.control_y2,
                b.x2 + dx,
                b.y2,
            )),
            Curve::Step { a, c } => Curve::step(*a, c + dx),
            Curve::Rect { a, b, c } => Curve::rect(*a, b + dx, c + dx),
            Curve::Constant { value } => Curve::constant(*value),
            Curve::Submerged {
                profile,
                width,
                waterline,
                scale,
            } => Curve::submerged(profile.shifted(dx), *width, *waterline, *scale),
        }
    }

    /// Same curve stretched by `factor` in both x and y: `g(x) = factor * f(x / factor)`.
    pub fn scaled(&self, factor: f64) -> Curve {
        match self {
            Curve::VertexFormParabola { a, h, k } => Curve::parabola(a / factor, h * factor, k * factor),
            Curve::CubicBezier(b) => Curve::CubicBezier(CubicBezier::new(
                b.x1 * factor,
                b.y1 * factor,
                b.control_x1 * factor,
                b.control_y1 * factor,
                b.control_x2 * factor,
                b.control_y2 * factor,
                b.x2 * factor,
                b.y2 * factor,
            )),
            Curve::Step { a, c } => Curve::step(a * factor, c * factor),
            Curve::Rect { a, b, c } => Curve::rect(a * factor, b * factor, c * factor),
            Curve::Constant { value } => Curve::constant(value * factor),
            Curve::Submerged {
                profile,
                width,
                waterline,
                scale,
            } => Curve::submerged(profile.scaled(factor), width * factor, waterline * factor, *scale),
        }
    }
}

impl BoundedFunction for Curve {
    fn value(&self, x: f64) -> f64 {
        self.evaluate(x)
    }
}
