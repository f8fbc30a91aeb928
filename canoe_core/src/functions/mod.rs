//! # Functions
//!
//! Intervals and bounded univariate functions: the domain and shape primitives
//! that loads and hull sections are built from.
//!
//! - [`Section`] - closed interval `[x, rx]`
//! - [`BoundedFunction`] - anything evaluable at `x`, with min/max over a section
//! - [`Curve`] - the serializable function variants
//! - [`calculus`] - integration, Brent's methods, piecewise validation
//!
//! ## Example
//!
//! ```rust
//! use canoe_core::functions::{BoundedFunction, Curve, Section};
//!
//! let profile = Curve::parabola(1.0 / 67.0, 3.0, -0.4);
//! let section = Section::new(0.0, 6.0).unwrap();
//!
//! // Dense sampling is the default and works for any shape
//! assert!((profile.min_value(&section) + 0.4).abs() < 1e-4);
//!
//! // Closures get the same operations
//! let doubled = |x: f64| 2.0 * profile.value(x);
//! assert!(doubled.max_signed_value(&section) < 0.0);
//! ```

pub mod bezier;
pub mod calculus;
pub mod curve;
pub mod section;

pub use bezier::CubicBezier;
pub use curve::Curve;
pub use section::Section;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_EXTREMUM_SAMPLES;
use crate::errors::{CanoeError, CanoeResult};

/// How the extreme values of a function on a section are found.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExtremumSearch {
    /// Evaluate at evenly spaced points including both endpoints.
    Sampled { samples: usize },

    /// Brent's method. Only valid when the caller knows the function is
    /// unimodal on the section; multi-modal input returns a local extremum.
    Brent,
}

impl Default for ExtremumSearch {
    fn default() -> Self {
        ExtremumSearch::Sampled {
            samples: DEFAULT_EXTREMUM_SAMPLES,
        }
    }
}

/// Minimum and maximum of a function on a section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extrema {
    pub min: f64,
    pub max: f64,
}

impl Extrema {
    /// The extreme with the larger magnitude, keeping its sign.
    pub fn max_signed(&self) -> f64 {
        if self.max.abs() >= self.min.abs() {
            self.max
        } else {
            self.min
        }
    }
}

/// A scalar function of position along the canoe.
///
/// Implemented for [`Curve`] and for every `Fn(f64) -> f64`, so composed
/// functions can be written as plain closures.
pub trait BoundedFunction {
    fn value(&self, x: f64) -> f64;

    /// Minimum and maximum on `section` using the given search.
    fn extremum(&self, section: &Section, search: ExtremumSearch) -> CanoeResult<Extrema> {
        match search {
            ExtremumSearch::Sampled { samples } => {
                if samples < 2 {
                    return Err(CanoeError::invalid_input(
                        "samples",
                        samples.to_string(),
                        "At least two samples are needed",
                    ));
                }
                Ok(sample_extrema(self, section, samples))
            }
            ExtremumSearch::Brent => {
                let (_, min) = calculus::brent_minimize(self, section.x(), section.rx())?;
                let (_, max) = calculus::brent_maximize(self, section.x(), section.rx())?;
                Ok(Extrema { min, max })
            }
        }
    }

    /// Minimum on `section` by dense sampling.
    fn min_value(&self, section: &Section) -> f64 {
        sample_extrema(self, section, DEFAULT_EXTREMUM_SAMPLES).min
    }

    /// Maximum on `section` by dense sampling.
    fn max_value(&self, section: &Section) -> f64 {
        sample_extrema(self, section, DEFAULT_EXTREMUM_SAMPLES).max
    }

    /// The value of largest magnitude on `section`, keeping its sign.
    fn max_signed_value(&self, section: &Section) -> f64 {
        sample_extrema(self, section, DEFAULT_EXTREMUM_SAMPLES).max_signed()
    }
}

/// Evaluate at `samples` evenly spaced points, both endpoints included.
fn sample_extrema<F: BoundedFunction + ?Sized>(f: &F, section: &Section, samples: usize) -> Extrema {
    let step = section.length() / (samples - 1) as f64;
    let mut extrema = Extrema {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };
    for i in 0..samples {
        let x = if i == samples - 1 {
            section.rx()
        } else {
            section.x() + i as f64 * step
        };
        let y = f.value(x);
        extrema.min = extrema.min.min(y);
        extrema.max = extrema.max.max(y);
    }
    extrema
}

impl<F: Fn(f64) -> f64> BoundedFunction for F {
    fn value(&self, x: f64) -> f64 {
        self(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sampled_extrema_include_endpoints() {
        let f = |x: f64| x;
        let section = Section::new(1.0, 4.0).unwrap();
        assert_eq!(f.min_value(&section), 1.0);
        assert_eq!(f.max_value(&section), 4.0);
    }

    #[test]
    fn test_max_signed_value_prefers_magnitude() {
        let section = Section::new(0.0, 1.0).unwrap();
        let mostly_down = |x: f64| 0.5 - 3.0 * x;
        assert_abs_diff_eq!(mostly_down.max_signed_value(&section), -2.5, epsilon = 1e-12);

        let mostly_up = |x: f64| 2.0 * x - 0.1;
        assert_abs_diff_eq!(mostly_up.max_signed_value(&section), 1.9, epsilon = 1e-12);
    }

    #[test]
    fn test_brent_search_on_unimodal() {
        let f = Curve::parabola(1.0, 2.0, -1.0);
        let section = Section::new(0.0, 3.0).unwrap();
        let extrema = f.extremum(&section, ExtremumSearch::Brent).unwrap();
        assert_abs_diff_eq!(extrema.min, -1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(extrema.max, 3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_sampling_finds_global_extrema_of_two_humps() {
        let f = |x: f64| (x * std::f64::consts::PI).sin() * if x > 1.0 { 2.0 } else { 1.0 };
        let section = Section::new(0.0, 2.0).unwrap();
        let sampled = f.extremum(&section, ExtremumSearch::default()).unwrap();
        assert_abs_diff_eq!(sampled.min, -2.0, epsilon = 1e-4);
        assert_abs_diff_eq!(sampled.max, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_sampled_needs_two_samples() {
        let f = |x: f64| x;
        let section = Section::new(0.0, 1.0).unwrap();
        assert!(f.extremum(&section, ExtremumSearch::Sampled { samples: 1 }).is_err());
    }
}
