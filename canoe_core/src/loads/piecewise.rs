//! Piecewise continuous load distributions
//!
//! A distribution built from consecutive sections, each with its own
//! [`Curve`]. Used for buoyancy and for any smooth intensity that the hull or a
//! solver produces. Construction checks that:
//!
//! - the sections form one contiguous interval (each `rx` equals the next `x` exactly)
//! - the stitched function has no jump larger than 1e-3 (sampled)
//! - the function never crosses zero (entirely up or entirely down)

use serde::{Deserialize, Serialize};

use crate::constants::CONTINUITY_TOLERANCE;
use crate::errors::{CanoeError, CanoeResult};
use crate::functions::calculus::{self, simpson};
use crate::functions::{BoundedFunction, Curve, Extrema, Section};

use super::LoadType;

/// One section of a piecewise distribution and its intensity function (kN/m).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub section: Section,
    pub function: Curve,
}

impl Piece {
    pub fn new(section: Section, function: Curve) -> Self {
        Piece { section, function }
    }
}

/// A continuous, single-signed load intensity over a contiguous run of sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPiecewise")]
pub struct PiecewiseContinuousLoadDistribution {
    load_type: LoadType,
    pieces: Vec<Piece>,
}

#[derive(Deserialize)]
struct RawPiecewise {
    load_type: LoadType,
    pieces: Vec<Piece>,
}

impl TryFrom<RawPiecewise> for PiecewiseContinuousLoadDistribution {
    type Error = CanoeError;

    fn try_from(raw: RawPiecewise) -> CanoeResult<Self> {
        PiecewiseContinuousLoadDistribution::new(raw.load_type, raw.pieces)
    }
}

impl PiecewiseContinuousLoadDistribution {
    /// Build and validate a distribution from ordered pieces.
    ///
    /// # Example
    ///
    /// ```rust
    /// use canoe_core::functions::{Curve, Section};
    /// use canoe_core::loads::{LoadType, Piece, PiecewiseContinuousLoadDistribution};
    ///
    /// let pieces = vec![
    ///     Piece::new(Section::new(0.0, 1.0).unwrap(), Curve::constant(2.0)),
    ///     Piece::new(Section::new(1.0, 3.0).unwrap(), Curve::constant(2.0)),
    /// ];
    /// let buoyancy = PiecewiseContinuousLoadDistribution::new(LoadType::Buoyancy, pieces).unwrap();
    /// assert!((buoyancy.force() - 6.0).abs() < 1e-9);
    /// ```
    pub fn new(load_type: LoadType, pieces: Vec<Piece>) -> CanoeResult<Self> {
        if pieces.is_empty() {
            return Err(CanoeError::invalid_input(
                "pieces",
                "[]",
                "A piecewise distribution needs at least one piece",
            ));
        }

        for piece in &pieces {
            piece.function.validate()?;
        }

        let sections: Vec<Section> = pieces.iter().map(|p| p.section).collect();
        calculus::validate_contiguous(&sections)?;

        for piece in &pieces {
            calculus::validate_continuity(&piece.function, &piece.section)?;
        }
        for pair in pieces.windows(2) {
            let boundary = pair[0].section.rx();
            let left = pair[0].function.evaluate(boundary);
            let right = pair[1].function.evaluate(boundary);
            if (left - right).abs() > CONTINUITY_TOLERANCE {
                return Err(CanoeError::invalid_input(
                    "pieces",
                    format!("x = {}: {} vs {}", boundary, left, right),
                    "Pieces do not meet at their shared boundary",
                ));
            }
        }

        let signed: Vec<(Section, Curve)> = pieces.iter().map(|p| (p.section, p.function.clone())).collect();
        calculus::validate_single_sign(&signed)?;

        Ok(PiecewiseContinuousLoadDistribution { load_type, pieces })
    }

    /// A zero-valued distribution over the given sections.
    pub fn zero(load_type: LoadType, sections: &[Section]) -> CanoeResult<Self> {
        let pieces = sections
            .iter()
            .map(|s| Piece::new(*s, Curve::constant(0.0)))
            .collect();
        PiecewiseContinuousLoadDistribution::new(load_type, pieces)
    }

    pub fn load_type(&self) -> LoadType {
        self.load_type
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// The whole interval covered, `[first.x, last.rx]`
    pub fn section(&self) -> Section {
        let first = self.pieces[0].section;
        let last = self.pieces[self.pieces.len() - 1].section;
        Section::new(first.x(), last.rx()).unwrap_or(first)
    }

    pub fn x(&self) -> f64 {
        self.section().x()
    }

    pub fn rx(&self) -> f64 {
        self.section().rx()
    }

    /// The stitched function at `x`: the first piece whose section contains `x`.
    pub fn value_at(&self, x: f64) -> CanoeResult<f64> {
        self.pieces
            .iter()
            .find(|p| p.section.contains(x))
            .map(|p| p.function.evaluate(x))
            .ok_or_else(|| {
                CanoeError::invalid_input(
                    "x",
                    x.to_string(),
                    format!("Out of bounds for distribution on [{}, {}]", self.x(), self.rx()),
                )
            })
    }

    /// Resultant force (kN): Simpson integral of every piece.
    pub fn force(&self) -> f64 {
        self.pieces
            .iter()
            .map(|p| simpson(&p.function, p.section.x(), p.section.rx()))
            .sum()
    }

    /// Moment about `pivot` (kN·m): integral of `f(x) * (x - pivot)`.
    pub fn moment_about(&self, pivot: f64) -> f64 {
        self.pieces
            .iter()
            .map(|p| {
                let arm = |x: f64| p.function.evaluate(x) * (x - pivot);
                simpson(&arm, p.section.x(), p.section.rx())
            })
            .sum()
    }

    /// Minimum and maximum intensity over the whole distribution.
    pub fn extrema(&self) -> Extrema {
        self.pieces.iter().fold(
            Extrema {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            },
            |acc, p| Extrema {
                min: acc.min.min(p.function.min_value(&p.section)),
                max: acc.max.max(p.function.max_value(&p.section)),
            },
        )
    }

    /// The intensity of largest magnitude, keeping its sign.
    pub fn max_signed_value(&self) -> f64 {
        self.extrema().max_signed()
    }
}

impl BoundedFunction for PiecewiseContinuousLoadDistribution {
    /// Stitched function; zero outside the covered interval.
    fn value(&self, x: f64) -> f64 {
        self.value_at(x).unwrap_or(0.0)
    }
}
