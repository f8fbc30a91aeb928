//! # Calculus
//!
//! Numerical integration, differentiation, Brent minimisation and root finding,
//! plus the validation routines used when stitching functions into piecewise
//! distributions.

use log::trace;

use crate::constants::{
    BRENT_ABSOLUTE_TOLERANCE, BRENT_MAX_EVALUATIONS, BRENT_RELATIVE_TOLERANCE, CONTINUITY_SAMPLES,
    CONTINUITY_TOLERANCE, DERIVATIVE_STEP, MIN_SECTION_WIDTH, SIGN_SUBINTERVALS, SIGN_TOLERANCE,
};
use crate::errors::{CanoeError, CanoeResult};

use super::{BoundedFunction, Section};

/// Subintervals used by [`simpson`]. Must be even.
pub const SIMPSON_INTERVALS: usize = 1000;

/// (3 - √5) / 2
const GOLDEN_SECTION: f64 = 0.381_966_011_250_105_1;

// ============================================================================
// Integration and Differentiation
// ============================================================================

/// Integrate `f` over `[a, b]` with composite Simpson's rule.
pub fn simpson<F: BoundedFunction + ?Sized>(f: &F, a: f64, b: f64) -> f64 {
    simpson_with_intervals(f, a, b, SIMPSON_INTERVALS)
}

/// Composite Simpson's rule with `n` subintervals (rounded up to even).
pub fn simpson_with_intervals<F: BoundedFunction + ?Sized>(f: &F, a: f64, b: f64, n: usize) -> f64 {
    if b == a {
        return 0.0;
    }
    let n = if n % 2 == 0 { n.max(2) } else { n + 1 };
    let h = (b - a) / n as f64;

    let mut sum = f.value(a) + f.value(b);
    for i in 1..n {
        let x = a + i as f64 * h;
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * f.value(x);
    }
    sum * h / 3.0
}

/// Central difference derivative of `f` at `x`.
pub fn derivative_at<F: BoundedFunction + ?Sized>(f: &F, x: f64) -> f64 {
    let h = DERIVATIVE_STEP;
    (f.value(x + h) - f.value(x - h)) / (2.0 * h)
}

/// Length of the curve `y = f(x)` on `[a, b]`.
pub fn arc_length<F: BoundedFunction + ?Sized>(f: &F, a: f64, b: f64) -> f64 {
    let element = |x: f64| {
        let slope = derivative_at(f, x);
        (1.0 + slope * slope).sqrt()
    };
    simpson(&element, a, b)
}

// ============================================================================
// Brent's Methods
// ============================================================================

/// Minimise `f` on `[lo, hi]` with Brent's method.
///
/// Only correct when `f` is unimodal on the interval; on a multi-modal
/// function it returns a local minimum. The endpoints are compared against
/// the interior result so monotone functions report their boundary value
/// exactly. Returns `(x, f(x))`.
pub fn brent_minimize<F: BoundedFunction + ?Sized>(f: &F, lo: f64, hi: f64) -> CanoeResult<(f64, f64)> {
    if !(lo < hi) {
        return Err(CanoeError::invalid_input(
            "search interval",
            format!("[{}, {}]", lo, hi),
            "Lower bound must be less than upper bound",
        ));
    }

    let (mut a, mut b) = (lo, hi);
    let mut x = a + GOLDEN_SECTION * (b - a);
    let (mut w, mut v) = (x, x);
    let mut fx = f.value(x);
    let (mut fw, mut fv) = (fx, fx);
    let (mut d, mut e) = (0.0_f64, 0.0_f64);
    let mut evaluations = 1;

    loop {
        let m = 0.5 * (a + b);
        let tol1 = BRENT_RELATIVE_TOLERANCE * x.abs() + BRENT_ABSOLUTE_TOLERANCE;
        let tol2 = 2.0 * tol1;

        if (x - m).abs() <= tol2 - 0.5 * (b - a) {
            break;
        }
        if evaluations >= BRENT_MAX_EVALUATIONS {
            return Err(CanoeError::non_convergence(
                "brent_minimize",
                format!("no convergence on [{}, {}] after {} evaluations", lo, hi, evaluations),
            ));
        }

        let mut golden = true;
        if e.abs() > tol1 {
            let r = (x - w) * (fx - fv);
            let mut q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            let previous_e = e;
            e = d;

            if p.abs() < (0.5 * q * previous_e).abs() && p > q * (a - x) && p < q * (b - x) {
                d = p / q;
                let u = x + d;
                if u - a < tol2 || b - u < tol2 {
                    d = if x <= m { tol1 } else { -tol1 };
                }
                golden = false;
            }
        }
        if golden {
            e = if x >= m { a - x } else { b - x };
            d = GOLDEN_SECTION * e;
        }

        let u = if d.abs() >= tol1 {
            x + d
        } else if d > 0.0 {
            x + tol1
        } else {
            x - tol1
        };
        let fu = f.value(u);
        evaluations += 1;

        if fu <= fx {
            if u < x {
                b = x;
            } else {
                a = x;
            }
            v = w;
            fv = fw;
            w = x;
            fw = fx;
            x = u;
            fx = fu;
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                fv = fw;
                w = u;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        }
    }

    trace!("brent_minimize on [{}, {}] converged after {} evaluations", lo, hi, evaluations);

    let mut best = (x, fx);
    for end in [lo, hi] {
        let f_end = f.value(end);
        if f_end < best.1 {
            best = (end, f_end);
        }
    }
    Ok(best)
}

/// Maximise `f` on `[lo, hi]` by minimising its negation. Returns `(x, f(x))`.
pub fn brent_maximize<F: BoundedFunction + ?Sized>(f: &F, lo: f64, hi: f64) -> CanoeResult<(f64, f64)> {
    let negated = |x: f64| -f.value(x);
    let (x, value) = brent_minimize(&negated, lo, hi)?;
    Ok((x, -value))
}

/// Find a root of `f` in `[lo, hi]` with the Brent-Dekker method.
///
/// `f(lo)` and `f(hi)` must have opposite signs (or one of them be zero).
pub fn brent_root<F: BoundedFunction + ?Sized>(f: &F, lo: f64, hi: f64) -> CanoeResult<f64> {
    let (mut a, mut b) = (lo, hi);
    let (mut fa, mut fb) = (f.value(a), f.value(b));

    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }
    if (fa > 0.0) == (fb > 0.0) {
        return Err(CanoeError::non_convergence(
            "brent_root",
            format!("root is not bracketed by [{}, {}] (f = {}, {})", lo, hi, fa, fb),
        ));
    }

    let (mut c, mut fc) = (b, fb);
    let mut d = b - a;
    let mut e = d;

    for _ in 0..BRENT_MAX_EVALUATIONS {
        if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * BRENT_ABSOLUTE_TOLERANCE;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol1 || fb == 0.0 {
            return Ok(b);
        }

        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let qa = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * qa * (qa - r) - (b - a) * (r - 1.0)),
                    (qa - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();

            let min1 = 3.0 * xm * q - (tol1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol1 { d } else { tol1.copysign(xm) };
        fb = f.value(b);
    }

    Err(CanoeError::non_convergence(
        "brent_root",
        format!("no convergence on [{}, {}] after {} evaluations", lo, hi, BRENT_MAX_EVALUATIONS),
    ))
}

// ============================================================================
// Rounding and Sections
// ============================================================================

/// Round `value` to `digits` digits after the decimal point.
pub fn round_digits(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// Join sorted endpoints `x_0 < x_1 < ... < x_n` into the `n` sections `[x_(i-1), x_i]`.
pub fn sections_from_endpoints(endpoints: &[f64]) -> CanoeResult<Vec<Section>> {
    if endpoints.len() < 2 {
        return Err(CanoeError::invalid_input(
            "endpoints",
            endpoints.len().to_string(),
            "Cannot form a section without at least two points",
        ));
    }

    endpoints
        .windows(2)
        .map(|pair| {
            if pair[1] - pair[0] < MIN_SECTION_WIDTH {
                return Err(CanoeError::invalid_input(
                    "endpoints",
                    format!("[{}, {}]", pair[0], pair[1]),
                    format!("All sections must be of width at least {}m", MIN_SECTION_WIDTH),
                ));
            }
            Section::new(pair[0], pair[1])
        })
        .collect()
}

// ============================================================================
// Piecewise Validation
// ============================================================================

/// Check that each section starts exactly where the previous one ends.
pub fn validate_contiguous(sections: &[Section]) -> CanoeResult<()> {
    for (i, pair) in sections.windows(2).enumerate() {
        if pair[0].rx() != pair[1].x() {
            return Err(CanoeError::invalid_input(
                "sections",
                format!("section {} ends at {}, section {} starts at {}", i, pair[0].rx(), i + 1, pair[1].x()),
                "Sections do not form a continuous interval",
            ));
        }
    }
    Ok(())
}

/// Check that `f` has no jump larger than the continuity tolerance on `section`.
///
/// Sampled at 10,000 evenly spaced points, so very steep but continuous
/// functions can be rejected.
pub fn validate_continuity<F: BoundedFunction + ?Sized>(f: &F, section: &Section) -> CanoeResult<()> {
    let step = section.length() / CONTINUITY_SAMPLES as f64;
    let mut previous = f.value(section.x());

    for i in 1..=CONTINUITY_SAMPLES {
        let x = section.x() + i as f64 * step;
        let current = f.value(x);
        if !current.is_finite() || (current - previous).abs() > CONTINUITY_TOLERANCE {
            return Err(CanoeError::invalid_input(
                "distribution",
                format!("x = {}", x),
                "The function is not continuous within tolerance",
            ));
        }
        previous = current;
    }
    Ok(())
}

/// Check that the stitched pieces are entirely non-negative or entirely non-positive.
///
/// Zeros are located with Brent's root finder on small subintervals of every
/// piece; the sign is then read between consecutive zeros and at every sampled
/// subinterval midpoint.
pub fn validate_single_sign<F: BoundedFunction>(pieces: &[(Section, F)]) -> CanoeResult<()> {
    let mut non_negative = true;
    let mut non_positive = true;

    for (section, piece) in pieces {
        let step = section.length() / SIGN_SUBINTERVALS as f64;
        let mut probes = Vec::new();
        let mut zeros = Vec::new();

        for i in 0..SIGN_SUBINTERVALS {
            let lo = section.x() + i as f64 * step;
            let hi = lo + step;
            probes.push(0.5 * (lo + hi));
            if let Ok(zero) = brent_root(piece, lo, hi) {
                zeros.push(zero);
            }
        }
        for pair in zeros.windows(2) {
            probes.push(0.5 * (pair[0] + pair[1]));
        }

        for x in probes {
            let value = piece.value(x);
            if value < -SIGN_TOLERANCE {
                non_negative = false;
            }
            if value > SIGN_TOLERANCE {
                non_positive = false;
            }
        }
    }

    if non_negative || non_positive {
        Ok(())
    } else {
        Err(CanoeError::invalid_input(
            "distribution",
            "mixed sign",
            "The piecewise function must be entirely non-negative or non-positive",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_simpson_exact_for_cubics() {
        let f = |x: f64| x * x * x - 2.0 * x;
        // ∫0^2 x³ - 2x dx = 4 - 4 = 0
        assert_abs_diff_eq!(simpson(&f, 0.0, 2.0), 0.0, epsilon = 1e-12);

        let g = |x: f64| 3.0 * x * x;
        assert_abs_diff_eq!(simpson(&g, 1.0, 3.0), 26.0, epsilon = 1e-10);
    }

    #[test]
    fn test_simpson_empty_interval() {
        let f = |_x: f64| 5.0;
        assert_eq!(simpson(&f, 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_arc_length_of_line() {
        // y = x on [0, 3] has length 3√2
        let f = |x: f64| x;
        assert_abs_diff_eq!(arc_length(&f, 0.0, 3.0), 3.0 * 2f64.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn test_brent_minimize_parabola() {
        let f = |x: f64| (x - 1.3).powi(2) + 2.0;
        let (x, value) = brent_minimize(&f, 0.0, 4.0).unwrap();
        assert_abs_diff_eq!(x, 1.3, epsilon = 1e-6);
        assert_abs_diff_eq!(value, 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_brent_minimize_monotone_hits_endpoint() {
        let f = |x: f64| x;
        let (x, value) = brent_minimize(&f, 2.0, 5.0).unwrap();
        assert_eq!(x, 2.0);
        assert_eq!(value, 2.0);
    }

    #[test]
    fn test_brent_maximize() {
        let f = |x: f64| -(x - 0.5).powi(2) + 1.0;
        let (x, value) = brent_maximize(&f, 0.0, 1.0).unwrap();
        assert_abs_diff_eq!(x, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(value, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_brent_root() {
        let f = |x: f64| x * x - 2.0;
        let root = brent_root(&f, 0.0, 2.0).unwrap();
        assert_abs_diff_eq!(root, 2f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn test_brent_root_requires_bracket() {
        let f = |x: f64| x * x + 1.0;
        let err = brent_root(&f, -1.0, 1.0).unwrap_err();
        assert_eq!(err.error_code(), "NON_CONVERGENCE");
    }

    #[test]
    fn test_round_digits() {
        assert_eq!(round_digits(1.23456, 2), 1.23);
        assert_eq!(round_digits(0.1 + 0.2, 10), 0.3);
    }

    #[test]
    fn test_sections_from_endpoints() {
        let sections = sections_from_endpoints(&[0.0, 1.0, 2.5]).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].x(), 1.0);
        assert_eq!(sections[1].rx(), 2.5);

        assert!(sections_from_endpoints(&[1.0]).is_err());
        assert!(sections_from_endpoints(&[0.0, 0.005]).is_err());
    }

    #[test]
    fn test_validate_contiguous() {
        let good = vec![Section::new(0.0, 1.0).unwrap(), Section::new(1.0, 2.0).unwrap()];
        assert!(validate_contiguous(&good).is_ok());

        let gap = vec![Section::new(0.0, 1.0).unwrap(), Section::new(1.1, 2.0).unwrap()];
        assert!(validate_contiguous(&gap).is_err());
    }

    #[test]
    fn test_validate_continuity() {
        let section = Section::new(0.0, 2.0).unwrap();
        let smooth = |x: f64| x.sin();
        assert!(validate_continuity(&smooth, &section).is_ok());

        let jump = |x: f64| if x < 1.0 { 0.0 } else { 1.0 };
        assert!(validate_continuity(&jump, &section).is_err());
    }

    #[test]
    fn test_validate_single_sign() {
        let s1 = Section::new(0.0, 1.0).unwrap();
        let s2 = Section::new(1.0, 2.0).unwrap();

        fn falling(x: f64) -> f64 {
            -x
        }
        fn shifted(x: f64) -> f64 {
            x - 0.5
        }

        let down = vec![(s1, falling as fn(f64) -> f64), (s2, falling as fn(f64) -> f64)];
        assert!(validate_single_sign(&down).is_ok());

        let crossing = vec![(s1, shifted as fn(f64) -> f64), (s2, shifted as fn(f64) -> f64)];
        assert!(validate_single_sign(&crossing).is_err());
    }
}
