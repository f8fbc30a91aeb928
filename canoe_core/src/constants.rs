//! # Constants
//!
//! Physical constants and the numerical tolerances shared by the solvers.
//! All quantities are SI: metres, kilograms, kilonewtons.

// ============================================================================
// Physical Constants
// ============================================================================

/// Standard gravity (m/s²)
pub const GRAVITY: f64 = 9.80665;

/// Density of fresh water (kg/m³)
pub const DENSITY_OF_WATER: f64 = 997.0;

/// Newtons per kilonewton
pub const NEWTONS_PER_KN: f64 = 1000.0;

// ============================================================================
// Numerical Tolerances
// ============================================================================

/// Relative tolerance for Brent minimisation
pub const BRENT_RELATIVE_TOLERANCE: f64 = 1e-10;

/// Absolute tolerance for Brent minimisation
pub const BRENT_ABSOLUTE_TOLERANCE: f64 = 1e-14;

/// Evaluation budget for Brent minimisation and root finding
pub const BRENT_MAX_EVALUATIONS: usize = 1000;

/// Step used by the central difference derivative
pub const DERIVATIVE_STEP: f64 = 1e-6;

/// Default sample count for min/max by dense sampling
pub const DEFAULT_EXTREMUM_SAMPLES: usize = 1000;

/// Sample count used when checking piecewise continuity
pub const CONTINUITY_SAMPLES: usize = 10_000;

/// Maximum jump allowed between consecutive samples of a continuous distribution
pub const CONTINUITY_TOLERANCE: f64 = 1e-3;

/// Slack when deciding that a piecewise distribution keeps one sign
pub const SIGN_TOLERANCE: f64 = 1e-2;

/// Subintervals searched for sign changes when validating a piecewise sign
pub const SIGN_SUBINTERVALS: usize = 100;

/// Maximum depth mismatch between neighbouring hull sections (m)
pub const HULL_CONTINUITY_TOLERANCE: f64 = 1e-6;

/// Shortest allowed section when building sections from endpoints (m)
pub const MIN_SECTION_WIDTH: f64 = 0.01;

/// Shortest allowed hull (m)
pub const MIN_HULL_LENGTH: f64 = 0.01;

/// Default width of the bracket at which the waterline bisection stops (m)
pub const DEFAULT_WATERLINE_TOLERANCE: f64 = 1e-6;

/// Default SFD sweep step (m)
pub const DEFAULT_DIAGRAM_STEP: f64 = 0.01;

/// Default BMD accumulation step (m)
pub const DEFAULT_BMD_STEP: f64 = 0.001;

/// Default pieces per metre when discretising piecewise distributions for diagrams
pub const DEFAULT_PIECES_PER_METRE: usize = 100;

/// Decimal digits kept when collecting section endpoints
pub const ENDPOINT_DIGITS: i32 = 10;

/// Step and tolerance when checking a distribution for mirror symmetry
pub const SYMMETRY_STEP: f64 = 1e-3;
pub const SYMMETRY_TOLERANCE: f64 = 1e-6;
