//! # canoe_core - Canoe Beam Analysis Engine
//!
//! `canoe_core` treats a canoe as a one-dimensional beam: a hull built from
//! profile curves, the loads placed on it, and the two ways it can be held up
//! (resting on stands, or floating). From those it finds the reactions and
//! draws the shear force and bending moment diagrams.
//!
//! ## Design Philosophy
//!
//! - **Values, not globals**: a `Canoe` is passed into each solve and never
//!   modified by it; solved copies come back in the result
//! - **Validated on construction**: every geometric and load invariant is
//!   checked when a value is built or deserialized
//! - **JSON-First**: all model types implement Serialize/Deserialize
//! - **Rich Errors**: refused solves are distinct error kinds, not strings
//!
//! ## Quick Start
//!
//! ```rust
//! use canoe_core::calculations::analyze;
//! use canoe_core::canoe::{Canoe, SolveType};
//! use canoe_core::hull::library;
//! use canoe_core::loads::PointLoad;
//! use canoe_core::model::SolverSettings;
//!
//! let mut canoe = Canoe::new(library::shark_bait(6.0).unwrap());
//! canoe.add_load(PointLoad::new(-0.8, 1.5, false).unwrap()).unwrap();
//! canoe.add_load(PointLoad::new(-0.8, 4.5, false).unwrap()).unwrap();
//!
//! let result = analyze(&canoe, &SolverSettings::default(), SolveType::Floating).unwrap();
//! println!("Waterline: {:.3} m", result.waterline.unwrap());
//! println!("Max moment: {:.3} kN·m at {:.2} m", result.max_moment, result.max_moment_position);
//! ```
//!
//! ## Modules
//!
//! - [`functions`] - sections, curves, numerical calculus
//! - [`loads`] - point, uniform, piecewise and discrete loads
//! - [`hull`] - hull sections, the hull, preset designs
//! - [`canoe`] - the hull plus its loads
//! - [`calculations`] - stand and floating solvers, SFD/BMD
//! - [`model`] - model file root and solver settings
//! - [`file_io`] - atomic saves, validated loads, file locking
//! - [`errors`] - structured error types
//! - [`constants`] - physical constants and tolerances

pub mod calculations;
pub mod canoe;
pub mod constants;
pub mod errors;
pub mod file_io;
pub mod functions;
pub mod hull;
pub mod loads;
pub mod model;

// Re-export commonly used types at crate root for convenience
pub use calculations::{analyze, AnalysisResult};
pub use canoe::{Canoe, SolveType};
pub use errors::{CanoeError, CanoeResult};
pub use file_io::{load_model, save_model, FileLock};
pub use hull::{Hull, HullSection};
pub use loads::{Load, LoadType};
pub use model::{CanoeModel, ModelMetadata, SolverSettings};
