//! # Model Files
//!
//! `CanoeModel` is the root that gets written to disk: who made it, how the
//! solvers are tuned, and the canoe itself. Model files are human-readable
//! JSON with the `.canoe` extension.
//!
//! ## Structure
//!
//! ```text
//! CanoeModel
//! ├── meta: ModelMetadata (id, schema version, author, name, timestamps)
//! ├── settings: SolverSettings (stand offset, tolerances, diagram resolution)
//! └── canoe: Canoe (hull and loads)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use canoe_core::canoe::Canoe;
//! use canoe_core::hull::library;
//! use canoe_core::model::CanoeModel;
//!
//! let canoe = Canoe::new(library::shark_bait(6.0).unwrap());
//! let model = CanoeModel::new("Design Team", "Shark Bait", canoe);
//!
//! let json = serde_json::to_string_pretty(&model).unwrap();
//! assert!(json.contains("Shark Bait"));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::canoe::Canoe;
use crate::constants::{
    DEFAULT_BMD_STEP, DEFAULT_DIAGRAM_STEP, DEFAULT_EXTREMUM_SAMPLES, DEFAULT_PIECES_PER_METRE,
    DEFAULT_WATERLINE_TOLERANCE,
};
use crate::errors::{CanoeError, CanoeResult};

/// Current schema version for model files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Extension used for model files
pub const MODEL_EXTENSION: &str = "canoe";

/// Root model container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanoeModel {
    pub meta: ModelMetadata,

    #[serde(default)]
    pub settings: SolverSettings,

    pub canoe: Canoe,
}

impl CanoeModel {
    /// Create a model around `canoe` with default solver settings.
    pub fn new(author: impl Into<String>, name: impl Into<String>, canoe: Canoe) -> Self {
        let now = Utc::now();
        CanoeModel {
            meta: ModelMetadata {
                id: Uuid::new_v4(),
                version: SCHEMA_VERSION.to_string(),
                author: author.into(),
                name: name.into(),
                created: now,
                modified: now,
            },
            settings: SolverSettings::default(),
            canoe,
        }
    }

    /// Replace the canoe and mark the model modified.
    pub fn set_canoe(&mut self, canoe: Canoe) {
        self.canoe = canoe;
        self.touch();
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// Check the settings and the canoe together.
    ///
    /// The stand offset is checked against the hull length, which neither
    /// the settings nor the canoe can do alone.
    pub fn validate(&self) -> CanoeResult<()> {
        self.settings.validate()?;
        self.canoe.validate()?;
        if self.canoe.has_hull() {
            let length = self.canoe.length()?;
            if self.settings.stand_offset >= length / 2.0 {
                return Err(CanoeError::invalid_input(
                    "stand_offset",
                    self.settings.stand_offset.to_string(),
                    format!("Stands must sit less than {}m from each end", length / 2.0),
                ));
            }
        }
        Ok(())
    }
}

impl Default for CanoeModel {
    fn default() -> Self {
        CanoeModel::new("", "", Canoe::default())
    }
}

/// Model metadata stored in the file header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub id: Uuid,

    /// Schema version (for migration compatibility)
    pub version: String,

    pub author: String,

    /// Design name
    pub name: String,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}

/// Tuning for the solvers and the diagram generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Distance of each stand from its end of the hull (m)
    pub stand_offset: f64,

    /// Bisection stops once the waterline bracket is this narrow (m)
    pub waterline_tolerance: f64,

    /// Grid the shear diagram snaps load positions to (m)
    pub diagram_step: f64,

    /// Spacing of points along parabolic moment segments (m)
    pub bmd_step: f64,

    /// Uniform pieces per metre when a piecewise load is drawn
    pub piecewise_samples_per_metre: usize,

    /// Samples used to find extreme load intensities
    pub extremum_samples: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            stand_offset: 0.0,
            waterline_tolerance: DEFAULT_WATERLINE_TOLERANCE,
            diagram_step: DEFAULT_DIAGRAM_STEP,
            bmd_step: DEFAULT_BMD_STEP,
            piecewise_samples_per_metre: DEFAULT_PIECES_PER_METRE,
            extremum_samples: DEFAULT_EXTREMUM_SAMPLES,
        }
    }
}

impl SolverSettings {
    /// Every step and tolerance must be positive; the stand offset non-negative.
    pub fn validate(&self) -> CanoeResult<()> {
        if !self.stand_offset.is_finite() || self.stand_offset < 0.0 {
            return Err(CanoeError::invalid_input(
                "stand_offset",
                self.stand_offset.to_string(),
                "Stand offset must be a finite, non-negative distance",
            ));
        }
        for (field, value) in [
            ("waterline_tolerance", self.waterline_tolerance),
            ("diagram_step", self.diagram_step),
            ("bmd_step", self.bmd_step),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CanoeError::invalid_input(field, value.to_string(), "Must be positive"));
            }
        }
        if self.piecewise_samples_per_metre == 0 {
            return Err(CanoeError::invalid_input(
                "piecewise_samples_per_metre",
                "0",
                "At least one piece per metre is needed",
            ));
        }
        if self.extremum_samples < 2 {
            return Err(CanoeError::invalid_input(
                "extremum_samples",
                self.extremum_samples.to_string(),
                "At least two samples are needed",
            ));
        }
        Ok(())
    }
}
