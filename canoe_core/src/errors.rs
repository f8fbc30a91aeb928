//! # Error Types
//!
//! Structured error types for canoe_core. Construction errors, refused solves and
//! numerical failures are distinct variants so a caller can tell the user exactly
//! why a request did not go through.
//!
//! ## Example
//!
//! ```rust
//! use canoe_core::errors::{CanoeError, CanoeResult};
//!
//! fn validate_length(length: f64) -> CanoeResult<()> {
//!     if length <= 0.0 {
//!         return Err(CanoeError::invalid_input(
//!             "length",
//!             length.to_string(),
//!             "Length must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for canoe_core operations
pub type CanoeResult<T> = Result<T, CanoeError>;

/// Structured error type for model construction, solving and file handling.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CanoeError {
    /// An input value is invalid (malformed interval, wrong sign, out of bounds, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// The canoe has no hull to operate on
    #[error("No hull: {operation} requires a hull")]
    NoHull { operation: String },

    /// Stand solve refused: the loads already push the canoe upward
    #[error("Cannot solve stands: net force {net_force} kN is already upward")]
    UpwardNetForce { net_force: f64 },

    /// Floating solve refused: the hull has no weight or volume
    #[error("Cannot solve floating case: the hull has zero weight")]
    ZeroWeightHull,

    /// Floating solve refused: loads are not mirrored about the canoe's midpoint
    #[error("Cannot solve floating case: the canoe is not symmetrically loaded")]
    AsymmetricLoading,

    /// Floating solve refused: the load exceeds what the fully submerged hull can carry
    #[error("Canoe sinks: net force {net_force} kN exceeds maximum buoyancy {max_buoyancy} kN")]
    CanoeSinks { net_force: f64, max_buoyancy: f64 },

    /// A numerical method failed to bracket or converge
    #[error("Numerical method '{method}' did not converge: {reason}")]
    NonConvergence { method: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CanoeError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CanoeError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a NoHull error
    pub fn no_hull(operation: impl Into<String>) -> Self {
        CanoeError::NoHull {
            operation: operation.into(),
        }
    }

    /// Create a NonConvergence error
    pub fn non_convergence(method: impl Into<String>, reason: impl Into<String>) -> Self {
        CanoeError::NonConvergence {
            method: method.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CanoeError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        CanoeError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        CanoeError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Whether this error is a refused solve rather than bad data or a failure.
    ///
    /// Refused solves leave the model untouched and can be reported to the user
    /// with a specific message.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            CanoeError::UpwardNetForce { .. }
                | CanoeError::ZeroWeightHull
                | CanoeError::AsymmetricLoading
                | CanoeError::CanoeSinks { .. }
        )
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CanoeError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CanoeError::InvalidInput { .. } => "INVALID_INPUT",
            CanoeError::NoHull { .. } => "NO_HULL",
            CanoeError::UpwardNetForce { .. } => "UPWARD_NET_FORCE",
            CanoeError::ZeroWeightHull => "ZERO_WEIGHT_HULL",
            CanoeError::AsymmetricLoading => "ASYMMETRIC_LOADING",
            CanoeError::CanoeSinks { .. } => "CANOE_SINKS",
            CanoeError::NonConvergence { .. } => "NON_CONVERGENCE",
            CanoeError::FileError { .. } => "FILE_ERROR",
            CanoeError::FileLocked { .. } => "FILE_LOCKED",
            CanoeError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CanoeError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CanoeError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CanoeError::invalid_input("rx", "-5", "rx must be greater than x");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: CanoeError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_unit_variant_serialization() {
        let json = serde_json::to_string(&CanoeError::ZeroWeightHull).unwrap();
        assert!(json.contains("ZeroWeightHull"));
        let roundtrip: CanoeError = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, CanoeError::ZeroWeightHull);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CanoeError::no_hull("stand solve").error_code(), "NO_HULL");
        assert_eq!(CanoeError::AsymmetricLoading.error_code(), "ASYMMETRIC_LOADING");
        assert_eq!(
            CanoeError::CanoeSinks { net_force: -5.0, max_buoyancy: 3.0 }.error_code(),
            "CANOE_SINKS"
        );
    }

    #[test]
    fn test_precondition_kinds() {
        assert!(CanoeError::UpwardNetForce { net_force: 1.0 }.is_precondition());
        assert!(CanoeError::ZeroWeightHull.is_precondition());
        assert!(!CanoeError::invalid_input("x", "1", "bad").is_precondition());
        assert!(!CanoeError::non_convergence("brent", "no bracket").is_precondition());
    }

    #[test]
    fn test_only_locks_are_recoverable() {
        assert!(CanoeError::file_locked("a.canoe", "alice", "now").is_recoverable());
        assert!(!CanoeError::ZeroWeightHull.is_recoverable());
    }
}
