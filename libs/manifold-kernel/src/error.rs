//! # Error Types
//!
//! Error types raised by the mesh-level boolean, hull, and export
//! algorithms in this crate. These never carry a node index (the crate has
//! no concept of a node tree); [`kernel_impl::ManifoldKernel`](crate::kernel_impl::ManifoldKernel)
//! attaches the node index and converts every variant here into
//! [`csg_core::error::CoreError::KernelFailure`] at the trait boundary.
//!
//! ## Error Policy
//!
//! - No fallback mechanisms when an operation fails
//! - All failures throw explicit errors
//! - Errors include enough context (operation name, message) for debugging

use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur during mesh or polygon operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ManifoldError {
    /// Error during mesh geometry generation.
    #[error("geometry error: {0}")]
    GeometryError(String),

    /// Error during a 3D boolean operation.
    #[error("boolean operation '{operation}' failed: {message}")]
    BooleanError {
        /// Name of the boolean operation (union, difference, intersection).
        operation: String,
        /// Error message.
        message: String,
    },

    /// The mesh is not a closed 2-manifold (watertight) solid.
    #[error("mesh is not manifold: {0}")]
    NonManifoldError(String),

    /// Error during a 2D polygon operation.
    #[error("2D operation '{operation}' failed: {message}")]
    CrossSectionError {
        /// Name of the 2D operation.
        operation: String,
        /// Error message.
        message: String,
    },
}

impl ManifoldError {
    /// The operation name this error carries, for attaching to a
    /// [`csg_core::error::CoreError::KernelFailure`] at the trait boundary.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::GeometryError(_) => "geometry",
            Self::BooleanError { .. } => "boolean",
            Self::NonManifoldError(_) => "manifold_check",
            Self::CrossSectionError { .. } => "cross_section",
        }
    }
}

// =============================================================================
// RESULT TYPE ALIAS
// =============================================================================

/// Result type alias for operations in this crate.
pub type ManifoldResult<T> = Result<T, ManifoldError>;
