//! # Core Errors
//!
//! Error tags surfaced by the geometry evaluator, normalizer, cache layer
//! and traversal framework. Only [`CoreError::Cancelled`] unwinds an
//! evaluation; every other variant is caught at the node that raised it,
//! degrades that subtree's geometry to empty, and is recorded as a
//! [`Warning`] rather than propagated.

use thiserror::Error;

/// Error tags for the core evaluation pipeline.
///
/// Each variant corresponds to one of the error kinds in the core's error
/// handling design. `EmptyResult` is deliberately not a variant here: an
/// empty result is a normal value ([`crate::geometry::Geometry::Empty`]),
/// not an error.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoreError {
    /// An operator was applied to a mix of 2D and 3D inputs.
    #[error("dimension mismatch in {op}: mixing 2D and 3D operands")]
    DimensionMismatch {
        /// Name of the operator that detected the mismatch.
        op: &'static str,
    },

    /// A transform matrix contained NaN/infinity, or its determinant was
    /// effectively zero.
    #[error("degenerate transform at node {node_index}: {reason}")]
    DegenerateTransform {
        /// Index of the `Transform` node.
        node_index: u32,
        /// Human-readable reason (NaN, infinite, zero-determinant).
        reason: String,
    },

    /// Input to an operator that requires a 2-manifold was not one.
    #[error("non-manifold input at node {node_index}")]
    NonManifoldInput {
        /// Index of the offending node.
        node_index: u32,
    },

    /// The boolean kernel raised a failure.
    #[error("boolean kernel failure in {op}: {message}")]
    KernelFailure {
        /// Name of the kernel operation that failed.
        op: &'static str,
        /// Kernel-provided message.
        message: String,
    },

    /// CSG normalization exceeded the configured term limit.
    #[error("CSG normalizer exceeded term limit of {limit}")]
    NormalizerOverflow {
        /// The configured limit that was exceeded.
        limit: usize,
    },

    /// A single cache entry exceeded the cache's total byte budget.
    #[error("cache entry of {size} bytes exceeds budget of {budget} bytes")]
    CacheOverflow {
        /// Size of the rejected entry, in bytes.
        size: usize,
        /// Total budget of the cache that rejected it.
        budget: usize,
    },

    /// The evaluation was cancelled cooperatively. The only variant that
    /// unwinds the traversal.
    #[error("evaluation cancelled")]
    Cancelled,
}

/// Result alias used throughout the core.
pub type CoreResult<T> = Result<T, CoreError>;

/// A structured, non-fatal diagnostic collected during evaluation.
///
/// Unlike [`CoreError`], a `Warning` never unwinds anything; it is pushed
/// onto the evaluator's warning list and the triggering subtree degrades to
/// empty geometry (or its dominant-dimension operand, per the tag).
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    /// Index of the node that produced the warning.
    pub node_index: u32,
    /// The underlying error tag.
    pub error: CoreError,
}

impl Warning {
    /// Builds a new warning and logs it at `warn` level immediately,
    /// mirroring the ambient logging convention used throughout the core.
    pub fn new(node_index: u32, error: CoreError) -> Self {
        log::warn!("node {node_index}: {error}");
        Self { node_index, error }
    }
}
