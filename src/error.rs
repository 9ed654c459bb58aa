//! Error types for leave-one-out risk scoring
//!
//! This module defines the failure modes of design evaluation, weighted
//! least-squares fitting, and risk scoring, along with a convenient
//! `Result` alias.
//!
//! None of these conditions are retried or downgraded internally: a failed
//! fit is a deterministic function of its inputs, so the calling
//! model-selection loop decides whether to skip or penalize the candidate.

/// Errors that can occur while scoring a candidate model.
///
/// Each variant carries enough context (typically `n` observations and `k`
/// active basis functions) for a caller to tell a bad model choice apart
/// from bad data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Cannot fit or score because the sample (or the active set) is empty.
    #[error("No observations available for fitting")]
    NoData,

    /// x, y, or weight lengths are mutually inconsistent.
    #[error("Input lengths are inconsistent [expected: {expected}, found: {found}]")]
    DimensionMismatch {
        /// Length implied by the design matrix or sample
        expected: usize,
        /// Length actually supplied
        found: usize,
    },

    /// The active set has at least as many functions as there are observations.
    ///
    /// The fit would interpolate (or worse); the caller must reduce `k`.
    #[error("Model is under-determined; the active set must be smaller than the sample [n: {n}, k: {k}]")]
    Underdetermined {
        /// Number of observations
        n: usize,
        /// Number of active basis functions
        k: usize,
    },

    /// A leverage value is numerically 1, so the leave-one-out residual for
    /// that observation is undefined.
    ///
    /// Distinct from [`Error::SingularFit`] so callers can tell "bad model
    /// choice" apart from "bad data". Clamping instead of rejecting would
    /// silently corrupt model comparison, so such fits are always rejected.
    #[error("Leverage of observation {index} is numerically 1; leave-one-out residual is undefined [n: {n}, k: {k}]")]
    DegenerateLeverage {
        /// Index of the offending observation
        index: usize,
        /// Number of observations
        n: usize,
        /// Number of active basis functions
        k: usize,
    },

    /// The weighted least-squares solve failed outright.
    ///
    /// Usually a rank-deficient design: collinear basis functions, a
    /// duplicated column, or exact input degeneracy.
    #[error("Weighted design matrix is rank-deficient; the active functions may be collinear [n: {n}, k: {k}]")]
    SingularFit {
        /// Number of observations
        n: usize,
        /// Number of active basis functions
        k: usize,
    },

    /// An active index refers past the end of the basis dictionary.
    #[error("Active index {index} is out of range for a basis of {dimension} functions")]
    IndexOutOfRange {
        /// The offending index
        index: usize,
        /// Number of functions in the dictionary
        dimension: usize,
    },

    /// An active index was listed more than once.
    ///
    /// A repeated index would produce a duplicated design column, which is
    /// always singular; it is rejected before any linear algebra happens.
    #[error("Active index {0} appears more than once")]
    DuplicateIndex(usize),

    /// A weight is negative, or every weight is zero.
    #[error("Weights must be non-negative and not all zero")]
    InvalidWeights,

    /// A numeric value could not be cast to the target type. This is usually a custom type much smaller than f64/f32
    #[error("Failed to cast value to target type")]
    CastFailed,
}

/// Result type for leave-one-out risk scoring
pub type Result<T> = std::result::Result<T, Error>;
