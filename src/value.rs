//! Numeric types for risk scoring.
//!
//! This module defines the [`Value`] trait, which abstracts the numeric
//! types that can be used in fitting and scoring, ensuring compatibility
//! with nalgebra and floating-point operations.
//!
//! `f32` and `f64` both satisfy it out of the box; most users never need to
//! touch this module directly.
//!
//! # Example
//!
//! ```rust
//! use loocv::value::Value;
//!
//! let two = f64::two();
//! let squared = two.powi(2);
//! assert_eq!(squared, 4.0);
//! ```
use crate::error::Error;

/// Numeric type for samples, weights, and risk scores.
///
/// `Send + Sync` is part of the contract so that candidates can be scored
/// from multiple threads against a shared design cache.
pub trait Value:
    nalgebra::Scalar
    + nalgebra::ComplexField<RealField = Self>
    + nalgebra::RealField
    + num_traits::float::FloatCore
    + Send
    + Sync
{
    /// Returns the value 2.0
    #[must_use]
    fn two() -> Self {
        Self::one() + Self::one()
    }

    /// Tries to cast a value to the target type
    ///
    /// # Errors
    /// Returns an error if the cast fails
    fn try_cast<U: num_traits::NumCast>(n: U) -> Result<Self, Error> {
        num_traits::cast(n).ok_or(Error::CastFailed)
    }

    /// Raises the value to the power of an integer
    #[must_use]
    fn powi(self, n: i32) -> Self {
        nalgebra::ComplexField::powi(self, n)
    }

    /// Get the absolute value for a numeric type
    #[must_use]
    fn abs(self) -> Self {
        nalgebra::ComplexField::abs(self)
    }

    /// Converts a `usize` to the target numeric type.
    ///
    /// Results in `infinity` if the value is out of range.
    #[must_use]
    fn from_positive_int(n: usize) -> Self {
        Self::try_cast(n).unwrap_or(Self::infinity())
    }
}

impl<T> Value for T where
    T: nalgebra::Scalar
        + nalgebra::ComplexField<RealField = Self>
        + nalgebra::RealField
        + num_traits::float::FloatCore
        + Send
        + Sync
{
}
