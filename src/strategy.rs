//! Risk-scoring strategies for model selection.
//!
//! These strategies estimate how well a fitted candidate model generalizes,
//! so a selection loop can compare many active subsets of a dictionary.
//! Lower scores indicate a better choice; scores are only meaningful
//! relative to other scores computed on the same sample.
//!
//! # Overview of Available Strategies
//! - **[`CorrectedLeaveOneOut`]**: The analytic leave-one-out estimator
//!   rescaled by a small-sample correction. The recommended default: it
//!   stays conservative when the active set is not small relative to the
//!   sample.
//! - **[`LeaveOneOut`]**: The raw analytic estimator, with no correction.
//!   Optimistic when k/n is non-negligible.
//!
//! Both are exact, not approximate: for a linear-in-parameters model the
//! leave-one-out residual of each observation has a closed form, so no
//! refitting per observation takes place.
//!
//! The [`FittingStrategy`] trait defines the interface for implementing
//! custom strategies.
//!
//! # One algorithm, three entry points
//! Each strategy can be invoked three ways with identical results, in
//! increasing order of reused precomputation:
//! 1. [`FittingStrategy::run`]: from raw samples, a dictionary, and an
//!    active index set.
//! 2. [`FittingStrategy::run_with_design`]: from a shared
//!    [`DesignEvaluator`], reusing its column cache.
//! 3. [`FittingStrategy::score`]: from a completed
//!    [`WeightedLeastSquares`] fit, when the caller already performed the
//!    regression.

use crate::{
    basis::Basis,
    design::DesignEvaluator,
    error::{Error, Result},
    least_squares::WeightedLeastSquares,
    value::Value,
};

/// Trait for implementing risk-scoring strategies for model selection.
///
/// A strategy is a pure function of a completed fit and the observed
/// targets; the provided `run*` methods are thin adapters that build the
/// fit first. Strategies carry no numeric state; they are tags selecting
/// a scoring rule.
pub trait FittingStrategy {
    /// A human-readable label for diagnostics.
    fn name(&self) -> &'static str;

    /// Scores a completed weighted least-squares fit against its targets.
    ///
    /// This is the fit-aware form: use it when the caller already performed
    /// the regression (e.g. to also obtain coefficients) and only wants the
    /// risk score.
    ///
    /// # Errors
    /// - [`Error::DimensionMismatch`]: `y` length differs from the fit's n.
    /// - [`Error::DegenerateLeverage`]: some leverage is numerically 1.
    fn score<T: Value>(&self, fit: &WeightedLeastSquares<T>, y: &[T]) -> Result<T>;

    /// Scores a candidate model from raw samples.
    ///
    /// Builds the design matrix for the active indices, performs the
    /// weighted least-squares fit, and delegates to
    /// [`FittingStrategy::score`].
    ///
    /// # Parameters
    /// - `x`: Sample points, length n.
    /// - `y`: Observed targets, length n.
    /// - `weights`: Optional per-observation weights; `None` means uniform.
    /// - `basis`: The function dictionary.
    /// - `indices`: Active index set; distinct indices into the dictionary.
    ///
    /// # Errors
    /// Any failure from design evaluation ([`crate::DesignEvaluator`]),
    /// fitting ([`WeightedLeastSquares::fit`]), or scoring.
    ///
    /// # Example
    /// ```rust
    /// use loocv::{basis::MonomialBasis, CorrectedLeaveOneOut, FittingStrategy};
    ///
    /// let x = [0.0, 1.0, 2.0, 3.0, 4.0];
    /// let y = [1.0, 3.0, 5.0, 7.0, 9.0]; // exactly y = 2x + 1
    ///
    /// let basis = MonomialBasis::new(3);
    /// let risk = CorrectedLeaveOneOut
    ///     .run(&x, &y, None, &basis, &[0, 1])
    ///     .unwrap();
    /// assert!(risk < 1e-18);
    /// ```
    fn run<T: Value, B: Basis<T>>(
        &self,
        x: &[T],
        y: &[T],
        weights: Option<&[T]>,
        basis: &B,
        indices: &[usize],
    ) -> Result<T> {
        let evaluator = DesignEvaluator::new(basis.clone(), x)?;
        self.run_with_design(y, weights, indices, &evaluator)
    }

    /// Scores a candidate model against a shared design evaluator.
    ///
    /// Skips re-deriving the design matrix from raw x when the evaluator
    /// can supply cached columns. This is the form a selection loop should
    /// use when scoring many candidates over the same sample.
    ///
    /// # Errors
    /// Any failure from design evaluation, fitting, or scoring.
    fn run_with_design<T: Value, B: Basis<T>>(
        &self,
        y: &[T],
        weights: Option<&[T]>,
        indices: &[usize],
        evaluator: &DesignEvaluator<'_, B, T>,
    ) -> Result<T> {
        let psi = evaluator.design_matrix(indices)?;
        let fit = WeightedLeastSquares::fit(psi, weights, y)?;
        self.score(&fit, y)
    }
}

/// Leverages this close to 1 make the leave-one-out residual numerically
/// meaningless; such fits are rejected rather than clamped.
fn leverage_tolerance<T: Value>() -> T {
    T::one() - T::epsilon().sqrt()
}

/// The raw analytic leave-one-out risk of a fit.
///
/// For each observation, `eᵢ = rᵢ / (1 - hᵢ)` is the exact residual the
/// model would leave at point i if it were refitted without it; the risk is
/// the weighted mean of eᵢ².
fn leave_one_out_risk<T: Value>(fit: &WeightedLeastSquares<T>, y: &[T]) -> Result<T> {
    let n = fit.n();
    let k = fit.k();
    if y.len() != n {
        return Err(Error::DimensionMismatch {
            expected: n,
            found: y.len(),
        });
    }

    let tolerance = leverage_tolerance::<T>();
    let mut total = T::zero();
    let mut total_weight = T::zero();
    for i in 0..n {
        let h = fit.leverages()[i];
        if h >= tolerance {
            return Err(Error::DegenerateLeverage { index: i, n, k });
        }

        let residual = y[i] - fit.predictions()[i];
        let held_out = residual / (T::one() - h);
        total += fit.weights()[i] * held_out * held_out;
        total_weight += fit.weights()[i];
    }

    Ok(total / total_weight)
}

/// The small-sample correction factor T(n, k) applied by
/// [`CorrectedLeaveOneOut`].
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// T(n, k) = (1 + k/n) / (1 - k/n)
/// where
///   n = number of observations, k = number of active basis functions
/// ```
///
/// This is the direct-eigenvalue correction of Chapelle, Vapnik & Bengio,
/// "Model selection for small sample regression" (Machine Learning, 2002),
/// as used for corrected leave-one-out model selection in sparse
/// regression (Blatman & Sudret, 2011). It depends only on n and k, equals
/// 1 in the limit k/n → 0, and diverges as k → n, counteracting the known
/// downward bias of the raw estimator when k is a non-negligible fraction
/// of n.
/// </div>
///
/// # Errors
/// Returns [`Error::Underdetermined`] if k ≥ n.
///
/// # Example
/// ```rust
/// let t: f64 = loocv::correction_factor(100, 10).unwrap();
/// assert!((t - (1.1 / 0.9)).abs() < 1e-12);
/// ```
pub fn correction_factor<T: Value>(n: usize, k: usize) -> Result<T> {
    if k >= n {
        return Err(Error::Underdetermined { n, k });
    }

    let ratio = T::from_positive_int(k) / T::from_positive_int(n);
    Ok((T::one() + ratio) / (T::one() - ratio))
}

/// Corrected leave-one-out cross-validation.
///
/// Estimates the generalization risk of a fitted linear-in-parameters model
/// without refitting it n times, then inflates the estimate by
/// [`correction_factor`] so it remains conservative when the active set is
/// not small relative to the sample.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// eᵢ   = (yᵢ - ŷᵢ) / (1 - hᵢ)
/// risk = (Σ wᵢ eᵢ²) / (Σ wᵢ) × T(n, k)
/// where
///   ŷᵢ = fitted value at observation i
///   hᵢ = leverage (diagonal of the weighted hat matrix)
///   T(n, k) = (1 + k/n) / (1 - k/n)
/// ```
///
/// The per-observation formula is exact for models linear in their
/// parameters: eᵢ equals the residual obtained by refitting on the other
/// n-1 observations and evaluating at the held-out point.
/// </div>
///
/// The strategy itself is a stateless marker; with the `serde` feature it
/// serializes as a tag with no numeric payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorrectedLeaveOneOut;
impl FittingStrategy for CorrectedLeaveOneOut {
    fn name(&self) -> &'static str {
        "CorrectedLeaveOneOut"
    }

    fn score<T: Value>(&self, fit: &WeightedLeastSquares<T>, y: &[T]) -> Result<T> {
        let risk = leave_one_out_risk(fit, y)?;
        let factor = correction_factor(fit.n(), fit.k())?;
        Ok(risk * factor)
    }
}

/// Plain (uncorrected) leave-one-out cross-validation.
///
/// Identical to [`CorrectedLeaveOneOut`] minus the correction factor. The
/// raw estimator is known to be optimistic when k/n is non-negligible;
/// prefer the corrected strategy for automatic selection and use this one
/// when you want the unbiased-looking number itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeaveOneOut;
impl FittingStrategy for LeaveOneOut {
    fn name(&self) -> &'static str {
        "LeaveOneOut"
    }

    fn score<T: Value>(&self, fit: &WeightedLeastSquares<T>, y: &[T]) -> Result<T> {
        leave_one_out_risk(fit, y)
    }
}
