//! Weighted least-squares fitting with leverage extraction
//!
//! [`WeightedLeastSquares`] solves the linear-in-parameters regression
//! problem `min Σ wᵢ (yᵢ - Ψᵢ·β)²` and keeps exactly the byproducts a
//! leave-one-out scorer needs: the fitted coefficients, the in-sample
//! predictions, and the per-observation leverages.
//!
//! # How it works
//! - Rows of Ψ and y are scaled by √wᵢ, turning the weighted problem into
//!   an ordinary least-squares problem.
//! - The scaled system is solved through its **SVD**, with rank decided by
//!   a relative tolerance on the singular values.
//! - Leverages (the diagonal of the weighted hat matrix
//!   `H = Ψ(ΨᵗWΨ)⁻¹ΨᵗW`) fall out of the same decomposition as the
//!   squared row norms of the rank-truncated U factor, so the hat matrix is
//!   never formed explicitly.
//!
//! Dominant cost is the SVD at O(n·k²); everything else is linear passes.

use nalgebra::{DMatrix, DVector, SVD};

use crate::{
    error::{Error, Result},
    value::Value,
};

/// A completed weighted least-squares fit of a design matrix to targets.
///
/// Produced by [`WeightedLeastSquares::fit`]; consumed by the scoring
/// strategies, which only need predictions, leverages, and weights. The fit
/// is immutable once constructed and safe to share across threads.
///
/// # Example
/// ```rust
/// use loocv::WeightedLeastSquares;
/// use loocv::nalgebra::DMatrix;
///
/// // Fit y = 2x + 1 through its exact design matrix {1, x}
/// let x = [0.0f64, 1.0, 2.0, 3.0, 4.0];
/// let psi = DMatrix::from_fn(5, 2, |i, j| if j == 0 { 1.0 } else { x[i] });
/// let y = [1.0f64, 3.0, 5.0, 7.0, 9.0];
///
/// let fit = WeightedLeastSquares::fit(psi, None, &y).unwrap();
/// assert!((fit.coefficients()[0] - 1.0).abs() < 1e-9);
/// assert!((fit.coefficients()[1] - 2.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedLeastSquares<T: Value = f64> {
    coefficients: DVector<T>,
    predictions: DVector<T>,
    leverages: DVector<T>,
    weights: DVector<T>,
    k: usize,
}

impl<T: Value> WeightedLeastSquares<T> {
    /// Fits the design matrix `psi` to the targets `y` under the given
    /// per-observation weights.
    ///
    /// # Parameters
    /// - `psi`: n×k design matrix (rows = observations, columns = active
    ///   basis functions).
    /// - `weights`: Optional per-observation weights; `None` means uniform
    ///   weight 1. Weights must be non-negative and not all zero.
    /// - `y`: Observed targets, length n.
    ///
    /// # Errors
    /// - [`Error::NoData`]: `psi` has no rows or no columns.
    /// - [`Error::DimensionMismatch`]: `y` or `weights` length differs from n.
    /// - [`Error::Underdetermined`]: k ≥ n.
    /// - [`Error::InvalidWeights`]: a negative weight, or all weights zero.
    /// - [`Error::SingularFit`]: the scaled design is rank-deficient, the
    ///   SVD solve fails, or the solution contains NaN.
    pub fn fit(psi: DMatrix<T>, weights: Option<&[T]>, y: &[T]) -> Result<Self> {
        let (n, k) = psi.shape();
        if n == 0 || k == 0 {
            return Err(Error::NoData);
        }
        if y.len() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                found: y.len(),
            });
        }
        if k >= n {
            return Err(Error::Underdetermined { n, k });
        }
        let weights = Self::checked_weights(weights, n)?;
        log::debug!("solving weighted least squares [n: {n}, k: {k}]");

        // Scale rows by sqrt(w) to reduce to an ordinary least-squares problem
        let sqrt_w = weights.map(|w| w.sqrt());
        let mut scaled = psi.clone();
        for (i, mut row) in scaled.row_iter_mut().enumerate() {
            row *= sqrt_w[i];
        }
        let b = DVector::from_iterator(
            n,
            y.iter().zip(sqrt_w.iter()).map(|(&y, &sw)| y * sw),
        );

        let svd = SVD::new_unordered(scaled, true, true);

        // Relative rank tolerance
        // ~= machine_epsilon * max(size) * max_singular
        let sigma_max = svd.singular_values.max();
        let epsilon = T::epsilon() * T::from_positive_int(n.max(k)) * sigma_max;

        let rank = svd
            .singular_values
            .iter()
            .filter(|&&sigma| sigma > epsilon)
            .count();
        if rank < k {
            log::debug!("rank-deficient design [rank: {rank}, k: {k}]");
            return Err(Error::SingularFit { n, k });
        }

        let coefficients = svd
            .solve(&b, epsilon)
            .map_err(|_| Error::SingularFit { n, k })?;
        if coefficients.iter().any(|c| c.is_nan()) {
            return Err(Error::SingularFit { n, k });
        }

        let leverages = Self::leverages_from_svd(&svd, n, k, epsilon)?;
        let predictions = &psi * &coefficients;

        Ok(Self {
            coefficients,
            predictions,
            leverages,
            weights,
            k,
        })
    }

    /// Validates the weight vector, substituting uniform weights for `None`.
    fn checked_weights(weights: Option<&[T]>, n: usize) -> Result<DVector<T>> {
        match weights {
            None => Ok(DVector::repeat(n, T::one())),
            Some(w) => {
                if w.len() != n {
                    return Err(Error::DimensionMismatch {
                        expected: n,
                        found: w.len(),
                    });
                }
                if w.iter().any(|&w| w < T::zero()) {
                    return Err(Error::InvalidWeights);
                }

                let mut total = T::zero();
                for &w in w {
                    total += w;
                }
                if total <= T::zero() {
                    return Err(Error::InvalidWeights);
                }

                Ok(DVector::from_column_slice(w))
            }
        }
    }

    /// Computes leverages as squared row norms of the rank-truncated U factor.
    ///
    /// For the scaled design A = diag(√w)Ψ with thin SVD A = UΣVᵗ, the hat
    /// matrix is U_r·U_rᵗ over the columns with σ above tolerance; its
    /// diagonal entries are the leverages, shared with the W-weighted hat
    /// matrix of the original problem.
    fn leverages_from_svd(
        svd: &SVD<T, nalgebra::Dyn, nalgebra::Dyn>,
        n: usize,
        k: usize,
        epsilon: T,
    ) -> Result<DVector<T>> {
        let u = svd.u.as_ref().ok_or(Error::SingularFit { n, k })?;

        let mut leverages = DVector::zeros(n);
        for j in 0..svd.singular_values.len() {
            if svd.singular_values[j] > epsilon {
                for i in 0..n {
                    leverages[i] += u[(i, j)] * u[(i, j)];
                }
            }
        }

        Ok(leverages)
    }

    /// Returns the number of observations (n).
    #[must_use]
    pub fn n(&self) -> usize {
        self.predictions.len()
    }

    /// Returns the number of active basis functions (k).
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns the fitted coefficients β, one per active basis function.
    pub fn coefficients(&self) -> &DVector<T> {
        &self.coefficients
    }

    /// Returns the in-sample predictions Ψβ, one per observation.
    pub fn predictions(&self) -> &DVector<T> {
        &self.predictions
    }

    /// Returns the leverages, the diagonal of the weighted hat matrix.
    ///
    /// Each hᵢ ∈ \[0, 1\] quantifies how much observation i influences its
    /// own fitted value; their sum equals k for a full-rank fit.
    pub fn leverages(&self) -> &DVector<T> {
        &self.leverages
    }

    /// Returns the per-observation weights (all 1 when fitted unweighted).
    pub fn weights(&self) -> &DVector<T> {
        &self.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_all_close, assert_close};
    use approx::assert_relative_eq;

    fn line_design(x: &[f64]) -> DMatrix<f64> {
        DMatrix::from_fn(x.len(), 2, |i, j| if j == 0 { 1.0 } else { x[i] })
    }

    #[test]
    fn exact_line_recovered() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [1.0, 3.0, 5.0, 7.0, 9.0];
        let fit = WeightedLeastSquares::fit(line_design(&x), None, &y).unwrap();

        assert_relative_eq!(fit.coefficients()[0], 1.0, max_relative = 1e-12);
        assert_relative_eq!(fit.coefficients()[1], 2.0, max_relative = 1e-12);
        for i in 0..5 {
            assert_close!(fit.predictions()[i], y[i], 1e-12);
        }
    }

    #[test]
    fn leverages_match_textbook_hat_values() {
        // For the design {1, x} at x = [0..4]: h_i = 1/n + (x_i - x̄)²/Σ(x_j - x̄)²
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [1.0, 3.0, 4.9, 7.2, 9.1];
        let fit = WeightedLeastSquares::fit(line_design(&x), None, &y).unwrap();

        let expected = [0.6, 0.3, 0.2, 0.3, 0.6];
        assert_all_close!(fit.leverages().as_slice(), &expected, 1e-12);

        // Trace of the hat matrix equals k
        let trace: f64 = fit.leverages().iter().sum();
        assert_close!(trace, 2.0, 1e-12);
    }

    #[test]
    fn weighted_fit_prefers_heavy_observations() {
        // All weight on three collinear points: the line through them is exact
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 2.0, 4.0, 100.0];
        let w = [1.0, 1.0, 1.0, 0.0];
        let fit = WeightedLeastSquares::fit(line_design(&x), Some(&w), &y).unwrap();

        assert_close!(fit.coefficients()[0], 0.0, 1e-9);
        assert_close!(fit.coefficients()[1], 2.0, 1e-9);

        // A zero-weight observation has zero leverage
        assert_close!(fit.leverages()[3], 0.0, 1e-12);
    }

    #[test]
    fn duplicated_column_is_singular() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [1.0, 3.0, 5.0, 7.0, 9.0];
        let psi = DMatrix::from_fn(5, 2, |i, _| x[i]);

        let result = WeightedLeastSquares::fit(psi, None, &y);
        assert!(matches!(result, Err(Error::SingularFit { n: 5, k: 2 })));
    }

    #[test]
    fn interpolating_fit_rejected() {
        let x = [0.0, 1.0, 2.0];
        let y = [1.0, 2.0, 4.0];
        let psi = DMatrix::from_fn(3, 3, |i, j| x[i].powi(j as i32));

        let result = WeightedLeastSquares::fit(psi, None, &y);
        assert!(matches!(result, Err(Error::Underdetermined { n: 3, k: 3 })));
    }

    #[test]
    fn input_validation() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 2.0, 3.0];

        let result = WeightedLeastSquares::fit(line_design(&x), None, &y);
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch { expected: 4, found: 3 })
        ));

        let y = [1.0, 2.0, 3.0, 4.0];
        let short = [1.0, 1.0];
        let result = WeightedLeastSquares::fit(line_design(&x), Some(&short), &y);
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch { expected: 4, found: 2 })
        ));

        let negative = [1.0, -1.0, 1.0, 1.0];
        let result = WeightedLeastSquares::fit(line_design(&x), Some(&negative), &y);
        assert!(matches!(result, Err(Error::InvalidWeights)));

        let zeros = [0.0; 4];
        let result = WeightedLeastSquares::fit(line_design(&x), Some(&zeros), &y);
        assert!(matches!(result, Err(Error::InvalidWeights)));
    }

    #[test]
    fn uniform_weight_scale_changes_nothing() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [0.3, 1.2, 1.8, 3.1, 3.9, 5.2];

        let plain = WeightedLeastSquares::fit(line_design(&x), None, &y).unwrap();
        let scaled =
            WeightedLeastSquares::fit(line_design(&x), Some(&[7.5; 6]), &y).unwrap();

        assert_all_close!(
            plain.coefficients().as_slice(),
            scaled.coefficients().as_slice(),
            1e-12
        );
        assert_all_close!(
            plain.leverages().as_slice(),
            scaled.leverages().as_slice(),
            1e-12
        );
    }
}
