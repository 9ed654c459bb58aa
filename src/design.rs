//! Design-matrix evaluation and caching
//!
//! A model-selection loop scores many candidate subsets of the same
//! dictionary against the same sample points. Rebuilding the design matrix
//! from scratch for every candidate wastes most of that work: overlapping
//! subsets share columns.
//!
//! [`DesignEvaluator`] owns the dictionary and the x-sample, evaluates each
//! basis function at the sample points at most once, and assembles n×k
//! design matrices for arbitrary active index sets from the cached columns.
//!
//! The cache is safe for concurrent read/insert, so one evaluator can be
//! shared by threads scoring different candidates in parallel.

use std::borrow::Cow;

use dashmap::DashMap;
use nalgebra::{DMatrix, DVector};

use crate::{
    basis::Basis,
    error::{Error, Result},
    value::Value,
};

/// Builds and caches design matrices for active subsets of a dictionary.
///
/// The evaluator is the reusable half of a scoring run: construct it once
/// per (dictionary, sample) pair, then score as many candidate index sets
/// against it as you like. Columns are evaluated lazily and cached by
/// dictionary index.
///
/// # Example
/// ```rust
/// use loocv::{basis::MonomialBasis, DesignEvaluator};
///
/// let x = [0.0, 1.0, 2.0, 3.0];
/// let evaluator = DesignEvaluator::new(MonomialBasis::new(4), &x[..]).unwrap();
///
/// let psi = evaluator.design_matrix(&[0, 2]).unwrap(); // columns {1, x²}
/// assert_eq!(psi.shape(), (4, 2));
/// assert_eq!(psi[(3, 1)], 9.0);
/// ```
#[derive(Debug)]
pub struct DesignEvaluator<'data, B, T: Value = f64>
where
    B: Basis<T>,
{
    basis: B,
    points: Cow<'data, [T]>,
    columns: DashMap<usize, DVector<T>>,
}

impl<'data, B, T: Value> DesignEvaluator<'data, B, T>
where
    B: Basis<T>,
{
    /// Minimum sample size before missing columns are evaluated in parallel.
    #[cfg(feature = "parallel")]
    const MIN_POINTS_TO_PARALLEL: usize = 100_000;

    /// Creates an evaluator for the given dictionary and sample points.
    ///
    /// # Errors
    /// Returns [`Error::NoData`] if `points` is empty.
    pub fn new(basis: B, points: impl Into<Cow<'data, [T]>>) -> Result<Self> {
        let points: Cow<_> = points.into();
        if points.is_empty() {
            return Err(Error::NoData);
        }

        Ok(Self {
            basis,
            points,
            columns: DashMap::new(),
        })
    }

    /// Returns the number of sample points (n).
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if there are no sample points.
    ///
    /// Always false: construction rejects an empty sample.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the number of candidate functions in the dictionary (p).
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.basis.dimension()
    }

    /// Returns the sample points.
    #[must_use]
    pub fn points(&self) -> &[T] {
        &self.points
    }

    /// Returns a reference to the dictionary.
    pub fn basis(&self) -> &B {
        &self.basis
    }

    /// Assembles the design matrix Ψ for an active index set.
    ///
    /// Ψ has one row per sample point and one column per active index, in
    /// the order the indices are listed: `Ψ[(i, jj)] = φ_{indices[jj]}(x_i)`.
    /// Columns already evaluated by a previous call are reused from the
    /// cache.
    ///
    /// # Errors
    /// - [`Error::NoData`]: `indices` is empty.
    /// - [`Error::IndexOutOfRange`]: an index is ≥ [`DesignEvaluator::dimension`].
    /// - [`Error::DuplicateIndex`]: an index is listed twice.
    pub fn design_matrix(&self, indices: &[usize]) -> Result<DMatrix<T>> {
        self.validate_indices(indices)?;
        self.populate_columns(indices);

        let n = self.points.len();
        let mut psi = DMatrix::zeros(n, indices.len());
        for (jj, &j) in indices.iter().enumerate() {
            match self.columns.get(&j) {
                Some(column) => psi.set_column(jj, &*column),
                None => psi.set_column(jj, &self.evaluate_column(j)),
            }
        }

        Ok(psi)
    }

    /// Checks bounds and uniqueness of an active index set.
    fn validate_indices(&self, indices: &[usize]) -> Result<()> {
        if indices.is_empty() {
            return Err(Error::NoData);
        }

        let dimension = self.basis.dimension();
        let mut seen = vec![false; dimension];
        for &j in indices {
            if j >= dimension {
                return Err(Error::IndexOutOfRange {
                    index: j,
                    dimension,
                });
            }
            if seen[j] {
                return Err(Error::DuplicateIndex(j));
            }
            seen[j] = true;
        }

        Ok(())
    }

    /// Evaluates and caches any columns the index set still needs.
    fn populate_columns(&self, indices: &[usize]) {
        let missing: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|j| !self.columns.contains_key(j))
            .collect();

        if missing.is_empty() {
            return;
        }
        log::trace!(
            "design cache miss for {} of {} columns",
            missing.len(),
            indices.len()
        );

        #[cfg(feature = "parallel")]
        if self.points.len() >= Self::MIN_POINTS_TO_PARALLEL {
            use rayon::prelude::*;

            let computed: Vec<(usize, DVector<T>)> = missing
                .into_par_iter()
                .map(|j| (j, self.evaluate_column(j)))
                .collect();

            for (j, column) in computed {
                self.columns.insert(j, column);
            }
            return;
        }

        for j in missing {
            self.columns.insert(j, self.evaluate_column(j));
        }
    }

    /// Evaluates the jth dictionary function at every sample point.
    fn evaluate_column(&self, j: usize) -> DVector<T> {
        DVector::from_iterator(
            self.points.len(),
            self.points
                .iter()
                .map(|&x| self.basis.eval(j, self.basis.normalize_x(x))),
        )
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::basis::{ChebyshevBasis, MonomialBasis};

    #[test]
    fn design_matrix_layout() {
        let x = [0.0, 1.0, 2.0];
        let evaluator = DesignEvaluator::new(MonomialBasis::new(3), &x[..]).unwrap();

        let psi = evaluator.design_matrix(&[0, 1, 2]).unwrap();
        assert_eq!(psi.shape(), (3, 3));
        assert_eq!(psi.row(2).iter().copied().collect::<Vec<_>>(), [1.0, 2.0, 4.0]);
    }

    #[test]
    fn column_order_follows_indices() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let evaluator = DesignEvaluator::new(MonomialBasis::new(3), &x[..]).unwrap();

        let forward = evaluator.design_matrix(&[0, 1]).unwrap();
        let reversed = evaluator.design_matrix(&[1, 0]).unwrap();
        assert_eq!(forward.column(0), reversed.column(1));
        assert_eq!(forward.column(1), reversed.column(0));
    }

    #[test]
    fn cache_reuse_across_subsets() {
        let x: Vec<f64> = (0..50).map(f64::from).collect();
        let evaluator = DesignEvaluator::new(MonomialBasis::new(6), x).unwrap();

        let small = evaluator.design_matrix(&[0, 1]).unwrap();
        let larger = evaluator.design_matrix(&[0, 1, 2, 3]).unwrap();

        // Shared columns must be identical, not merely close
        assert_eq!(small.column(0), larger.column(0));
        assert_eq!(small.column(1), larger.column(1));
    }

    #[test]
    fn normalization_applied_before_evaluation() {
        let x = [0.0, 5.0, 10.0];
        let evaluator =
            DesignEvaluator::new(ChebyshevBasis::new(2, 0.0, 10.0), &x[..]).unwrap();

        let psi = evaluator.design_matrix(&[1]).unwrap();
        assert_eq!(psi[(0, 0)], -1.0);
        assert_eq!(psi[(1, 0)], 0.0);
        assert_eq!(psi[(2, 0)], 1.0);
    }

    #[test]
    fn rejects_bad_index_sets() {
        let x = [0.0, 1.0, 2.0];
        let evaluator = DesignEvaluator::new(MonomialBasis::new(3), &x[..]).unwrap();

        assert!(matches!(
            evaluator.design_matrix(&[]),
            Err(Error::NoData)
        ));
        assert!(matches!(
            evaluator.design_matrix(&[0, 3]),
            Err(Error::IndexOutOfRange { index: 3, dimension: 3 })
        ));
        assert!(matches!(
            evaluator.design_matrix(&[0, 1, 1]),
            Err(Error::DuplicateIndex(1))
        ));
    }

    #[test]
    fn rejects_empty_sample() {
        let x: Vec<f64> = Vec::new();
        assert!(matches!(
            DesignEvaluator::new(MonomialBasis::new(3), x),
            Err(Error::NoData)
        ));
    }
}
