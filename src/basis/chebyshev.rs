use crate::{
    basis::{Basis, DomainNormalizer},
    error::{Error, Result},
    value::Value,
};

/// Normalized Chebyshev dictionary.
///
/// Holds the Chebyshev polynomials of the first kind, which form an
/// orthogonal family on the interval \[-1, 1\]. Orthogonality keeps the
/// design matrix well-conditioned compared to raw monomials, especially
/// when many terms are active.
///
/// Inputs are normalized so that the evaluation domain \[`x_min`, `x_max`\]
/// is mapped onto \[-1, 1\]; the dictionary can therefore be used with
/// arbitrary sample ranges while retaining its stability properties.
///
/// # When to use
/// - Prefer for larger dictionaries where conditioning is a concern.
/// - Use [`crate::basis::MonomialBasis`] if you specifically need the raw
///   xⁿ form.
#[derive(Debug, Clone, PartialEq)]
pub struct ChebyshevBasis<T: Value = f64> {
    dimension: usize,
    normalizer: DomainNormalizer<T>,
}
impl<T: Value> ChebyshevBasis<T> {
    /// Creates a Chebyshev dictionary with `dimension` candidate functions,
    /// normalizing inputs from the given range to \[-1, 1\].
    pub fn new(dimension: usize, x_min: T, x_max: T) -> Self {
        let normalizer = DomainNormalizer::new((x_min, x_max), (-T::one(), T::one()));
        Self {
            dimension,
            normalizer,
        }
    }

    /// Creates a Chebyshev dictionary whose domain is the range of the
    /// given sample points.
    ///
    /// # Errors
    /// Returns [`Error::NoData`] if `points` is empty.
    pub fn from_points(dimension: usize, points: &[T]) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::NoData);
        }

        let mut min = T::infinity();
        let mut max = T::neg_infinity();
        for &x in points {
            min = nalgebra::RealField::min(min, x);
            max = nalgebra::RealField::max(max, x);
        }

        Ok(Self::new(dimension, min, max))
    }

    /// Returns the normalizer mapping the sample domain onto \[-1, 1\].
    pub fn normalizer(&self) -> &DomainNormalizer<T> {
        &self.normalizer
    }
}
impl<T: Value> Basis<T> for ChebyshevBasis<T> {
    #[inline(always)]
    fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline(always)]
    fn eval(&self, j: usize, x: T) -> T {
        match j {
            0 => T::one(), // T0(x) = 1
            1 => x,        // T1(x) = x
            _ => {
                // Tn(x) = 2x*T_{n-1}(x) - T_{n-2}(x)
                let mut t0 = T::one();
                let mut t1 = x;
                let mut t = T::zero();

                for _ in 2..=j {
                    t = T::two() * x * t1 - t0;
                    t0 = t1;
                    t1 = t;
                }

                t
            }
        }
    }

    #[inline(always)]
    fn normalize_x(&self, x: T) -> T {
        self.normalizer.normalize(x)
    }
}
