//! Small numeric utilities shared across the crate.
//!
//! Symmetry and definiteness checks back the material validators and the
//! matrix-free operator's algebraic flags. The density means feed the
//! Voigt/Reuss bounds.

use crate::error::{Error, Result};
use nalgebra::DMatrix;

/// Numerical tolerance used to treat small floating-point values as zero.
///
/// Also serves as the density floor that keeps element matrices nonsingular
/// at vanishing material density.
pub const NUMERICAL_ZERO: f64 = 1e-9;

/// Replace `a` with ½(a + aᵀ), removing asymmetry introduced by
/// floating-point roundoff in computations that are symmetric in exact
/// arithmetic.
///
/// # Panics
///
/// Panics if `a` is not square.
pub fn symmetrize(a: &mut DMatrix<f64>) {
    assert_eq!(a.nrows(), a.ncols(), "symmetrize requires a square matrix");

    let sym = 0.5 * (&*a + a.transpose());
    a.copy_from(&sym);
}

/// `true` if `a` is square and symmetric to within [`NUMERICAL_ZERO`]
/// relative to its norm.
pub fn is_symmetric(a: &DMatrix<f64>) -> bool {
    if a.nrows() != a.ncols() {
        return false;
    }

    let asym = (a - a.transpose()).norm();
    asym <= NUMERICAL_ZERO * a.norm().max(1.0)
}

/// `true` if `a` is symmetric positive definite, checked by attempting a
/// Cholesky factorization.
pub fn is_pd(a: &DMatrix<f64>) -> bool {
    if !is_symmetric(a) {
        return false;
    }

    a.clone().cholesky().is_some()
}

/// `true` if `a` is symmetric positive semi-definite, checked by verifying
/// that all eigenvalues are non-negative to within [`NUMERICAL_ZERO`].
pub fn is_psd(a: &DMatrix<f64>) -> bool {
    if !is_symmetric(a) {
        return false;
    }

    let eigenvalues = a.clone().symmetric_eigen().eigenvalues;
    eigenvalues.iter().all(|&lambda| lambda >= -NUMERICAL_ZERO)
}

/// Arithmetic mean (1/n)Σxᵢ of a list of scalar values.
pub fn arithmetic_mean(x: &[f64]) -> f64 {
    let sum: f64 = x.iter().sum();

    sum / x.len() as f64
}

/// Harmonic mean n/Σ(1/xᵢ) of a list of scalar values.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if any entry is zero.
pub fn harmonic_mean(x: &[f64]) -> Result<f64> {
    let mut inv_sum = 0.0;
    for &value in x {
        if value == 0.0 {
            return Err(Error::InvalidArgument(
                "scalar values must be nonzero".into(),
            ));
        }
        inv_sum += 1.0 / value;
    }

    Ok(x.len() as f64 / inv_sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_symmetrize_removes_asymmetry() {
        let mut a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 4.0, 3.0]);
        symmetrize(&mut a);

        assert_relative_eq!(a[(0, 1)], 3.0, epsilon = 1e-15);
        assert_relative_eq!(a[(1, 0)], 3.0, epsilon = 1e-15);
        assert_relative_eq!(a[(0, 0)], 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_is_symmetric() {
        let sym = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        assert!(is_symmetric(&sym));

        let asym = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, -1.0, 3.0]);
        assert!(!is_symmetric(&asym));

        let rect = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        assert!(!is_symmetric(&rect));
    }

    #[test]
    fn test_is_pd() {
        let pd = DMatrix::from_row_slice(2, 2, &[4.0, 2.0, 2.0, 3.0]);
        assert!(is_pd(&pd));

        // Eigenvalues 3 and -1
        let indefinite = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        assert!(!is_pd(&indefinite));
    }

    #[test]
    fn test_is_psd_accepts_singular() {
        // Rank-one, eigenvalues 2 and 0
        let psd = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        assert!(is_psd(&psd));
        assert!(!is_pd(&psd));

        let indefinite = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        assert!(!is_psd(&indefinite));
    }

    #[test]
    fn test_means() {
        let x = [1.0, 2.0, 4.0];
        assert_relative_eq!(arithmetic_mean(&x), 7.0 / 3.0, epsilon = 1e-15);
        assert_relative_eq!(
            harmonic_mean(&x).unwrap(),
            3.0 / (1.0 + 0.5 + 0.25),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_harmonic_mean_rejects_zero() {
        assert!(harmonic_mean(&[1.0, 0.0]).is_err());
    }

    #[test]
    fn test_harmonic_below_arithmetic() {
        let x = [0.2, 0.9, 0.5, 1.0];
        assert!(harmonic_mean(&x).unwrap() <= arithmetic_mean(&x));
    }
}
