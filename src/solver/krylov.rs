//! Self-contained Krylov solvers over operator callables.
//!
//! Both solvers are matrix-free: the operator and the preconditioner are
//! arbitrary `Fn(&DVector) -> DVector` callables. Convergence is tested on
//! the relative residual ‖r‖ ≤ tol · ‖b‖; a zero right-hand side
//! short-circuits to the zero solution.
//!
//! [`conjugate_gradient`] handles the symmetric positive semi-definite
//! operators of the elastic and transport physics;
//! [`bicgstab`] handles the symmetric-indefinite piezoelectric operator.

use crate::error::{Error, Result};
use log::debug;
use nalgebra::DVector;

fn non_convergence(method: &str, max_iterations: usize, relative_residual: f64) -> Error {
    Error::Solver(format!(
        "{} did not converge: max iterations ({}) reached with relative residual {:.3e}",
        method, max_iterations, relative_residual
    ))
}

fn numerical_issue(method: &str, detail: &str) -> Error {
    Error::Solver(format!("{} encountered a numerical issue: {}", method, detail))
}

/// Preconditioned conjugate gradient.
///
/// Requires a symmetric positive semi-definite operator; a non-positive
/// curvature p·Ap surfaces as a numerical issue.
///
/// # Errors
///
/// [`Error::Solver`] on non-convergence within `max_iterations` or on a
/// numerical breakdown.
pub fn conjugate_gradient<A, M>(
    apply: A,
    precondition: M,
    b: &DVector<f64>,
    max_iterations: usize,
    tolerance: f64,
) -> Result<DVector<f64>>
where
    A: Fn(&DVector<f64>) -> DVector<f64>,
    M: Fn(&DVector<f64>) -> DVector<f64>,
{
    let b_norm = b.norm();
    if b_norm == 0.0 {
        return Ok(DVector::zeros(b.len()));
    }

    let mut x = DVector::zeros(b.len());
    let mut r = b.clone();
    let mut z = precondition(&r);
    let mut p = z.clone();
    let mut zr = z.dot(&r);

    for iteration in 0..max_iterations {
        if r.norm() <= tolerance * b_norm {
            debug!(
                "cg converged in {} iterations (relative residual {:.3e})",
                iteration,
                r.norm() / b_norm
            );
            return Ok(x);
        }

        let ap = apply(&p);
        let pap = p.dot(&ap);

        if !pap.is_finite() || pap <= 0.0 {
            return Err(numerical_issue(
                "cg",
                &format!("non-positive curvature p·Ap = {:.3e}", pap),
            ));
        }

        let alpha = zr / pap;
        x.axpy(alpha, &p, 1.0);
        r.axpy(-alpha, &ap, 1.0);

        z = precondition(&r);
        let zr_next = z.dot(&r);
        let beta = zr_next / zr;

        p = &z + beta * p;
        zr = zr_next;
    }

    if r.norm() <= tolerance * b_norm {
        debug!(
            "cg converged in {} iterations (relative residual {:.3e})",
            max_iterations,
            r.norm() / b_norm
        );
        return Ok(x);
    }

    Err(non_convergence("cg", max_iterations, r.norm() / b_norm))
}

/// Preconditioned biconjugate gradient stabilized.
///
/// Converges on symmetric-indefinite operators where conjugate gradient
/// breaks down.
///
/// # Errors
///
/// [`Error::Solver`] on non-convergence within `max_iterations` or on a
/// numerical breakdown.
pub fn bicgstab<A, M>(
    apply: A,
    precondition: M,
    b: &DVector<f64>,
    max_iterations: usize,
    tolerance: f64,
) -> Result<DVector<f64>>
where
    A: Fn(&DVector<f64>) -> DVector<f64>,
    M: Fn(&DVector<f64>) -> DVector<f64>,
{
    let b_norm = b.norm();
    if b_norm == 0.0 {
        return Ok(DVector::zeros(b.len()));
    }

    let mut x = DVector::zeros(b.len());
    let mut r = b.clone();
    let r_hat = r.clone();

    let mut rho = 1.0;
    let mut alpha = 1.0;
    let mut omega = 1.0;

    let mut v = DVector::zeros(b.len());
    let mut p = DVector::zeros(b.len());

    for iteration in 0..max_iterations {
        if r.norm() <= tolerance * b_norm {
            debug!(
                "bicgstab converged in {} iterations (relative residual {:.3e})",
                iteration,
                r.norm() / b_norm
            );
            return Ok(x);
        }

        let rho_next = r_hat.dot(&r);
        if rho_next == 0.0 || !rho_next.is_finite() {
            return Err(numerical_issue(
                "bicgstab",
                &format!("breakdown with rho = {:.3e}", rho_next),
            ));
        }

        let beta = (rho_next / rho) * (alpha / omega);
        p = &r + beta * (p - omega * &v);
        rho = rho_next;

        let p_hat = precondition(&p);
        v = apply(&p_hat);

        let r_hat_v = r_hat.dot(&v);
        if r_hat_v == 0.0 || !r_hat_v.is_finite() {
            return Err(numerical_issue(
                "bicgstab",
                &format!("breakdown with r̂·v = {:.3e}", r_hat_v),
            ));
        }

        alpha = rho / r_hat_v;
        let s = &r - alpha * &v;

        if s.norm() <= tolerance * b_norm {
            x.axpy(alpha, &p_hat, 1.0);
            debug!(
                "bicgstab converged in {} iterations (relative residual {:.3e})",
                iteration + 1,
                s.norm() / b_norm
            );
            return Ok(x);
        }

        let s_hat = precondition(&s);
        let t = apply(&s_hat);

        let tt = t.dot(&t);
        if tt == 0.0 || !tt.is_finite() {
            return Err(numerical_issue(
                "bicgstab",
                &format!("breakdown with t·t = {:.3e}", tt),
            ));
        }

        omega = t.dot(&s) / tt;
        if omega == 0.0 || !omega.is_finite() {
            return Err(numerical_issue(
                "bicgstab",
                &format!("breakdown with omega = {:.3e}", omega),
            ));
        }

        x.axpy(alpha, &p_hat, 1.0);
        x.axpy(omega, &s_hat, 1.0);

        r = s - omega * t;
    }

    if r.norm() <= tolerance * b_norm {
        return Ok(x);
    }

    Err(non_convergence("bicgstab", max_iterations, r.norm() / b_norm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    fn identity_preconditioner(v: &DVector<f64>) -> DVector<f64> {
        v.clone()
    }

    fn spd_system() -> (DMatrix<f64>, DVector<f64>) {
        let a = DMatrix::from_row_slice(
            3,
            3,
            &[4.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0, 1.0, 2.0],
        );
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);

        (a, b)
    }

    #[test]
    fn test_cg_solves_spd_system() {
        let (a, b) = spd_system();

        let x = conjugate_gradient(|v| &a * v, identity_preconditioner, &b, 100, 1e-12).unwrap();

        assert_relative_eq!(&a * &x, b, epsilon = 1e-10);
    }

    #[test]
    fn test_cg_with_jacobi_preconditioning() {
        let (a, b) = spd_system();
        let diagonal = a.diagonal();

        let x = conjugate_gradient(
            |v| &a * v,
            |v| v.component_div(&diagonal),
            &b,
            100,
            1e-12,
        )
        .unwrap();

        assert_relative_eq!(&a * &x, b, epsilon = 1e-10);
    }

    #[test]
    fn test_cg_zero_rhs_short_circuits() {
        let (a, _) = spd_system();
        let b = DVector::zeros(3);

        let x = conjugate_gradient(|v| &a * v, identity_preconditioner, &b, 100, 1e-12).unwrap();
        assert_relative_eq!(x.norm(), 0.0);
    }

    #[test]
    fn test_cg_iteration_cap_fails() {
        // A 50-dof Laplacian chain needs more than one iteration
        let n = 50;
        let a = DMatrix::from_fn(n, n, |i, j| {
            if i == j {
                2.0
            } else if i.abs_diff(j) == 1 {
                -1.0
            } else {
                0.0
            }
        });
        let b = DVector::from_element(n, 1.0);

        let result = conjugate_gradient(|v| &a * v, identity_preconditioner, &b, 1, 1e-12);
        assert!(matches!(result, Err(Error::Solver(_))));
    }

    #[test]
    fn test_cg_rejects_indefinite_operator() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, -1.0]);
        let b = DVector::from_vec(vec![0.0, 1.0]);

        let result = conjugate_gradient(|v| &a * v, identity_preconditioner, &b, 100, 1e-12);
        assert!(matches!(result, Err(Error::Solver(_))));
    }

    #[test]
    fn test_bicgstab_solves_indefinite_symmetric_system() {
        // Saddle-shaped symmetric matrix that CG cannot handle
        let a = DMatrix::from_row_slice(
            3,
            3,
            &[4.0, 1.0, 0.5, 1.0, -3.0, 1.0, 0.5, 1.0, -2.0],
        );
        let b = DVector::from_vec(vec![1.0, -1.0, 2.0]);

        let x = bicgstab(|v| &a * v, identity_preconditioner, &b, 200, 1e-12).unwrap();
        assert_relative_eq!(&a * &x, b, epsilon = 1e-8);
    }

    #[test]
    fn test_bicgstab_solves_spd_system_too() {
        let (a, b) = spd_system();

        let x = bicgstab(|v| &a * v, identity_preconditioner, &b, 200, 1e-12).unwrap();
        assert_relative_eq!(&a * &x, b, epsilon = 1e-8);
    }

    #[test]
    fn test_bicgstab_iteration_cap_fails() {
        let n = 50;
        let a = DMatrix::from_fn(n, n, |i, j| {
            if i == j {
                2.0
            } else if i.abs_diff(j) == 1 {
                -1.0
            } else {
                0.0
            }
        });
        let b = DVector::from_element(n, 1.0);

        let result = bicgstab(|v| &a * v, identity_preconditioner, &b, 1, 1e-14);
        assert!(matches!(result, Err(Error::Solver(_))));
    }
}
