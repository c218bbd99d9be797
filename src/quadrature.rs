//! Gauss–Legendre quadrature rules and numerical integration.
//!
//! Tensor-product rules on the reference square/cube [-1, 1]ᴰ:
//!
//! - 2-point per axis: exact for total degree ≤ 3 (Quad4, Hex8)
//! - 3-point per axis: exact for total degree ≤ 5 (Quad8, Hex20)

use nalgebra::DMatrix;

/// A Gauss quadrature point with natural coordinates and weight.
///
/// `coords` stores [ξ, η, ζ]; ζ is zero for 2D rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussPoint {
    /// Natural coordinates [ξ, η, ζ] in [-1, 1].
    pub coords: [f64; 3],
    /// Integration weight.
    pub weight: f64,
}

impl GaussPoint {
    /// Create a new Gauss point.
    pub fn new(coords: [f64; 3], weight: f64) -> Self {
        Self { coords, weight }
    }

    /// ξ (first natural coordinate).
    #[inline]
    pub fn xi(&self) -> f64 {
        self.coords[0]
    }

    /// η (second natural coordinate).
    #[inline]
    pub fn eta(&self) -> f64 {
        self.coords[1]
    }

    /// ζ (third natural coordinate).
    #[inline]
    pub fn zeta(&self) -> f64 {
        self.coords[2]
    }
}

/// 1D Gauss–Legendre points and weights on [-1, 1].
///
/// An n-point rule integrates polynomials up to degree 2n-1 exactly.
///
/// # Panics
///
/// Panics if `n` is not in 1..=3.
pub fn gauss_1d(n: usize) -> Vec<(f64, f64)> {
    match n {
        1 => vec![(0.0, 2.0)],
        2 => {
            let p = 1.0 / 3.0_f64.sqrt();
            vec![(-p, 1.0), (p, 1.0)]
        }
        3 => {
            let p = (3.0 / 5.0_f64).sqrt();
            vec![(-p, 5.0 / 9.0), (0.0, 8.0 / 9.0), (p, 5.0 / 9.0)]
        }
        _ => panic!("gauss_1d: n must be 1, 2, or 3, got {}", n),
    }
}

/// Tensor-product rule for the reference square (ξ, η) ∈ [-1, 1]².
///
/// Returns n² points ordered ξ-major (η varies fastest).
pub fn gauss_quad(n: usize) -> Vec<GaussPoint> {
    let rule_1d = gauss_1d(n);
    let mut points = Vec::with_capacity(n * n);

    for &(xi, w_xi) in &rule_1d {
        for &(eta, w_eta) in &rule_1d {
            points.push(GaussPoint::new([xi, eta, 0.0], w_xi * w_eta));
        }
    }

    points
}

/// Tensor-product rule for the reference cube (ξ, η, ζ) ∈ [-1, 1]³.
///
/// Returns n³ points ordered ζ-major, then ξ, with η varying fastest.
pub fn gauss_hex(n: usize) -> Vec<GaussPoint> {
    let rule_1d = gauss_1d(n);
    let mut points = Vec::with_capacity(n * n * n);

    for &(zeta, w_zeta) in &rule_1d {
        for &(xi, w_xi) in &rule_1d {
            for &(eta, w_eta) in &rule_1d {
                points.push(GaussPoint::new([xi, eta, zeta], w_xi * w_eta * w_zeta));
            }
        }
    }

    points
}

/// Numerical integration of a scalar integrand: Σ wₖ f(ξₖ).
pub fn integrate_scalar<F>(integrand: F, rule: &[GaussPoint]) -> f64
where
    F: Fn(&GaussPoint) -> f64,
{
    rule.iter().map(|gp| gp.weight * integrand(gp)).sum()
}

/// Numerical integration of a matrix-valued integrand: Σ wₖ f(ξₖ).
///
/// # Panics
///
/// Panics if `rule` is empty.
pub fn integrate_matrix<F>(integrand: F, rule: &[GaussPoint]) -> DMatrix<f64>
where
    F: Fn(&GaussPoint) -> DMatrix<f64>,
{
    assert!(!rule.is_empty(), "quadrature rule must be non-empty");

    let mut result = rule[0].weight * integrand(&rule[0]);

    for gp in &rule[1..] {
        result += gp.weight * integrand(gp);
    }

    result
}
