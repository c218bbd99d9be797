//! 8-node serendipity quadrilateral (Quad8).
//!
//! ```text
//!  3---6---2
//!  |       |
//!  7       5
//!  |       |
//!  0---4---1
//! ```
//!
//! Corners first, then edge midpoints. Corner shape functions are the
//! quadratic serendipity polynomials
//! Nᵢ = ¼(1 + ξᵢξ)(1 + ηᵢη)(ξᵢξ + ηᵢη − 1); midpoint functions carry the
//! (1 − ξ²) or (1 − η²) bubble along their edge. The 3×3 Gauss rule
//! integrates the quadratic stiffness integrands exactly.

use crate::element::Element;
use crate::quadrature::{gauss_quad, GaussPoint};
use nalgebra::{DMatrix, DVector};

/// Local node signs (ξᵢ, ηᵢ); midpoints carry a zero on their edge axis.
const XI: [f64; 8] = [-1.0, 1.0, 1.0, -1.0, 0.0, 1.0, 0.0, -1.0];
const ETA: [f64; 8] = [-1.0, -1.0, 1.0, 1.0, -1.0, 0.0, 1.0, 0.0];

/// 8-node serendipity quadrilateral.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quad8;

impl Element for Quad8 {
    const DIM: usize = 2;
    const NUM_NODES: usize = 8;

    fn local_nodes() -> DMatrix<f64> {
        DMatrix::from_fn(8, 2, |i, d| if d == 0 { XI[i] } else { ETA[i] })
    }

    fn shape_functions(point: &[f64; 3]) -> DVector<f64> {
        let xi = point[0];
        let eta = point[1];

        DVector::from_fn(8, |i, _| {
            let (sx, sy) = (XI[i], ETA[i]);

            if sx == 0.0 {
                0.5 * (1.0 - xi * xi) * (1.0 + sy * eta)
            } else if sy == 0.0 {
                0.5 * (1.0 + sx * xi) * (1.0 - eta * eta)
            } else {
                0.25 * (1.0 + sx * xi) * (1.0 + sy * eta) * (sx * xi + sy * eta - 1.0)
            }
        })
    }

    fn grad_shape_functions(point: &[f64; 3]) -> DMatrix<f64> {
        let xi = point[0];
        let eta = point[1];

        let mut dn = DMatrix::zeros(2, 8);
        for i in 0..8 {
            let (sx, sy) = (XI[i], ETA[i]);

            if sx == 0.0 {
                dn[(0, i)] = -xi * (1.0 + sy * eta);
                dn[(1, i)] = 0.5 * (1.0 - xi * xi) * sy;
            } else if sy == 0.0 {
                dn[(0, i)] = 0.5 * sx * (1.0 - eta * eta);
                dn[(1, i)] = -(1.0 + sx * xi) * eta;
            } else {
                dn[(0, i)] = 0.25 * sx * (1.0 + sy * eta) * (2.0 * sx * xi + sy * eta);
                dn[(1, i)] = 0.25 * sy * (1.0 + sx * xi) * (sx * xi + 2.0 * sy * eta);
            }
        }

        dn
    }

    fn quadrature_rule() -> Vec<GaussPoint> {
        gauss_quad(3)
    }

    fn gmsh_element_type() -> i32 {
        16
    }

    fn gmsh_node_ordering() -> Vec<usize> {
        vec![0, 1, 2, 3, 4, 5, 6, 7]
    }
}
