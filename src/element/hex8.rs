//! 8-node trilinear hexahedron (Hex8).
//!
//! ```text
//!        7-------6
//!       /|      /|
//!      / |     / |
//!     4-------5  |
//!     |  3----|--2
//!     | /     | /
//!     |/      |/
//!     0-------1
//! ```
//!
//! Bottom face counterclockwise, then top face. Shape functions are
//! Nᵢ = ⅛(1 + ξᵢξ)(1 + ηᵢη)(1 + ζᵢζ) with a 2×2×2 Gauss rule.

use crate::element::Element;
use crate::quadrature::{gauss_hex, GaussPoint};
use nalgebra::{DMatrix, DVector};

const XI: [f64; 8] = [-1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0];
const ETA: [f64; 8] = [-1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0];
const ZETA: [f64; 8] = [-1.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0];

/// 8-node trilinear hexahedron.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hex8;

impl Element for Hex8 {
    const DIM: usize = 3;
    const NUM_NODES: usize = 8;

    fn local_nodes() -> DMatrix<f64> {
        DMatrix::from_fn(8, 3, |i, d| match d {
            0 => XI[i],
            1 => ETA[i],
            _ => ZETA[i],
        })
    }

    fn shape_functions(point: &[f64; 3]) -> DVector<f64> {
        let [xi, eta, zeta] = *point;

        DVector::from_fn(8, |i, _| {
            0.125 * (1.0 + XI[i] * xi) * (1.0 + ETA[i] * eta) * (1.0 + ZETA[i] * zeta)
        })
    }

    fn grad_shape_functions(point: &[f64; 3]) -> DMatrix<f64> {
        let [xi, eta, zeta] = *point;

        let mut dn = DMatrix::zeros(3, 8);
        for i in 0..8 {
            let fx = 1.0 + XI[i] * xi;
            let fy = 1.0 + ETA[i] * eta;
            let fz = 1.0 + ZETA[i] * zeta;

            dn[(0, i)] = 0.125 * XI[i] * fy * fz;
            dn[(1, i)] = 0.125 * fx * ETA[i] * fz;
            dn[(2, i)] = 0.125 * fx * fy * ZETA[i];
        }

        dn
    }

    fn quadrature_rule() -> Vec<GaussPoint> {
        gauss_hex(2)
    }

    fn gmsh_element_type() -> i32 {
        5
    }

    fn gmsh_node_ordering() -> Vec<usize> {
        vec![0, 1, 5, 4, 3, 2, 6, 7]
    }
}
