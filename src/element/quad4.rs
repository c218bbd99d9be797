//! 4-node bilinear quadrilateral (Quad4).
//!
//! ```text
//!  3-------2
//!  |       |
//!  |       |
//!  0-------1
//! ```
//!
//! Node i sits at (ξᵢ, ηᵢ) with ξᵢ, ηᵢ ∈ {-1, +1}; shape functions are
//! Nᵢ = ¼(1 + ξᵢξ)(1 + ηᵢη). A 2×2 Gauss rule integrates the bilinear
//! stiffness integrands exactly.

use crate::element::Element;
use crate::quadrature::{gauss_quad, GaussPoint};
use nalgebra::{DMatrix, DVector};

const XI: [f64; 4] = [-1.0, 1.0, 1.0, -1.0];
const ETA: [f64; 4] = [-1.0, -1.0, 1.0, 1.0];

/// 4-node bilinear quadrilateral.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quad4;

impl Element for Quad4 {
    const DIM: usize = 2;
    const NUM_NODES: usize = 4;

    fn local_nodes() -> DMatrix<f64> {
        DMatrix::from_fn(4, 2, |i, d| if d == 0 { XI[i] } else { ETA[i] })
    }

    fn shape_functions(point: &[f64; 3]) -> DVector<f64> {
        let xi = point[0];
        let eta = point[1];

        DVector::from_fn(4, |i, _| {
            0.25 * (1.0 + XI[i] * xi) * (1.0 + ETA[i] * eta)
        })
    }

    fn grad_shape_functions(point: &[f64; 3]) -> DMatrix<f64> {
        let xi = point[0];
        let eta = point[1];

        let mut dn = DMatrix::zeros(2, 4);
        for i in 0..4 {
            dn[(0, i)] = 0.25 * XI[i] * (1.0 + ETA[i] * eta);
            dn[(1, i)] = 0.25 * (1.0 + XI[i] * xi) * ETA[i];
        }

        dn
    }

    fn quadrature_rule() -> Vec<GaussPoint> {
        gauss_quad(2)
    }

    fn gmsh_element_type() -> i32 {
        3
    }

    fn gmsh_node_ordering() -> Vec<usize> {
        vec![0, 1, 2, 3]
    }
}
