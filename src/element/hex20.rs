//! 20-node serendipity hexahedron (Hex20).
//!
//! Corner ordering matches [`Hex8`](crate::element::Hex8); edge midpoints
//! follow in three groups of four: bottom face, top face, then the vertical
//! edges. Corner shape functions are the cubic serendipity polynomials
//! Nᵢ = ⅛(1 + ξᵢξ)(1 + ηᵢη)(1 + ζᵢζ)(ξᵢξ + ηᵢη + ζᵢζ − 2); midpoint
//! functions carry the quadratic bubble along their edge axis. The 3×3×3
//! Gauss rule integrates the quadratic stiffness integrands exactly.

use crate::element::Element;
use crate::quadrature::{gauss_hex, GaussPoint};
use nalgebra::{DMatrix, DVector};

/// Local node signs; edge midpoints carry a zero on their edge axis.
const XI: [f64; 20] = [
    -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, // corners
    0.0, 1.0, 0.0, -1.0, // bottom midpoints
    0.0, 1.0, 0.0, -1.0, // top midpoints
    -1.0, 1.0, 1.0, -1.0, // vertical midpoints
];
const ETA: [f64; 20] = [
    -1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0, // corners
    -1.0, 0.0, 1.0, 0.0, // bottom midpoints
    -1.0, 0.0, 1.0, 0.0, // top midpoints
    -1.0, -1.0, 1.0, 1.0, // vertical midpoints
];
const ZETA: [f64; 20] = [
    -1.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0, // corners
    -1.0, -1.0, -1.0, -1.0, // bottom midpoints
    1.0, 1.0, 1.0, 1.0, // top midpoints
    0.0, 0.0, 0.0, 0.0, // vertical midpoints
];

/// 20-node serendipity hexahedron.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hex20;

impl Element for Hex20 {
    const DIM: usize = 3;
    const NUM_NODES: usize = 20;

    fn local_nodes() -> DMatrix<f64> {
        DMatrix::from_fn(20, 3, |i, d| match d {
            0 => XI[i],
            1 => ETA[i],
            _ => ZETA[i],
        })
    }

    fn shape_functions(point: &[f64; 3]) -> DVector<f64> {
        let [xi, eta, zeta] = *point;

        DVector::from_fn(20, |i, _| {
            let (sx, sy, sz) = (XI[i], ETA[i], ZETA[i]);
            let fx = 1.0 + sx * xi;
            let fy = 1.0 + sy * eta;
            let fz = 1.0 + sz * zeta;

            if sx == 0.0 {
                0.25 * (1.0 - xi * xi) * fy * fz
            } else if sy == 0.0 {
                0.25 * fx * (1.0 - eta * eta) * fz
            } else if sz == 0.0 {
                0.25 * fx * fy * (1.0 - zeta * zeta)
            } else {
                0.125 * fx * fy * fz * (sx * xi + sy * eta + sz * zeta - 2.0)
            }
        })
    }

    fn grad_shape_functions(point: &[f64; 3]) -> DMatrix<f64> {
        let [xi, eta, zeta] = *point;

        let mut dn = DMatrix::zeros(3, 20);
        for i in 0..20 {
            let (sx, sy, sz) = (XI[i], ETA[i], ZETA[i]);
            let fx = 1.0 + sx * xi;
            let fy = 1.0 + sy * eta;
            let fz = 1.0 + sz * zeta;

            if sx == 0.0 {
                let bubble = 1.0 - xi * xi;
                dn[(0, i)] = -0.5 * xi * fy * fz;
                dn[(1, i)] = 0.25 * bubble * sy * fz;
                dn[(2, i)] = 0.25 * bubble * fy * sz;
            } else if sy == 0.0 {
                let bubble = 1.0 - eta * eta;
                dn[(0, i)] = 0.25 * sx * bubble * fz;
                dn[(1, i)] = -0.5 * eta * fx * fz;
                dn[(2, i)] = 0.25 * fx * bubble * sz;
            } else if sz == 0.0 {
                let bubble = 1.0 - zeta * zeta;
                dn[(0, i)] = 0.25 * sx * fy * bubble;
                dn[(1, i)] = 0.25 * fx * sy * bubble;
                dn[(2, i)] = -0.5 * zeta * fx * fy;
            } else {
                dn[(0, i)] = 0.125 * sx * fy * fz * (2.0 * sx * xi + sy * eta + sz * zeta - 1.0);
                dn[(1, i)] = 0.125 * sy * fx * fz * (sx * xi + 2.0 * sy * eta + sz * zeta - 1.0);
                dn[(2, i)] = 0.125 * sz * fx * fy * (sx * xi + sy * eta + 2.0 * sz * zeta - 1.0);
            }
        }

        dn
    }

    fn quadrature_rule() -> Vec<GaussPoint> {
        gauss_hex(3)
    }

    fn gmsh_element_type() -> i32 {
        17
    }

    fn gmsh_node_ordering() -> Vec<usize> {
        vec![
            0, 1, 5, 4, 3, 2, 6, 7, 8, 16, 11, 17, 9, 12, 13, 15, 10, 19, 18, 14,
        ]
    }
}
