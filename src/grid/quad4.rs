//! Structured-grid connectivity for Quad4 elements.
//!
//! Standard view of a 3×2 grid:
//!
//! ```text
//!  8-------9------10------11
//!  |       |       |       |
//!  |   3   |   4   |   5   |
//!  |       |       |       |
//!  4-------5-------6-------7
//!  |       |       |       |
//!  |   0   |   1   |   2   |
//!  |       |       |       |
//!  0-------1-------2-------3
//! ```
//!
//! The periodic view identifies the right column with the left and the top
//! row with the bottom, leaving nx·ny distinct nodes.

use crate::element::Quad4;
use crate::grid::GridTopology;
use nalgebra::DVector;

impl GridTopology for Quad4 {
    fn num_nodes(resolution: &[usize]) -> usize {
        (resolution[0] + 1) * (resolution[1] + 1)
    }

    fn num_periodic_nodes(resolution: &[usize]) -> usize {
        resolution[0] * resolution[1]
    }

    fn node(resolution: &[usize], size: &[f64], index: usize) -> DVector<f64> {
        let nx = resolution[0];

        let dx = size[0] / resolution[0] as f64;
        let dy = size[1] / resolution[1] as f64;

        let i = index % (nx + 1);
        let j = index / (nx + 1);

        DVector::from_vec(vec![i as f64 * dx, j as f64 * dy])
    }

    fn element(resolution: &[usize], index: usize) -> Vec<usize> {
        let nx = resolution[0];

        let i = index % nx;
        let j = index / nx;

        let node = |i: usize, j: usize| j * (nx + 1) + i;

        vec![
            node(i, j),
            node(i + 1, j),
            node(i + 1, j + 1),
            node(i, j + 1),
        ]
    }

    fn periodic_element(resolution: &[usize], index: usize) -> Vec<usize> {
        let nx = resolution[0];
        let ny = resolution[1];

        let i = index % nx;
        let j = index / nx;

        let node = |i: usize, j: usize| (j % ny) * nx + (i % nx);

        vec![
            node(i, j),
            node(i + 1, j),
            node(i + 1, j + 1),
            node(i, j + 1),
        ]
    }
}
