//! Structured-grid connectivity for Hex8 elements.
//!
//! Standard node numbering runs x fastest, then y, then z. The periodic
//! view wraps all three axes, leaving nx·ny·nz distinct nodes.

use crate::element::Hex8;
use crate::grid::GridTopology;
use nalgebra::DVector;

impl GridTopology for Hex8 {
    fn num_nodes(resolution: &[usize]) -> usize {
        (resolution[0] + 1) * (resolution[1] + 1) * (resolution[2] + 1)
    }

    fn num_periodic_nodes(resolution: &[usize]) -> usize {
        resolution[0] * resolution[1] * resolution[2]
    }

    fn node(resolution: &[usize], size: &[f64], index: usize) -> DVector<f64> {
        let nx = resolution[0];
        let ny = resolution[1];

        let nodes_per_plane = (nx + 1) * (ny + 1);
        let index_in_plane = index % nodes_per_plane;

        let dx = size[0] / resolution[0] as f64;
        let dy = size[1] / resolution[1] as f64;
        let dz = size[2] / resolution[2] as f64;

        let i = index_in_plane % (nx + 1);
        let j = index_in_plane / (nx + 1);
        let k = index / nodes_per_plane;

        DVector::from_vec(vec![i as f64 * dx, j as f64 * dy, k as f64 * dz])
    }

    fn element(resolution: &[usize], index: usize) -> Vec<usize> {
        let nx = resolution[0];
        let ny = resolution[1];

        let elements_per_plane = nx * ny;

        let i = index % nx;
        let j = (index / nx) % ny;
        let k = index / elements_per_plane;

        let node = |i: usize, j: usize, k: usize| k * (nx + 1) * (ny + 1) + j * (nx + 1) + i;

        vec![
            // Bottom face
            node(i, j, k),
            node(i + 1, j, k),
            node(i + 1, j + 1, k),
            node(i, j + 1, k),
            // Top face
            node(i, j, k + 1),
            node(i + 1, j, k + 1),
            node(i + 1, j + 1, k + 1),
            node(i, j + 1, k + 1),
        ]
    }

    fn periodic_element(resolution: &[usize], index: usize) -> Vec<usize> {
        let nx = resolution[0];
        let ny = resolution[1];
        let nz = resolution[2];

        let elements_per_plane = nx * ny;

        let i = index % nx;
        let j = (index / nx) % ny;
        let k = index / elements_per_plane;

        let node = |i: usize, j: usize, k: usize| (k % nz) * nx * ny + (j % ny) * nx + (i % nx);

        vec![
            // Bottom face
            node(i, j, k),
            node(i + 1, j, k),
            node(i + 1, j + 1, k),
            node(i, j + 1, k),
            // Top face
            node(i, j, k + 1),
            node(i + 1, j, k + 1),
            node(i + 1, j + 1, k + 1),
            node(i, j + 1, k + 1),
        ]
    }
}
