//! Structured-grid connectivity for Hex20 elements.
//!
//! Standard node numbering lays out four blocks, each x fastest, then y,
//! then z: corners, x-midpoints (nx × (ny+1) × (nz+1)), y-midpoints
//! ((nx+1) × ny × (nz+1)), and z-midpoints ((nx+1) × (ny+1) × nz). The
//! periodic view keeps one node of each family per element, wrapped on the
//! lattice, for 4·nx·ny·nz nodes in total.

use crate::element::Hex20;
use crate::grid::GridTopology;
use nalgebra::DVector;

impl GridTopology for Hex20 {
    fn num_nodes(resolution: &[usize]) -> usize {
        let nx = resolution[0];
        let ny = resolution[1];
        let nz = resolution[2];

        let corners = (nx + 1) * (ny + 1) * (nz + 1);
        let x_mids = nx * (ny + 1) * (nz + 1);
        let y_mids = (nx + 1) * ny * (nz + 1);
        let z_mids = (nx + 1) * (ny + 1) * nz;

        corners + x_mids + y_mids + z_mids
    }

    fn num_periodic_nodes(resolution: &[usize]) -> usize {
        4 * resolution[0] * resolution[1] * resolution[2]
    }

    fn node(resolution: &[usize], size: &[f64], index: usize) -> DVector<f64> {
        let nx = resolution[0];
        let ny = resolution[1];
        let nz = resolution[2];

        let corners = (nx + 1) * (ny + 1) * (nz + 1);
        let x_mids = nx * (ny + 1) * (nz + 1);
        let y_mids = (nx + 1) * ny * (nz + 1);

        let dx = size[0] / nx as f64;
        let dy = size[1] / ny as f64;
        let dz = size[2] / nz as f64;

        // Decompose a block-local index over an (ni × nj)-per-plane layout
        let split = |index: usize, ni: usize, nj: usize| {
            let per_plane = ni * nj;
            let in_plane = index % per_plane;
            (in_plane % ni, in_plane / ni, index / per_plane)
        };

        let (x, y, z) = if index < corners {
            let (i, j, k) = split(index, nx + 1, ny + 1);

            (i as f64 * dx, j as f64 * dy, k as f64 * dz)
        } else if index < corners + x_mids {
            let (i, j, k) = split(index - corners, nx, ny + 1);

            ((i as f64 + 0.5) * dx, j as f64 * dy, k as f64 * dz)
        } else if index < corners + x_mids + y_mids {
            let (i, j, k) = split(index - corners - x_mids, nx + 1, ny);

            (i as f64 * dx, (j as f64 + 0.5) * dy, k as f64 * dz)
        } else {
            let (i, j, k) = split(index - corners - x_mids - y_mids, nx + 1, ny + 1);

            (i as f64 * dx, j as f64 * dy, (k as f64 + 0.5) * dz)
        };

        DVector::from_vec(vec![x, y, z])
    }

    fn element(resolution: &[usize], index: usize) -> Vec<usize> {
        let nx = resolution[0];
        let ny = resolution[1];
        let nz = resolution[2];

        let corners = (nx + 1) * (ny + 1) * (nz + 1);
        let x_mids = nx * (ny + 1) * (nz + 1);
        let y_mids = (nx + 1) * ny * (nz + 1);

        let i = index % nx;
        let j = (index / nx) % ny;
        let k = index / (nx * ny);

        let corner = |i: usize, j: usize, k: usize| k * (nx + 1) * (ny + 1) + j * (nx + 1) + i;
        let x_mid =
            |i: usize, j: usize, k: usize| corners + k * nx * (ny + 1) + j * nx + i;
        let y_mid =
            |i: usize, j: usize, k: usize| corners + x_mids + k * (nx + 1) * ny + j * (nx + 1) + i;
        let z_mid = |i: usize, j: usize, k: usize| {
            corners + x_mids + y_mids + k * (nx + 1) * (ny + 1) + j * (nx + 1) + i
        };

        vec![
            // Bottom face corners
            corner(i, j, k),
            corner(i + 1, j, k),
            corner(i + 1, j + 1, k),
            corner(i, j + 1, k),
            // Top face corners
            corner(i, j, k + 1),
            corner(i + 1, j, k + 1),
            corner(i + 1, j + 1, k + 1),
            corner(i, j + 1, k + 1),
            // Bottom face edge midpoints
            x_mid(i, j, k),
            y_mid(i + 1, j, k),
            x_mid(i, j + 1, k),
            y_mid(i, j, k),
            // Top face edge midpoints
            x_mid(i, j, k + 1),
            y_mid(i + 1, j, k + 1),
            x_mid(i, j + 1, k + 1),
            y_mid(i, j, k + 1),
            // Vertical edge midpoints
            z_mid(i, j, k),
            z_mid(i + 1, j, k),
            z_mid(i + 1, j + 1, k),
            z_mid(i, j + 1, k),
        ]
    }

    fn periodic_element(resolution: &[usize], index: usize) -> Vec<usize> {
        let nx = resolution[0];
        let ny = resolution[1];
        let nz = resolution[2];

        let num_elements = nx * ny * nz;

        let i = index % nx;
        let j = (index / nx) % ny;
        let k = index / (nx * ny);

        let wrap =
            |i: usize, j: usize, k: usize| (k % nz) * nx * ny + (j % ny) * nx + (i % nx);

        let corner = wrap;
        let x_mid = |i: usize, j: usize, k: usize| num_elements + wrap(i, j, k);
        let y_mid = |i: usize, j: usize, k: usize| 2 * num_elements + wrap(i, j, k);
        let z_mid = |i: usize, j: usize, k: usize| 3 * num_elements + wrap(i, j, k);

        vec![
            // Bottom face corners
            corner(i, j, k),
            corner(i + 1, j, k),
            corner(i + 1, j + 1, k),
            corner(i, j + 1, k),
            // Top face corners
            corner(i, j, k + 1),
            corner(i + 1, j, k + 1),
            corner(i + 1, j + 1, k + 1),
            corner(i, j + 1, k + 1),
            // Bottom face edge midpoints
            x_mid(i, j, k),
            y_mid(i + 1, j, k),
            x_mid(i, j + 1, k),
            y_mid(i, j, k),
            // Top face edge midpoints
            x_mid(i, j, k + 1),
            y_mid(i + 1, j, k + 1),
            x_mid(i, j + 1, k + 1),
            y_mid(i, j, k + 1),
            // Vertical edge midpoints
            z_mid(i, j, k),
            z_mid(i + 1, j, k),
            z_mid(i + 1, j + 1, k),
            z_mid(i, j + 1, k),
        ]
    }
}
