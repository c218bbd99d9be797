//! Structured-grid connectivity for Quad8 elements.
//!
//! Standard node numbering lays out the corner block first, then the
//! x-midpoint block (nx columns, ny+1 rows), then the y-midpoint block
//! (nx+1 columns, ny rows). The periodic view keeps one corner, one
//! x-midpoint, and one y-midpoint per element, each family wrapped on the
//! lattice, for 3·nx·ny nodes in total.

use crate::element::Quad8;
use crate::grid::GridTopology;
use nalgebra::DVector;

impl GridTopology for Quad8 {
    fn num_nodes(resolution: &[usize]) -> usize {
        let nx = resolution[0];
        let ny = resolution[1];

        let corners = (nx + 1) * (ny + 1);
        let x_mids = nx * (ny + 1);
        let y_mids = (nx + 1) * ny;

        corners + x_mids + y_mids
    }

    fn num_periodic_nodes(resolution: &[usize]) -> usize {
        3 * resolution[0] * resolution[1]
    }

    fn node(resolution: &[usize], size: &[f64], index: usize) -> DVector<f64> {
        let nx = resolution[0];
        let ny = resolution[1];

        let corners = (nx + 1) * (ny + 1);
        let x_mids = nx * (ny + 1);

        let dx = size[0] / nx as f64;
        let dy = size[1] / ny as f64;

        let (x, y) = if index < corners {
            let i = index % (nx + 1);
            let j = index / (nx + 1);

            (i as f64 * dx, j as f64 * dy)
        } else if index < corners + x_mids {
            let index = index - corners;
            let i = index % nx;
            let j = index / nx;

            ((i as f64 + 0.5) * dx, j as f64 * dy)
        } else {
            let index = index - corners - x_mids;
            let i = index % (nx + 1);
            let j = index / (nx + 1);

            (i as f64 * dx, (j as f64 + 0.5) * dy)
        };

        DVector::from_vec(vec![x, y])
    }

    fn element(resolution: &[usize], index: usize) -> Vec<usize> {
        let nx = resolution[0];
        let ny = resolution[1];

        let corners = (nx + 1) * (ny + 1);
        let x_mids = nx * (ny + 1);

        let i = index % nx;
        let j = index / nx;

        let corner = |i: usize, j: usize| j * (nx + 1) + i;
        let x_mid = |i: usize, j: usize| corners + j * nx + i;
        let y_mid = |i: usize, j: usize| corners + x_mids + j * (nx + 1) + i;

        vec![
            corner(i, j),
            corner(i + 1, j),
            corner(i + 1, j + 1),
            corner(i, j + 1),
            x_mid(i, j),     // bottom edge
            y_mid(i + 1, j), // right edge
            x_mid(i, j + 1), // top edge
            y_mid(i, j),     // left edge
        ]
    }

    fn periodic_element(resolution: &[usize], index: usize) -> Vec<usize> {
        let nx = resolution[0];
        let ny = resolution[1];

        let num_elements = nx * ny;

        let i = index % nx;
        let j = index / nx;

        let corner = |i: usize, j: usize| (j % ny) * nx + (i % nx);
        let x_mid = |i: usize, j: usize| num_elements + (j % ny) * nx + (i % nx);
        let y_mid = |i: usize, j: usize| 2 * num_elements + (j % ny) * nx + (i % nx);

        vec![
            corner(i, j),
            corner(i + 1, j),
            corner(i + 1, j + 1),
            corner(i, j + 1),
            x_mid(i, j),     // bottom edge
            y_mid(i + 1, j), // right edge
            x_mid(i, j + 1), // top edge
            y_mid(i, j),     // left edge
        ]
    }
}
