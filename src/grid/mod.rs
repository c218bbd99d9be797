//! Structured periodic unit-cell grids.
//!
//! A [`Grid`] is a regular tiling of one element kind over a rectangular
//! unit cell. It owns the immutable resolution and physical size and the
//! mutable per-element material densities, and produces node coordinates and
//! element connectivity in two views:
//!
//! - *standard*: every distinct geometric node has a unique index;
//! - *periodic*: nodes that differ only by a lattice translation of the
//!   unit cell are identified.
//!
//! Densities are stored row-major (x fastest, then y, then z) and clamped to
//! a small positive floor so element matrices stay nonsingular at vanishing
//! density.

use crate::element::Element;
use crate::error::{Error, Result};
use crate::numeric::NUMERICAL_ZERO;
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::BufRead;
use std::marker::PhantomData;
use std::path::Path;

mod hex20;
mod hex8;
mod quad4;
mod quad8;

/// Structured-grid connectivity for an element kind.
///
/// Implementations assume `resolution`/`size` have length `DIM` and indices
/// are in range; [`Grid`] validates both before delegating.
pub trait GridTopology: Element {
    /// Number of distinct geometric nodes.
    fn num_nodes(resolution: &[usize]) -> usize;

    /// Number of nodes after periodic identification.
    fn num_periodic_nodes(resolution: &[usize]) -> usize;

    /// Coordinates of a node in the standard view.
    fn node(resolution: &[usize], size: &[f64], index: usize) -> DVector<f64>;

    /// Standard-view node indices for an element, in local ordering.
    fn element(resolution: &[usize], index: usize) -> Vec<usize>;

    /// Periodic-view node indices for an element, in the same local ordering.
    fn periodic_element(resolution: &[usize], index: usize) -> Vec<usize>;
}

/// A periodic unit-cell grid of one element kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<E: GridTopology> {
    resolution: Vec<usize>,
    size: Vec<f64>,
    densities: Vec<f64>,
    _element: PhantomData<E>,
}

/// 2D grid of 4-node quadrilaterals.
pub type Quad4Grid = Grid<crate::element::Quad4>;
/// 2D grid of 8-node serendipity quadrilaterals.
pub type Quad8Grid = Grid<crate::element::Quad8>;
/// 3D grid of 8-node hexahedra.
pub type Hex8Grid = Grid<crate::element::Hex8>;
/// 3D grid of 20-node serendipity hexahedra.
pub type Hex20Grid = Grid<crate::element::Hex20>;

impl<E: GridTopology> Grid<E> {
    /// Create a grid with the given per-axis element counts and physical
    /// lengths. Densities start at the numerical zero floor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the slice lengths do not equal
    /// the element dimension, any resolution entry is zero, or any size
    /// entry is non-positive.
    pub fn new(resolution: &[usize], size: &[f64]) -> Result<Self> {
        if resolution.len() != E::DIM {
            return Err(Error::InvalidArgument(format!(
                "resolution length ({}) must equal grid dimension ({})",
                resolution.len(),
                E::DIM
            )));
        }
        if size.len() != E::DIM {
            return Err(Error::InvalidArgument(format!(
                "size length ({}) must equal grid dimension ({})",
                size.len(),
                E::DIM
            )));
        }

        for d in 0..E::DIM {
            if resolution[d] == 0 {
                return Err(Error::InvalidArgument(format!(
                    "resolution in dimension {} must be positive",
                    d + 1
                )));
            }
            if size[d] <= 0.0 {
                return Err(Error::InvalidArgument(format!(
                    "size in dimension {} ({}) must be positive",
                    d + 1,
                    size[d]
                )));
            }
        }

        let num_elements = resolution.iter().product();

        Ok(Self {
            resolution: resolution.to_vec(),
            size: size.to_vec(),
            densities: vec![NUMERICAL_ZERO; num_elements],
            _element: PhantomData,
        })
    }

    /// Element counts per axis.
    pub fn resolution(&self) -> &[usize] {
        &self.resolution
    }

    /// Physical lengths per axis.
    pub fn size(&self) -> &[f64] {
        &self.size
    }

    /// Per-element material densities, row-major.
    pub fn densities(&self) -> &[f64] {
        &self.densities
    }

    /// Number of elements.
    pub fn num_elements(&self) -> usize {
        self.densities.len()
    }

    /// Number of distinct geometric nodes.
    pub fn num_nodes(&self) -> usize {
        E::num_nodes(&self.resolution)
    }

    /// Number of nodes after periodic identification.
    pub fn num_periodic_nodes(&self) -> usize {
        E::num_periodic_nodes(&self.resolution)
    }

    /// Coordinates of a node in the standard view.
    pub fn node(&self, index: usize) -> Result<DVector<f64>> {
        if index >= self.num_nodes() {
            return Err(Error::OutOfRange(format!(
                "node index ({}) is out of range [0,{})",
                index,
                self.num_nodes()
            )));
        }

        Ok(E::node(&self.resolution, &self.size, index))
    }

    /// Coordinates of all nodes in the standard view.
    pub fn nodes(&self) -> Vec<DVector<f64>> {
        (0..self.num_nodes())
            .map(|i| E::node(&self.resolution, &self.size, i))
            .collect()
    }

    /// Standard-view node indices for an element.
    pub fn element(&self, index: usize) -> Result<Vec<usize>> {
        self.check_element_index(index)?;

        Ok(E::element(&self.resolution, index))
    }

    /// Standard-view node indices for all elements.
    pub fn elements(&self) -> Vec<Vec<usize>> {
        (0..self.num_elements())
            .map(|i| E::element(&self.resolution, i))
            .collect()
    }

    /// Periodic-view node indices for an element.
    pub fn periodic_element(&self, index: usize) -> Result<Vec<usize>> {
        self.check_element_index(index)?;

        Ok(E::periodic_element(&self.resolution, index))
    }

    /// Periodic-view node indices for all elements.
    pub fn periodic_elements(&self) -> Vec<Vec<usize>> {
        (0..self.num_elements())
            .map(|i| E::periodic_element(&self.resolution, i))
            .collect()
    }

    /// Material density of an element.
    pub fn density(&self, index: usize) -> Result<f64> {
        self.check_element_index(index)?;

        Ok(self.densities[index])
    }

    /// Set the material density of an element.
    ///
    /// Values below the numerical zero floor are clamped up to it.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] for a bad index, [`Error::InvalidArgument`] for
    /// a density outside [0, 1].
    pub fn set_density(&mut self, index: usize, density: f64) -> Result<()> {
        self.check_element_index(index)?;

        if !(0.0..=1.0).contains(&density) {
            return Err(Error::InvalidArgument(format!(
                "density ({}) is out of range [0,1]",
                density
            )));
        }

        self.densities[index] = density.max(NUMERICAL_ZERO);
        Ok(())
    }

    /// Set all densities from a row-major sequence.
    pub fn set_densities(&mut self, densities: &[f64]) -> Result<()> {
        if densities.len() != self.num_elements() {
            return Err(Error::InvalidArgument(format!(
                "densities length ({}) must equal number of grid elements ({})",
                densities.len(),
                self.num_elements()
            )));
        }

        for (i, &density) in densities.iter().enumerate() {
            self.set_density(i, density)?;
        }

        Ok(())
    }

    /// Set all densities to a constant value.
    pub fn set_densities_constant(&mut self, density: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&density) {
            return Err(Error::InvalidArgument(format!(
                "density ({}) is out of range [0,1]",
                density
            )));
        }

        self.densities.fill(density.max(NUMERICAL_ZERO));
        Ok(())
    }

    /// Set all densities to zero (clamped to the numerical floor).
    pub fn set_densities_zeros(&mut self) {
        self.densities.fill(NUMERICAL_ZERO);
    }

    /// Set all densities to one.
    pub fn set_densities_ones(&mut self) {
        self.densities.fill(1.0);
    }

    /// Set all densities to uniform random values in [floor, 1].
    ///
    /// A `seed` makes the sequence reproducible (`StdRng::seed_from_u64`);
    /// `None` seeds from entropy.
    pub fn set_densities_random(&mut self, seed: Option<u64>) {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        for density in &mut self.densities {
            *density = rng.gen_range(NUMERICAL_ZERO..=1.0);
        }
    }

    /// Set densities from a continuous function of physical position.
    ///
    /// Each element receives the element-average ∫ f(x) |det J| dΩ̂ / measure,
    /// with `f` sampled once per quadrature point.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if any sampled value lies outside [0, 1].
    pub fn set_densities_fn<F>(&mut self, f: F) -> Result<()>
    where
        F: Fn(&[f64]) -> f64,
    {
        let rule = E::quadrature_rule();

        for index in 0..self.num_elements() {
            let nodes = self.element_nodes_unchecked(index);

            let mut integral = 0.0;
            for gp in &rule {
                let n = E::shape_functions(&gp.coords);
                let physical = nodes.transpose() * &n;

                let value = f(physical.as_slice());
                if !(0.0..=1.0).contains(&value) {
                    return Err(Error::InvalidArgument(format!(
                        "function value ({}) is outside range [0,1]",
                        value
                    )));
                }

                let det_j = E::jacobian(&gp.coords, &nodes).determinant().abs();
                integral += gp.weight * value * det_j;
            }

            // Quadrature roundoff can push the average marginally outside
            // [0,1] even when every sample is in range.
            let density = (integral / E::measure(&nodes)).clamp(0.0, 1.0);
            self.set_density(index, density)?;
        }

        Ok(())
    }

    /// Set densities from a CSV file (2D grids only).
    ///
    /// The file must contain `ny` non-empty rows of `nx` comma-separated
    /// values in [0, 1]; row 0 of the file is the TOP row of the grid
    /// (origin at the bottom-left).
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the file cannot be opened or read, [`Error::Parse`]
    /// on non-numeric cells, [`Error::InvalidArgument`] on out-of-range
    /// values or shape mismatch, and [`Error::InvalidArgument`] on 3D grids.
    pub fn set_densities_from_csv<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        if E::DIM != 2 {
            return Err(Error::InvalidArgument(
                "CSV densities are only supported for 2D grids".into(),
            ));
        }

        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);

        let nx = self.resolution[0];
        let ny = self.resolution[1];

        let mut rows: Vec<Vec<f64>> = Vec::with_capacity(ny);

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let mut row = Vec::with_capacity(nx);
            for cell in line.split(',') {
                let cell = cell.trim();
                if cell.is_empty() {
                    continue;
                }

                let value: f64 = cell.parse().map_err(|_| {
                    Error::Parse(format!(
                        "{} contains non-numeric data ({:?})",
                        path.display(),
                        cell
                    ))
                })?;

                if !(0.0..=1.0).contains(&value) {
                    return Err(Error::InvalidArgument(format!(
                        "{} contains data ({}) outside the range [0,1]",
                        path.display(),
                        value
                    )));
                }

                row.push(value);
            }

            if row.is_empty() {
                continue;
            }

            if row.len() != nx {
                return Err(Error::InvalidArgument(format!(
                    "{} number of columns ({}) does not equal grid x-resolution ({})",
                    path.display(),
                    row.len(),
                    nx
                )));
            }

            rows.push(row);
        }

        if rows.len() != ny {
            return Err(Error::InvalidArgument(format!(
                "{} number of rows ({}) does not equal grid y-resolution ({})",
                path.display(),
                rows.len(),
                ny
            )));
        }

        // File row 0 is the top of the grid
        for (i, row) in rows.iter().enumerate() {
            let row_start = nx * (ny - 1 - i);
            for (j, &value) in row.iter().enumerate() {
                self.set_density(row_start + j, value)?;
            }
        }

        Ok(())
    }

    /// Circularly shift the densities by whole elements along each axis.
    ///
    /// Equivalent to relabeling the lattice origin; `translate(shift)`
    /// followed by `translate(resolution - shift)` is the identity.
    pub fn translate(&mut self, shift: &[usize]) -> Result<()> {
        if shift.len() != E::DIM {
            return Err(Error::InvalidArgument(format!(
                "shift length ({}) must equal grid dimension ({})",
                shift.len(),
                E::DIM
            )));
        }

        let mut shifted = vec![0.0; self.num_elements()];

        for index in 0..self.num_elements() {
            let mut remainder = index;
            let mut new_index = 0;
            let mut stride = 1;

            for d in 0..E::DIM {
                let n = self.resolution[d];
                let i = remainder % n;
                remainder /= n;

                new_index += ((i + shift[d]) % n) * stride;
                stride *= n;
            }

            shifted[new_index] = self.densities[index];
        }

        self.densities = shifted;
        Ok(())
    }

    /// Nodal coordinates of an element as a `NUM_NODES × DIM` matrix.
    pub fn element_nodes(&self, index: usize) -> Result<DMatrix<f64>> {
        self.check_element_index(index)?;

        Ok(self.element_nodes_unchecked(index))
    }

    /// Grid area (2D) or volume (3D).
    ///
    /// All elements of a structured grid are congruent, so this is the
    /// reference element's measure times the element count.
    pub fn measure(&self) -> f64 {
        let nodes = self.element_nodes_unchecked(0);

        E::measure(&nodes) * self.num_elements() as f64
    }

    fn element_nodes_unchecked(&self, index: usize) -> DMatrix<f64> {
        let element = E::element(&self.resolution, index);

        let mut nodes = DMatrix::zeros(E::NUM_NODES, E::DIM);
        for (row, &node_index) in element.iter().enumerate() {
            let point = E::node(&self.resolution, &self.size, node_index);
            for d in 0..E::DIM {
                nodes[(row, d)] = point[d];
            }
        }

        nodes
    }

    fn check_element_index(&self, index: usize) -> Result<()> {
        if index >= self.num_elements() {
            return Err(Error::OutOfRange(format!(
                "element index ({}) is out of range [0,{})",
                index,
                self.num_elements()
            )));
        }

        Ok(())
    }
}
