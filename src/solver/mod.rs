//! Periodic unit-cell homogenization solvers.
//!
//! [`PeriodicCellSolver`] implements the physics-agnostic orchestration;
//! the per-physics policies ([`ElasticPhysics`], [`TransportPhysics`],
//! [`PiezoelectricPhysics`]) plug in kernels, dof maps, macroscopic loading
//! construction, and result extraction. Type aliases name the common
//! combinations:
//!
//! ```no_run
//! use unicell::{LinearElasticSolver, ElasticPhysics, Quad8Grid};
//! use unicell::{LinearElasticMaterial, PlaneCondition, SolverOptions};
//!
//! let mut grid = Quad8Grid::new(&[3, 3], &[1.0, 1.0])?;
//! grid.set_densities_ones();
//!
//! let material = LinearElasticMaterial::isotropic_2d(
//!     1.0, 0.3, PlaneCondition::PlaneStress,
//! )?;
//!
//! let solver = LinearElasticSolver::new(&grid, &material, ElasticPhysics::default())?;
//! let results = solver.solve(&SolverOptions::default())?;
//! println!("{}", results.c_bar);
//! # Ok::<(), unicell::Error>(())
//! ```

mod cell;
mod elastic;
mod krylov;
mod options;
mod piezoelectric;
mod transport;

pub use cell::{PeriodicCellSolver, Physics};
pub use elastic::{ElasticPhysics, ElasticResults, LinearElasticSolver};
pub use krylov::{bicgstab, conjugate_gradient};
pub use options::{FieldSave, SolverOptions};
pub use piezoelectric::{LinearPiezoelectricSolver, PiezoelectricPhysics, PiezoelectricResults};
pub use transport::{LinearTransportSolver, TransportPhysics, TransportResults};

use nalgebra::{DMatrix, DVector};

/// Reshape one loading column of a node-interleaved dof field into a
/// `num_nodes × dim` nodal field.
pub(crate) fn reshape_nodal_field(
    column: &DVector<f64>,
    num_nodes: usize,
    dim: usize,
) -> DMatrix<f64> {
    DMatrix::from_fn(num_nodes, dim, |i, d| column[dim * i + d])
}
