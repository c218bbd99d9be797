//! Matrix-free global operator and its physics-specific dof maps.
//!
//! The reduced global stiffness K never exists as a sparse matrix: the
//! [`MatrixFreeOperator`] applies it element-by-element from one reference
//! element stiffness, per-element densities, and precomputed reduced dof
//! indices. An [`OperatorTraits`] implementation per physics owns the dof
//! bookkeeping: layout of element dofs, which dofs are pinned to remove the
//! rigid-body/constant-mode nullspace, and the bijection between reduced
//! and expanded dof indices.

mod jacobi;
mod matrix_free;
mod traits;

pub use jacobi::JacobiPreconditioner;
pub use matrix_free::MatrixFreeOperator;
pub use traits::{ElasticOperatorTraits, PiezoelectricOperatorTraits, TransportOperatorTraits};

/// Physics-specific dof bookkeeping for the matrix-free operator.
///
/// `num_nodes` is the node count of whichever view the caller works in
/// (periodic during solves, standard during field expansion); multi-physics
/// layouts need it to offset their secondary dof blocks.
pub trait OperatorTraits {
    /// Dofs carried per node.
    const NUM_NODE_DOFS: usize;

    /// Number of dofs fixed to remove the nullspace.
    const NUM_FIXED_DOFS: usize;

    /// Flat list of global dofs for an element's nodes, in the local
    /// ordering the kernels use.
    fn dofs(element: &[usize], num_nodes: usize) -> Vec<usize>;

    /// `true` if the global dof is fixed (pinned to zero).
    fn is_fixed_dof(dof: usize, num_nodes: usize) -> bool;

    /// Map an unfixed global dof into the reduced index space.
    fn reduced_dof(dof: usize, num_nodes: usize) -> usize;

    /// Map a reduced dof back to its global index.
    fn expanded_dof(dof: usize, num_nodes: usize) -> usize;
}
