//! Reference finite elements.
//!
//! The [`Element`] trait defines the reference-domain data every element kind
//! provides: local nodes, shape functions, shape-function gradients, a
//! quadrature rule of sufficient order, and Gmsh output metadata. Derived
//! quantities (Jacobian, measure) are provided generically.
//!
//! # Element catalogue
//!
//! - [`Quad4`] — 4-node bilinear quadrilateral (2×2 quadrature)
//! - [`Quad8`] — 8-node serendipity quadrilateral (3×3 quadrature)
//! - [`Hex8`] — 8-node trilinear hexahedron (2×2×2 quadrature)
//! - [`Hex20`] — 20-node serendipity hexahedron (3×3×3 quadrature)
//!
//! Local node ordering is corners first, then edge midpoints, matching the
//! shape-function ordering used by the kernels and grids.

use crate::quadrature::{integrate_scalar, GaussPoint};
use nalgebra::{DMatrix, DVector};

mod hex20;
mod hex8;
mod quad4;
mod quad8;

pub use hex20::Hex20;
pub use hex8::Hex8;
pub use quad4::Quad4;
pub use quad8::Quad8;

/// Reference finite element interface.
///
/// All methods are associated functions: element kinds are zero-sized type
/// markers, selected as generic parameters of grids, kernels, and solvers.
///
/// Points are passed as `[ξ, η, ζ]` with ζ ignored by 2D elements.
pub trait Element {
    /// Spatial dimension (2 or 3).
    const DIM: usize;

    /// Number of nodes.
    const NUM_NODES: usize;

    /// Local nodal coordinates on the reference domain [-1, 1]ᴰ.
    ///
    /// Returns a `NUM_NODES × DIM` matrix, corners first.
    fn local_nodes() -> DMatrix<f64>;

    /// Shape functions N(ξ) evaluated at a local point.
    ///
    /// Satisfies the partition of unity ΣᵢNᵢ = 1 and the Kronecker-delta
    /// property Nᵢ(xⱼ) = δᵢⱼ at local nodes.
    fn shape_functions(point: &[f64; 3]) -> DVector<f64>;

    /// Shape function gradients ∂N/∂ξ evaluated at a local point.
    ///
    /// Returns a `DIM × NUM_NODES` matrix; row d holds ∂Nᵢ/∂ξ_d.
    fn grad_shape_functions(point: &[f64; 3]) -> DMatrix<f64>;

    /// Gauss–Legendre quadrature rule of sufficient order for the element's
    /// stiffness integrands.
    fn quadrature_rule() -> Vec<GaussPoint>;

    /// Gmsh element type id.
    fn gmsh_element_type() -> i32;

    /// Gmsh node ordering (local indices in Gmsh order).
    fn gmsh_node_ordering() -> Vec<usize>;

    /// Jacobian J = ∂N/∂ξ · nodes evaluated at a local point.
    ///
    /// `nodes` is the `NUM_NODES × DIM` matrix of physical nodal coordinates.
    fn jacobian(point: &[f64; 3], nodes: &DMatrix<f64>) -> DMatrix<f64> {
        Self::grad_shape_functions(point) * nodes
    }

    /// Area (2D) or volume (3D) of the element: ∫ |det J| dΩ̂.
    fn measure(nodes: &DMatrix<f64>) -> f64 {
        let rule = Self::quadrature_rule();

        integrate_scalar(
            |gp| Self::jacobian(&gp.coords, nodes).determinant().abs(),
            &rule,
        )
    }
}
