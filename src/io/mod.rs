//! File output for downstream visualization.

pub mod gmsh;

pub use gmsh::{save_grid, save_grid_and_field};
