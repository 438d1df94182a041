//! Layout assignment for grid-like containers.

pub mod grid_matrix;

pub use grid_matrix::{GridCell, GridMatrix};
