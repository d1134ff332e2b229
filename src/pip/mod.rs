//! Point-in-Polygon (PIP) relation source.
//!
//! Holds administrative boundaries and point features in memory and answers
//! relation queries with an R-tree spatial index, without any upstream service.

mod boundary;
mod index;
mod service;

pub use boundary::{load_boundaries, Boundary};
pub use index::BoundaryIndex;
