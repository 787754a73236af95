//! Spatial indexing for proximity queries

pub mod sparse_hash;

pub use sparse_hash::SparseHashGrid;
