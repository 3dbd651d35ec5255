//! Blueprint geometry data structures.
//!
//! - `vertex` is the fixed 28 byte vertex record and its element list
//! - `staging` is the CPU-side buffer quads are written into while building
//! - `texture` wraps GPU textures for the block atlas and render targets

pub mod staging;
pub mod texture;
pub mod vertex;
