//! blueprint-render
//!
//! Tessellation and rendering of structure blueprint previews. Geometry
//! producers write quads into a staging buffer, the tessellator uploads them
//! once into a backend vertex buffer and then draws them every frame inside a
//! balanced render-state bracket.
//!
//! High-level modules
//! - `tessellator`: the build/upload/draw state machine
//! - `render_state`: scoped setup and teardown around each draw
//! - `compat`: optional hooks into the draw bracket and the upload
//! - `backend`: the rendering primitives the tessellator needs, and a wgpu implementation
//! - `data_structures`: vertex layout, staging buffer, textures
//! - `render`: per-frame preview driver
//! - `context`, `pipelines`, `resources`: wgpu device, pipelines and bind groups
//!

pub mod backend;
pub mod compat;
pub mod context;
pub mod data_structures;
pub mod pipelines;
pub mod render;
pub mod render_state;
pub mod resources;
pub mod tessellator;

// Re-exports commonly used types for convenience in downstream code.
pub use backend::RenderBackend;
pub use compat::{CompatHook, FaceNormals, NoCompat, PointerSetup};
pub use data_structures::{staging::BufferBuilder, vertex::BlockVertex};
pub use render::{Frame, StructurePreview};
pub use tessellator::{State, StructureTessellator, TessellatorConfig, TessellatorError};
