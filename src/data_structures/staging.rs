//! CPU-side staging buffer for blueprint quads.

use crate::data_structures::vertex::{BlockVertex, VERTEX_SIZE};

/// Default staging capacity in bytes (2 MiB).
pub const DEFAULT_BUFFER_SIZE: usize = 2_097_152;

/// Vertices per quad primitive.
pub const QUAD_VERTICES: u32 = 4;

/// Accumulates whole quads as raw vertex bytes.
///
/// Builders are owned by a tessellator, which opens one for its building
/// session and seals it afterwards; callers only ever borrow it. Geometry can only be appended four vertices at a
/// time, so the byte length is always a multiple of one quad.
#[derive(Debug, Clone)]
pub struct BufferBuilder {
    data: Vec<u8>,
    vertex_count: u32,
    drawing: bool,
    finished: bool,
}

impl BufferBuilder {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            vertex_count: 0,
            drawing: false,
            finished: false,
        }
    }

    /// Clears any previous content and opens the builder for writing.
    pub(crate) fn begin(&mut self) {
        self.data.clear();
        self.vertex_count = 0;
        self.drawing = true;
        self.finished = false;
    }

    /// Seals the builder. No further writes are accepted.
    pub(crate) fn finish(&mut self) {
        self.drawing = false;
        self.finished = true;
        log::debug!(
            "Staging buffer sealed with {} quads ({} bytes)",
            self.quad_count(),
            self.data.len()
        );
    }

    /// Appends one quad. The vertices are expected in counter-clockwise order
    /// when looking at the visible side.
    pub fn quad(&mut self, vertices: [BlockVertex; 4]) -> &mut Self {
        if !self.drawing {
            log::warn!("Ignoring quad written to a staging buffer that is not building");
            return self;
        }
        self.data.extend_from_slice(bytemuck::cast_slice(&vertices));
        self.vertex_count += QUAD_VERTICES;
        self
    }

    pub fn extend_quads<I>(&mut self, quads: I) -> &mut Self
    where
        I: IntoIterator<Item = [BlockVertex; 4]>,
    {
        for quad in quads {
            self.quad(quad);
        }
        self
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn quad_count(&self) -> u32 {
        self.vertex_count / QUAD_VERTICES
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Raw staged bytes, `vertex_count * 28` long.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Staged vertices, reinterpreted from the raw bytes.
    pub fn vertices(&self) -> Vec<BlockVertex> {
        // The backing Vec<u8> carries no alignment guarantee, so copy out.
        self.data
            .chunks_exact(VERTEX_SIZE as usize)
            .map(bytemuck::pod_read_unaligned::<BlockVertex>)
            .collect()
    }

    /// Staged quads, four vertices each.
    pub fn quads(&self) -> Vec<[BlockVertex; 4]> {
        self.vertices()
            .chunks_exact(QUAD_VERTICES as usize)
            .map(|q| [q[0], q[1], q[2], q[3]])
            .collect()
    }
}
