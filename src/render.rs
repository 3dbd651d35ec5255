//! Per-frame driver for a blueprint preview.
//!
//! [`StructurePreview`] owns one [`StructureTessellator`] for the lifetime of
//! a preview session and encodes the render-loop contract: upload when ready,
//! then draw if visible. It also owns the teardown that releases the backend
//! buffer when the preview is discarded.

use crate::{
    backend::RenderBackend,
    compat::{CompatHook, NoCompat},
    data_structures::staging::BufferBuilder,
    tessellator::{StructureTessellator, TessellatorConfig, TessellatorResult},
};

/// Outcome of [`StructurePreview::render_frame`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Geometry was drawn.
    Drawn,
    /// The preview is hidden.
    Hidden,
    /// Geometry is not finished yet.
    Pending,
}

pub struct StructurePreview<B: RenderBackend, H: CompatHook<B> = NoCompat> {
    tessellator: StructureTessellator<B, H>,
    visible: bool,
}

impl<B: RenderBackend> StructurePreview<B, NoCompat> {
    pub fn new(backend: &mut B, config: TessellatorConfig) -> Self {
        Self::with_hook(backend, config, NoCompat)
    }
}

impl<B: RenderBackend, H: CompatHook<B>> StructurePreview<B, H> {
    pub fn with_hook(backend: &mut B, config: TessellatorConfig, hook: H) -> Self {
        Self {
            tessellator: StructureTessellator::with_hook(backend, config, hook),
            visible: true,
        }
    }

    /// Runs a whole building session: `produce` writes the quads into the staging buffer.
    pub fn build<F>(&mut self, produce: F) -> TessellatorResult<()>
    where
        F: FnOnce(&mut BufferBuilder),
    {
        self.tessellator.start_building()?;
        produce(self.tessellator.builder()?);
        self.tessellator.finish_building()
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn tessellator(&self) -> &StructureTessellator<B, H> {
        &self.tessellator
    }

    pub fn tessellator_mut(&mut self) -> &mut StructureTessellator<B, H> {
        &mut self.tessellator
    }

    /// Call once per frame on the render thread.
    pub fn render_frame(&mut self, backend: &mut B) -> TessellatorResult<Frame> {
        self.tessellator.ensure_uploaded(backend);
        if !self.tessellator.is_built() {
            return Ok(Frame::Pending);
        }
        if !self.visible {
            return Ok(Frame::Hidden);
        }
        self.tessellator.draw(backend)?;
        Ok(Frame::Drawn)
    }

    /// Releases the backend buffer of this preview.
    pub fn discard(self, backend: &mut B) {
        self.tessellator.destroy(backend);
    }
}
