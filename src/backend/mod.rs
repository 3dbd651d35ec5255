//! Platform rendering backend abstraction.
//!
//! The tessellator never talks to a graphics API directly. Everything it needs
//! (buffer storage, attribute arrays, pointer setup, draw submission) goes
//! through [`RenderBackend`]. The protocol mirrors a fixed-function pipeline:
//! state is toggled on, a draw is issued, state is toggled off again.
//!
//! [`gpu::GpuBackend`] implements the protocol on top of wgpu.

pub mod gpu;

use crate::data_structures::vertex::ComponentType;

/// Global render capabilities toggled around a blueprint draw.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Standard scene/item lighting.
    StandardLighting,
    /// Lightmap shading on the secondary texture unit.
    Lightmap,
    /// Back-face culling.
    CullFace,
}

/// Client-side vertex attribute arrays.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ClientArray {
    Vertex,
    Color,
    /// Texture coordinates of the currently active texture unit.
    TexCoord,
}

/// Texture units used by blueprint geometry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureUnit {
    /// Block atlas.
    Primary,
    /// Lightmap.
    Lightmap,
}

impl TextureUnit {
    pub fn index(&self) -> u32 {
        match self {
            TextureUnit::Primary => 0,
            TextureUnit::Lightmap => 1,
        }
    }

    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(TextureUnit::Primary),
            1 => Some(TextureUnit::Lightmap),
            _ => None,
        }
    }
}

/// Describes where an attribute lives inside the bound vertex buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AttributePointer {
    pub components: u32,
    pub component_type: ComponentType,
    pub stride: u32,
    pub offset: u32,
}

/// Rendering primitives consumed by the tessellator.
///
/// All calls are synchronous submissions; a backend that executes them
/// asynchronously must still preserve call order.
pub trait RenderBackend {
    /// Backend-resident vertex buffer object.
    type Buffer;

    fn create_buffer(&mut self, label: &str) -> Self::Buffer;
    fn destroy_buffer(&mut self, buffer: Self::Buffer);
    /// Replaces the content of `buffer` with `data` holding `vertex_count` vertices.
    fn upload(&mut self, buffer: &mut Self::Buffer, data: &[u8], vertex_count: u32);
    fn bind_buffer(&mut self, buffer: &Self::Buffer);
    fn unbind_buffer(&mut self);

    fn set_capability(&mut self, capability: Capability, enabled: bool);
    fn push_matrix(&mut self);
    fn pop_matrix(&mut self);

    /// Selects the texture unit that `TexCoord` array calls refer to.
    fn client_active_texture(&mut self, unit: TextureUnit);
    fn enable_client_state(&mut self, array: ClientArray);
    fn disable_client_state(&mut self, array: ClientArray);
    fn attribute_pointer(&mut self, array: ClientArray, pointer: AttributePointer);

    /// Binds the block texture atlas on the primary unit.
    fn bind_atlas(&mut self);
    /// Draws `count` vertices starting at `first` from the bound buffer, four per quad.
    fn draw_quads(&mut self, first: u32, count: u32);
    /// Resets the immediate-mode colour to opaque white.
    fn clear_current_color(&mut self);
}
