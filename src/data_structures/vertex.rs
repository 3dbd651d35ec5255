//! Fixed vertex layout for blueprint geometry.
//!
//! Every vertex written into a [`crate::data_structures::staging::BufferBuilder`]
//! is a [`BlockVertex`]: position, packed colour, atlas UV and lightmap UV.
//! The byte layout is fixed so that attribute pointers can be configured with
//! the constants below without inspecting the data.

use std::mem;

/// Byte size of one [`BlockVertex`].
pub const VERTEX_SIZE: u32 = 28;
pub const POSITION_OFFSET: u32 = 0;
pub const COLOR_OFFSET: u32 = 12;
pub const TEX_COORD_OFFSET: u32 = 16;
pub const LIGHT_TEX_COORD_OFFSET: u32 = 24;

pub const POSITION_COMPONENTS: u32 = 3;
pub const COLOR_COMPONENTS: u32 = 4;
pub const TEX_COORD_COMPONENTS: u32 = 2;
pub const LIGHT_TEX_COORD_COMPONENTS: u32 = TEX_COORD_COMPONENTS;

/// A single vertex as it is stored in GPU memory.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlockVertex {
    pub position: [f32; 3],
    pub color: [u8; 4],
    pub tex_coords: [f32; 2],
    pub light_coords: [i16; 2],
}

impl BlockVertex {
    pub fn new(position: [f32; 3], color: [u8; 4], tex_coords: [f32; 2], light_coords: [i16; 2]) -> Self {
        Self {
            position,
            color,
            tex_coords,
            light_coords,
        }
    }

    /**
     * Tells wgpu what the 28 bytes of a vertex refer to. Locations follow the order of
     * `VertexFormat::BLOCK` so shader inputs line up with the element list.
     */
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 4] = [
            wgpu::VertexAttribute {
                offset: POSITION_OFFSET as wgpu::BufferAddress,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: COLOR_OFFSET as wgpu::BufferAddress,
                shader_location: 1,
                format: wgpu::VertexFormat::Unorm8x4,
            },
            wgpu::VertexAttribute {
                offset: TEX_COORD_OFFSET as wgpu::BufferAddress,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
            // Lightmap coordinates stay integral on the GPU side.
            wgpu::VertexAttribute {
                offset: LIGHT_TEX_COORD_OFFSET as wgpu::BufferAddress,
                shader_location: 3,
                format: wgpu::VertexFormat::Sint16x2,
            },
        ];
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<BlockVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// What a vertex element is used for. `Uv` carries the texture unit index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ElementUsage {
    Position,
    Color,
    Uv(u32),
}

/// Scalar type of the components of an element.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Float,
    UnsignedByte,
    Short,
}

impl ComponentType {
    pub fn size(&self) -> u32 {
        match self {
            ComponentType::Float => 4,
            ComponentType::UnsignedByte => 1,
            ComponentType::Short => 2,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexElement {
    pub usage: ElementUsage,
    pub components: u32,
    pub component_type: ComponentType,
    pub offset: u32,
}

impl VertexElement {
    pub const fn new(usage: ElementUsage, components: u32, component_type: ComponentType, offset: u32) -> Self {
        Self {
            usage,
            components,
            component_type,
            offset,
        }
    }

    pub fn byte_size(&self) -> u32 {
        self.components * self.component_type.size()
    }
}

/// Ordered list of elements making up one vertex.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexFormat {
    elements: &'static [VertexElement],
}

impl VertexFormat {
    /// The layout of [`BlockVertex`].
    pub const BLOCK: VertexFormat = VertexFormat {
        elements: &[
            VertexElement::new(ElementUsage::Position, POSITION_COMPONENTS, ComponentType::Float, POSITION_OFFSET),
            VertexElement::new(ElementUsage::Color, COLOR_COMPONENTS, ComponentType::UnsignedByte, COLOR_OFFSET),
            VertexElement::new(ElementUsage::Uv(0), TEX_COORD_COMPONENTS, ComponentType::Float, TEX_COORD_OFFSET),
            VertexElement::new(
                ElementUsage::Uv(1),
                LIGHT_TEX_COORD_COMPONENTS,
                ComponentType::Short,
                LIGHT_TEX_COORD_OFFSET,
            ),
        ],
    };

    pub fn elements(&self) -> &'static [VertexElement] {
        self.elements
    }

    pub fn stride(&self) -> u32 {
        self.elements.iter().map(VertexElement::byte_size).sum()
    }
}
