//! wgpu implementation of [`RenderBackend`].
//!
//! wgpu has no fixed-function state, so [`GpuBackend`] keeps an emulated copy
//! of it: enabled arrays, active texture unit, attribute pointers, capability
//! flags and the bound buffer. A quad draw is only accepted when that state
//! describes the [`BlockVertex`] layout; it is then recorded as a
//! [`DrawCommand`] and encoded later with [`GpuBackend::replay`].
//!
//! wgpu also has no quad primitive. Quads are drawn as two triangles each
//! through a shared index buffer that grows with the largest upload.

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::{
    backend::{AttributePointer, Capability, ClientArray, RenderBackend, TextureUnit},
    context::Context,
    data_structures::{
        staging::QUAD_VERTICES,
        texture::Texture,
        vertex::{BlockVertex, ElementUsage, VERTEX_SIZE, VertexFormat},
    },
    pipelines::blueprint::BlueprintPipelines,
    resources::atlas_bind_group,
};

const QUAD_INDEX_PATTERN: [u32; 6] = [0, 1, 2, 2, 3, 0];
const INDICES_PER_QUAD: u32 = QUAD_INDEX_PATTERN.len() as u32;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    fn new(view_proj: cgmath::Matrix4<f32>) -> Self {
        Self {
            view_proj: view_proj.into(),
        }
    }
}

/// A vertex buffer owned by a tessellator.
///
/// The wgpu buffer is created lazily on the first upload because wgpu
/// buffers cannot be resized and the size is only known then.
#[derive(Debug)]
pub struct GpuBuffer {
    label: String,
    buffer: Option<wgpu::Buffer>,
    vertex_count: u32,
}

impl GpuBuffer {
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn is_allocated(&self) -> bool {
        self.buffer.is_some()
    }
}

/// One accepted quad draw, ready to be encoded into a render pass.
#[derive(Debug, Clone)]
pub struct DrawCommand {
    pub buffer: wgpu::Buffer,
    pub first: u32,
    pub count: u32,
    pub cull: bool,
}

impl DrawCommand {
    pub fn quad_count(&self) -> u32 {
        self.count / QUAD_VERTICES
    }
}

#[derive(Debug, Default)]
struct FixedFunctionState {
    lighting: bool,
    lightmap: bool,
    cull: bool,
    atlas_bound: bool,
    active_unit: Option<TextureUnit>,
    enabled: HashMap<(ClientArray, TextureUnit), bool>,
    pointers: HashMap<(ClientArray, TextureUnit), AttributePointer>,
    bound: Option<(wgpu::Buffer, u32)>,
    matrix_depth: u32,
}

impl FixedFunctionState {
    fn unit(&self) -> TextureUnit {
        self.active_unit.unwrap_or(TextureUnit::Primary)
    }

    /// Vertex and colour arrays are not per unit; only coordinates are.
    fn key(&self, array: ClientArray) -> (ClientArray, TextureUnit) {
        match array {
            ClientArray::TexCoord => (array, self.unit()),
            ClientArray::Vertex | ClientArray::Color => (array, TextureUnit::Primary),
        }
    }

    fn is_enabled(&self, key: (ClientArray, TextureUnit)) -> bool {
        self.enabled.get(&key).copied().unwrap_or(false)
    }
}

fn element_key(usage: ElementUsage) -> Option<(ClientArray, TextureUnit)> {
    match usage {
        ElementUsage::Position => Some((ClientArray::Vertex, TextureUnit::Primary)),
        ElementUsage::Color => Some((ClientArray::Color, TextureUnit::Primary)),
        ElementUsage::Uv(index) => TextureUnit::from_index(index).map(|unit| (ClientArray::TexCoord, unit)),
    }
}

pub struct GpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipelines: BlueprintPipelines,
    atlas: wgpu::BindGroup,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    quad_indices: Option<wgpu::Buffer>,
    quad_index_capacity: u32,
    state: FixedFunctionState,
    commands: Vec<DrawCommand>,
}

impl GpuBackend {
    pub fn new(
        ctx: &Context,
        color_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
        atlas: &Texture,
    ) -> anyhow::Result<Self> {
        let device = ctx.device.clone();
        let pipelines = BlueprintPipelines::new(&device, color_format, depth_format);
        let atlas = atlas_bind_group(&device, &pipelines.atlas_layout, atlas)?;

        let camera_uniform = CameraUniform::new(cgmath::Matrix4::from_scale(1.0));
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Blueprint Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &pipelines.camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("blueprint_camera_bind_group"),
        });

        Ok(Self {
            device,
            queue: ctx.queue.clone(),
            pipelines,
            atlas,
            camera_buffer,
            camera_bind_group,
            quad_indices: None,
            quad_index_capacity: 0,
            state: FixedFunctionState::default(),
            commands: Vec::new(),
        })
    }

    pub fn set_view_projection(&mut self, view_proj: cgmath::Matrix4<f32>) {
        let uniform = CameraUniform::new(view_proj);
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    /// Draws recorded since the last replay.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// True when no array is enabled and no buffer is bound.
    pub fn is_state_clean(&self) -> bool {
        self.state.bound.is_none() && self.state.enabled.values().all(|enabled| !enabled)
    }

    /// Encodes and clears all recorded draws.
    pub fn replay(&mut self, pass: &mut wgpu::RenderPass<'_>) {
        let Some(indices) = &self.quad_indices else {
            if !self.commands.is_empty() {
                log::warn!("Dropping {} blueprint draws without a quad index buffer", self.commands.len());
            }
            self.commands.clear();
            return;
        };
        pass.set_bind_group(0, &self.atlas, &[]);
        pass.set_bind_group(1, &self.camera_bind_group, &[]);
        pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
        for command in self.commands.drain(..) {
            pass.set_pipeline(self.pipelines.for_culling(command.cull));
            pass.set_vertex_buffer(0, command.buffer.slice(..));
            pass.draw_indexed(0..command.quad_count() * INDICES_PER_QUAD, command.first as i32, 0..1);
        }
    }

    fn ensure_quad_indices(&mut self, quads: u32) {
        if quads <= self.quad_index_capacity {
            return;
        }
        let capacity = quads.next_power_of_two();
        let indices: Vec<u32> = (0..capacity)
            .flat_map(|quad| QUAD_INDEX_PATTERN.map(|i| quad * QUAD_VERTICES + i))
            .collect();
        self.quad_indices = Some(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Blueprint Quad Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
        self.quad_index_capacity = capacity;
        log::debug!("Quad index buffer grown to {} quads", capacity);
    }

    /// Checks that enabled arrays and pointers describe the blueprint pipeline's input.
    fn validate_draw(&self) -> Result<(), String> {
        if self.state.bound.is_none() {
            return Err("no vertex buffer bound".to_string());
        }
        if !self.state.atlas_bound {
            return Err("no atlas bound".to_string());
        }
        let expected = BlockVertex::desc();
        for (element, attribute) in VertexFormat::BLOCK.elements().iter().zip(expected.attributes) {
            let Some(key) = element_key(element.usage) else {
                continue;
            };
            if !self.state.is_enabled(key) {
                return Err(format!("{:?} array on {:?} is not enabled", key.0, key.1));
            }
            let Some(pointer) = self.state.pointers.get(&key) else {
                return Err(format!("{:?} pointer on {:?} is not configured", key.0, key.1));
            };
            if pointer.stride as u64 != expected.array_stride
                || pointer.offset as u64 != attribute.offset
                || pointer.components != element.components
                || pointer.component_type != element.component_type
            {
                return Err(format!("{:?} pointer {:?} does not match the block vertex layout", key.0, pointer));
            }
        }
        Ok(())
    }
}

impl RenderBackend for GpuBackend {
    type Buffer = GpuBuffer;

    fn create_buffer(&mut self, label: &str) -> GpuBuffer {
        GpuBuffer {
            label: label.to_string(),
            buffer: None,
            vertex_count: 0,
        }
    }

    fn destroy_buffer(&mut self, buffer: GpuBuffer) {
        if let Some(buffer) = buffer.buffer {
            buffer.destroy();
        }
    }

    fn upload(&mut self, buffer: &mut GpuBuffer, data: &[u8], vertex_count: u32) {
        buffer.vertex_count = vertex_count;
        if data.is_empty() {
            return;
        }
        let fits = buffer
            .buffer
            .as_ref()
            .is_some_and(|existing| existing.size() >= data.len() as u64);
        if fits {
            if let Some(existing) = &buffer.buffer {
                self.queue.write_buffer(existing, 0, data);
            }
        } else {
            if let Some(old) = buffer.buffer.take() {
                old.destroy();
            }
            buffer.buffer = Some(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&buffer.label),
                contents: data,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            }));
        }
        self.ensure_quad_indices(vertex_count.div_ceil(QUAD_VERTICES));
    }

    fn bind_buffer(&mut self, buffer: &GpuBuffer) {
        // Pointers refer to the buffer bound when they were set.
        self.state.pointers.clear();
        self.state.bound = buffer.buffer.clone().map(|b| (b, buffer.vertex_count));
        if self.state.bound.is_none() {
            log::warn!("Binding blueprint buffer {:?} that was never uploaded", buffer.label);
        }
    }

    fn unbind_buffer(&mut self) {
        self.state.bound = None;
    }

    fn set_capability(&mut self, capability: Capability, enabled: bool) {
        match capability {
            Capability::StandardLighting => self.state.lighting = enabled,
            Capability::Lightmap => self.state.lightmap = enabled,
            Capability::CullFace => self.state.cull = enabled,
        }
    }

    fn push_matrix(&mut self) {
        self.state.matrix_depth += 1;
    }

    fn pop_matrix(&mut self) {
        if self.state.matrix_depth == 0 {
            log::warn!("Matrix stack underflow");
            return;
        }
        self.state.matrix_depth -= 1;
    }

    fn client_active_texture(&mut self, unit: TextureUnit) {
        self.state.active_unit = Some(unit);
    }

    fn enable_client_state(&mut self, array: ClientArray) {
        let key = self.state.key(array);
        self.state.enabled.insert(key, true);
    }

    fn disable_client_state(&mut self, array: ClientArray) {
        let key = self.state.key(array);
        self.state.enabled.insert(key, false);
    }

    fn attribute_pointer(&mut self, array: ClientArray, pointer: AttributePointer) {
        if pointer.stride != VERTEX_SIZE {
            log::warn!("Attribute pointer with stride {} on a {} byte layout", pointer.stride, VERTEX_SIZE);
        }
        let key = self.state.key(array);
        self.state.pointers.insert(key, pointer);
    }

    fn bind_atlas(&mut self) {
        self.state.atlas_bound = true;
    }

    fn draw_quads(&mut self, first: u32, count: u32) {
        if let Err(reason) = self.validate_draw() {
            log::warn!("Refusing blueprint draw: {}", reason);
            return;
        }
        if first % QUAD_VERTICES != 0 || count % QUAD_VERTICES != 0 {
            log::warn!("Quad draw range {}+{} is not quad aligned", first, count);
            return;
        }
        if self.state.lighting || self.state.lightmap {
            log::debug!("Blueprint drawn with lighting enabled; shading stays full-bright");
        }
        let Some((buffer, available)) = self.state.bound.clone() else {
            return;
        };
        if first + count > available {
            log::warn!("Quad draw range {}+{} exceeds {} uploaded vertices", first, count, available);
            return;
        }
        self.commands.push(DrawCommand {
            buffer,
            first,
            count,
            cull: self.state.cull,
        });
    }

    fn clear_current_color(&mut self) {
        // The shader takes colour from the vertices only; there is no current colour to reset.
    }
}
