use crate::{
    data_structures::vertex::BlockVertex,
    resources::{atlas_layout, camera_layout},
};

/// Pipelines for blueprint quads, one per culling mode.
///
/// Blueprints are drawn see-through, so both pipelines alpha-blend.
#[derive(Debug)]
pub struct BlueprintPipelines {
    pub culled: wgpu::RenderPipeline,
    pub unculled: wgpu::RenderPipeline,
    pub atlas_layout: wgpu::BindGroupLayout,
    pub camera_layout: wgpu::BindGroupLayout,
}

impl BlueprintPipelines {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
    ) -> Self {
        let atlas_layout = atlas_layout(device);
        let camera_layout = camera_layout(device);
        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Blueprint Pipeline Layout"),
            bind_group_layouts: &[&atlas_layout, &camera_layout],
            push_constant_ranges: &[],
        });

        let shader = || wgpu::ShaderModuleDescriptor {
            label: Some("Blueprint Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("blueprint.wgsl").into()),
        };

        let culled = mk_blueprint_pipeline(
            device,
            &render_pipeline_layout,
            color_format,
            depth_format,
            Some(wgpu::Face::Back),
            shader(),
        );
        let unculled = mk_blueprint_pipeline(
            device,
            &render_pipeline_layout,
            color_format,
            depth_format,
            None,
            shader(),
        );

        Self {
            culled,
            unculled,
            atlas_layout,
            camera_layout,
        }
    }

    pub fn for_culling(&self, cull: bool) -> &wgpu::RenderPipeline {
        if cull { &self.culled } else { &self.unculled }
    }
}

pub fn mk_blueprint_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    depth_format: Option<wgpu::TextureFormat>,
    cull_mode: Option<wgpu::Face>,
    shader: wgpu::ShaderModuleDescriptor,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(shader);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Blueprint Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[BlockVertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            // Quads are expanded to two triangles each through the quad index buffer.
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            // Blueprints overlay the world; they test against it but do not occlude it.
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
