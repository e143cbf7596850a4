use tracing::{debug, error, warn};
use wgpu::*;

use crate::controller::FrameData;
use crate::error::RenderError;
use crate::view::mesh::{create_unit_cube_mesh, InstanceRaw, MeshBuffer, Vertex};
use crate::view::texture::{create_texture_bind_group_layout, CubeTexture, TextureImage};
use crate::view::GpuContext;

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;
const INITIAL_INSTANCE_CAPACITY: usize = 256;

/// Anything that can draw a composed frame. The wgpu `RenderState` is the
/// production backend; tests substitute a recorder.
pub trait CubeRenderer {
    fn render(&mut self, frame: &FrameData) -> Result<(), RenderError>;
}

pub struct CameraResources {
    pub camera_buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub camera_bind_group: wgpu::BindGroup,
}

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

pub fn create_camera_resources(device: &wgpu::Device) -> CameraResources {
    let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("camera_buffer"),
        size: 64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("camera_bind_group_layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("camera_bind_group"),
        layout: &bind_group_layout,
        entries: &[wgpu::BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() }],
    });

    CameraResources { camera_buffer, bind_group_layout, camera_bind_group }
}

/// Compile the cube shader, reporting WGSL errors instead of panicking
async fn create_cube_shader(device: &wgpu::Device) -> Result<wgpu::ShaderModule, RenderError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("cube_shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/cube.wgsl").into()),
    });
    let info = shader.get_compilation_info().await;
    let scope_error = device.pop_error_scope().await;

    let messages: Vec<String> = info
        .messages
        .iter()
        .filter(|m| m.message_type == wgpu::CompilationMessageType::Error)
        .map(|m| match &m.location {
            Some(loc) => format!("{}:{}: {}", loc.line_number, loc.line_position, m.message),
            None => m.message.clone(),
        })
        .collect();

    if !messages.is_empty() {
        return Err(RenderError::ShaderCompile(messages.join("\n")));
    }
    if let Some(e) = scope_error {
        return Err(RenderError::ShaderCompile(e.to_string()));
    }
    Ok(shader)
}

pub async fn create_cube_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    camera_layout: &wgpu::BindGroupLayout,
    texture_layout: &wgpu::BindGroupLayout,
) -> Result<wgpu::RenderPipeline, RenderError> {
    let shader = create_cube_shader(device).await?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pipeline_layout"),
        bind_group_layouts: &[camera_layout, texture_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("cube_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout(), InstanceRaw::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState { format, blend: Some(wgpu::BlendState::REPLACE), write_mask: wgpu::ColorWrites::ALL })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    });

    match device.pop_error_scope().await {
        Some(e) => Err(RenderError::PipelineLink(e.to_string())),
        None => Ok(pipeline),
    }
}

///////////////////////////////////////////////////////////////////////////////

/// GPU resources for drawing the cube scene
pub struct RenderState {
    pub gpu: GpuContext,
    pipeline: RenderPipeline,
    camera_buffer: Buffer,
    camera_bind_group: BindGroup,
    texture: CubeTexture,
    cube_mesh: MeshBuffer,
    instance_buffer: Buffer,
    instance_capacity: usize,
    depth_view: TextureView,
    clear_color: Color,
}

fn create_instance_buffer(device: &Device, capacity: usize) -> Buffer {
    device.create_buffer(&BufferDescriptor {
        label: Some("instance_buffer"),
        size: (capacity * std::mem::size_of::<InstanceRaw>()) as BufferAddress,
        usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

impl RenderState {
    pub async fn new(gpu: GpuContext, image: &TextureImage, clear_color: [f64; 4]) -> Result<Self, RenderError> {
        let device = gpu.device.as_ref();

        let camera = create_camera_resources(device);
        let texture_layout = create_texture_bind_group_layout(device);
        let pipeline = create_cube_pipeline(device, gpu.format, &camera.bind_group_layout, &texture_layout).await?;
        let texture = CubeTexture::upload(device, gpu.queue.as_ref(), &texture_layout, image);
        let cube_mesh = create_unit_cube_mesh().upload(device);
        let instance_buffer = create_instance_buffer(device, INITIAL_INSTANCE_CAPACITY);
        let (_, depth_view) = create_depth_texture(device, gpu.config.width, gpu.config.height);

        let [r, g, b, a] = clear_color;
        Ok(Self {
            pipeline,
            camera_buffer: camera.camera_buffer,
            camera_bind_group: camera.camera_bind_group,
            texture,
            cube_mesh,
            instance_buffer,
            instance_capacity: INITIAL_INSTANCE_CAPACITY,
            depth_view,
            clear_color: Color { r, g, b, a },
            gpu,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.gpu.resize(width, height);
        let (_, depth_view) = create_depth_texture(self.gpu.device.as_ref(), width, height);
        self.depth_view = depth_view;
    }

    /// Upload the instance list, growing the buffer only when it is too small
    fn upload_instances(&mut self, frame: &FrameData) -> u32 {
        let raw: Vec<InstanceRaw> = frame.cubes.iter().map(InstanceRaw::from).collect();
        if raw.len() > self.instance_capacity {
            self.instance_capacity = raw.len().next_power_of_two();
            debug!(capacity = self.instance_capacity, "growing instance buffer");
            self.instance_buffer = create_instance_buffer(self.gpu.device.as_ref(), self.instance_capacity);
        }
        if !raw.is_empty() {
            self.gpu.queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&raw));
        }
        raw.len() as u32
    }
}

impl CubeRenderer for RenderState {
    fn render(&mut self, frame: &FrameData) -> Result<(), RenderError> {
        let surface_texture = match self.gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(e @ (SurfaceError::Lost | SurfaceError::Outdated)) => {
                warn!("surface {e:?}, reconfiguring");
                self.gpu.reconfigure();
                return Err(e.into());
            }
            Err(e @ SurfaceError::OutOfMemory) => {
                error!("surface error: {e:?}");
                return Err(e.into());
            }
            Err(e) => {
                warn!("surface error: {e:?}, skipping frame");
                return Err(e.into());
            }
        };

        self.gpu.queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&frame.camera));
        let instance_count = self.upload_instances(frame);

        let view = surface_texture.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = self.gpu.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(self.clear_color),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if instance_count > 0 {
                rp.set_pipeline(&self.pipeline);
                rp.set_bind_group(0, &self.camera_bind_group, &[]);
                rp.set_bind_group(1, &self.texture.bind_group, &[]);
                rp.set_vertex_buffer(0, self.cube_mesh.vertex_buffer.slice(..));
                rp.set_vertex_buffer(1, self.instance_buffer.slice(..));
                rp.set_index_buffer(self.cube_mesh.index_buffer.slice(..), IndexFormat::Uint16);
                // instances rasterize in list order: sky, ground, stacks
                rp.draw_indexed(0..self.cube_mesh.index_count, 0, 0..instance_count);
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}
