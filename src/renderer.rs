use std::path::Path;

use super::camera::{Camera, Projection};
use super::geometry::TerrainVertex;
use super::mesh::{DiffuseTexture, GpuMesh};
use super::post::{Framebuffer, PostEffect};
use super::scene::{FrameContext, SceneNode};
use super::terrain::RenderMode;
use wgpu::util::DeviceExt;

const SCENE_CLEAR: wgpu::Color = wgpu::Color {
    r: 0.01,
    g: 0.01,
    b: 0.01,
    a: 1.0,
};

pub struct Renderer {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub projection: Projection,
    node_layout: wgpu::BindGroupLayout,
    strip_pipeline: wgpu::RenderPipeline,
    strip_wireframe_pipeline: Option<wgpu::RenderPipeline>,
    points_pipeline: wgpu::RenderPipeline,
    post_layout: wgpu::BindGroupLayout,
    post_pipeline: wgpu::RenderPipeline,
    post_wireframe_pipeline: Option<wgpu::RenderPipeline>,
    post_uniform_buffer: wgpu::Buffer,
    framebuffer: Framebuffer,
    diffuse: DiffuseTexture,
    meshes: Vec<GpuMesh>,
    post_effect: PostEffect,
    geometry_wireframe: bool,
    framebuffer_wireframe: bool,
}

impl Renderer {
    pub async fn new_with_surface(
        surface: wgpu::Surface<'static>,
        instance: wgpu::Instance,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
            })
            .await?;
        let info = adapter.get_info();
        log::info!("Adapter: {} ({:?}, {:?})", info.name, info.device_type, info.backend);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        // Wireframe needs line polygon mode, which not every adapter has.
        let line_mode = adapter.features().contains(wgpu::Features::POLYGON_MODE_LINE);
        if !line_mode {
            log::warn!("Adapter lacks POLYGON_MODE_LINE, wireframe toggles are disabled");
        }
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: if line_mode {
                    wgpu::Features::POLYGON_MODE_LINE
                } else {
                    wgpu::Features::empty()
                },
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;
        surface.configure(&device, &surface_config);

        let node_layout = GpuMesh::bind_group_layout(&device);
        let post_layout = Framebuffer::bind_group_layout(&device);

        let post_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Post Uniform Buffer"),
            contents: bytemuck::cast_slice(&[PostEffect::default().uniforms()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let framebuffer = Framebuffer::new(
            &device,
            &post_layout,
            &post_uniform_buffer,
            surface_format,
            glam::UVec2::new(surface_config.width, surface_config.height),
        );
        let diffuse = DiffuseTexture::white(&device, &queue);

        // Scene pipelines
        let terrain_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Terrain Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("terrain.wgsl").into()),
        });
        let terrain_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Terrain Pipeline Layout"),
                bind_group_layouts: &[&node_layout],
                push_constant_ranges: &[],
            });
        let terrain_pipeline = |label, topology, polygon_mode| {
            create_terrain_pipeline(
                &device,
                &terrain_pipeline_layout,
                &terrain_shader,
                surface_format,
                label,
                topology,
                polygon_mode,
            )
        };
        let strip_pipeline = terrain_pipeline(
            "Terrain Strip Pipeline",
            wgpu::PrimitiveTopology::TriangleStrip,
            wgpu::PolygonMode::Fill,
        );
        let strip_wireframe_pipeline = line_mode.then(|| {
            terrain_pipeline(
                "Terrain Wireframe Pipeline",
                wgpu::PrimitiveTopology::TriangleStrip,
                wgpu::PolygonMode::Line,
            )
        });
        let points_pipeline = terrain_pipeline(
            "Terrain Points Pipeline",
            wgpu::PrimitiveTopology::PointList,
            wgpu::PolygonMode::Fill,
        );

        // Post pipelines
        let post_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Post Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("post.wgsl").into()),
        });
        let post_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Post Pipeline Layout"),
            bind_group_layouts: &[&post_layout],
            push_constant_ranges: &[],
        });
        let post_pipeline = create_post_pipeline(
            &device,
            &post_pipeline_layout,
            &post_shader,
            surface_format,
            wgpu::PolygonMode::Fill,
        );
        let post_wireframe_pipeline = line_mode.then(|| {
            create_post_pipeline(
                &device,
                &post_pipeline_layout,
                &post_shader,
                surface_format,
                wgpu::PolygonMode::Line,
            )
        });

        let mut projection = Projection::default();
        projection.update_aspect(glam::UVec2::new(surface_config.width, surface_config.height));

        Ok(Self {
            adapter,
            device,
            queue,
            surface,
            surface_config,
            projection,
            node_layout,
            strip_pipeline,
            strip_wireframe_pipeline,
            points_pipeline,
            post_layout,
            post_pipeline,
            post_wireframe_pipeline,
            post_uniform_buffer,
            framebuffer,
            diffuse,
            meshes: Vec::new(),
            post_effect: PostEffect::default(),
            geometry_wireframe: false,
            framebuffer_wireframe: false,
        })
    }

    pub fn window_size(&self) -> glam::UVec2 {
        glam::UVec2::new(self.surface_config.width, self.surface_config.height)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        let window_size = self.window_size();
        log::debug!("Window Size: {}x{}", window_size.x, window_size.y);
        self.framebuffer = Framebuffer::new(
            &self.device,
            &self.post_layout,
            &self.post_uniform_buffer,
            self.surface_config.format,
            window_size,
        );
        self.projection.update_aspect(window_size);
    }

    /// Replaces the surface texture used by every terrain node. Meshes
    /// uploaded afterwards pick it up.
    pub fn load_diffuse_texture(&mut self, path: &Path) -> anyhow::Result<()> {
        self.diffuse = DiffuseTexture::from_path(&self.device, &self.queue, path)?;
        Ok(())
    }

    /// Uploads a GPU mesh for every drawable node, in draw order.
    pub fn set_scene(&mut self, root: &SceneNode) {
        let mut meshes = Vec::with_capacity(root.drawable_count());
        root.draw(&mut |node: &SceneNode| {
            if let Some(object) = node.object() {
                meshes.push(GpuMesh::from_geometry(
                    &self.device,
                    &self.node_layout,
                    &self.diffuse,
                    object.geometry(),
                ));
            }
        });
        log::debug!("Scene uploaded with {} meshes", meshes.len());
        self.meshes = meshes;
    }

    /// Runs the scene update with the current camera and window aspect.
    pub fn update(&self, root: &mut SceneNode, camera: &impl Camera, delta_ms: f32) {
        let frame = FrameContext {
            projection: self.projection.matrix(),
            view: *camera.view_matrix(),
            eye: camera.eye_position(),
            delta_ms,
        };
        root.update(&glam::Mat4::IDENTITY, &frame);
    }

    pub fn set_post_effect(&mut self, effect: PostEffect) {
        log::info!("Post effect: {}", effect.name());
        self.post_effect = effect;
        self.queue.write_buffer(
            &self.post_uniform_buffer,
            0,
            bytemuck::cast_slice(&[effect.uniforms()]),
        );
    }

    pub fn post_effect(&self) -> PostEffect {
        self.post_effect
    }

    pub fn set_geometry_wireframe(&mut self, enabled: bool) {
        self.geometry_wireframe = wireframe_state(
            "Wireframe",
            enabled,
            self.strip_wireframe_pipeline.is_some(),
        );
    }

    pub fn geometry_wireframe(&self) -> bool {
        self.geometry_wireframe
    }

    pub fn set_framebuffer_wireframe(&mut self, enabled: bool) {
        self.framebuffer_wireframe = wireframe_state(
            "Framebuffer wireframe",
            enabled,
            self.post_wireframe_pipeline.is_some(),
        );
    }

    pub fn framebuffer_wireframe(&self) -> bool {
        self.framebuffer_wireframe
    }

    /// Draws the scene into the offscreen framebuffer, then composites it
    /// onto the window through the post effect.
    pub fn render(&mut self, root: &SceneNode) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.framebuffer.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(SCENE_CLEAR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.framebuffer.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let mut meshes = self.meshes.iter();
            let queue = &self.queue;
            let strip_pipeline = match (&self.strip_wireframe_pipeline, self.geometry_wireframe) {
                (Some(wireframe), true) => wireframe,
                _ => &self.strip_pipeline,
            };
            let points_pipeline = &self.points_pipeline;
            root.draw(&mut |node: &SceneNode| {
                let (Some(object), Some(mesh)) = (node.object(), meshes.next()) else {
                    log::warn!("Scene has more drawables than uploaded meshes");
                    return;
                };
                mesh.write_uniforms(queue, node.uniforms());
                match object.render_mode() {
                    RenderMode::TriangleStrip => render_pass.set_pipeline(strip_pipeline),
                    RenderMode::Points => render_pass.set_pipeline(points_pipeline),
                }
                mesh.draw(&mut render_pass);
            });
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Post Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            let pipeline = match (&self.post_wireframe_pipeline, self.framebuffer_wireframe) {
                (Some(wireframe), true) => wireframe,
                _ => &self.post_pipeline,
            };
            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, &self.framebuffer.bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// Resolves a wireframe toggle against adapter support. Without a line
/// pipeline the request is refused and the mode stays off.
fn wireframe_state(label: &str, enabled: bool, supported: bool) -> bool {
    if enabled && !supported {
        log::warn!("{label} mode unavailable: adapter lacks POLYGON_MODE_LINE");
        return false;
    }
    log::info!(
        "{label} mode {}",
        if enabled { "ENABLED" } else { "DISABLED" }
    );
    enabled
}

fn create_terrain_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    label: &str,
    topology: wgpu::PrimitiveTopology,
    polygon_mode: wgpu::PolygonMode,
) -> wgpu::RenderPipeline {
    let strip_index_format = match topology {
        wgpu::PrimitiveTopology::TriangleStrip => Some(wgpu::IndexFormat::Uint32),
        _ => None,
    };
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[TerrainVertex::desc()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        depth_stencil: Some(wgpu::DepthStencilState {
            format: Framebuffer::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format,
            front_face: wgpu::FrontFace::Ccw,
            // The terrain is seen from below too.
            cull_mode: None,
            polygon_mode,
            unclipped_depth: false,
            conservative: false,
        },
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

fn create_post_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    polygon_mode: wgpu::PolygonMode,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Post Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        depth_stencil: None,
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode,
            unclipped_depth: false,
            conservative: false,
        },
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}
