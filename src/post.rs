/// Screen-space effect applied when the offscreen framebuffer is
/// composited onto the window.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PostEffect {
    #[default]
    Standard,
    Grayscale,
    Blur,
    Invert,
    Sharpen,
    EdgeDetection,
}

/// Shader branch selected by [`PostUniforms::mode`].
const MODE_PASSTHROUGH: u32 = 0;
const MODE_GRAYSCALE: u32 = 1;
const MODE_INVERT: u32 = 2;
const MODE_KERNEL: u32 = 3;

impl PostEffect {
    pub const ALL: [PostEffect; 6] = [
        PostEffect::Standard,
        PostEffect::Grayscale,
        PostEffect::Blur,
        PostEffect::Invert,
        PostEffect::Sharpen,
        PostEffect::EdgeDetection,
    ];

    /// Effects are bound to the number keys 1 through 6.
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            1..=6 => Some(Self::ALL[digit as usize - 1]),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PostEffect::Standard => "standard",
            PostEffect::Grayscale => "grayscale",
            PostEffect::Blur => "blur",
            PostEffect::Invert => "invert colors",
            PostEffect::Sharpen => "sharpen",
            PostEffect::EdgeDetection => "edge detection",
        }
    }

    /// 3x3 convolution kernel, row major, for the kernel based effects.
    pub fn kernel(self) -> Option<[[f32; 3]; 3]> {
        match self {
            PostEffect::Blur => Some([
                [1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0],
                [2.0 / 16.0, 4.0 / 16.0, 2.0 / 16.0],
                [1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0],
            ]),
            PostEffect::Sharpen => Some([[-1.0, -1.0, -1.0], [-1.0, 9.0, -1.0], [-1.0, -1.0, -1.0]]),
            PostEffect::EdgeDetection => {
                Some([[1.0, 1.0, 1.0], [1.0, -8.0, 1.0], [1.0, 1.0, 1.0]])
            }
            _ => None,
        }
    }

    pub fn uniforms(self) -> PostUniforms {
        let mode = match self {
            PostEffect::Standard => MODE_PASSTHROUGH,
            PostEffect::Grayscale => MODE_GRAYSCALE,
            PostEffect::Invert => MODE_INVERT,
            PostEffect::Blur | PostEffect::Sharpen | PostEffect::EdgeDetection => MODE_KERNEL,
        };
        let mut kernel = [[0.0; 4]; 3];
        if let Some(rows) = self.kernel() {
            for (dst, src) in kernel.iter_mut().zip(rows) {
                dst[..3].copy_from_slice(&src);
            }
        }
        PostUniforms {
            mode,
            _padding: [0; 3],
            kernel,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PostUniforms {
    pub mode: u32,
    _padding: [u32; 3],
    pub kernel: [[f32; 4]; 3],
}

/// Offscreen colour and depth targets the scene renders into before the
/// post pass samples them.
pub struct Framebuffer {
    pub color_texture: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    pub depth_texture: wgpu::Texture,
    pub depth_view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub bind_group: wgpu::BindGroup,
    pub size: glam::UVec2,
}

impl Framebuffer {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Framebuffer Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        })
    }

    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        post_uniforms: &wgpu::Buffer,
        format: wgpu::TextureFormat,
        size: glam::UVec2,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width: size.x.max(1),
            height: size.y.max(1),
            depth_or_array_layers: 1,
        };
        log::debug!("Creating framebuffer at {}x{}", extent.width, extent.height);

        let color_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Framebuffer Color Texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Framebuffer Depth Texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[Self::DEPTH_FORMAT],
        });
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Framebuffer Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Framebuffer Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&color_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: post_uniforms.as_entire_binding(),
                },
            ],
        });

        Self {
            color_texture,
            color_view,
            depth_texture,
            depth_view,
            sampler,
            bind_group,
            size: glam::UVec2::new(extent.width, extent.height),
        }
    }
}
