use crate::renderer::Renderer;
use std::sync::Arc;
use winit::window::Window;

impl Renderer {
    pub async fn from_winit_window(window: Arc<Window>) -> anyhow::Result<Self> {
        let window_size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;
        log::debug!("Winit surface created.");
        Self::new_with_surface(surface, instance, window_size.width, window_size.height).await
    }
}
