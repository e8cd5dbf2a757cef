use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::Window,
};

use sine_terrain::{
    camera::{FlyCamera, ViewPreset, preset_distance},
    config::VisualizerConfig,
    controls::{Action, CAMERA_SPEED, Movement},
    frame::FramePacer,
    renderer::Renderer,
    scene::SceneNode,
    terrain::Terrain,
};

pub struct State {
    window: Arc<Window>,
    pub renderer: Renderer,
    pub root: SceneNode,
    pub camera: FlyCamera,
    preset_distance: f32,
    mouse_look: bool,
    cursor: glam::Vec2,
    last_frame: Instant,
}

impl State {
    pub async fn new(window: Arc<Window>, config: &VisualizerConfig) -> anyhow::Result<Self> {
        let mut renderer = Renderer::from_winit_window(window.clone()).await?;

        let (x_segments, z_segments) = config.grid();
        let terrain = match &config.heightmap {
            Some(path) => Terrain::from_height_map(x_segments, z_segments, path)?,
            None => Terrain::flat(x_segments, z_segments)?,
        };
        log::info!(
            "Terrain {}x{} with {} indices",
            terrain.x_segments(),
            terrain.z_segments(),
            terrain.geometry().indices().len()
        );
        let mut root = SceneNode::terrain(terrain);
        root.wave = config.wave_params();
        root.plane_mode = config.plane_mode;

        if let Some(path) = &config.texture {
            if let Err(e) = renderer.load_diffuse_texture(path) {
                log::warn!("Unable to load texture {:?}: {}", path, e);
            }
        }
        renderer.set_scene(&root);
        renderer.set_post_effect(config.effect);

        let distance = preset_distance(x_segments, z_segments);
        let mut camera = FlyCamera::default();
        camera.set_preset(ViewPreset::Top, distance);

        Ok(Self {
            window,
            renderer,
            root,
            camera,
            preset_distance: distance,
            mouse_look: false,
            cursor: glam::Vec2::ZERO,
            last_frame: Instant::now(),
        })
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.renderer.resize(size.width, size.height);
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let delta_ms = now.duration_since(self.last_frame).as_secs_f32() * 1000.0;
        self.last_frame = now;

        self.renderer.update(&mut self.root, &self.camera, delta_ms);
        self.renderer.render(&self.root)
    }

    pub fn handle_action(&mut self, event_loop: &ActiveEventLoop, action: Action) {
        match action {
            Action::Quit => event_loop.exit(),
            Action::Preset(preset) => self.camera.set_preset(preset, self.preset_distance),
            Action::Move(movement) => match movement {
                Movement::Forward => self.camera.move_forward(CAMERA_SPEED),
                Movement::Backward => self.camera.move_backward(CAMERA_SPEED),
                Movement::Left => self.camera.move_left(CAMERA_SPEED),
                Movement::Right => self.camera.move_right(CAMERA_SPEED),
                Movement::Up => self.camera.move_up(CAMERA_SPEED),
                Movement::Down => self.camera.move_down(CAMERA_SPEED),
            },
            Action::ToggleMouseLook => {
                self.mouse_look = !self.mouse_look;
                if self.mouse_look {
                    self.camera.anchor_mouse(self.cursor);
                }
                log::info!(
                    "Mouse look {}",
                    if self.mouse_look { "ENABLED" } else { "DISABLED" }
                );
            }
            Action::Wave(control) => self.root.wave.adjust(control),
            Action::PlaneMode(mode) => {
                log::info!("Plane mode: {:?}", mode);
                self.root.plane_mode = mode;
            }
            Action::ToggleGeometryWireframe => {
                let enabled = !self.renderer.geometry_wireframe();
                self.renderer.set_geometry_wireframe(enabled);
            }
            Action::ToggleFramebufferWireframe => {
                let enabled = !self.renderer.framebuffer_wireframe();
                self.renderer.set_framebuffer_wireframe(enabled);
            }
            Action::RenderMode(mode) => {
                if let Some(object) = self.root.object_mut() {
                    log::info!("Render mode: {}", mode.name());
                    object.set_render_mode(mode);
                }
            }
            Action::PostEffect(effect) => self.renderer.set_post_effect(effect),
        }
    }
}

pub struct App {
    config: VisualizerConfig,
    pacer: FramePacer,
    state: Option<State>,
}

impl App {
    pub fn new(config: VisualizerConfig) -> Self {
        let pacer = FramePacer::new(config.frame_delay(), Instant::now());
        log::debug!("Frame delay: {:?}", pacer.delay());
        Self {
            config,
            pacer,
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window_attributes = Window::default_attributes()
            .with_title("Sine Terrain")
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Unable to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(State::new(window, &self.config)) {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                log::error!("Unable to initialize renderer: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let app_state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => app_state.resize(size),
            WindowEvent::RedrawRequested => match app_state.render() {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let size = app_state.window.inner_size();
                    app_state.resize(size);
                }
                Err(e) => {
                    log::error!("Unable to render {}", e);
                }
            },
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if let Some(action) = Action::from_key(code) {
                    app_state.handle_action(event_loop, action);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                app_state.cursor = glam::vec2(position.x as f32, position.y as f32);
                if app_state.mouse_look {
                    app_state.camera.mouse_look(app_state.cursor);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            if self.pacer.frame_due(Instant::now()) {
                state.window.request_redraw();
            }
            event_loop.set_control_flow(ControlFlow::WaitUntil(self.pacer.next_frame()));
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    env_logger::init();

    let config = VisualizerConfig::parse();
    config.validate()?;
    log::debug!("{:?}", config);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}

pub fn main() -> anyhow::Result<()> {
    run()
}
